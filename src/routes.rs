use crate::{
    api::{employee, leave_request},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
    error::AppError,
};
use actix_cors::Cors;
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{HttpResponse, Responder, get, http::header, middleware::from_fn, web};
use serde_json::json;
use std::sync::Arc;

// Helper to build per-route limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);

    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_default();
    Governor::new(&cfg)
}

/// Open CORS policy for browser clients. Preflights are answered here,
/// before the auth middleware sees them.
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .send_wildcard()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
        ])
        .max_age(3600)
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "message": "HR leave service is running"
    }))
}

/// Body, query and path extraction failures all surface as `invalid_input`.
fn extractor_errors(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::InvalidInput(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::InvalidInput(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::InvalidInput(err.to_string()).into()),
    );
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    extractor_errors(cfg);
    cfg.service(health);

    cfg.service(
        web::scope(&config.api_prefix)
            // Public routes
            .service(
                web::scope("/auth")
                    .service(
                        web::resource("/login")
                            .wrap(login_limiter)
                            .route(web::post().to(handlers::login)),
                    )
                    .service(
                        web::resource("/register")
                            .wrap(register_limiter)
                            .route(web::post().to(handlers::register)),
                    ),
            )
            // Protected routes
            .service(
                web::scope("/employees")
                    .wrap(from_fn(auth_middleware)) // authentication
                    .wrap(protected_limiter.clone()) // rate limiting
                    // /employees
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    // /employees/{id}
                    .service(web::resource("/{id}").route(web::get().to(employee::get_employee))),
            )
            .service(
                web::scope("/leave-requests")
                    .wrap(from_fn(auth_middleware))
                    .wrap(protected_limiter)
                    // /leave-requests
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_request::leave_list))
                            .route(web::post().to(leave_request::create_leave)),
                    )
                    // /leave-requests/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(leave_request::get_leave))
                            .route(web::put().to(leave_request::update_leave))
                            .route(web::delete().to(leave_request::delete_leave)),
                    )
                    // /leave-requests/{id}/approve
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(leave_request::approve_leave)),
                    )
                    // /leave-requests/{id}/reject
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(leave_request::reject_leave)),
                    ),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::generate_token;
    use crate::auth::password::hash_password;
    use crate::model::employee::{Employee, EmployeeProfile};
    use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType};
    use crate::model::role::Role;
    use crate::repository::employee::MockEmployeeRepository;
    use crate::repository::leave_request::MockLeaveRequestRepository;
    use crate::repository::{EmployeeRepository, LeaveRequestRepository};
    use crate::service::{AuthService, EmployeeService, LeaveRequestService};
    use actix_web::{App, http::StatusCode, test, web::Data};
    use chrono::{Days, NaiveDate, Utc};
    use serde_json::Value;
    use std::net::SocketAddr;

    const SECRET: &str = "test-secret";

    fn test_config() -> Config {
        Config {
            database_url: "mysql://unused".into(),
            jwt_secret: SECRET.into(),
            server_addr: "127.0.0.1:0".into(),
            token_ttl: 3600,
            rate_login_per_min: 1000,
            rate_register_per_min: 1000,
            rate_protected_per_min: 1000,
            api_prefix: "/api/v1".into(),
            log_dir: "logs".into(),
            log_level: tracing::Level::DEBUG,
        }
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    fn employee(id: u64, role: Option<Role>) -> Employee {
        Employee {
            id,
            name: "John Doe".into(),
            email: format!("user{id}@example.com"),
            password_hash: String::new(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn bearer(id: u64, role: Option<Role>) -> (&'static str, String) {
        let token = generate_token(&employee(id, role), SECRET, 3600).unwrap();
        ("Authorization", format!("Bearer {token}"))
    }

    fn day(offset: u64) -> NaiveDate {
        Utc::now().date_naive().checked_add_days(Days::new(offset)).unwrap()
    }

    fn stored_leave(id: u64, owner: u64, status: LeaveStatus) -> LeaveRequest {
        let profile = EmployeeProfile::from(&employee(owner, Some(Role::Employee)));
        LeaveRequest {
            id,
            employee_id: owner,
            employee: profile,
            start_date: day(3),
            end_date: day(4),
            leave_type: LeaveType::Sick,
            status,
            reason: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    macro_rules! test_app {
        ($employees:expr, $leaves:expr) => {{
            let employees: Arc<dyn EmployeeRepository> = Arc::new($employees);
            let leaves: Arc<dyn LeaveRequestRepository> = Arc::new($leaves);
            let config = test_config();

            test::init_service(
                App::new()
                    .wrap(cors())
                    .app_data(Data::new(config.clone()))
                    .app_data(Data::new(AuthService::new(
                        employees.clone(),
                        config.jwt_secret.clone(),
                        config.token_ttl,
                    )))
                    .app_data(Data::new(EmployeeService::new(employees.clone())))
                    .app_data(Data::new(LeaveRequestService::new(leaves, employees)))
                    .configure(|cfg| configure(cfg, &config)),
            )
            .await
        }};
    }

    #[actix_web::test]
    async fn health_is_public() {
        let app = test_app!(MockEmployeeRepository::new(), MockLeaveRequestRepository::new());

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "ok");
    }

    #[actix_web::test]
    async fn preflight_is_answered_with_open_cors_headers() {
        let app = test_app!(MockEmployeeRepository::new(), MockLeaveRequestRepository::new());

        let req = test::TestRequest::default()
            .method(actix_web::http::Method::OPTIONS)
            .uri("/api/v1/auth/login")
            .peer_addr(peer())
            .insert_header((header::ORIGIN, "http://example.com"))
            .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "POST"))
            .insert_header((header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let headers = resp.headers();
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
        let methods = headers
            .get(header::ACCESS_CONTROL_ALLOW_METHODS)
            .unwrap()
            .to_str()
            .unwrap();
        for method in ["GET", "POST", "PUT", "DELETE", "OPTIONS"] {
            assert!(methods.contains(method), "{method} missing from {methods}");
        }
    }

    #[actix_web::test]
    async fn preflight_on_protected_route_skips_authentication() {
        let app = test_app!(MockEmployeeRepository::new(), MockLeaveRequestRepository::new());

        let req = test::TestRequest::default()
            .method(actix_web::http::Method::OPTIONS)
            .uri("/api/v1/leave-requests/1/approve")
            .peer_addr(peer())
            .insert_header((header::ORIGIN, "http://example.com"))
            .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "PUT"))
            .insert_header((header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let allowed = resp
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_HEADERS)
            .unwrap()
            .to_str()
            .unwrap()
            .to_ascii_lowercase();
        assert!(allowed.contains("authorization"), "got {allowed}");
    }

    #[actix_web::test]
    async fn simple_requests_carry_allow_origin() {
        let app = test_app!(MockEmployeeRepository::new(), MockLeaveRequestRepository::new());

        let req = test::TestRequest::get()
            .uri("/health")
            .insert_header((header::ORIGIN, "http://example.com"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }

    #[actix_web::test]
    async fn protected_routes_require_a_bearer_token() {
        let app = test_app!(MockEmployeeRepository::new(), MockLeaveRequestRepository::new());

        for uri in ["/api/v1/leave-requests", "/api/v1/employees"] {
            let req = test::TestRequest::get().uri(uri).peer_addr(peer()).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["error"], "unauthenticated");
        }
    }

    #[actix_web::test]
    async fn tampered_or_foreign_tokens_are_rejected() {
        let app = test_app!(MockEmployeeRepository::new(), MockLeaveRequestRepository::new());
        let foreign = generate_token(&employee(1, None), "other-secret", 3600).unwrap();

        for header in [
            format!("Bearer {foreign}"),
            "Bearer not.a.jwt".to_string(),
            "Token abc".to_string(),
        ] {
            let req = test::TestRequest::get()
                .uri("/api/v1/leave-requests/1")
                .peer_addr(peer())
                .insert_header(("Authorization", header))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[actix_web::test]
    async fn login_returns_token_and_profile() {
        let hash = hash_password("password123").unwrap();
        let mut employees = MockEmployeeRepository::new();
        employees
            .expect_find_by_email()
            .returning(move |email| {
                let mut found = employee(1, Some(Role::Hr));
                found.email = email.to_string();
                found.password_hash = hash.clone();
                Ok(Some(found))
            });
        let app = test_app!(employees, MockLeaveRequestRepository::new());

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .peer_addr(peer())
            .set_json(json!({ "email": "hr@example.com", "password": "password123" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
        assert_eq!(body["user"]["role"], "hr");
        assert!(body["user"].get("password_hash").is_none());
    }

    #[actix_web::test]
    async fn login_with_wrong_password_is_401() {
        let hash = hash_password("password123").unwrap();
        let mut employees = MockEmployeeRepository::new();
        employees.expect_find_by_email().returning(move |_| {
            let mut found = employee(1, None);
            found.password_hash = hash.clone();
            Ok(Some(found))
        });
        let app = test_app!(employees, MockLeaveRequestRepository::new());

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .peer_addr(peer())
            .set_json(json!({ "email": "a@example.com", "password": "wrong" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "invalid_credentials");
    }

    #[actix_web::test]
    async fn register_creates_account() {
        let mut employees = MockEmployeeRepository::new();
        employees.expect_find_by_email().returning(|_| Ok(None));
        employees.expect_create().returning(|new| {
            let mut created = employee(5, new.role);
            created.name = new.name.clone();
            created.email = new.email.clone();
            Ok(created)
        });
        let app = test_app!(employees, MockLeaveRequestRepository::new());

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .peer_addr(peer())
            .set_json(json!({
                "name": "Jane Roe",
                "email": "jane@example.com",
                "password": "secret123"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["user"]["email"], "jane@example.com");
        assert!(body["user"]["role"].is_null());
    }

    #[actix_web::test]
    async fn malformed_json_is_invalid_input() {
        let app = test_app!(MockEmployeeRepository::new(), MockLeaveRequestRepository::new());

        let req = test::TestRequest::post()
            .uri("/api/v1/leave-requests")
            .peer_addr(peer())
            .insert_header(bearer(1, None))
            .set_json(json!({ "start_date": "tomorrow", "type": "vacation" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "invalid_input");
    }

    #[actix_web::test]
    async fn unknown_sort_column_and_bad_id_are_invalid_input() {
        let app = test_app!(MockEmployeeRepository::new(), MockLeaveRequestRepository::new());

        for uri in [
            "/api/v1/leave-requests?sort_by=reason",
            "/api/v1/employees?sort_dir=sideways",
            "/api/v1/leave-requests/abc",
        ] {
            let req = test::TestRequest::get()
                .uri(uri)
                .peer_addr(peer())
                .insert_header(bearer(1, None))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
        }
    }

    #[actix_web::test]
    async fn create_leave_uses_token_subject_and_returns_201() {
        let mut employees = MockEmployeeRepository::new();
        employees
            .expect_find_by_id()
            .returning(|id| Ok(Some(employee(id, Some(Role::Employee)))));
        let mut leaves = MockLeaveRequestRepository::new();
        leaves
            .expect_has_overlapping_approved()
            .returning(|_, _, _, _| Ok(false));
        leaves
            .expect_create()
            .withf(|new| new.employee_id == 7 && new.leave_type == LeaveType::Sick)
            .returning(|_| Ok(11));
        leaves
            .expect_find_by_id()
            .returning(|id| Ok(Some(stored_leave(id, 7, LeaveStatus::Pending))));
        let app = test_app!(employees, leaves);

        let req = test::TestRequest::post()
            .uri("/api/v1/leave-requests")
            .peer_addr(peer())
            .insert_header(bearer(7, Some(Role::Employee)))
            .set_json(json!({
                "start_date": day(3),
                "end_date": day(4),
                "type": "sick"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["id"], 11);
        assert_eq!(body["data"]["type"], "sick");
        assert_eq!(body["data"]["status"], "pending");
        assert_eq!(body["data"]["employee"]["id"], 7);
    }

    #[actix_web::test]
    async fn overlapping_create_is_409() {
        let mut employees = MockEmployeeRepository::new();
        employees
            .expect_find_by_id()
            .returning(|id| Ok(Some(employee(id, None))));
        let mut leaves = MockLeaveRequestRepository::new();
        leaves
            .expect_has_overlapping_approved()
            .returning(|_, _, _, _| Ok(true));
        let app = test_app!(employees, leaves);

        let req = test::TestRequest::post()
            .uri("/api/v1/leave-requests")
            .peer_addr(peer())
            .insert_header(bearer(1, None))
            .set_json(json!({ "start_date": day(2), "end_date": day(4), "type": "vacation" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "overlap_conflict");
    }

    #[actix_web::test]
    async fn approve_by_manager_is_forbidden() {
        let mut leaves = MockLeaveRequestRepository::new();
        leaves
            .expect_find_by_id()
            .returning(|id| Ok(Some(stored_leave(id, 1, LeaveStatus::Pending))));
        leaves.expect_update().never();
        let app = test_app!(MockEmployeeRepository::new(), leaves);

        let req = test::TestRequest::put()
            .uri("/api/v1/leave-requests/3/approve")
            .peer_addr(peer())
            .insert_header(bearer(2, Some(Role::Manager)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "forbidden");
    }

    #[actix_web::test]
    async fn stranger_update_is_unauthorized_code() {
        let mut leaves = MockLeaveRequestRepository::new();
        leaves
            .expect_find_by_id()
            .returning(|id| Ok(Some(stored_leave(id, 1, LeaveStatus::Pending))));
        leaves.expect_update().never();
        let app = test_app!(MockEmployeeRepository::new(), leaves);

        let req = test::TestRequest::put()
            .uri("/api/v1/leave-requests/3")
            .peer_addr(peer())
            .insert_header(bearer(2, Some(Role::Employee)))
            .set_json(json!({ "status": "approved" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "unauthorized");
    }

    #[actix_web::test]
    async fn missing_leave_is_404() {
        let mut leaves = MockLeaveRequestRepository::new();
        leaves.expect_find_by_id().returning(|_| Ok(None));
        let app = test_app!(MockEmployeeRepository::new(), leaves);

        let req = test::TestRequest::get()
            .uri("/api/v1/leave-requests/99")
            .peer_addr(peer())
            .insert_header(bearer(1, None))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "not_found");
    }

    #[actix_web::test]
    async fn owner_delete_returns_message_only() {
        let mut leaves = MockLeaveRequestRepository::new();
        leaves
            .expect_find_by_id()
            .returning(|id| Ok(Some(stored_leave(id, 1, LeaveStatus::Pending))));
        leaves.expect_soft_delete().times(1).returning(|_| Ok(()));
        let app = test_app!(MockEmployeeRepository::new(), leaves);

        let req = test::TestRequest::delete()
            .uri("/api/v1/leave-requests/3")
            .peer_addr(peer())
            .insert_header(bearer(1, Some(Role::Employee)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Leave request deleted successfully");
        assert!(body.get("data").is_none());
    }

    #[actix_web::test]
    async fn list_wraps_data_with_pagination() {
        let mut leaves = MockLeaveRequestRepository::new();
        leaves.expect_find_all().returning(|q| {
            assert_eq!(q.page.page_size, 2);
            Ok((vec![stored_leave(1, 1, LeaveStatus::Approved)], 5))
        });
        let app = test_app!(MockEmployeeRepository::new(), leaves);

        let req = test::TestRequest::get()
            .uri("/api/v1/leave-requests?page=1&page_size=2&status=approved&sort_by=start_date&sort_dir=asc")
            .peer_addr(peer())
            .insert_header(bearer(1, None))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["success"], true);
        assert_eq!(body["pagination"]["total_items"], 5);
        assert_eq!(body["pagination"]["total_pages"], 3);
        assert_eq!(body["data"][0]["status"], "approved");
    }

    #[actix_web::test]
    async fn login_is_rate_limited_per_peer() {
        let employees = {
            let mut m = MockEmployeeRepository::new();
            m.expect_find_by_email().returning(|_| Ok(None));
            m
        };
        let employees: Arc<dyn EmployeeRepository> = Arc::new(employees);
        let mut config = test_config();
        config.rate_login_per_min = 1;

        let app = test::init_service(
            App::new()
                .app_data(Data::new(AuthService::new(employees, SECRET.into(), 3600)))
                .configure(|cfg| configure(cfg, &config)),
        )
        .await;

        let login = || {
            test::TestRequest::post()
                .uri("/api/v1/auth/login")
                .peer_addr(peer())
                .set_json(json!({ "email": "a@example.com", "password": "x" }))
                .to_request()
        };

        let first = test::call_service(&app, login()).await;
        assert_eq!(first.status(), StatusCode::UNAUTHORIZED);

        let second = test::call_service(&app, login()).await;
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
