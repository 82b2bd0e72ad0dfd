use crate::{
    error::AppResult,
    models::{AuthResponse, LoginRequest, RegisterRequest},
    service::AuthService,
};
use actix_web::{HttpResponse, web};
use tracing::{info, instrument};

// auth end points

/// Exchange email and password for a session token
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body(content = LoginRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Invalid request body"),
        (status = 401, description = "Invalid email or password"),
        (status = 429, description = "Too many requests")
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_login", skip(auth, payload), fields(email = %payload.email))]
pub async fn login(
    auth: web::Data<AuthService>,
    payload: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    info!("Login request received");

    let response = auth.login(payload.into_inner()).await?;

    info!(user_id = response.user.id, "Login successful");
    Ok(HttpResponse::Ok().json(response))
}

/// Create an employee account and log it in
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body(content = RegisterRequest, content_type = "application/json"),
    responses(
        (status = 201, description = "Registered", body = AuthResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email already exists"),
        (status = 429, description = "Too many requests")
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_register", skip(auth, payload), fields(email = %payload.email))]
pub async fn register(
    auth: web::Data<AuthService>,
    payload: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    info!("Registration request received");

    let response = auth.register(payload.into_inner()).await?;

    info!(user_id = response.user.id, "Employee registered");
    Ok(HttpResponse::Created().json(response))
}
