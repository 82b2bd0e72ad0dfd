use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::model::employee::Employee;
use crate::models::Claims;

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as usize)
        .unwrap_or_default()
}

/// Signs an HS256 session token for `employee`, valid for `ttl` seconds.
/// Expiry saturates instead of wrapping for very large TTLs.
pub fn generate_token(employee: &Employee, secret: &str, ttl: u64) -> AppResult<String> {
    let issued_at = now();
    let claims = Claims {
        user_id: employee.id,
        email: employee.email.clone(),
        role: employee.role,
        iat: issued_at,
        exp: issued_at.saturating_add(usize::try_from(ttl).unwrap_or(usize::MAX)),
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("token signing failed: {e}")))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::role::Role;
    use chrono::Utc;

    fn employee() -> Employee {
        Employee {
            id: 42,
            name: "John Doe".into(),
            email: "john@example.com".into(),
            password_hash: String::new(),
            role: Some(Role::Hr),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn token_round_trips_identity() {
        let token = generate_token(&employee(), "test-secret-key", 3600).unwrap();
        let claims = verify_token(&token, "test-secret-key").unwrap();
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.email, "john@example.com");
        assert_eq!(claims.role, Some(Role::Hr));
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn huge_ttl_saturates_expiry() {
        let token = generate_token(&employee(), "test-secret-key", u64::MAX).unwrap();
        let claims = verify_token(&token, "test-secret-key").unwrap();
        assert_eq!(claims.exp, usize::MAX);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_token(&employee(), "test-secret-key", 3600).unwrap();
        assert!(verify_token(&token, "other-secret").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = Claims {
            user_id: 1,
            email: "a@example.com".into(),
            role: None,
            iat: 1_000,
            exp: 2_000,
            jti: "x".into(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret-key"),
        )
        .unwrap();
        assert!(verify_token(&token, "test-secret-key").is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(verify_token("not.a.jwt", "test-secret-key").is_err());
    }
}
