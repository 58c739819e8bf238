//! # JWT Auth Middleware
//!
//! HS256 bearer-token validation plus a static role table.
//!
//! ## Role Table
//! ```text
//! role    rights
//! ─────   ───────────────
//! user    user
//! admin   user, admin      (strict superset)
//! ```
//!
//! The table is fixed at compile time; tokens carry a `role` claim and the
//! rights come from the table, never from the token. Every protected route
//! requires the `user` right.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user identifier)
    pub sub: String,
    /// Role name looked up in the role table
    pub role: String,
    /// Issued-at (seconds since epoch)
    pub iat: i64,
    /// Expiration (seconds since epoch)
    pub exp: i64,
}

/// Rights granted to a role. Unknown roles get nothing.
pub fn rights_for(role: &str) -> &'static [&'static str] {
    match role {
        "user" => &["user"],
        "admin" => &["user", "admin"],
        _ => &[],
    }
}

/// The authenticated principal, inserted into request extensions.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub sub: String,
    pub role: String,
}

impl AuthContext {
    pub fn has_right(&self, right: &str) -> bool {
        rights_for(&self.role).contains(&right)
    }
}

/// Shared validator state for the auth middleware.
#[derive(Clone)]
pub struct AuthState {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AuthState {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        AuthState {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Decodes and validates a bearer token.
    pub fn validate(&self, token: &str) -> Result<Claims, ApiError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "Token validation failed");
                ApiError::unauthorized()
            })
    }
}

/// Bearer-token middleware guarding every ledger route.
///
/// Missing/invalid token → 401; valid token whose role lacks the `user`
/// right → 403. On success an [`AuthContext`] lands in request extensions.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(req.headers())?;
    let claims = state.validate(token)?;

    let context = AuthContext {
        sub: claims.sub,
        role: claims.role,
    };

    if !context.has_right("user") {
        return Err(ApiError::forbidden());
    }

    req.extensions_mut().insert(context);

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(ApiError::unauthorized)?;

    let header = header.to_str().map_err(|_| ApiError::unauthorized())?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(ApiError::unauthorized)?
        .trim();

    if token.is_empty() {
        return Err(ApiError::unauthorized());
    }

    Ok(token)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn mint(secret: &str, role: &str, exp_offset_secs: i64) -> String {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "user-1".to_string(),
            role: role.to_string(),
            iat: now,
            exp: now + exp_offset_secs,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn valid_token_round_trips() {
        let state = AuthState::new("secret");
        let claims = state.validate(&mint("secret", "user", 600)).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.role, "user");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let state = AuthState::new("secret");
        assert!(state.validate(&mint("other", "user", 600)).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let state = AuthState::new("secret");
        assert!(state.validate(&mint("secret", "user", -600)).is_err());
    }

    #[test]
    fn admin_rights_are_a_superset_of_user() {
        let admin = AuthContext {
            sub: "a".into(),
            role: "admin".into(),
        };
        assert!(admin.has_right("user"));
        assert!(admin.has_right("admin"));

        let user = AuthContext {
            sub: "u".into(),
            role: "user".into(),
        };
        assert!(user.has_right("user"));
        assert!(!user.has_right("admin"));

        let ghost = AuthContext {
            sub: "g".into(),
            role: "ghost".into(),
        };
        assert!(!ghost.has_right("user"));
    }
}
