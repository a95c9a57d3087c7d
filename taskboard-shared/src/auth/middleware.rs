/// Request authentication for Axum
///
/// This module resolves a caller identity from the `Authorization` header.
/// The API server wraps [`authenticate_request`] in an axum middleware layer
/// that inserts the resulting [`AuthContext`] into request extensions, where
/// protected handlers extract it with `Extension<AuthContext>`.
///
/// # Header Shape
///
/// Exactly `Authorization: Bearer <token>`. A missing header, a different
/// scheme, or a token that fails validation all resolve to 401: an
/// unauthenticated caller learns nothing about which check failed beyond
/// header-vs-token.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use taskboard_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {}, role: {:?}", auth.user_id, auth.role)
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::{validate_token, Claims, JwtError};
use crate::models::user::Role;

/// Authenticated caller identity, added to request extensions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Caller's role, as carried by the token
    pub role: Role,
}

impl AuthContext {
    /// Creates an auth context from validated JWT claims
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub,
            role: claims.role,
        }
    }

    /// Whether the caller holds the admin role
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Error type for request authentication
///
/// Every variant maps to 401: a caller without valid credentials is
/// unauthenticated regardless of how the credentials were malformed.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Authorization header absent or not of the `Bearer <token>` shape
    #[error("Missing or invalid Authorization header")]
    MissingCredentials,

    /// Bearer token failed signature, expiry, or issuer checks
    #[error("Invalid or expired token")]
    InvalidToken(#[source] JwtError),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "message": self.to_string() }));
        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

/// Resolves a caller identity from an `Authorization` header value
///
/// # Arguments
///
/// * `header` - the raw header value, if the request carried one
/// * `secret` - JWT secret for validation
///
/// # Errors
///
/// Returns `AuthError::MissingCredentials` if the header is absent or not
/// `Bearer <token>`, and `AuthError::InvalidToken` if validation fails.
pub fn authenticate_request(header: Option<&str>, secret: &str) -> Result<AuthContext, AuthError> {
    let header = header.ok_or(AuthError::MissingCredentials)?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::MissingCredentials)?;

    let claims = validate_token(token, secret).map_err(AuthError::InvalidToken)?;

    Ok(AuthContext::from_claims(&claims))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::create_token;
    use chrono::Duration;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn token_for(role: Role) -> (Uuid, String) {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, role, Duration::hours(1));
        (user_id, create_token(&claims, SECRET).unwrap())
    }

    #[test]
    fn test_authenticate_valid_bearer() {
        let (user_id, token) = token_for(Role::User);
        let header = format!("Bearer {}", token);

        let auth = authenticate_request(Some(&header), SECRET).expect("Should authenticate");
        assert_eq!(auth.user_id, user_id);
        assert_eq!(auth.role, Role::User);
        assert!(!auth.is_admin());
    }

    #[test]
    fn test_admin_context() {
        let (_, token) = token_for(Role::Admin);
        let header = format!("Bearer {}", token);

        let auth = authenticate_request(Some(&header), SECRET).unwrap();
        assert!(auth.is_admin());
    }

    #[test]
    fn test_missing_header() {
        let result = authenticate_request(None, SECRET);
        assert!(matches!(result, Err(AuthError::MissingCredentials)));
    }

    #[test]
    fn test_wrong_scheme() {
        let (_, token) = token_for(Role::User);

        // Same credential, wrong scheme: still unauthenticated
        let header = format!("Token {}", token);
        let result = authenticate_request(Some(&header), SECRET);
        assert!(matches!(result, Err(AuthError::MissingCredentials)));
    }

    #[test]
    fn test_garbage_token() {
        let result = authenticate_request(Some("Bearer not-a-jwt"), SECRET);
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_expired_token() {
        let claims = Claims::new(Uuid::new_v4(), Role::User, Duration::seconds(-60));
        let token = create_token(&claims, SECRET).unwrap();
        let header = format!("Bearer {}", token);

        let result = authenticate_request(Some(&header), SECRET);
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_auth_error_into_response() {
        let response = AuthError::MissingCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
