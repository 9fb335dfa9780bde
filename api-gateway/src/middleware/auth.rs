// ==============================================================================
// middleware/auth.rs - Reverse Proxy Authentication
// ==============================================================================
// Description: Extract the authenticated username set by the front proxy
// Author: Matt Barham
// Created: 2026-01-11
// Modified: 2026-10-17
// Version: 1.1.0
// ==============================================================================
//
// Security: The gateway sits behind an authenticating reverse proxy which sets
// the X-Remote-User header. Requests without it are rejected with 401.
// Project-level access is checked by the handlers against the catalog.
//
// ==============================================================================

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::models::ErrorResponse;

pub const REMOTE_USER_HEADER: &str = "X-Remote-User";

/// Authenticated username extracted from the proxy header
///
/// # Example
/// ```rust,ignore
/// async fn my_handler(AuthUser(username): AuthUser) -> impl IntoResponse {
///     format!("Hello, {}!", username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let username = parts
            .headers
            .get(REMOTE_USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty());

        match username {
            Some(username) => Ok(AuthUser(username.to_string())),
            None => Err((
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new(format!(
                    "Missing or invalid {} header",
                    REMOTE_USER_HEADER
                ))),
            )
                .into_response()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[tokio::test]
    async fn test_auth_user_extraction() {
        let req = Request::builder()
            .header(REMOTE_USER_HEADER, " alice ")
            .body(())
            .unwrap();

        let (mut parts, _) = req.into_parts();
        let result = AuthUser::from_request_parts(&mut parts, &()).await;

        assert_eq!(result.unwrap().0, "alice");
    }

    #[tokio::test]
    async fn test_auth_user_missing_header() {
        let req = Request::builder().body(()).unwrap();
        let (mut parts, _) = req.into_parts();
        let result = AuthUser::from_request_parts(&mut parts, &()).await;

        assert_eq!(result.unwrap_err().status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_auth_user_empty_header() {
        let req = Request::builder()
            .header(REMOTE_USER_HEADER, "")
            .body(())
            .unwrap();

        let (mut parts, _) = req.into_parts();
        let result = AuthUser::from_request_parts(&mut parts, &()).await;

        assert!(result.is_err());
    }
}
