//! Bearer-token authentication backed by the sessions table.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use super::error::AppError;
use super::state::AppState;
use crate::models::UserId;

const BEARER_SCHEME: &str = "Bearer";

/// Identity resolved from the request's session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// Middleware that rejects requests without a known session token.
///
/// On success the request carries an [`AuthenticatedUser`] extension.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request)
        .map(str::to_owned)
        .ok_or_else(unauthorized)?;

    let session = state
        .repository
        .find_session_by_token(&token)
        .await?
        .ok_or_else(|| {
            tracing::debug!("no session for presented token");
            unauthorized()
        })?;

    request.extensions_mut().insert(AuthenticatedUser {
        user_id: session.user_id,
    });
    Ok(next.run(request).await)
}

fn bearer_token(request: &Request) -> Option<&str> {
    let header = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    // Auth schemes are case-insensitive
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case(BEARER_SCHEME) && !token.is_empty()).then_some(token)
}

fn unauthorized() -> AppError {
    AppError::Unauthorized("You must be signed in to continue".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with(header: Option<&str>) -> Request {
        let mut builder = Request::builder().uri("/hotels");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(&request_with(Some("Bearer abc"))), Some("abc"));
        assert_eq!(bearer_token(&request_with(Some("Bearer  abc "))), Some("abc"));
        assert_eq!(bearer_token(&request_with(Some("Bearer "))), None);
        assert_eq!(bearer_token(&request_with(Some("Basic abc"))), None);
        assert_eq!(bearer_token(&request_with(Some("Bearerabc"))), None);
        assert_eq!(bearer_token(&request_with(None)), None);
    }

    #[test]
    fn test_bearer_scheme_ignores_case() {
        assert_eq!(bearer_token(&request_with(Some("bearer abc"))), Some("abc"));
        assert_eq!(bearer_token(&request_with(Some("BEARER abc"))), Some("abc"));
    }
}
