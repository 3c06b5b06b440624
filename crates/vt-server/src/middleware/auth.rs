//! Bearer-token authentication middleware.
//!
//! Every protected request must carry `Authorization: Bearer <api_token>`.
//! A missing header, a malformed value and a wrong token are rejected with
//! distinct messages. When auth is disabled in config all requests pass.

use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use vt_core::config::AuthConfig;

use crate::context::AppContext;
use crate::error::AppError;

pub const MISSING_HEADER: &str = "Authorization header is missing";
pub const INVALID_FORMAT: &str = "Invalid authorization format";
pub const INVALID_TOKEN: &str = "Invalid API token";

/// Check a raw `Authorization` header value against the configured token.
pub fn check_authorization(auth: &AuthConfig, header: Option<&str>) -> vt_core::Result<()> {
    if !auth.enabled {
        return Ok(());
    }

    let header = header
        .filter(|h| !h.is_empty())
        .ok_or_else(|| vt_core::Error::Unauthorized(MISSING_HEADER.into()))?;

    // `<scheme> <token>`; anything after a second space is ignored.
    let mut parts = header.split(' ');
    let token = match (parts.next(), parts.next()) {
        (Some("Bearer"), Some(token)) if !token.is_empty() => token,
        _ => return Err(vt_core::Error::Unauthorized(INVALID_FORMAT.into())),
    };

    match auth.api_token.as_deref() {
        Some(expected) if !expected.is_empty() && expected == token => Ok(()),
        _ => Err(vt_core::Error::Unauthorized(INVALID_TOKEN.into())),
    }
}

/// Authentication middleware. Applied to protected routes only.
pub async fn auth_middleware(
    State(ctx): State<AppContext>,
    request: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let authorization = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .map(|v| v.to_str().unwrap_or(""));

    check_authorization(&ctx.config.auth, authorization)?;
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled(token: Option<&str>) -> AuthConfig {
        AuthConfig {
            enabled: true,
            api_token: token.map(String::from),
        }
    }

    fn message(result: vt_core::Result<()>) -> String {
        result.unwrap_err().to_string()
    }

    #[test]
    fn valid_token_passes() {
        assert!(check_authorization(&enabled(Some("s3cret")), Some("Bearer s3cret")).is_ok());
    }

    #[test]
    fn missing_header() {
        assert_eq!(message(check_authorization(&enabled(Some("s")), None)), MISSING_HEADER);
        assert_eq!(message(check_authorization(&enabled(Some("s")), Some(""))), MISSING_HEADER);
    }

    #[test]
    fn malformed_header() {
        let cfg = enabled(Some("s"));
        for value in ["s", "Basic s", "Bearer", "Bearer ", "bearer s", "Bearer  s"] {
            assert_eq!(
                message(check_authorization(&cfg, Some(value))),
                INVALID_FORMAT,
                "{value:?}"
            );
        }
    }

    #[test]
    fn trailing_words_after_token_are_ignored() {
        let cfg = enabled(Some("s3cret"));
        assert!(check_authorization(&cfg, Some("Bearer s3cret extra")).is_ok());
        assert_eq!(
            message(check_authorization(&cfg, Some("Bearer other s3cret"))),
            INVALID_TOKEN
        );
    }

    #[test]
    fn wrong_token() {
        assert_eq!(
            message(check_authorization(&enabled(Some("s")), Some("Bearer nope"))),
            INVALID_TOKEN
        );
    }

    #[test]
    fn no_configured_token_rejects_everything() {
        assert_eq!(
            message(check_authorization(&enabled(None), Some("Bearer anything"))),
            INVALID_TOKEN
        );
        assert_eq!(
            message(check_authorization(&enabled(Some("")), Some("Bearer x"))),
            INVALID_TOKEN
        );
    }

    #[test]
    fn disabled_auth_passes() {
        let cfg = AuthConfig {
            enabled: false,
            api_token: None,
        };
        assert!(check_authorization(&cfg, None).is_ok());
    }
}
