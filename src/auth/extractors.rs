use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use tracing::warn;

use crate::auth::password::verify_password;
use crate::auth::repo_types::User;
use crate::error::ApiError;
use crate::state::AppState;

/// Resolves HTTP Basic credentials to a known user, rejecting the
/// request with 401 before any handler logic runs.
pub struct AuthUser(pub String);

/// Splits an `Authorization: Basic <payload>` header value into
/// username and password.
pub(crate) fn parse_basic_credentials(header: &str) -> Option<(String, String)> {
    let encoded = header
        .strip_prefix("Basic ")
        .or_else(|| header.strip_prefix("basic "))?;
    let decoded = BASE64.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".into()))?;

        let (username, password) = parse_basic_credentials(header)
            .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header".into()))?;

        let user = match User::find_by_username(&state.db, &username).await? {
            Some(u) => u,
            None => {
                warn!(username = %username, "unknown user");
                return Err(ApiError::Unauthorized("Invalid credentials".into()));
            }
        };

        if !verify_password(&password, &user.password_hash)? {
            warn!(username = %username, "invalid password");
            return Err(ApiError::Unauthorized("Invalid credentials".into()));
        }

        Ok(AuthUser(user.username))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(raw: &str) -> String {
        format!("Basic {}", BASE64.encode(raw.as_bytes()))
    }

    #[test]
    fn parses_well_formed_header() {
        let (user, pass) = parse_basic_credentials(&encode("chef@test.com:test1234")).unwrap();
        assert_eq!(user, "chef@test.com");
        assert_eq!(pass, "test1234");
    }

    #[test]
    fn password_may_contain_colons() {
        let (user, pass) = parse_basic_credentials(&encode("chef@test.com:a:b:c")).unwrap();
        assert_eq!(user, "chef@test.com");
        assert_eq!(pass, "a:b:c");
    }

    #[test]
    fn rejects_wrong_scheme() {
        assert!(parse_basic_credentials("Bearer abcdef").is_none());
    }

    #[test]
    fn rejects_undecodable_payload() {
        assert!(parse_basic_credentials("Basic not-base64!!!").is_none());
    }

    #[test]
    fn rejects_payload_without_separator() {
        let header = format!("Basic {}", BASE64.encode(b"no-colon-here"));
        assert!(parse_basic_credentials(&header).is_none());
    }
}
