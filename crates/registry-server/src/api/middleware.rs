//! Basic-аутентификация для пишущих маршрутов.

use crate::api::AppState;
use crate::config::BasicCredentials;
use crate::error::AppError;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use base64::Engine;
use subtle::ConstantTimeEq;

/// Экстрактор пользователя, прошедшего Basic-аутентификацию.
///
/// В обработчиках стоит перед `Path` и телом, поэтому срабатывает до их разбора:
/// запрос без верных учётных данных получает 401 при любом payload.
pub struct BasicAuth(pub String);

impl FromRequestParts<AppState> for BasicAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some((user, password)) = extract_basic_credentials(parts) else {
            tracing::debug!("Запрос к {} без Basic-авторизации", parts.uri.path());
            return Err(AppError::Unauthorized);
        };

        if !credentials_match(&user, &password, &state.auth) {
            tracing::warn!(
                "Неудачная попытка авторизации для пользователя: {user} ({} {})",
                parts.method,
                parts.uri.path()
            );
            return Err(AppError::Unauthorized);
        }

        Ok(BasicAuth(user))
    }
}

// ── Вспомогательные функции ──────────────────────────────────────────────────

fn extract_basic_credentials(parts: &Parts) -> Option<(String, String)> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    parse_basic_header(value)
}

/// Разобрать значение `Authorization: Basic <base64(user:password)>`.
pub fn parse_basic_header(value: &str) -> Option<(String, String)> {
    let (scheme, encoded) = value.split_at_checked("Basic ".len())?;
    if !scheme.eq_ignore_ascii_case("Basic ") {
        return None;
    }
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, password) = decoded.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}

/// Побайтовое сравнение за постоянное время.
fn credentials_match(user: &str, password: &str, expected: &BasicCredentials) -> bool {
    let user_ok = user.as_bytes().ct_eq(expected.user.as_bytes());
    let password_ok = password.as_bytes().ct_eq(expected.password.as_bytes());
    (user_ok & password_ok).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(raw: &str) -> String {
        base64::engine::general_purpose::STANDARD.encode(raw)
    }

    #[test]
    fn test_parse_valid_header() {
        let header = format!("Basic {}", encode("admin:s3cret"));
        assert_eq!(
            parse_basic_header(&header),
            Some(("admin".to_string(), "s3cret".to_string()))
        );
    }

    #[test]
    fn test_parse_scheme_is_case_insensitive() {
        let header = format!("basic {}", encode("admin:pw"));
        assert!(parse_basic_header(&header).is_some());
    }

    #[test]
    fn test_password_may_contain_colon() {
        let header = format!("Basic {}", encode("admin:a:b"));
        assert_eq!(
            parse_basic_header(&header),
            Some(("admin".to_string(), "a:b".to_string()))
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(parse_basic_header("Bearer abc"), None);
        assert_eq!(parse_basic_header("Basic !!!notbase64"), None);
        assert_eq!(parse_basic_header(&format!("Basic {}", encode("nocolon"))), None);
        assert_eq!(parse_basic_header("Basic"), None);
    }

    #[test]
    fn test_credentials_match_exactly() {
        let expected = BasicCredentials::new("admin", "pw");
        assert!(credentials_match("admin", "pw", &expected));
        assert!(!credentials_match("admin", "pw ", &expected));
        assert!(!credentials_match("Admin", "pw", &expected));
        assert!(!credentials_match("", "", &expected));
    }
}
