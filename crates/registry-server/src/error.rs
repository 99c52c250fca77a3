//! Типы ошибок REST-сервиса реестра.

use crate::api::response::JsonResponse;
use crate::services::server_store::StoreError;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Значение заголовка WWW-Authenticate при отказе в доступе.
pub const BASIC_CHALLENGE: &str = "Basic realm=Restricted";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Неверный запрос: {0}")]
    BadRequest(String),

    #[error("Не авторизован")]
    Unauthorized,

    #[error("Не найдено: {0}")]
    NotFound(String),

    #[error("Конфликт: {0}")]
    Conflict(String),

    #[error("Внутренняя ошибка: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Unauthorized => return unauthorized_response(),
            AppError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            AppError::Conflict(m) => (StatusCode::CONFLICT, m),
            AppError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m),
        };
        JsonResponse::new(status, json!({ "error": message })).into_response()
    }
}

/// Ответ 401 с вызовом Basic-аутентификации (тело — текст, не JSON).
fn unauthorized_response() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [
            (header::WWW_AUTHENTICATE, BASIC_CHALLENGE),
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
        ],
        "Unauthorized",
    )
        .into_response()
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => AppError::NotFound("Server not found".into()),
            StoreError::Duplicate(m) => AppError::Conflict(m),
            StoreError::Io(m) => {
                tracing::error!("Ошибка хранилища: {m}");
                AppError::Internal(m)
            }
        }
    }
}
