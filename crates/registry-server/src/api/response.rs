//! JSON-ответы с явной кодировкой в Content-Type.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Content-Type всех JSON-ответов сервиса.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Аналог `axum::Json`, но со статусом и `charset=utf-8` в заголовке.
#[derive(Debug)]
pub struct JsonResponse<T> {
    status: StatusCode,
    payload: T,
}

impl<T> JsonResponse<T> {
    pub fn new(status: StatusCode, payload: T) -> Self {
        Self { status, payload }
    }

    pub fn ok(payload: T) -> Self {
        Self::new(StatusCode::OK, payload)
    }

    pub fn created(payload: T) -> Self {
        Self::new(StatusCode::CREATED, payload)
    }
}

impl<T: Serialize> IntoResponse for JsonResponse<T> {
    fn into_response(self) -> Response {
        // Ошибка сериализации не должна ронять обработчик: отдаём пустое тело
        let body = serde_json::to_vec(&self.payload).unwrap_or_else(|e| {
            tracing::error!("Ошибка сериализации ответа: {e}");
            Vec::new()
        });
        (
            self.status,
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_static(JSON_CONTENT_TYPE),
            )],
            body,
        )
            .into_response()
    }
}
