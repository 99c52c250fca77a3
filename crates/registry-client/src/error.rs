//! Ошибки клиента реестра.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Некорректное имя сервера: {0}")]
    InvalidName(String),

    #[error("Сервер с именем {0} уже существует")]
    Duplicate(String),

    #[error("Сервис вернул {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Некорректный URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Ошибка HTTP: {0}")]
    Http(#[from] reqwest::Error),
}

impl ClientError {
    /// Истёк таймаут запроса.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Http(e) if e.is_timeout())
    }
}
