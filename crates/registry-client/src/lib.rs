//! Клиент REST-сервиса реестра серверов.
//!
//! Тот же контракт, которым пользуется веб-интерфейс: список, создание с
//! проверкой имени, удаление. Запись идёт с Basic-аутентификацией, каждый
//! запрос ограничен таймаутом (по умолчанию 3 секунды, включая TLS-рукопожатие).

mod client;
pub mod config;
pub mod error;
pub mod validate;

pub use client::{RegistryClient, Server};
pub use config::ClientConfig;
pub use error::ClientError;
pub use validate::server_name_valid;
