//! Конфигурация клиента.

use crate::error::ClientError;
use std::time::Duration;
use url::Url;

/// Таймаут исходящего запроса целиком, включая TLS-рукопожатие.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Clone)]
pub struct ClientConfig {
    /// Базовый URL сервиса, например `https://registry.local:8443/`
    pub base_url: Url,

    /// Учётные данные для пишущих запросов
    pub auth_user: String,
    pub auth_password: String,

    /// Таймаут одного запроса
    pub timeout: Duration,

    /// Не проверять сертификат сервиса. Только для стендов с самоподписанным сертификатом.
    pub accept_invalid_certs: bool,
}

impl ClientConfig {
    pub fn new(base_url: Url, auth_user: impl Into<String>, auth_password: impl Into<String>) -> Self {
        Self {
            base_url,
            auth_user: auth_user.into(),
            auth_password: auth_password.into(),
            timeout: DEFAULT_TIMEOUT,
            accept_invalid_certs: false,
        }
    }

    /// Конфигурация для `https://{host}:{port}/`.
    pub fn remote(
        host: &str,
        port: u16,
        auth_user: impl Into<String>,
        auth_password: impl Into<String>,
    ) -> Result<Self, ClientError> {
        let base_url = Url::parse(&format!("https://{host}:{port}/"))?;
        Ok(Self::new(base_url, auth_user, auth_password))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }
}

// Пароль в логи не попадает
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url.as_str())
            .field("auth_user", &self.auth_user)
            .field("auth_password", &"***")
            .field("timeout", &self.timeout)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}
