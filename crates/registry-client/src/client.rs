//! HTTP-клиент реестра.

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::validate::server_name_valid;
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

/// Запись реестра в том виде, в каком её отдаёт сервис.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub id: i64,
    pub name: String,
}

#[derive(Serialize)]
struct CreateRequest<'a> {
    name: &'a str,
}

/// Клиент REST-сервиса. Дёшево клонируется, пул соединений общий.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl RegistryClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        if config.accept_invalid_certs {
            tracing::warn!("Проверка TLS-сертификата сервиса отключена");
        }
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;
        Ok(Self { http, config })
    }

    /// GET /v1/servers — первая страница серверов.
    pub async fn list_servers(&self) -> Result<Vec<Server>, ClientError> {
        let response = self.http.get(self.endpoint("v1/servers")?).send().await?;

        if response.status() != StatusCode::OK {
            return Err(status_error(response).await);
        }
        let servers: Vec<Server> = response.json().await?;
        tracing::debug!("Получено серверов: {}", servers.len());
        Ok(servers)
    }

    /// POST /v1/servers — создать сервер. Имя проверяется до отправки.
    pub async fn create_server(&self, name: &str) -> Result<Server, ClientError> {
        if !server_name_valid(name) {
            return Err(ClientError::InvalidName(name.to_string()));
        }

        let response = self
            .http
            .post(self.endpoint("v1/servers")?)
            .basic_auth(&self.config.auth_user, Some(&self.config.auth_password))
            .json(&CreateRequest { name })
            .send()
            .await?;

        match response.status() {
            StatusCode::CREATED => {
                let server: Server = response.json().await?;
                tracing::info!("Создан сервер {} (id {})", server.name, server.id);
                Ok(server)
            }
            StatusCode::CONFLICT => Err(ClientError::Duplicate(name.to_string())),
            _ => Err(status_error(response).await),
        }
    }

    /// DELETE /v1/servers/{id} — удалить сервер.
    pub async fn delete_server(&self, id: i64) -> Result<(), ClientError> {
        let response = self
            .http
            .delete(self.endpoint(&format!("v1/servers/{id}"))?)
            .basic_auth(&self.config.auth_user, Some(&self.config.auth_password))
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(status_error(response).await);
        }
        tracing::info!("Удалён сервер {id}");
        Ok(())
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.config.base_url.join(path)?)
    }
}

async fn status_error(response: Response) -> ClientError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    tracing::warn!("Сервис реестра вернул {status}: {body}");
    ClientError::Status { status, body }
}

#[cfg(test)]
mod tests {
    use super::*;
    use registry_migration::{Migrator, MigratorTrait};
    use registry_server::api::{build_router, AppState};
    use registry_server::config::BasicCredentials;
    use sea_orm::{ConnectOptions, Database};
    use std::time::Duration;

    const USER: &str = "web";
    const PASSWORD: &str = "web-pass";

    /// Поднять сервис реестра по HTTP на свободном порту.
    async fn spawn_registry() -> Url {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).sqlx_logging(false);
        let db = Database::connect(options).await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let app = build_router(AppState::new(db, BasicCredentials::new(USER, PASSWORD)));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Url::parse(&format!("http://{addr}/")).unwrap()
    }

    async fn client_for(base_url: Url, password: &str) -> RegistryClient {
        RegistryClient::new(ClientConfig::new(base_url, USER, password)).unwrap()
    }

    #[tokio::test]
    async fn test_create_list_delete() {
        let client = client_for(spawn_registry().await, PASSWORD).await;

        assert!(client.list_servers().await.unwrap().is_empty());

        let web = client.create_server("web.example.com").await.unwrap();
        let db = client.create_server("db.example.com").await.unwrap();
        assert_eq!(web.id, 1);

        let listed = client.list_servers().await.unwrap();
        assert_eq!(listed, vec![db.clone(), web.clone()]);

        client.delete_server(web.id).await.unwrap();
        assert_eq!(client.list_servers().await.unwrap(), vec![db]);
    }

    #[tokio::test]
    async fn test_duplicate_name() {
        let client = client_for(spawn_registry().await, PASSWORD).await;

        client.create_server("srv.example.com").await.unwrap();
        let err = client.create_server("srv.example.com").await.unwrap_err();

        assert!(matches!(err, ClientError::Duplicate(ref n) if n == "srv.example.com"));
    }

    #[tokio::test]
    async fn test_invalid_name_is_not_sent() {
        let client = client_for(spawn_registry().await, PASSWORD).await;

        let err = client.create_server("127.0.0.1").await.unwrap_err();

        assert!(matches!(err, ClientError::InvalidName(_)));
        assert!(client.list_servers().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_wrong_credentials() {
        let client = client_for(spawn_registry().await, "wrong").await;

        let err = client.create_server("srv.example.com").await.unwrap_err();
        assert!(
            matches!(err, ClientError::Status { status, .. } if status == StatusCode::UNAUTHORIZED)
        );

        let err = client.delete_server(1).await.unwrap_err();
        assert!(
            matches!(err, ClientError::Status { status, .. } if status == StatusCode::UNAUTHORIZED)
        );
    }

    #[tokio::test]
    async fn test_timeout() {
        // Принимает соединения и молчит
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let base_url = Url::parse(&format!("http://{addr}/")).unwrap();
        let config =
            ClientConfig::new(base_url, USER, PASSWORD).with_timeout(Duration::from_millis(200));
        let client = RegistryClient::new(config).unwrap();

        let err = client.list_servers().await.unwrap_err();
        assert!(err.is_timeout(), "ожидался таймаут, получено: {err:?}");
    }
}
