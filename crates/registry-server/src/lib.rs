//! Ядро REST-сервиса реестра серверов.

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod tls;


use api::AppState;
use config::ServerConfig;
use registry_migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use tokio::sync::watch;
use tracing::info;

/// Запустить REST-сервис реестра.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    tls::install_crypto_provider();

    // 1. Подключение к БД (ошибка фатальна)
    info!("Подключение к базе данных: {}", redact_url(&config.db_url));
    let db: DatabaseConnection = Database::connect(&config.db_url).await?;

    // 2. Схема
    info!("Выполнение миграций...");
    Migrator::up(&db, None).await?;

    // 3. Состояние приложения
    if config.auth.user.is_empty() && config.auth.password.is_empty() {
        tracing::warn!("AUTH_USER и AUTH_PASSWORD не заданы: запись доступна с пустыми учётными данными");
    }
    let state = AppState::new(db, config.auth.clone());

    // 4. Маршрутизатор
    let app = api::build_router(state);

    // 5. Graceful shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Получен сигнал завершения, останавливаю сервер...");
        let _ = shutdown_tx.send(true);
    });

    // 6. Запуск сервера
    info!("Сервис реестра запущен");
    tls::serve(&config, app, shutdown_rx).await?;

    info!("Сервис реестра остановлен");
    Ok(())
}

/// Скрыть пароль в URL БД перед выводом в лог.
fn redact_url(db_url: &str) -> String {
    match url::Url::parse(db_url) {
        Ok(mut parsed) if parsed.password().is_some() => {
            let _ = parsed.set_password(Some("***"));
            parsed.to_string()
        }
        _ => db_url.to_string(),
    }
}
