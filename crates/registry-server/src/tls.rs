//! TLS: PEM-сертификаты из файлов или самоподписанный сертификат.
//! Сервис работает только по HTTPS.

use crate::config::{ServerConfig, TlsMode};
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::info;

/// Период перечитывания PEM-файлов.
const CERT_RELOAD_INTERVAL: Duration = Duration::from_secs(12 * 3600);

/// Сколько ждать завершения активных соединений при остановке.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Выбрать криптопровайдер rustls для процесса. При сборке вместе с reqwest
/// rustls видит и ring, и aws-lc-rs, и без явного выбора не стартует.
pub fn install_crypto_provider() {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
}

/// Запустить HTTPS-сервер в нужном TLS-режиме.
pub async fn serve(
    config: &ServerConfig,
    app: Router,
    shutdown_rx: tokio::sync::watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let addr: SocketAddr = config.listen.parse()?;

    let rustls_config = match &config.tls_mode {
        TlsMode::Cert => load_cert_files(config).await?,
        TlsMode::SelfSigned => self_signed(config).await?,
    };

    info!("Запуск HTTPS сервера на {addr} (TLS: {})", config.tls_mode);

    let handle = axum_server::Handle::new();
    spawn_shutdown_watcher(handle.clone(), shutdown_rx);

    axum_server::bind_rustls(addr, rustls_config)
        .handle(handle)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

/// PEM-сертификат и ключ из файлов, с периодической перезагрузкой.
async fn load_cert_files(config: &ServerConfig) -> anyhow::Result<RustlsConfig> {
    let cert_path = config.tls_cert.clone();
    let key_path = config.tls_key.clone();
    info!("Сертификат: {cert_path}, ключ: {key_path}");

    let rustls_config = RustlsConfig::from_pem_file(&cert_path, &key_path)
        .await
        .map_err(|e| anyhow::anyhow!("Ошибка загрузки TLS ({cert_path}, {key_path}): {e}"))?;

    let reload_config = rustls_config.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CERT_RELOAD_INTERVAL);
        interval.tick().await; // пропустить первый тик
        loop {
            interval.tick().await;
            match reload_config
                .reload_from_pem_file(&cert_path, &key_path)
                .await
            {
                Ok(()) => tracing::info!("TLS сертификаты перезагружены"),
                Err(e) => tracing::error!("Ошибка перезагрузки TLS сертификатов: {e}"),
            }
        }
    });

    Ok(rustls_config)
}

/// Самоподписанный сертификат для разработки.
async fn self_signed(config: &ServerConfig) -> anyhow::Result<RustlsConfig> {
    let subject_alt_names = vec![config.domain.clone(), "localhost".to_string()];
    let certified_key = rcgen::generate_simple_self_signed(subject_alt_names)
        .map_err(|e| anyhow::anyhow!("Ошибка генерации сертификата: {e}"))?;

    let cert_pem = certified_key.cert.pem();
    let key_pem = certified_key.signing_key.serialize_pem();

    let rustls_config =
        RustlsConfig::from_pem(cert_pem.into_bytes(), key_pem.into_bytes()).await?;
    Ok(rustls_config)
}

fn spawn_shutdown_watcher(
    handle: axum_server::Handle,
    mut shutdown_rx: tokio::sync::watch::Receiver<bool>,
) {
    tokio::spawn(async move {
        while !*shutdown_rx.borrow_and_update() {
            if shutdown_rx.changed().await.is_err() {
                break;
            }
        }
        handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
    });
}
