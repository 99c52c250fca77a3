//! Точка входа REST-сервиса реестра серверов.

use clap::Parser;
use registry_server::config::{BasicCredentials, MysqlParams, ServerConfig, TlsMode};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "registry-server",
    about = "REST-сервис реестра серверов (HTTPS, Basic auth на запись)"
)]
struct Cli {
    /// Хост MySQL
    #[arg(long, env = "MYSQL_HOST", default_value = "localhost")]
    mysql_host: String,

    /// Порт MySQL
    #[arg(long, env = "MYSQL_PORT", default_value = "3306")]
    mysql_port: String,

    /// Пользователь MySQL
    #[arg(long, env = "MYSQL_USER", default_value = "")]
    mysql_user: String,

    /// Пароль MySQL
    #[arg(long, env = "MYSQL_PASSWORD", default_value = "", hide_env_values = true)]
    mysql_password: String,

    /// Имя базы MySQL
    #[arg(long, env = "MYSQL_DB", default_value = "")]
    mysql_db: String,

    /// Полный URL БД (перекрывает MYSQL_*)
    #[arg(long, env = "DATABASE_URL")]
    db_url: Option<String>,

    /// Пользователь для пишущих маршрутов
    #[arg(long, env = "AUTH_USER", default_value = "")]
    auth_user: String,

    /// Пароль для пишущих маршрутов
    #[arg(long, env = "AUTH_PASSWORD", default_value = "", hide_env_values = true)]
    auth_password: String,

    /// Адрес интерфейса
    #[arg(long, env = "LISTEN_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Порт HTTPS
    #[arg(long, env = "PORT", default_value = "8443")]
    port: u16,

    /// Режим TLS: cert, self-signed
    #[arg(long, env = "TLS_MODE", default_value = "cert")]
    tls_mode: String,

    /// PEM-файл сертификата
    #[arg(long, env = "TLS_CERT", default_value = "../../certificates/REST-server.pem")]
    tls_cert: String,

    /// PEM-файл закрытого ключа
    #[arg(
        long,
        env = "TLS_KEY",
        default_value = "../../certificates/REST-server-private-key.pem"
    )]
    tls_key: String,

    /// Домен для SAN самоподписанного сертификата
    #[arg(long, env = "TLS_DOMAIN", default_value = "localhost")]
    domain: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Инициализация логгера
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "registry_server=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();

    // Разбор режима TLS
    let tls_mode: TlsMode = cli
        .tls_mode
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let db_url = cli.db_url.unwrap_or_else(|| {
        MysqlParams {
            host: cli.mysql_host,
            port: cli.mysql_port,
            user: cli.mysql_user,
            password: cli.mysql_password,
            database: cli.mysql_db,
        }
        .database_url()
    });

    let config = ServerConfig {
        listen: format!("{}:{}", cli.host, cli.port),
        db_url,
        auth: BasicCredentials::new(cli.auth_user, cli.auth_password),
        tls_mode,
        tls_cert: cli.tls_cert,
        tls_key: cli.tls_key,
        domain: cli.domain,
    };

    registry_server::run(config).await
}
