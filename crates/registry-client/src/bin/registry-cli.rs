//! Консольный клиент реестра серверов.

use clap::{Parser, Subcommand};
use registry_client::{ClientConfig, RegistryClient};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "registry-cli", about = "Управление реестром серверов через REST-сервис")]
struct Cli {
    /// Хост REST-сервиса
    #[arg(long, env = "REMOTE_HOST", default_value = "localhost")]
    host: String,

    /// Порт REST-сервиса
    #[arg(long, env = "REMOTE_PORT", default_value = "8443")]
    port: u16,

    /// Пользователь для пишущих запросов
    #[arg(long, env = "REMOTE_AUTH_USER", default_value = "")]
    user: String,

    /// Пароль для пишущих запросов
    #[arg(long, env = "REMOTE_AUTH_PASSWORD", default_value = "", hide_env_values = true)]
    password: String,

    /// Не проверять TLS-сертификат сервиса
    #[arg(long, env = "REMOTE_TLS_INSECURE")]
    insecure: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Показать серверы
    List,
    /// Создать сервер (имя вида host.domain.tld)
    Create { name: String },
    /// Удалить сервер по id
    Delete { id: i64 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "registry_client=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = ClientConfig::remote(&cli.host, cli.port, cli.user, cli.password)?
        .with_accept_invalid_certs(cli.insecure);
    let client = RegistryClient::new(config)?;

    match cli.command {
        Commands::List => {
            let servers = client.list_servers().await?;
            println!("{}", serde_json::to_string_pretty(&servers)?);
        }
        Commands::Create { name } => {
            let server = client.create_server(&name).await?;
            println!("{}", serde_json::to_string_pretty(&server)?);
        }
        Commands::Delete { id } => {
            client.delete_server(id).await?;
            println!("{}", serde_json::json!({ "result": "success" }));
        }
    }

    Ok(())
}
