use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use roomielab_api::{
    api::create_router,
    application::builder::ApplicationBuilder,
    config::{Environment, LogFormat},
    Config,
};

#[derive(Parser, Debug)]
#[command(name = "roomielab-api", version, about = "RoomieLab REST API server")]
struct Cli {
    /// TOML file applied on top of the environment
    #[arg(short, long, env = "ROOMIELAB_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind, overrides LISTEN_ADDR
    #[arg(long)]
    listen_addr: Option<String>,

    /// Overrides ENVIRONMENT
    #[arg(long, value_enum)]
    environment: Option<Environment>,
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = Config::from_env();
    if let Some(path) = &cli.config {
        config = config.with_file(path).map_err(anyhow::Error::msg)?;
    }
    if let Some(addr) = &cli.listen_addr {
        config.listen_addr = addr.clone();
    }
    if let Some(environment) = cli.environment {
        config.environment = environment;
    }
    config.validate().map_err(anyhow::Error::msg)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli).context("Invalid configuration")?;
    init_tracing(config.log_format);

    info!(
        environment = ?config.environment,
        persistent = config.database_url.is_some(),
        "Starting RoomieLab API"
    );

    let listen_addr = config.listen_addr.clone();
    let state = ApplicationBuilder::new(config)
        .with_document_store()
        .await
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to initialize document store")?
        .with_identity()
        .map_err(|e| anyhow::anyhow!(e))?
        .build()
        .map_err(|e| anyhow::anyhow!(e))?;

    let app = create_router(state);

    let listener = TcpListener::bind(&listen_addr)
        .await
        .with_context(|| format!("Cannot bind {}", listen_addr))?;
    info!(addr = %listen_addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
