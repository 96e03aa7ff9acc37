use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use site_backend::{
    api::routes::{create_router, AppState},
    config::Config,
    storage,
};

#[derive(Debug, Parser)]
#[command(name = "site-backend", version, about = "Backing API for the marketing site")]
struct Cli {
    /// Config file to load instead of ~/.site-backend/config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Interface to bind, overriding the config
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, overriding the config
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Load config
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(host) = cli.host {
        config.server_host = host;
    }
    if let Some(port) = cli.port {
        config.server_port = port;
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("site_backend={},tower_http=info", config.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Storage backend is chosen once, here
    let repository = storage::open_repository(&config).await?;

    let addr = config.bind_address();
    if let Some(dir) = &config.static_dir {
        tracing::info!("Serving static pages from {}", dir);
    }

    let state = AppState::new(config, repository);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
