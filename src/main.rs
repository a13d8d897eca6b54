//! GymSpot server entry point

use anyhow::Result;
use clap::Parser;
use gymspot::{
    config,
    store::StoreLoader,
    web::{create_router, AppState},
};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Gym discovery server
#[derive(Debug, Parser)]
#[command(name = "gymspot", version, about)]
struct Args {
    /// Path to settings.yml
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the configured server port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = config::load(args.config.as_deref())?;
    if let Some(port) = args.port {
        settings.server.port = port;
    }

    // RUST_LOG wins over the configured level
    let default_level = if settings.general.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    info!("Starting GymSpot v{}", gymspot::VERSION);
    info!(
        "Loaded configuration for instance: {}",
        settings.general.instance_name
    );

    let store = StoreLoader::load(&settings)?;
    info!("Listing store '{}' ready", store.name());

    let addr = SocketAddr::new(settings.server.bind_address.parse()?, settings.server.port);

    let state = AppState::new(settings, store)?;
    let app = create_router(state);

    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
