use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};
use trexa_cli::{build_router, telemetry, AppState};
use trexa_core::config::Config;
use trexa_index::Pipeline;

/// Serve indexing, search and graph endpoints over HTTP.
#[derive(Parser)]
#[command(name = "trexa-server")]
struct Args {
    #[arg(long)]
    host: Option<String>,
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();
    let args = Args::parse();
    let settings = Config::load()?.settings()?;

    // The model must load before the server accepts anything.
    let pipeline = Pipeline::from_settings(&settings)?;
    if settings.server.eager_init && !pipeline.indexer.open_existing().await? {
        warn!("Nothing indexed yet; search answers 409 until a folder is indexed");
    }

    let host = args.host.unwrap_or_else(|| settings.server.host.clone());
    let port = args.port.unwrap_or(settings.server.port);
    let app = build_router(AppState::new(pipeline, &settings));
    let listener = TcpListener::bind((host.as_str(), port)).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
