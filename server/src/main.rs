use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use logistics_nlu_lib::LogisticsNluEngine;
use logistics_nlu_server::routes::start_server;
use logistics_nlu_server::AppState;

/// HTTP API for the logistics voice-to-action NLU engine.
#[derive(Debug, Parser)]
#[command(name = "logistics-nlu-server", version)]
struct Cli {
    /// Path to the trained nlu engine directory.
    engine_dir: PathBuf,
    /// Address to bind to.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    /// Port to listen on.
    #[arg(long, default_value_t = 8000)]
    port: u16,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let engine = match LogisticsNluEngine::from_path(&cli.engine_dir) {
        Ok(engine) => engine,
        Err(err) => {
            tracing::error!("Could not load nlu engine from {:?}: {}", cli.engine_dir, err);
            process::exit(1);
        }
    };
    tracing::info!(
        "Engine loaded with intents: {}",
        engine.intents().join(", ")
    );

    let state = AppState::new(engine);
    if let Err(err) = start_server(&cli.host, cli.port, state).await {
        tracing::error!("Server error: {}", err);
        process::exit(1);
    }
}
