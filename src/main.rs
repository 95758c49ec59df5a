use std::path::Path;

use ordinals_psbt::{Config, PsbtEngine};
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load_or_default(Path::new("config.json"))?;
    let engine = PsbtEngine::from_config(&config)?;

    println!("Using {} on {}", config.server_url, config.network);
    cli::run_interactive_mode(&engine).await
}
