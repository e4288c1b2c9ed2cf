pub mod ai;
mod commands;
pub mod config;
pub mod extract;
pub mod generation;

use clap::Parser;
use commands::Cli;
use tracing_subscriber::EnvFilter;

pub fn run() {
    // Load .env file - current dir first, then the parent
    if dotenvy::dotenv().is_err() {
        let _ = dotenvy::from_path("../.env");
    }

    // Default: warn for most crates, info for ours. RUST_LOG=debug for per-step logs
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,deckgen_lib=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start async runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(commands::dispatch(cli)) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
