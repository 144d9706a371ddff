use clap::Parser;
use tracing_subscriber::EnvFilter;

use gigbook_api::cli::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SECRET_KEY, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("gigbook_api=info,tower_http=info")),
        )
        .init();

    cli::run(Cli::parse()).await
}
