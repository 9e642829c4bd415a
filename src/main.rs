use std::io;

use anyhow::Result;
use clap::Parser;
use kotoba_duet::Credentials;
use kotoba_duet::cli::{Cli, run};
use kotoba_duet::http::reqwest::default_dyn_transport;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    run(cli, Credentials::from_env, default_dyn_transport, &mut io::stdout()).await
}
