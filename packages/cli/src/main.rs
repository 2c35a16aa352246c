mod cli;

use anyhow::Result;
use clap::Parser;
use cli::opt;
use coursedesk_cli::ApiClient;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let opt = opt::Cli::parse();
    cli::exec(ApiClient::new(opt.base_url), opt.command).await
}
