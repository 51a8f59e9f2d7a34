//! nnclassify - Main Entry Point

use clap::Parser;
use classify_app::{init_logging, report_termination, run, Cli, Settings};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging();

    info!("=== nnclassify v{} ===", env!("CARGO_PKG_VERSION"));

    let settings = Settings::load(cli.config.as_deref())?.with_cli(&cli);

    let termination = run(settings).await?;
    report_termination(&termination);

    Ok(())
}
