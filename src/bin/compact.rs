// Offline journal compaction: folds every journal file except the server's
// live one into net SET records. Safe to run while the server is up.

use std::path::{Path, PathBuf};

use clap::Parser;

use lmq::recovery::compact_dir;
use lmq::Config;

#[derive(Parser)]
#[command(name = "lmq-compact", about = "Compact the lmq recovery journal")]
struct Cli {
    /// Path to the JSON config file.
    #[arg(default_value = "config.json")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let written = compact_dir(
        Path::new(&config.recovery_dir),
        config.recovery_file_lines,
    )
    .await?;

    tracing::info!(records = written, "journal compaction complete");
    Ok(())
}
