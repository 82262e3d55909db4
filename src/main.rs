use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;

use lmq::recovery::{self, JournalWriter};
use lmq::{AppState, Config, HttpServer, QueueManager};

#[derive(Parser)]
#[command(name = "lmq", about = "Lightweight message queue server")]
struct Cli {
    /// Path to the JSON config file.
    #[arg(default_value = "config.json")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    let default_level = if config.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let manager = Arc::new(QueueManager::new(config.queue_init_capacity));

    // The journal writer must be draining before replay starts: replayed
    // messages are re-journaled so the fresh journal reflects them.
    let writer = JournalWriter::new(&config.recovery_dir, config.recovery_file_lines);
    let (journal, _journal_task) = writer.spawn();

    recovery::replay_into(&manager, &journal, Path::new(&config.recovery_dir)).await?;

    let state = AppState::new(&config, manager, journal);
    HttpServer::new(config, state).run().await?;
    Ok(())
}
