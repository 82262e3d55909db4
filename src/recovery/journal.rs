use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::LmqError;

/// Producers never wait on the journal; a full channel is reported back to
/// the client instead of stalling the queue.
pub const JOURNAL_CHANNEL_CAPACITY: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JournalOp {
    Set,
    Get,
    Del,
}

/// One journal line: a queue mutation. Serialized as a single JSON object
/// per line, so arbitrary message bodies stay on one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalRecord {
    pub op: JournalOp,
    pub queue: String,
    #[serde(default)]
    pub message: String,
}

impl JournalRecord {
    pub fn set(queue: &str, message: &str) -> Self {
        Self {
            op: JournalOp::Set,
            queue: queue.to_string(),
            message: message.to_string(),
        }
    }

    pub fn get(queue: &str, message: &str) -> Self {
        Self {
            op: JournalOp::Get,
            queue: queue.to_string(),
            message: message.to_string(),
        }
    }

    pub fn del(queue: &str) -> Self {
        Self {
            op: JournalOp::Del,
            queue: queue.to_string(),
            message: String::new(),
        }
    }
}

/// Cloneable producer side of the journal channel.
#[derive(Clone)]
pub struct JournalSender {
    tx: mpsc::Sender<JournalRecord>,
}

impl JournalSender {
    pub fn record(&self, record: JournalRecord) -> Result<(), LmqError> {
        self.tx.try_send(record).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => LmqError::JournalFull,
            mpsc::error::TrySendError::Closed(_) => LmqError::JournalClosed,
        })
    }
}

/// Background writer task. Each record is written and flushed immediately;
/// after `max_lines` records the file is closed and a new timestamp-named
/// one is opened.
pub struct JournalWriter {
    dir: PathBuf,
    max_lines: usize,
}

impl JournalWriter {
    pub fn new(dir: impl Into<PathBuf>, max_lines: usize) -> Self {
        Self {
            dir: dir.into(),
            max_lines: max_lines.max(1),
        }
    }

    pub fn spawn(self) -> (JournalSender, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(JOURNAL_CHANNEL_CAPACITY);
        let handle = tokio::spawn(self.run(rx));
        (JournalSender { tx }, handle)
    }

    async fn run(self, mut rx: mpsc::Receiver<JournalRecord>) {
        let mut file: Option<File> = None;
        let mut lines = 0usize;

        while let Some(record) = rx.recv().await {
            let line = match serde_json::to_string(&record) {
                Ok(json) => json + "\n",
                Err(e) => {
                    tracing::error!("failed to serialize journal record: {}", e);
                    continue;
                }
            };

            if file.is_none() {
                match self.open_fresh().await {
                    Ok(f) => file = Some(f),
                    Err(e) => {
                        tracing::error!("failed to open journal file: {}", e);
                        continue;
                    }
                }
            }

            if let Some(f) = file.as_mut() {
                if let Err(e) = write_line(f, &line).await {
                    tracing::error!("failed to write journal line: {}", e);
                    continue;
                }
            }

            lines += 1;
            if lines >= self.max_lines {
                file = None;
                lines = 0;
            }
        }
        tracing::debug!("journal writer shutting down");
    }

    async fn open_fresh(&self) -> std::io::Result<File> {
        tokio::fs::create_dir_all(&self.dir).await?;
        OpenOptions::new()
            .append(true)
            .create(true)
            .open(self.dir.join(timestamped_name("")))
            .await
    }
}

async fn write_line(file: &mut File, line: &str) -> std::io::Result<()> {
    file.write_all(line.as_bytes()).await?;
    file.flush().await
}

/// Journal filename: nanoseconds since epoch, so lexicographic order is
/// chronological. Compacted files get a `0` prefix to sort before live ones.
pub fn timestamped_name(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    format!("{}{}", prefix, nanos)
}
