use std::collections::HashMap;
use std::path::Path;

use tokio::io::AsyncWriteExt;

use crate::error::LmqError;
use crate::queue::QueueManager;

use super::journal::{timestamped_name, JournalOp, JournalRecord, JournalSender};

/// Net message count per queue, per body. `SET` adds one, `GET` subtracts
/// one, `DEL` drops the queue's whole accumulator.
pub type NetCounts = HashMap<String, HashMap<String, i64>>;

/// Read every journal file in `dir` in filename order (chronological),
/// accumulate net counts, and delete each file once consumed. With
/// `keep_newest` the lexicographically last file (the server's live one)
/// is left untouched.
pub async fn consume_dir(dir: &Path, keep_newest: bool) -> Result<NetCounts, LmqError> {
    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            names.push(entry.file_name());
        }
    }
    names.sort();
    if keep_newest {
        names.pop();
    }

    let mut counts = NetCounts::new();
    for name in names {
        let path = dir.join(&name);
        let contents = tokio::fs::read_to_string(&path).await?;
        for line in contents.lines() {
            match serde_json::from_str::<JournalRecord>(line) {
                Ok(record) => apply(&mut counts, record),
                Err(e) => {
                    tracing::warn!(file = %path.display(), "skipping malformed recovery line: {}", e);
                }
            }
        }
        if let Err(e) = tokio::fs::remove_file(&path).await {
            tracing::warn!(file = %path.display(), "failed to remove consumed journal file: {}", e);
        }
    }
    Ok(counts)
}

fn apply(counts: &mut NetCounts, record: JournalRecord) {
    match record.op {
        JournalOp::Set => {
            *counts
                .entry(record.queue)
                .or_default()
                .entry(record.message)
                .or_insert(0) += 1;
        }
        JournalOp::Get => {
            *counts
                .entry(record.queue)
                .or_default()
                .entry(record.message)
                .or_insert(0) -= 1;
        }
        JournalOp::Del => {
            counts.remove(&record.queue);
        }
    }
}

/// Startup replay: rebuild queues from the journal directory. Every queue
/// that appears in the surviving history is created, even when its net
/// counts are all zero. Replayed messages are journaled again so the fresh
/// journal reflects the reconstructed state.
pub async fn replay_into(
    manager: &QueueManager,
    journal: &JournalSender,
    dir: &Path,
) -> Result<(), LmqError> {
    tokio::fs::create_dir_all(dir).await?;
    let counts = consume_dir(dir, false).await?;

    let mut restored = 0usize;
    for (queue_name, bodies) in counts {
        let queue = manager.get_or_create_queue(&queue_name);
        for (body, count) in bodies {
            for _ in 0..count.max(0) {
                queue.enqueue(body.clone());
                restored += 1;
                if let Err(e) = journal.record(JournalRecord::set(&queue_name, &body)) {
                    tracing::error!(queue = %queue_name, "failed to journal replayed message: {}", e);
                }
            }
        }
    }
    tracing::info!(
        queues = manager.queue_count(),
        messages = restored,
        "recovery replay complete"
    );
    Ok(())
}

/// Offline compaction: fold every journal file except the newest into net
/// `SET` records, written to `0`-prefixed files (which sort before all live
/// files) with the usual rotation threshold. Returns the number of records
/// written.
pub async fn compact_dir(dir: &Path, max_lines: usize) -> Result<usize, LmqError> {
    let max_lines = max_lines.max(1);
    let counts = consume_dir(dir, true).await?;

    let mut file: Option<tokio::fs::File> = None;
    let mut lines = 0usize;
    let mut written = 0usize;

    for (queue_name, bodies) in counts {
        for (body, count) in bodies {
            if count <= 0 {
                continue;
            }
            let line = serde_json::to_string(&JournalRecord::set(&queue_name, &body))? + "\n";
            for _ in 0..count {
                if file.is_none() {
                    let f = tokio::fs::File::create(dir.join(timestamped_name("0"))).await?;
                    file = Some(f);
                    lines = 0;
                }
                if let Some(f) = file.as_mut() {
                    f.write_all(line.as_bytes()).await?;
                }
                written += 1;
                lines += 1;
                if lines >= max_lines {
                    if let Some(mut f) = file.take() {
                        f.flush().await?;
                    }
                }
            }
        }
    }
    if let Some(mut f) = file.take() {
        f.flush().await?;
    }
    Ok(written)
}
