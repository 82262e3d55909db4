use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// A single queue element: the message text plus its enqueue timestamp
/// (microseconds since epoch). The timestamp is informational only and is
/// re-stamped when a message is rebuilt by journal replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub body: String,
    pub enqueued_at: u64,
}

impl Message {
    pub fn new(body: String) -> Self {
        let enqueued_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as u64)
            .unwrap_or(0);
        Self { body, enqueued_at }
    }
}
