// LMQ - Lightweight message queue server
//
// This library provides the queue core, the recovery journal, and the HTTP
// transport. Binary entry points are in src/main.rs (server) and
// src/bin/compact.rs (journal compaction).

pub mod config;
pub mod error;
pub mod http;
pub mod payload;
pub mod queue;
pub mod recovery;

pub use config::Config;
pub use error::LmqError;
pub use http::{AppState, HttpServer};
pub use queue::{Message, MessageQueue, QueueManager, QueueStats};
pub use recovery::{JournalOp, JournalRecord, JournalWriter};
