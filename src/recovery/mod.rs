// Recovery journal: append-only log of queue mutations, replayed on startup
// and compacted offline by the lmq-compact binary.

pub mod journal;
pub mod replay;

pub use journal::{JournalOp, JournalRecord, JournalSender, JournalWriter};
pub use replay::{compact_dir, consume_dir, replay_into, NetCounts};
