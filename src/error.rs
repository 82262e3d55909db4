use thiserror::Error;

#[derive(Debug, Error)]
pub enum LmqError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("recovery journal is not keeping up")]
    JournalFull,

    #[error("recovery journal writer has shut down")]
    JournalClosed,
}
