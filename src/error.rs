use thiserror::Error;

/// A fetch attempt against the upstream warning feed failed.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("feed returned status {0}")]
    Status(u16),

    #[error("invalid feed format: {0}")]
    InvalidFormat(String),
}

/// A single feed record could not be normalized. Never fatal: the record
/// is dropped and the rest of the batch is processed.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("missing warning id")]
    MissingId,

    #[error("malformed feature: {0}")]
    Malformed(String),

    #[error("timestamp out of range: {0}")]
    InvalidTimestamp(i64),
}

/// A persistence operation failed. Prior state is left intact.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A fetch+save cycle failed, either at the feed or the store step.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
