use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("invalid stored payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("unknown activity type '{0}'")]
    UnknownActivityType(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("could not read session cache: {0}")]
    Io(#[from] std::io::Error),

    #[error("session cache is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}
