use thiserror::Error;

#[derive(Debug, Error)]
pub enum EaselError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server rejected the request: {error}: {message}")]
    Api { error: String, message: String },

    #[error("no board loaded")]
    NoBoard,

    #[error("unknown task: {0}")]
    UnknownTask(String),

    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("position {position} out of range for a list of {len}")]
    PositionOutOfRange { position: i64, len: usize },
}
