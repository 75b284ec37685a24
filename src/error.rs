use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("io: {0}")]
    Io(#[from] io::Error),
    #[error("storage file is not valid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("config: {0}")]
    Config(#[from] toml::de::Error),
    #[error("failed to persist {path}: {source}")]
    Persist {
        path: String,
        #[source]
        source: io::Error,
    },
}

pub type AppResult<T> = Result<T, AppError>;
