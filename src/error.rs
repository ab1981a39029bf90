use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("fetch error: {0}")]
    Fetch(String),
    #[error("malformed payload: {0}")]
    Payload(String),
    #[error("render error: {0}")]
    Render(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
