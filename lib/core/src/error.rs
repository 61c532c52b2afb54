use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to load catalog: {0}")]
    DataLoad(String),

    #[error("Failed to load embedding model: {0}")]
    ModelLoad(String),

    #[error("Prediction failed: {0}")]
    Prediction(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

