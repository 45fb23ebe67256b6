use thiserror::Error;

#[derive(Error, Debug)]
pub enum FoldCmpError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Worker error: {0}")]
    Worker(String),
}
