use missive_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("csv error: {0}")]
    Csv(#[from] ::csv::Error),
    #[error("missing required column: {0}")]
    MissingColumn(&'static str),
    #[error("unsupported file type: {0}")]
    UnsupportedFile(String),
}

pub type Result<T> = std::result::Result<T, ImportError>;
