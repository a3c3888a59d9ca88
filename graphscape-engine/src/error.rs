use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("unreadable input: {0}")]
    Format(String),

    #[error("incomplete mapping: {0}")]
    Mapping(String),

    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
