use thiserror::Error;

#[derive(Debug, Error)]
pub enum KnotworkError {
    #[error("Invalid knot vector: {0}")]
    InvalidKnots(String),

    #[error("Control grid error: {0}")]
    ControlGrid(String),

    #[error("Mesh error: {0}")]
    Mesh(String),

    #[error("Invalid resolution: {0}")]
    InvalidResolution(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Physics error: {0}")]
    Physics(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, KnotworkError>;
