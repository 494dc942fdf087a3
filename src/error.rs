use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    #[error("Shape mismatch: {left:?} vs {right:?}")]
    ShapeMismatch { left: Vec<usize>, right: Vec<usize> },

    #[error("{what} {index} out of range [0, {bound})")]
    IndexOutOfRange { what: String, index: usize, bound: usize },

    #[error("Geometry mismatch: operator expects grid with {expected}, got {found}")]
    GeometryMismatch { expected: String, found: String },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Raw grid function format error: {0}")]
    RawFormat(#[from] binrw::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
