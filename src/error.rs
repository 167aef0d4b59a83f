use thiserror::Error;

/// Errors surfaced by simulation setup, persistence and export
#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("could not parse point list: {0}")]
    PointParse(String),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("image export failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("gif encoding failed: {0}")]
    Gif(#[from] gif::EncodingError),
}

pub type Result<T> = std::result::Result<T, SimError>;
