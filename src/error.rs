use thiserror::Error;

/// Errors raised while configuring or running the speed pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// The calibration quadrilateral cannot define a homography.
    #[error("degenerate region: {0}")]
    DegenerateRegion(String),

    #[error("invalid region: expected {expected} points, got {got}")]
    InvalidRegion { expected: usize, got: usize },

    #[error("too few polygon vertices: need {needed}, got {got}")]
    TooFewVertices { needed: usize, got: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
