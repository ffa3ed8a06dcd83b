//! Error types for configuration and export.
//!
//! Generation itself never fails: placement and routing shortfalls are
//! reported through the log and the `GenerationReport`. Only an invalid
//! parameter set is rejected, before any stage runs.

use thiserror::Error;

/// Rejected parameter set.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid grid dimensions {width}x{height}: both must be positive")]
    InvalidDimensions { width: usize, height: usize },

    #[error("inverted range for {name}: min {min} > max {max}")]
    InvertedRange { name: &'static str, min: f64, max: f64 },

    #[error("{name} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("water elevations must increase ocean < seas < coast (got {ocean}, {seas}, {coast})")]
    ElevationOrder { ocean: f32, seas: f32, coast: f32 },

    #[error("unknown {kind} '{value}'")]
    UnknownName { kind: &'static str, value: String },

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure while writing CLI outputs.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
