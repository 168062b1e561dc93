use crate::grid::AxisKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InjectionError {
    #[error("{axis}-axis coordinate {value} outside [{min}, {max})")]
    OutOfRange {
        axis: AxisKind,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Injection origin (z={z}, r={r}) is not contained in any {axis}-axis cell")]
    OriginOutOfBounds { axis: AxisKind, z: f64, r: f64 },

    #[error("Injection line from (z={z}, r={r}) at theta={theta_deg} deg does not intersect the grid")]
    NoIntersection { z: f64, r: f64, theta_deg: f64 },

    #[error("Invalid {axis}-axis: {message}")]
    InvalidAxis { axis: AxisKind, message: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Physics constraint violated: {0}")]
    PhysicsViolation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type InjectionResult<T> = Result<T, InjectionError>;
