//! Errors raised for malformed geometry input.

use thiserror::Error;

/// Input that cannot be turned into obstacles or a scannable path.
///
/// Degenerate but well-formed geometry (zero-length segments, collinear
/// overlaps) never produces one of these.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("obstacle {index} must have 4 or 5 elements, got {len}")]
    ObstacleArity { index: usize, len: usize },

    #[error("{field} is not a finite number ({value})")]
    NonFinite { field: &'static str, value: f64 },

    #[error("{field} {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("obstacle {index} has invalid id {value}; ids must be non-negative integers")]
    InvalidObstacleId { index: usize, value: f64 },

    #[error("obstacle id {0} is used more than once")]
    DuplicateObstacleId(u64),

    #[error("unsupported geometry type {0:?}; only LineString or MultiLineString are supported")]
    UnsupportedGeometry(String),

    #[error("malformed geometry: {0}")]
    MalformedGeometry(String),
}

/// Fail with [`GeometryError::NonFinite`] unless `value` is finite.
pub(crate) fn ensure_finite(field: &'static str, value: f64) -> Result<f64, GeometryError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(GeometryError::NonFinite { field, value })
    }
}

/// Fail unless `value` is finite and inside `[min, max]`.
pub(crate) fn ensure_range(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<f64, GeometryError> {
    let value = ensure_finite(field, value)?;
    if value < min || value > max {
        return Err(GeometryError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(value)
}
