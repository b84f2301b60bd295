//! Unified error type for the simulation core.
//!
//! Runtime numeric edge cases (negative heights, overflowing sand) are
//! handled by clamping inside the update rules, never by errors. The only
//! failure paths are invalid grid indices, bad configuration at startup,
//! and non-finite external input rejected at the step boundary.

use thiserror::Error;

pub type SimResult<T> = Result<T, SimError>;

#[derive(Error, Debug)]
pub enum SimError {
    /// Invalid grid index. A programming error - bounded UV inputs can
    /// never produce this in normal operation.
    #[error("grid index ({x}, {y}) out of range for {width}x{width} field")]
    OutOfRange { x: usize, y: usize, width: usize },

    /// Bad configuration at initialization (resolution, plane size).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Non-finite scalar fed across the step boundary. NaN propagation
    /// through the grid is unrecoverable, so inputs are rejected up front.
    #[error("non-finite step input: {name} = {value}")]
    InvalidStepInput { name: &'static str, value: f32 },
}

impl SimError {
    /// Check one boundary scalar, rejecting NaN and infinities.
    pub fn check_finite(name: &'static str, value: f32) -> SimResult<()> {
        if value.is_finite() {
            Ok(())
        } else {
            Err(SimError::InvalidStepInput { name, value })
        }
    }
}
