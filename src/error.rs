//! Recoverable errors at the boundary of the analysis engine.
//!
//! Contract violations inside the engine (empty sample sets, empty domains)
//! panic instead; see the `# Panics` sections of the individual constructors.

use thiserror::Error;

/// Errors returned when caller-supplied input cannot be analyzed.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The renderable area left after applying insets is empty or not finite.
    #[error("graph area {width}x{height} has no renderable space")]
    InvalidGraphSize { width: f64, height: f64 },

    /// The smoothing coefficient must be positive and finite.
    #[error("invalid smoothing coefficient: {0}")]
    InvalidSmoothing(f64),

    /// The workout interval is empty, reversed, not finite or too long.
    #[error("workout interval [{start}, {end}] cannot be analyzed")]
    InvalidWorkoutInterval { start: f64, end: f64 },

    /// Encoding or decoding a workout archive failed.
    #[cfg(feature = "archive")]
    #[error("workout archive: {0}")]
    Archive(#[from] serde_json::Error),
}
