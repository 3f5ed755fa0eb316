//! Scheduling errors.
//!
//! Configuration failures only. An instance that admits no schedule is a
//! valid outcome ([`crate::models::ScheduleOutcome::Infeasible`]), not an error.

use crate::validation::ValidationError;

/// Errors reported at the scheduling contract boundary.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchedulingError {
    /// The task sequence failed precondition checks.
    #[error("invalid scheduling input: {}", summarize(.0))]
    InvalidInput(Vec<ValidationError>),

    /// Quantization step is not a positive finite number.
    #[error("quantization step must be positive and finite, got {0}")]
    InvalidDelta(f64),

    /// The DP table would exceed the configured cell limit.
    #[error("reward table needs {cells} cells, limit is {limit}; use a coarser delta")]
    TableTooLarge {
        /// Cells the request would allocate.
        cells: u128,
        /// Configured limit.
        limit: u64,
    },

    /// Scenario generation could not be set up.
    #[error("simulation setup failed: {0}")]
    Simulation(String),
}

impl From<Vec<ValidationError>> for SchedulingError {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::InvalidInput(errors)
    }
}

fn summarize(errors: &[ValidationError]) -> String {
    match errors {
        [] => "no details".to_string(),
        [only] => only.message.clone(),
        [first, rest @ ..] => format!("{} (and {} more)", first.message, rest.len()),
    }
}
