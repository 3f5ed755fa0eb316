//! Task (imprecise computation) model.
//!
//! A task is a chain of refinement stages. Stage 0 is mandatory; every
//! further stage adds runtime and precision. Stage values are cumulative:
//! `stages[d]` describes the cost and quality of running stages `0..=d`.
//!
//! # Reference
//! Liu et al. (1991), "Algorithms for Scheduling Imprecise Computations"

use serde::{Deserialize, Serialize};

use crate::validation::{ValidationError, ValidationErrorKind};

/// Cumulative cost and quality of running a task up to one depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    /// Cumulative runtime of stages `0..=d`.
    pub runtime: f64,
    /// Precision reached after stages `0..=d`, in `[0, 1)`.
    pub precision: f64,
}

impl Stage {
    /// Creates a stage from its cumulative runtime and precision.
    pub fn new(runtime: f64, precision: f64) -> Self {
        Self { runtime, precision }
    }
}

/// A task to be assigned a stopping depth.
///
/// # Deadline Semantics
/// `deadline` bounds the *cumulative* runtime of every task up to and
/// including this one on the shared timeline, not this task's own runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Task identifier (job id from the ingestion side).
    pub id: String,
    /// Importance in `[0, 1]`.
    pub priority: f64,
    /// Bound on cumulative runtime through this task.
    pub deadline: f64,
    /// Cumulative stage profile, index = depth.
    pub stages: Vec<Stage>,
}

impl Task {
    /// Creates a task with no stages, priority 0 and deadline 0.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            priority: 0.0,
            deadline: 0.0,
            stages: Vec::new(),
        }
    }

    /// Builds a task from parallel cumulative runtime and precision arrays.
    ///
    /// Fails with [`ValidationErrorKind::LengthMismatch`] when the arrays
    /// disagree in length.
    pub fn from_profiles(
        id: impl Into<String>,
        runtimes: &[f64],
        precisions: &[f64],
    ) -> Result<Self, ValidationError> {
        let id = id.into();
        if runtimes.len() != precisions.len() {
            return Err(ValidationError::new(
                ValidationErrorKind::LengthMismatch,
                format!(
                    "Task '{}' has {} runtimes but {} precisions",
                    id,
                    runtimes.len(),
                    precisions.len()
                ),
            ));
        }
        let stages = runtimes
            .iter()
            .zip(precisions)
            .map(|(&runtime, &precision)| Stage::new(runtime, precision))
            .collect();
        Ok(Self {
            id,
            priority: 0.0,
            deadline: 0.0,
            stages,
        })
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: f64) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the cumulative deadline.
    pub fn with_deadline(mut self, deadline: f64) -> Self {
        self.deadline = deadline;
        self
    }

    /// Appends the next stage (cumulative values).
    pub fn with_stage(mut self, runtime: f64, precision: f64) -> Self {
        self.stages.push(Stage::new(runtime, precision));
        self
    }

    /// Number of stages (valid depths are `0..stage_count()`).
    #[inline]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Deepest valid depth, `None` for a task without stages.
    #[inline]
    pub fn max_depth(&self) -> Option<usize> {
        self.stages.len().checked_sub(1)
    }

    /// Runtime of the mandatory stage.
    pub fn mandatory_runtime(&self) -> f64 {
        self.stages.first().map(|s| s.runtime).unwrap_or(0.0)
    }

    /// Cumulative runtime at `depth`.
    ///
    /// # Panics
    /// If `depth >= stage_count()`.
    #[inline]
    pub fn runtime_at(&self, depth: usize) -> f64 {
        self.stages[depth].runtime
    }

    /// Cumulative precision at `depth`.
    ///
    /// # Panics
    /// If `depth >= stage_count()`.
    #[inline]
    pub fn precision_at(&self, depth: usize) -> f64 {
        self.stages[depth].precision
    }

    /// Runtime added by going from `from` to `to` (cumulative difference).
    #[inline]
    pub fn marginal_runtime(&self, from: usize, to: usize) -> f64 {
        self.runtime_at(to) - self.runtime_at(from)
    }

    /// Precision added by going from `from` to `to`.
    #[inline]
    pub fn marginal_precision(&self, from: usize, to: usize) -> f64 {
        self.precision_at(to) - self.precision_at(from)
    }
}
