//! Input validation for depth scheduling.
//!
//! Checks the preconditions every scheduler relies on before any table is
//! built. Detects:
//! - Tasks without stages
//! - Stage arrays whose lengths disagree with the stage count
//! - Runtime or precision profiles that decrease with depth
//! - Priority outside `[0, 1]`, precision outside `[0, 1)`
//! - Negative or non-finite runtimes and deadlines
//! - Deadlines that are not weakly increasing across the task sequence
//!
//! Every check runs; all findings are reported together.

use crate::models::Task;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A task has no stages (the mandatory stage is missing).
    EmptyTask,
    /// Per-stage arrays disagree with the declared stage count.
    LengthMismatch,
    /// Cumulative runtime or precision decreases with depth.
    NonMonotoneStages,
    /// Precision outside `[0, 1)`.
    PrecisionOutOfRange,
    /// Priority outside `[0, 1]`.
    PriorityOutOfRange,
    /// Runtime negative or not finite.
    InvalidRuntime,
    /// Deadline negative or not finite.
    InvalidDeadline,
    /// Deadlines are not weakly increasing in task order.
    DeadlineOrder,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates an ordered task sequence.
///
/// Checks:
/// 1. Every task has at least one stage
/// 2. Runtimes are finite, non-negative and weakly increasing with depth
/// 3. Precisions lie in `[0, 1)` and are weakly increasing with depth
/// 4. Priority lies in `[0, 1]`
/// 5. Deadlines are finite, non-negative and weakly increasing across tasks
///
/// An empty sequence is valid.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_tasks(tasks: &[Task]) -> ValidationResult {
    let mut errors = Vec::new();

    for (index, task) in tasks.iter().enumerate() {
        if task.stages.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyTask,
                format!("Task '{}' (#{index}) has no stages", task.id),
            ));
        }

        if !(0.0..=1.0).contains(&task.priority) {
            errors.push(ValidationError::new(
                ValidationErrorKind::PriorityOutOfRange,
                format!(
                    "Task '{}' priority {} is outside [0, 1]",
                    task.id, task.priority
                ),
            ));
        }

        if !task.deadline.is_finite() || task.deadline < 0.0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidDeadline,
                format!("Task '{}' deadline {} is invalid", task.id, task.deadline),
            ));
        }

        check_stages(task, &mut errors);
    }

    for (index, pair) in tasks.windows(2).enumerate() {
        // NaN deadlines are already reported above
        if pair[1].deadline < pair[0].deadline {
            errors.push(ValidationError::new(
                ValidationErrorKind::DeadlineOrder,
                format!(
                    "Task '{}' (#{}) deadline {} precedes task '{}' (#{index}) deadline {}",
                    pair[1].id,
                    index + 1,
                    pair[1].deadline,
                    pair[0].id,
                    pair[0].deadline
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_stages(task: &Task, errors: &mut Vec<ValidationError>) {
    for (depth, stage) in task.stages.iter().enumerate() {
        if !stage.runtime.is_finite() || stage.runtime < 0.0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidRuntime,
                format!(
                    "Task '{}' stage {depth} runtime {} is invalid",
                    task.id, stage.runtime
                ),
            ));
        }
        if !(0.0..1.0).contains(&stage.precision) {
            errors.push(ValidationError::new(
                ValidationErrorKind::PrecisionOutOfRange,
                format!(
                    "Task '{}' stage {depth} precision {} is outside [0, 1)",
                    task.id, stage.precision
                ),
            ));
        }
    }

    for (depth, pair) in task.stages.windows(2).enumerate() {
        if pair[1].runtime < pair[0].runtime || pair[1].precision < pair[0].precision {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonMonotoneStages,
                format!(
                    "Task '{}' stage {} decreases runtime or precision relative to stage {depth}",
                    task.id,
                    depth + 1
                ),
            ));
        }
    }
}

/// Builds tasks from column-oriented input.
///
/// `runtimes[i]` and `precisions[i]` must both have length `stage_counts[i]`,
/// and every column must have one entry per task. Task IDs are the indices.
/// The resulting tasks are not validated beyond their shape; run
/// [`validate_tasks`] (or a scheduler) on them.
pub fn build_tasks(
    stage_counts: &[usize],
    runtimes: &[Vec<f64>],
    precisions: &[Vec<f64>],
    priorities: &[f64],
    deadlines: &[f64],
) -> Result<Vec<Task>, Vec<ValidationError>> {
    let n = stage_counts.len();
    let mut errors = Vec::new();

    for (column, len) in [
        ("runtimes", runtimes.len()),
        ("precisions", precisions.len()),
        ("priorities", priorities.len()),
        ("deadlines", deadlines.len()),
    ] {
        if len != n {
            errors.push(ValidationError::new(
                ValidationErrorKind::LengthMismatch,
                format!("Column '{column}' has {len} entries, expected {n}"),
            ));
        }
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    let mut tasks = Vec::with_capacity(n);
    for i in 0..n {
        for (column, len) in [("runtimes", runtimes[i].len()), ("precisions", precisions[i].len())]
        {
            if len != stage_counts[i] {
                errors.push(ValidationError::new(
                    ValidationErrorKind::LengthMismatch,
                    format!(
                        "Task #{i} {column} has {len} stages, expected {}",
                        stage_counts[i]
                    ),
                ));
            }
        }
        match Task::from_profiles(i.to_string(), &runtimes[i], &precisions[i]) {
            Ok(task) => tasks.push(
                task.with_priority(priorities[i])
                    .with_deadline(deadlines[i]),
            ),
            // Already reported against the stage count
            Err(_) => continue,
        }
    }

    if errors.is_empty() {
        Ok(tasks)
    } else {
        Err(errors)
    }
}
