//! Task orderings.
//!
//! Schedulers consume tasks in non-decreasing deadline order (the DP
//! recurrence depends on it), while the greedy variants visit them by
//! priority. Both orders are stable: ties keep submission order.
//!
//! [`DeadlineOrdering`] is the adapter an ingestion front end uses to bring
//! submitted tasks into deadline order and to map the resulting schedule
//! back to submission order.
//!
//! # Usage
//!
//! ```
//! use u_imprecise::models::Task;
//! use u_imprecise::ordering::DeadlineOrdering;
//! use u_imprecise::scheduler::{DepthScheduler, GlobalRankingScheduler, ScheduleOptions};
//!
//! let submitted = vec![
//!     Task::new("late").with_priority(0.9).with_deadline(8.0).with_stage(1.0, 0.2).with_stage(2.0, 0.6),
//!     Task::new("soon").with_priority(0.1).with_deadline(8.0).with_stage(1.0, 0.2),
//! ];
//! let ordering = DeadlineOrdering::arrange(submitted);
//! let outcome = GlobalRankingScheduler::new()
//!     .schedule(ordering.tasks(), &ScheduleOptions::default())
//!     .unwrap();
//! let schedule = ordering.restore(outcome.schedule().unwrap()).unwrap();
//! assert_eq!(schedule.depths(), &[1, 0]);
//! ```
//!
//! # Reference
//! Jackson (1955), Earliest Due Date ordering

use crate::models::{DepthSchedule, Task};
use crate::validation::{ValidationError, ValidationErrorKind};

/// Indices sorted by priority, highest first; ties by lowest index.
pub fn priority_order(tasks: &[Task]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..tasks.len()).collect();
    indices.sort_by(|&a, &b| tasks[b].priority.total_cmp(&tasks[a].priority));
    indices
}

/// Indices sorted by deadline, earliest first; ties by lowest index.
///
/// Uses IEEE total order, so NaN deadlines sort last instead of breaking the
/// sort; validation rejects them afterwards.
pub fn deadline_order(tasks: &[Task]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..tasks.len()).collect();
    indices.sort_by(|&a, &b| tasks[a].deadline.total_cmp(&tasks[b].deadline));
    indices
}

/// Index of the highest-priority task (lowest index among ties).
pub fn highest_priority(tasks: &[Task]) -> Option<usize> {
    priority_order(tasks).first().copied()
}

/// Tasks rearranged into deadline order, remembering where each came from.
#[derive(Debug, Clone)]
pub struct DeadlineOrdering {
    tasks: Vec<Task>,
    /// `origin[k]` = submission index of `tasks[k]`.
    origin: Vec<usize>,
}

impl DeadlineOrdering {
    /// Stably sorts submitted tasks by deadline.
    pub fn arrange(submitted: Vec<Task>) -> Self {
        let origin = deadline_order(&submitted);
        let mut slots: Vec<Option<Task>> = submitted.into_iter().map(Some).collect();
        let tasks = origin.iter().filter_map(|&i| slots[i].take()).collect();
        Self { tasks, origin }
    }

    /// Tasks in deadline order, ready for a scheduler.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Submission index of the task at deadline position `position`.
    pub fn origin(&self, position: usize) -> Option<usize> {
        self.origin.get(position).copied()
    }

    /// Maps a schedule over [`Self::tasks`] back to submission order.
    ///
    /// Fails with [`ValidationErrorKind::LengthMismatch`] if `schedule` does
    /// not cover exactly the arranged tasks.
    pub fn restore(&self, schedule: &DepthSchedule) -> Result<DepthSchedule, ValidationError> {
        if schedule.len() != self.origin.len() {
            return Err(ValidationError::new(
                ValidationErrorKind::LengthMismatch,
                format!(
                    "schedule covers {} tasks, ordering holds {}",
                    schedule.len(),
                    self.origin.len()
                ),
            ));
        }
        let mut depths = vec![0; self.origin.len()];
        for (&origin, &depth) in self.origin.iter().zip(schedule.depths()) {
            depths[origin] = depth;
        }
        Ok(DepthSchedule::new(depths))
    }
}
