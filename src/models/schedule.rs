//! Schedule (solution) model.
//!
//! A schedule is a depth assignment: for every task, the deepest stage to
//! run. Schedulers return a [`ScheduleOutcome`], which separates
//! "no depth combination meets the deadlines" from a real assignment.

use serde::{Deserialize, Serialize};

use super::Task;

/// Per-task depth assignment.
///
/// `depths[i]` means stages `0..=depths[i]` of task `i` run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthSchedule {
    depths: Vec<usize>,
}

impl DepthSchedule {
    /// Wraps a depth vector.
    pub fn new(depths: Vec<usize>) -> Self {
        Self { depths }
    }

    /// Mandatory-only schedule (every depth 0) for `task_count` tasks.
    pub fn mandatory_only(task_count: usize) -> Self {
        Self {
            depths: vec![0; task_count],
        }
    }

    /// Depth per task.
    #[inline]
    pub fn depths(&self) -> &[usize] {
        &self.depths
    }

    /// Depth of task `index`, if present.
    #[inline]
    pub fn depth(&self, index: usize) -> Option<usize> {
        self.depths.get(index).copied()
    }

    /// Number of tasks covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.depths.len()
    }

    /// Whether the schedule covers no tasks.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }

    /// Running cumulative runtime through each task.
    ///
    /// # Panics
    /// If a depth is out of range for its task. Use
    /// [`crate::scheduler::is_valid`] on untrusted schedules first.
    pub fn cumulative_runtimes(&self, tasks: &[Task]) -> Vec<f64> {
        let mut elapsed = 0.0;
        self.depths
            .iter()
            .zip(tasks)
            .map(|(&depth, task)| {
                elapsed += task.runtime_at(depth);
                elapsed
            })
            .collect()
    }

    /// Total runtime of the schedule.
    pub fn total_runtime(&self, tasks: &[Task]) -> f64 {
        self.cumulative_runtimes(tasks).last().copied().unwrap_or(0.0)
    }

    /// Consumes the schedule, returning the depth vector.
    pub fn into_depths(self) -> Vec<usize> {
        self.depths
    }
}

impl From<Vec<usize>> for DepthSchedule {
    fn from(depths: Vec<usize>) -> Self {
        Self::new(depths)
    }
}

/// Result of a scheduling call on valid input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "schedule", rename_all = "snake_case")]
pub enum ScheduleOutcome {
    /// A depth assignment meeting every deadline.
    Scheduled(DepthSchedule),
    /// No depth combination satisfies the deadlines.
    Infeasible,
}

impl ScheduleOutcome {
    /// Whether a schedule was found.
    #[inline]
    pub fn is_feasible(&self) -> bool {
        matches!(self, Self::Scheduled(_))
    }

    /// The schedule, if one was found.
    pub fn schedule(&self) -> Option<&DepthSchedule> {
        match self {
            Self::Scheduled(schedule) => Some(schedule),
            Self::Infeasible => None,
        }
    }

    /// Consumes the outcome, returning the schedule if one was found.
    pub fn into_schedule(self) -> Option<DepthSchedule> {
        match self {
            Self::Scheduled(schedule) => Some(schedule),
            Self::Infeasible => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tasks() -> Vec<Task> {
        vec![
            Task::new("A").with_stage(2.0, 0.1).with_stage(3.0, 0.2),
            Task::new("B").with_stage(1.0, 0.1).with_stage(4.0, 0.3),
        ]
    }

    #[test]
    fn test_cumulative_runtimes() {
        let schedule = DepthSchedule::new(vec![1, 0]);
        let tasks = sample_tasks();
        assert_eq!(schedule.cumulative_runtimes(&tasks), vec![3.0, 4.0]);
        assert!((schedule.total_runtime(&tasks) - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_mandatory_only() {
        let schedule = DepthSchedule::mandatory_only(3);
        assert_eq!(schedule.depths(), &[0, 0, 0]);
        assert_eq!(schedule.depth(2), Some(0));
        assert_eq!(schedule.depth(3), None);
    }

    #[test]
    fn test_empty_schedule() {
        let schedule = DepthSchedule::default();
        assert!(schedule.is_empty());
        assert!((schedule.total_runtime(&[])).abs() < 1e-10);
    }

    #[test]
    fn test_outcome_accessors() {
        let outcome = ScheduleOutcome::Scheduled(vec![0, 1].into());
        assert!(outcome.is_feasible());
        assert_eq!(outcome.schedule().map(|s| s.len()), Some(2));

        let none = ScheduleOutcome::Infeasible;
        assert!(!none.is_feasible());
        assert!(none.into_schedule().is_none());
    }
}
