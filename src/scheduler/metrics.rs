//! Schedule feasibility and quality metrics.
//!
//! Validates a depth schedule against its tasks and scores it.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Weighted sum | Σ precision[i][d_i] · priority[i] |
//! | Max-priority precision | precision of the highest-priority task |
//! | Total runtime | Σ runtime[i][d_i] |
//! | Minimum slack | min over i of deadline[i] − cumulative runtime through i |
//! | Optional stages | Σ d_i |
//!
//! Metrics are `None` for invalid schedules, so "invalid" is never
//! confused with a genuine score of zero.

use crate::models::{reward, DepthSchedule, Task};
use crate::ordering::highest_priority;

/// Whether `schedule` is a valid depth assignment for `tasks`.
///
/// Valid means: one depth per task, every depth within the task's stage
/// range, and for every `i` the cumulative runtime through task `i` within
/// `tasks[i].deadline`.
pub fn is_valid(schedule: &DepthSchedule, tasks: &[Task]) -> bool {
    if schedule.len() != tasks.len() {
        return false;
    }
    let mut elapsed = 0.0;
    for (&depth, task) in schedule.depths().iter().zip(tasks) {
        if depth >= task.stage_count() {
            return false;
        }
        elapsed += task.runtime_at(depth);
        if elapsed > task.deadline {
            return false;
        }
    }
    true
}

/// Σ precision · priority over all tasks, `None` if the schedule is invalid.
pub fn weighted_sum_metric(schedule: &DepthSchedule, tasks: &[Task]) -> Option<f64> {
    if !is_valid(schedule, tasks) {
        return None;
    }
    Some(
        schedule
            .depths()
            .iter()
            .zip(tasks)
            .map(|(&depth, task)| reward(task.precision_at(depth), task.priority))
            .sum(),
    )
}

/// Precision reached by the highest-priority task (lowest index among
/// ties), `None` if the schedule is invalid or empty.
pub fn max_priority_metric(schedule: &DepthSchedule, tasks: &[Task]) -> Option<f64> {
    if !is_valid(schedule, tasks) {
        return None;
    }
    let top = highest_priority(tasks)?;
    Some(tasks[top].precision_at(schedule.depths()[top]))
}

/// Quality summary of a valid schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleMetrics {
    /// Σ precision · priority.
    pub weighted_sum: f64,
    /// Precision of the highest-priority task (0 for an empty schedule).
    pub max_priority_precision: f64,
    /// Total runtime of all chosen stages.
    pub total_runtime: f64,
    /// Smallest deadline slack over all prefixes (`+inf` when empty).
    pub min_slack: f64,
    /// Number of optional stages selected (Σ depth).
    pub optional_stages: usize,
}

impl ScheduleMetrics {
    /// Computes metrics, `None` if the schedule is invalid.
    pub fn calculate(schedule: &DepthSchedule, tasks: &[Task]) -> Option<Self> {
        let weighted_sum = weighted_sum_metric(schedule, tasks)?;
        let max_priority_precision = max_priority_metric(schedule, tasks).unwrap_or(0.0);

        let cumulative = schedule.cumulative_runtimes(tasks);
        let min_slack = cumulative
            .iter()
            .zip(tasks)
            .map(|(elapsed, task)| task.deadline - elapsed)
            .fold(f64::INFINITY, f64::min);

        Some(Self {
            weighted_sum,
            max_priority_precision,
            total_runtime: cumulative.last().copied().unwrap_or(0.0),
            min_slack,
            optional_stages: schedule.depths().iter().sum(),
        })
    }
}
