//! Priority-ordered fill.
//!
//! # Algorithm
//!
//! 1. Charge every mandatory stage against the shared deadline.
//! 2. Visit tasks by priority, highest first.
//! 3. For each, take the deepest stage whose extra runtime still fits,
//!    then move on. Tasks are never revisited.
//!
//! # Complexity
//! O(N log N + N² · L); each fit check re-sums the assignment in task order.

use super::{log_infeasible, log_result, Budget};
use crate::error::SchedulingError;
use crate::models::{ScheduleOutcome, Task};
use crate::ordering::priority_order;
use crate::scheduler::{check_preconditions, DepthScheduler, ScheduleOptions};

/// Greedy scheduler that deepens tasks one at a time in priority order.
///
/// # Example
///
/// ```
/// use u_imprecise::models::Task;
/// use u_imprecise::scheduler::{DepthScheduler, PriorityFillScheduler, ScheduleOptions};
///
/// let tasks = vec![
///     Task::new("low").with_priority(0.1).with_deadline(4.0)
///         .with_stage(1.0, 0.1).with_stage(3.0, 0.9),
///     Task::new("high").with_priority(0.9).with_deadline(4.0)
///         .with_stage(1.0, 0.1).with_stage(3.0, 0.2),
/// ];
/// let outcome = PriorityFillScheduler::new()
///     .schedule(&tasks, &ScheduleOptions::default())
///     .unwrap();
/// // "high" takes the slack first, whatever the precision gain.
/// assert_eq!(outcome.schedule().unwrap().depths(), &[0, 1]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PriorityFillScheduler;

impl PriorityFillScheduler {
    /// Creates the scheduler.
    pub fn new() -> Self {
        Self
    }
}

impl DepthScheduler for PriorityFillScheduler {
    fn name(&self) -> &'static str {
        "GREEDY-FILL"
    }

    fn schedule(
        &self,
        tasks: &[Task],
        options: &ScheduleOptions,
    ) -> Result<ScheduleOutcome, SchedulingError> {
        check_preconditions(tasks)?;

        let Some(mut budget) = Budget::for_tasks(tasks) else {
            log_infeasible(self.name(), tasks, options);
            return Ok(ScheduleOutcome::Infeasible);
        };

        for idx in priority_order(tasks) {
            // Cumulative runtimes: scan from the deepest stage back, first fit wins.
            for depth in (1..tasks[idx].stage_count()).rev() {
                if budget.try_deepen(idx, depth) {
                    break;
                }
            }
        }

        log_result(self.name(), &budget, options);
        let schedule = budget.into_schedule();
        Ok(ScheduleOutcome::Scheduled(schedule))
    }

    fn description(&self) -> &'static str {
        "Priority-ordered fill"
    }
}
