//! Greedy depth schedulers.
//!
//! Fast heuristic alternatives to [`super::DynamicScheduler`], kept for
//! comparative evaluation. All variants share one set-up:
//!
//! 1. Every task starts at depth 0 (mandatory stage).
//! 2. The earliest deadline `deadline[0]` bounds the *total* runtime.
//! 3. If the mandatory stages alone exceed it, the instance is infeasible.
//!
//! Because deadlines are weakly increasing, a schedule whose total runtime
//! meets `deadline[0]` meets every prefix deadline too. Every step is
//! checked against the task-order running sum of the whole assignment, the
//! same sum the evaluator recomputes, so the greedy variants never produce
//! invalid schedules. They may report infeasible instances the DP can
//! schedule.
//!
//! | Variant | Order | Step |
//! |---------|-------|------|
//! | [`PriorityFillScheduler`] | Priority, one pass | Deepest fitting stage |
//! | [`HeuristicSweepScheduler`] | Priority, repeated sweeps | One stage, marginal heuristic |
//! | [`GlobalRankingScheduler`] | All (task, stage) by score | Jump to ranked stage |

mod fill;
mod ranking;
mod sweep;

pub use fill::PriorityFillScheduler;
pub use ranking::GlobalRankingScheduler;
pub use sweep::HeuristicSweepScheduler;

use tracing::{debug, trace};

use super::ScheduleOptions;
use crate::models::{DepthSchedule, Task};

/// Shared-deadline time budget over the current depth assignment.
///
/// Candidate totals are summed over `runtime_at(depth)` in task order,
/// the same quantity [`super::is_valid`] checks, so an accepted step never
/// drifts past the deadline through rounding.
#[derive(Debug, Clone)]
pub(super) struct Budget<'a> {
    tasks: &'a [Task],
    deadline: f64,
    depths: Vec<usize>,
    used: f64,
}

impl<'a> Budget<'a> {
    /// Starts every task at its mandatory stage; `None` if that does not fit.
    pub(super) fn for_tasks(tasks: &'a [Task]) -> Option<Self> {
        let deadline = tasks.first().map(|t| t.deadline).unwrap_or(0.0);
        let mut budget = Self {
            tasks,
            deadline,
            depths: vec![0; tasks.len()],
            used: 0.0,
        };
        budget.used = budget.total_with(None);
        (budget.used <= deadline).then_some(budget)
    }

    /// Current depth of `task`.
    #[inline]
    pub(super) fn depth(&self, task: usize) -> usize {
        self.depths[task]
    }

    /// Whether moving `task` to `depth` keeps the total within the deadline.
    pub(super) fn fits(&self, task: usize, depth: usize) -> bool {
        self.total_with(Some((task, depth))) <= self.deadline
    }

    /// Moves `task` to `depth` if the result fits; reports whether it did.
    pub(super) fn try_deepen(&mut self, task: usize, depth: usize) -> bool {
        let total = self.total_with(Some((task, depth)));
        if total > self.deadline {
            return false;
        }
        self.depths[task] = depth;
        self.used = total;
        true
    }

    #[inline]
    pub(super) fn used(&self) -> f64 {
        self.used
    }

    #[inline]
    pub(super) fn depths(&self) -> &[usize] {
        &self.depths
    }

    pub(super) fn into_schedule(self) -> DepthSchedule {
        DepthSchedule::new(self.depths)
    }

    fn total_with(&self, change: Option<(usize, usize)>) -> f64 {
        let mut elapsed = 0.0;
        for (i, (task, &depth)) in self.tasks.iter().zip(&self.depths).enumerate() {
            let depth = match change {
                Some((changed, to)) if changed == i => to,
                _ => depth,
            };
            elapsed += task.runtime_at(depth);
        }
        elapsed
    }
}

/// Benefit per unit time: `precision * priority / time`.
///
/// Zero-time refinements score `+inf`.
#[inline]
pub(super) fn heuristic(precision: f64, priority: f64, time: f64) -> f64 {
    if time <= 0.0 {
        f64::INFINITY
    } else {
        precision * priority / time
    }
}

pub(super) fn log_result(name: &str, budget: &Budget<'_>, options: &ScheduleOptions) {
    if options.verbose {
        debug!(
            scheduler = name,
            depths = ?budget.depths(),
            used = budget.used(),
            deadline = budget.deadline,
            "greedy schedule found"
        );
    } else {
        trace!(scheduler = name, depths = ?budget.depths(), used = budget.used(), "greedy schedule found");
    }
}

pub(super) fn log_infeasible(name: &str, tasks: &[Task], options: &ScheduleOptions) {
    let mandatory: f64 = tasks.iter().map(Task::mandatory_runtime).sum();
    if options.verbose {
        debug!(scheduler = name, mandatory, "mandatory stages exceed the shared deadline");
    } else {
        trace!(scheduler = name, mandatory, "mandatory stages exceed the shared deadline");
    }
}
