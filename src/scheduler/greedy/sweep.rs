//! Heuristic sweep.
//!
//! # Algorithm
//!
//! Tasks are visited in priority order in repeated sweeps. A task can
//! *advance* if it has a next stage and that stage's extra runtime fits.
//!
//! 1. A sweep starts at the highest-priority task that can advance. It
//!    always advances one stage; the marginal heuristic of that stage
//!    (`Δprecision · priority / Δtime`) becomes the sweep threshold.
//! 2. The sweep continues down the priority order. A task that can advance
//!    does so by one stage if its next stage scores at least the
//!    threshold; otherwise the sweep ends and a new one starts.
//! 3. Scheduling stops when no task can advance.
//!
//! Runtime only accumulates, so a task that cannot advance never can
//! again and the sweep head only moves forward. Every sweep advances at
//! least one stage, bounding the number of sweeps by the total stage count.
//!
//! # Complexity
//! O(N log N + S · N²) with `S` the total number of stages; each fit check
//! re-sums the assignment in task order.

use super::{heuristic, log_infeasible, log_result, Budget};
use crate::error::SchedulingError;
use crate::models::{ScheduleOutcome, Task};
use crate::ordering::priority_order;
use crate::scheduler::{check_preconditions, DepthScheduler, ScheduleOptions};

/// Greedy scheduler that deepens tasks one stage at a time in heuristic sweeps.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicSweepScheduler;

impl HeuristicSweepScheduler {
    /// Creates the scheduler.
    pub fn new() -> Self {
        Self
    }
}

struct Sweep<'a> {
    tasks: &'a [Task],
    budget: Budget<'a>,
}

impl Sweep<'_> {
    /// `task`'s next depth, if it has one and it fits.
    fn next_step(&self, task: usize) -> Option<usize> {
        let next = self.budget.depth(task) + 1;
        (next < self.tasks[task].stage_count() && self.budget.fits(task, next)).then_some(next)
    }

    fn next_score(&self, task: usize) -> f64 {
        let t = &self.tasks[task];
        let depth = self.budget.depth(task);
        heuristic(
            t.marginal_precision(depth, depth + 1),
            t.priority,
            t.marginal_runtime(depth, depth + 1),
        )
    }

    fn advance(&mut self, task: usize, depth: usize) {
        self.budget.try_deepen(task, depth);
    }
}

impl DepthScheduler for HeuristicSweepScheduler {
    fn name(&self) -> &'static str {
        "GREEDY-SWEEP"
    }

    fn schedule(
        &self,
        tasks: &[Task],
        options: &ScheduleOptions,
    ) -> Result<ScheduleOutcome, SchedulingError> {
        check_preconditions(tasks)?;

        let Some(budget) = Budget::for_tasks(tasks) else {
            log_infeasible(self.name(), tasks, options);
            return Ok(ScheduleOutcome::Infeasible);
        };

        let order = priority_order(tasks);
        let mut state = Sweep { tasks, budget };
        let mut head = 0;

        while head < order.len() {
            let Some(next) = state.next_step(order[head]) else {
                head += 1;
                continue;
            };

            let threshold = state.next_score(order[head]);
            state.advance(order[head], next);

            for &task in &order[head + 1..] {
                let Some(next) = state.next_step(task) else {
                    continue;
                };
                if state.next_score(task) < threshold {
                    break;
                }
                state.advance(task, next);
            }
        }

        log_result(self.name(), &state.budget, options);
        let schedule = state.budget.into_schedule();
        Ok(ScheduleOutcome::Scheduled(schedule))
    }

    fn description(&self) -> &'static str {
        "Marginal-heuristic priority sweeps"
    }
}
