//! Global heuristic ranking.
//!
//! # Algorithm
//!
//! 1. Score every (task, stage) pair once with the cumulative heuristic
//!    `precision · priority / runtime`.
//! 2. Sort all pairs by score, best first (stable: ties keep task-major order).
//! 3. Scan once. A pair is taken if it deepens its task beyond the depth
//!    already committed and the extra runtime fits; the task then jumps
//!    straight to that depth.
//!
//! # Complexity
//! O(S log S + S · N) with `S` the total number of stages.

use super::{heuristic, log_infeasible, log_result, Budget};
use crate::error::SchedulingError;
use crate::models::{ScheduleOutcome, Task};
use crate::scheduler::{check_preconditions, DepthScheduler, ScheduleOptions};

/// Greedy scheduler driven by one global ranking of all stages.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalRankingScheduler;

impl GlobalRankingScheduler {
    /// Creates the scheduler.
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    task: usize,
    depth: usize,
    score: f64,
}

fn rank(tasks: &[Task]) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = tasks
        .iter()
        .enumerate()
        .flat_map(|(task, t)| {
            t.stages.iter().enumerate().map(move |(depth, stage)| Candidate {
                task,
                depth,
                score: heuristic(stage.precision, t.priority, stage.runtime),
            })
        })
        .collect();
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    candidates
}

impl DepthScheduler for GlobalRankingScheduler {
    fn name(&self) -> &'static str {
        "GREEDY-RANK"
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

        for candidate in rank(tasks) {
            if candidate.depth > budget.depth(candidate.task) {
                budget.try_deepen(candidate.task, candidate.depth);
            }
        }

        log_result(self.name(), &budget, options);
        let schedule = budget.into_schedule();
        Ok(ScheduleOutcome::Scheduled(schedule))
    }

    fn description(&self) -> &'static str {
        "Global precision-per-time ranking"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_task(id: &str, priority: f64, deadline: f64, stages: &[(f64, f64)]) -> Task {
        stages.iter().fold(
            Task::new(id).with_priority(priority).with_deadline(deadline),
            |task, &(runtime, precision)| task.with_stage(runtime, precision),
        )
    }

    fn run(tasks: &[Task]) -> ScheduleOutcome {
        GlobalRankingScheduler::new()
            .schedule(tasks, &ScheduleOptions::default())
            .unwrap()
    }

    #[test]
    fn test_rank_order() {
        let tasks = vec![
            make_task("a", 1.0, 10.0, &[(1.0, 0.1), (2.0, 0.6)]),
            make_task("b", 0.5, 10.0, &[(1.0, 0.4)]),
        ];
        let ranked: Vec<(usize, usize)> = rank(&tasks).iter().map(|c| (c.task, c.depth)).collect();
        // scores: a0 0.1, a1 0.3, b0 0.2
        assert_eq!(ranked, vec![(0, 1), (1, 0), (0, 0)]);
    }

    #[test]
    fn test_rank_ties_keep_task_major_order() {
        let tasks = vec![
            make_task("a", 1.0, 10.0, &[(1.0, 0.2), (2.0, 0.4)]),
            make_task("b", 1.0, 10.0, &[(1.0, 0.2)]),
        ];
        let ranked: Vec<(usize, usize)> = rank(&tasks).iter().map(|c| (c.task, c.depth)).collect();
        assert_eq!(ranked, vec![(0, 0), (0, 1), (1, 0)]);
    }

    #[test]
    fn test_jumps_to_ranked_depth() {
        let tasks = vec![
            make_task("a", 1.0, 6.0, &[(1.0, 0.1), (2.0, 0.2), (4.0, 0.9)]),
            make_task("b", 1.0, 6.0, &[(1.0, 0.1), (2.0, 0.3)]),
        ];
        // a2 (0.225) ranks first: +3 fits (used 5); b1 (0.15): +1 fits (used 6)
        assert_eq!(run(&tasks).schedule().unwrap().depths(), &[2, 1]);
    }

    #[test]
    fn test_shallower_candidate_after_deeper_is_skipped() {
        let tasks = vec![make_task("a", 1.0, 10.0, &[(1.0, 0.1), (2.0, 0.2), (3.0, 0.9)])];
        // a2 (0.3) taken first; a1 (0.1) is not a strict advance
        assert_eq!(run(&tasks).schedule().unwrap().depths(), &[2]);
    }

    #[test]
    fn test_candidate_that_does_not_fit_is_skipped() {
        let tasks = vec![
            make_task("a", 1.0, 4.0, &[(1.0, 0.1), (5.0, 0.9)]),
            make_task("b", 0.5, 4.0, &[(1.0, 0.1), (2.0, 0.3)]),
        ];
        // a1 needs +4 with 2 units of slack; b1 needs +1
        assert_eq!(run(&tasks).schedule().unwrap().depths(), &[0, 1]);
    }

    #[test]
    fn test_infeasible() {
        let tasks = vec![make_task("a", 0.5, 0.5, &[(1.0, 0.1)])];
        assert_eq!(run(&tasks), ScheduleOutcome::Infeasible);
    }
}
