//! Depth schedulers and schedule evaluation.
//!
//! Every algorithm implements [`DepthScheduler`]: given tasks ordered by
//! non-decreasing deadline, return a depth per task or
//! [`ScheduleOutcome::Infeasible`].
//!
//! # Algorithms
//!
//! | Scheduler | Kind | Deadline model |
//! |-----------|------|----------------|
//! | [`DynamicScheduler`] | Exact (up to `delta`) | Per-task cumulative |
//! | [`PriorityFillScheduler`] | Greedy | Shared (earliest) |
//! | [`HeuristicSweepScheduler`] | Greedy | Shared (earliest) |
//! | [`GlobalRankingScheduler`] | Greedy | Shared (earliest) |
//!
//! The greedy variants exist for comparison against the optimizer; they
//! treat the earliest deadline as a single bound on total runtime.
//!
//! # Evaluation
//!
//! [`is_valid`], [`weighted_sum_metric`] and [`max_priority_metric`] score a
//! schedule; metrics are `None` for schedules that miss a deadline.
//!
//! # References
//!
//! - Yao et al. (2020), "Scheduling Real-time Deep Learning Services as
//!   Imprecise Computations"
//! - Liu et al. (1991), "Algorithms for Scheduling Imprecise Computations"

mod dynamic;
mod greedy;
mod metrics;

pub use dynamic::{
    DynamicConfig, DynamicScheduler, DynamicSolution, QuantizedProblem, DEFAULT_MAX_TABLE_CELLS,
};
pub use greedy::{GlobalRankingScheduler, HeuristicSweepScheduler, PriorityFillScheduler};
pub use metrics::{is_valid, max_priority_metric, weighted_sum_metric, ScheduleMetrics};

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::error::SchedulingError;
use crate::models::{ScheduleOutcome, Task};
use crate::validation::validate_tasks;

/// Per-call scheduling options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleOptions {
    /// Emit the detailed trace at `debug` level instead of `trace`.
    #[serde(default)]
    pub verbose: bool,
}

impl ScheduleOptions {
    /// Options with verbose tracing on.
    pub fn verbose() -> Self {
        Self { verbose: true }
    }
}

/// The scheduling contract.
///
/// # Preconditions
/// `tasks` is ordered by non-decreasing deadline and passes
/// [`validate_tasks`]. Implementations check this and fail with
/// [`SchedulingError::InvalidInput`] instead of coercing.
///
/// # Postcondition
/// On `Scheduled(s)`, for every `i` the runtime of tasks `0..=i` at their
/// chosen depths does not exceed `tasks[i].deadline`.
///
/// Implementations hold no state between calls.
pub trait DepthScheduler: Send + Sync + Debug {
    /// Scheduler name (e.g., "DP", "GREEDY-FILL").
    fn name(&self) -> &'static str;

    /// Assigns a depth to every task.
    fn schedule(
        &self,
        tasks: &[Task],
        options: &ScheduleOptions,
    ) -> Result<ScheduleOutcome, SchedulingError>;

    /// Scheduler description.
    fn description(&self) -> &'static str {
        self.name()
    }
}

/// Runs the shared precondition checks.
pub(crate) fn check_preconditions(tasks: &[Task]) -> Result<(), SchedulingError> {
    validate_tasks(tasks).map_err(SchedulingError::InvalidInput)
}

/// Configurable scheduler selection.
///
/// Lets a configuration file name the schedulers to run, and gives a
/// comparison harness a homogeneous collection.
///
/// # Example
/// ```
/// use u_imprecise::scheduler::SchedulerKind;
///
/// let schedulers: Vec<_> = [
///     SchedulerKind::Dynamic { delta: 0.01 },
///     SchedulerKind::GlobalRanking,
/// ]
/// .iter()
/// .map(SchedulerKind::build)
/// .collect();
/// assert_eq!(schedulers[0].name(), "DP");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchedulerKind {
    /// [`DynamicScheduler`] with the given quantization step.
    Dynamic {
        /// Quantization step.
        delta: f64,
    },
    /// [`PriorityFillScheduler`].
    PriorityFill,
    /// [`HeuristicSweepScheduler`].
    HeuristicSweep,
    /// [`GlobalRankingScheduler`].
    GlobalRanking,
}

impl SchedulerKind {
    /// Every scheduler, DP at `delta`.
    pub fn all(delta: f64) -> Vec<Self> {
        vec![
            Self::Dynamic { delta },
            Self::PriorityFill,
            Self::HeuristicSweep,
            Self::GlobalRanking,
        ]
    }

    /// Constructs the scheduler.
    pub fn build(&self) -> Box<dyn DepthScheduler> {
        match *self {
            Self::Dynamic { delta } => {
                Box::new(DynamicScheduler::new(DynamicConfig::default().with_delta(delta)))
            }
            Self::PriorityFill => Box::new(PriorityFillScheduler::new()),
            Self::HeuristicSweep => Box::new(HeuristicSweepScheduler::new()),
            Self::GlobalRanking => Box::new(GlobalRankingScheduler::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_all() {
        let names: Vec<&str> = SchedulerKind::all(0.01)
            .iter()
            .map(|k| k.build().name())
            .collect();
        assert_eq!(
            names,
            vec!["DP", "GREEDY-FILL", "GREEDY-SWEEP", "GREEDY-RANK"]
        );
    }

    #[test]
    fn test_kind_from_json() {
        let kinds: Vec<SchedulerKind> = serde_json::from_str(
            r#"[{"kind": "dynamic", "delta": 0.05}, {"kind": "heuristic_sweep"}]"#,
        )
        .unwrap();
        assert_eq!(
            kinds,
            vec![
                SchedulerKind::Dynamic { delta: 0.05 },
                SchedulerKind::HeuristicSweep
            ]
        );
    }

    #[test]
    fn test_every_scheduler_rejects_unsorted_deadlines() {
        let tasks = vec![
            Task::new("late")
                .with_priority(0.5)
                .with_deadline(10.0)
                .with_stage(1.0, 0.1),
            Task::new("early")
                .with_priority(0.5)
                .with_deadline(5.0)
                .with_stage(1.0, 0.1),
        ];
        for kind in SchedulerKind::all(0.01) {
            let err = kind
                .build()
                .schedule(&tasks, &ScheduleOptions::default())
                .unwrap_err();
            assert!(matches!(err, SchedulingError::InvalidInput(_)));
        }
    }

    #[test]
    fn test_every_scheduler_accepts_empty_input() {
        for kind in SchedulerKind::all(0.01) {
            let outcome = kind
                .build()
                .schedule(&[], &ScheduleOptions::default())
                .unwrap();
            assert_eq!(outcome.schedule().map(|s| s.len()), Some(0));
        }
    }
}
