//! Dynamic-programming depth scheduler.
//!
//! # Algorithm
//!
//! Rewards are quantized to integer levels `r = floor(reward / delta)`.
//! Two tables are filled task by task in deadline order:
//!
//! - `S[i][r]`: the depth of task `i` that lets tasks `0..=i` reach level
//!   exactly `r` in minimum total time,
//! - `P[i][r]`: that minimum time.
//!
//! Row 0 keeps, per level, the fastest stage of task 0 reaching it. Row
//! `i > 0` combines each stage `l` of task `i` with row `i - 1` at level
//! `r - level[i][l]`. A cell is kept only if its time meets `deadline[i]`,
//! so every surviving cell describes a prefix-feasible schedule. The best
//! level in the last row is then backtracked into depths.
//!
//! # Complexity
//! Time O(N · W · L), space O(N · W), with `W = Rmax · N + 1` levels and
//! `L` the largest stage count. Coarser `delta` shrinks `W`.
//!
//! # Reference
//! Yao et al. (2020), "Scheduling Real-time Deep Learning Services as
//! Imprecise Computations", Sec. IV

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::{check_preconditions, DepthScheduler, ScheduleOptions};
use crate::error::SchedulingError;
use crate::models::{quantize, DepthSchedule, RewardModel, ScheduleOutcome, Task};
use crate::validation::{ValidationError, ValidationErrorKind};

/// Default cap on DP table cells.
pub const DEFAULT_MAX_TABLE_CELLS: u64 = 50_000_000;

/// Configuration for [`DynamicScheduler`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicConfig {
    /// Quantization step for rewards. Must be positive.
    pub delta: f64,
    /// How precision and priority combine into reward.
    pub reward_model: RewardModel,
    /// Largest table (tasks × levels) a call may allocate.
    pub max_table_cells: u64,
}

impl Default for DynamicConfig {
    fn default() -> Self {
        Self {
            delta: 0.01,
            reward_model: RewardModel::PrecisionTimesPriority,
            max_table_cells: DEFAULT_MAX_TABLE_CELLS,
        }
    }
}

impl DynamicConfig {
    /// Sets the quantization step.
    pub fn with_delta(mut self, delta: f64) -> Self {
        self.delta = delta;
        self
    }

    /// Sets the reward model.
    pub fn with_reward_model(mut self, reward_model: RewardModel) -> Self {
        self.reward_model = reward_model;
        self
    }

    /// Sets the table size limit.
    pub fn with_max_table_cells(mut self, max_table_cells: u64) -> Self {
        self.max_table_cells = max_table_cells;
        self
    }
}

/// Exact depth scheduler (up to the resolution of `delta`).
///
/// # Example
///
/// ```
/// use u_imprecise::models::Task;
/// use u_imprecise::scheduler::{DepthScheduler, DynamicConfig, DynamicScheduler, ScheduleOptions};
///
/// let tasks = vec![
///     Task::new("a").with_priority(1.0).with_deadline(3.0)
///         .with_stage(1.0, 0.25).with_stage(3.0, 0.5),
///     Task::new("b").with_priority(1.0).with_deadline(4.0)
///         .with_stage(1.0, 0.25).with_stage(2.0, 0.75),
/// ];
/// let scheduler = DynamicScheduler::new(DynamicConfig::default().with_delta(0.25));
/// let outcome = scheduler.schedule(&tasks, &ScheduleOptions::default()).unwrap();
/// assert_eq!(outcome.schedule().unwrap().depths(), &[0, 1]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DynamicScheduler {
    config: DynamicConfig,
}

impl DynamicScheduler {
    /// Creates a scheduler with the given configuration.
    pub fn new(config: DynamicConfig) -> Self {
        Self { config }
    }

    /// The configuration.
    pub fn config(&self) -> &DynamicConfig {
        &self.config
    }

    /// Solves the instance, returning the full solution detail.
    ///
    /// `Ok(None)` means no depth assignment meets the deadlines.
    pub fn solve(&self, tasks: &[Task]) -> Result<Option<DynamicSolution>, SchedulingError> {
        let delta = self.config.delta;
        if !delta.is_finite() || delta <= 0.0 {
            return Err(SchedulingError::InvalidDelta(delta));
        }
        check_preconditions(tasks)?;

        QuantizedProblem::from_tasks(tasks, delta, self.config.reward_model)
            .solve(self.config.max_table_cells)
    }
}

impl DepthScheduler for DynamicScheduler {
    fn name(&self) -> &'static str {
        "DP"
    }

    fn schedule(
        &self,
        tasks: &[Task],
        options: &ScheduleOptions,
    ) -> Result<ScheduleOutcome, SchedulingError> {
        let solution = self.solve(tasks)?;

        match &solution {
            Some(s) if options.verbose => debug!(
                depths = ?s.schedule.depths(),
                levels = ?s.levels,
                cumulative = ?s.cumulative_runtimes,
                optimal_level = s.optimal_level,
                reward = s.quantized_reward(),
                "dp schedule found"
            ),
            Some(s) => trace!(depths = ?s.schedule.depths(), optimal_level = s.optimal_level, "dp schedule found"),
            None if options.verbose => debug!(tasks = tasks.len(), "no viable schedule"),
            None => trace!(tasks = tasks.len(), "no viable schedule"),
        }

        Ok(match solution {
            Some(s) => ScheduleOutcome::Scheduled(s.schedule),
            None => ScheduleOutcome::Infeasible,
        })
    }

    fn description(&self) -> &'static str {
        "Quantized-reward dynamic programming (Yao)"
    }
}

/// Optimal schedule found by the DP, with its reward accounting.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicSolution {
    /// Chosen depth per task.
    pub schedule: DepthSchedule,
    /// Highest feasible total reward level.
    pub optimal_level: u64,
    /// Reward level contributed by each task at its depth.
    pub levels: Vec<u64>,
    /// Running runtime through each task.
    pub cumulative_runtimes: Vec<f64>,
    /// Quantization step the levels are expressed in.
    pub delta: f64,
}

impl DynamicSolution {
    /// Optimal level expressed in reward units (`level × delta`).
    pub fn quantized_reward(&self) -> f64 {
        self.optimal_level as f64 * self.delta
    }
}

/// A DP instance over integer reward levels.
///
/// Normally built from tasks with [`QuantizedProblem::from_tasks`]. Callers
/// whose rewards are already integral can build it directly with
/// [`QuantizedProblem::new`].
#[derive(Debug, Clone)]
pub struct QuantizedProblem {
    levels: Vec<Vec<u64>>,
    runtimes: Vec<Vec<f64>>,
    deadlines: Vec<f64>,
    delta: f64,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    depth: usize,
    time: f64,
}

/// `S` and `P` in one arena: row-major `tasks × width`, `None` = infeasible.
struct RewardTable {
    width: usize,
    cells: Vec<Option<Entry>>,
}

impl RewardTable {
    fn new(rows: usize, width: usize) -> Self {
        Self {
            width,
            cells: vec![None; rows * width],
        }
    }

    #[inline]
    fn get(&self, task: usize, level: usize) -> Option<Entry> {
        self.cells[task * self.width + level]
    }

    #[inline]
    fn set(&mut self, task: usize, level: usize, entry: Entry) {
        self.cells[task * self.width + level] = Some(entry);
    }
}

impl QuantizedProblem {
    /// Builds an instance from pre-quantized levels (delta = 1).
    ///
    /// `levels[i]` and `runtimes[i]` are per-stage cumulative values of task
    /// `i`; `deadlines` must be weakly increasing.
    pub fn new(
        levels: Vec<Vec<u64>>,
        runtimes: Vec<Vec<f64>>,
        deadlines: Vec<f64>,
    ) -> Result<Self, SchedulingError> {
        let mut errors = Vec::new();
        if levels.len() != runtimes.len() || levels.len() != deadlines.len() {
            errors.push(ValidationError::new(
                ValidationErrorKind::LengthMismatch,
                format!(
                    "{} level rows, {} runtime rows, {} deadlines",
                    levels.len(),
                    runtimes.len(),
                    deadlines.len()
                ),
            ));
        }
        for (i, (l, t)) in levels.iter().zip(&runtimes).enumerate() {
            if l.is_empty() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::EmptyTask,
                    format!("Task #{i} has no stages"),
                ));
            } else if l.len() != t.len() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::LengthMismatch,
                    format!("Task #{i} has {} levels but {} runtimes", l.len(), t.len()),
                ));
            }
        }
        if deadlines.windows(2).any(|w| w[1] < w[0]) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DeadlineOrder,
                "deadlines are not weakly increasing",
            ));
        }
        if !errors.is_empty() {
            return Err(SchedulingError::InvalidInput(errors));
        }

        Ok(Self {
            levels,
            runtimes,
            deadlines,
            delta: 1.0,
        })
    }

    /// Quantizes validated tasks.
    pub fn from_tasks(tasks: &[Task], delta: f64, model: RewardModel) -> Self {
        let levels = tasks
            .iter()
            .map(|task| {
                task.stages
                    .iter()
                    .map(|stage| quantize(model.reward(stage.precision, task.priority), delta))
                    .collect()
            })
            .collect();
        let runtimes = tasks
            .iter()
            .map(|task| task.stages.iter().map(|s| s.runtime).collect())
            .collect();
        let deadlines = tasks.iter().map(|t| t.deadline).collect();

        Self {
            levels,
            runtimes,
            deadlines,
            delta,
        }
    }

    /// Number of tasks.
    pub fn task_count(&self) -> usize {
        self.levels.len()
    }

    /// Largest single-task level (`Rmax`).
    pub fn max_level(&self) -> u64 {
        self.levels
            .iter()
            .flat_map(|row| row.iter().copied())
            .max()
            .unwrap_or(0)
    }

    /// Cells the tables need: `N × (Rmax · N + 1)`, saturating at `u128::MAX`.
    pub fn table_cells(&self) -> u128 {
        let n = self.task_count() as u128;
        u128::from(self.max_level())
            .checked_mul(n)
            .and_then(|levels| levels.checked_add(1))
            .and_then(|width| width.checked_mul(n))
            .unwrap_or(u128::MAX)
    }

    /// Runs table construction and backtracking.
    ///
    /// Fails with [`SchedulingError::TableTooLarge`] before allocating when
    /// the tables would exceed `max_table_cells`. `Ok(None)` means the
    /// instance is infeasible.
    pub fn solve(&self, max_table_cells: u64) -> Result<Option<DynamicSolution>, SchedulingError> {
        let n = self.task_count();
        if n == 0 {
            return Ok(Some(DynamicSolution {
                schedule: DepthSchedule::default(),
                optimal_level: 0,
                levels: Vec::new(),
                cumulative_runtimes: Vec::new(),
                delta: self.delta,
            }));
        }

        let cells = self.table_cells();
        let too_large = SchedulingError::TableTooLarge {
            cells,
            limit: max_table_cells,
        };
        if cells > u128::from(max_table_cells) {
            return Err(too_large);
        }
        let width = usize::try_from(cells).map_err(|_| too_large)? / n;
        let table = self.build_table(width);

        let last = n - 1;
        let Some(optimal) = (0..width).rev().find(|&r| table.get(last, r).is_some()) else {
            return Ok(None);
        };
        let depths = self.backtrack(&table, optimal);

        let levels: Vec<u64> = depths
            .iter()
            .enumerate()
            .map(|(i, &d)| self.levels[i][d])
            .collect();
        let mut elapsed = 0.0;
        let cumulative_runtimes = depths
            .iter()
            .enumerate()
            .map(|(i, &d)| {
                elapsed += self.runtimes[i][d];
                elapsed
            })
            .collect();

        Ok(Some(DynamicSolution {
            schedule: DepthSchedule::new(depths),
            optimal_level: optimal as u64,
            levels,
            cumulative_runtimes,
            delta: self.delta,
        }))
    }

    fn build_table(&self, width: usize) -> RewardTable {
        let n = self.task_count();
        let mut table = RewardTable::new(n, width);

        // Row 0: fastest stage per level; first stage wins ties.
        let mut best: Vec<Option<Entry>> = vec![None; width];
        for (depth, (&level, &time)) in self.levels[0].iter().zip(&self.runtimes[0]).enumerate() {
            let slot = &mut best[level as usize];
            if slot.map_or(true, |e| time < e.time) {
                *slot = Some(Entry { depth, time });
            }
        }
        for (r, entry) in best.into_iter().enumerate() {
            if let Some(entry) = entry.filter(|e| e.time <= self.deadlines[0]) {
                table.set(0, r, entry);
            }
        }

        for i in 1..n {
            for r in 0..width {
                let mut winner: Option<Entry> = None;
                for (depth, (&level, &time)) in
                    self.levels[i].iter().zip(&self.runtimes[i]).enumerate()
                {
                    let Some(rest) = r.checked_sub(level as usize) else {
                        continue;
                    };
                    let Some(prev) = table.get(i - 1, rest) else {
                        continue;
                    };
                    let total = time + prev.time;
                    if winner.map_or(true, |w| total < w.time) {
                        winner = Some(Entry { depth, time: total });
                    }
                }
                if let Some(entry) = winner.filter(|e| e.time <= self.deadlines[i]) {
                    table.set(i, r, entry);
                }
            }
        }

        table
    }

    fn backtrack(&self, table: &RewardTable, optimal: usize) -> Vec<usize> {
        let n = self.task_count();
        let mut depths = vec![0; n];
        let mut target = optimal;

        for i in (0..n).rev() {
            let Some(entry) = table.get(i, target) else {
                panic!("reward table has no entry for task {i} at level {target} while backtracking level {optimal}");
            };
            depths[i] = entry.depth;
            target -= self.levels[i][entry.depth] as usize;
        }

        assert_eq!(
            target, 0,
            "backtracked levels do not sum to the optimal level {optimal}"
        );
        depths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Three tasks, integer rewards, deadlines that do not bind at the optimum.
    fn worked_problem() -> QuantizedProblem {
        QuantizedProblem::new(
            vec![vec![12, 15, 16, 17, 17], vec![2, 6, 6], vec![3, 3, 4, 6]],
            vec![
                vec![2.0, 3.0, 5.0, 7.0, 9.0],
                vec![3.0, 4.0, 7.0],
                vec![1.0, 9.0, 9.0, 12.0],
            ],
            vec![18.0, 19.0, 23.0],
        )
        .unwrap()
    }

    /// The worked problem with precision = level / 32, priority 1.
    fn worked_tasks() -> Vec<Task> {
        let precisions: [&[f64]; 3] = [&[12.0, 15.0, 16.0, 17.0, 17.0], &[2.0, 6.0, 6.0], &[3.0, 3.0, 4.0, 6.0]];
        let runtimes: [&[f64]; 3] = [&[2.0, 3.0, 5.0, 7.0, 9.0], &[3.0, 4.0, 7.0], &[1.0, 9.0, 9.0, 12.0]];
        let deadlines = [18.0, 19.0, 23.0];
        (0..3)
            .map(|i| {
                let scaled: Vec<f64> = precisions[i].iter().map(|p| p / 32.0).collect();
                Task::from_profiles(format!("T{i}"), runtimes[i], &scaled)
                    .unwrap()
                    .with_priority(1.0)
                    .with_deadline(deadlines[i])
            })
            .collect()
    }

    #[test]
    fn test_worked_scenario() {
        let solution = worked_problem().solve(DEFAULT_MAX_TABLE_CELLS).unwrap().unwrap();
        assert_eq!(solution.schedule.depths(), &[3, 1, 3]);
        assert_eq!(solution.levels, vec![17, 6, 6]);
        assert_eq!(solution.cumulative_runtimes, vec![7.0, 11.0, 23.0]);
        assert_eq!(solution.optimal_level, 29);
    }

    #[test]
    fn test_worked_scenario_through_tasks() {
        let scheduler = DynamicScheduler::new(DynamicConfig::default().with_delta(1.0 / 32.0));
        let solution = scheduler.solve(&worked_tasks()).unwrap().unwrap();
        assert_eq!(solution.schedule.depths(), &[3, 1, 3]);
        assert_eq!(solution.optimal_level, 29);
        assert!((solution.quantized_reward() - 29.0 / 32.0).abs() < 1e-10);
    }

    #[test]
    fn test_dominated_stage_not_selected() {
        // Depth 4 of task 0 has the same level as depth 3 but costs more.
        let solution = worked_problem().solve(DEFAULT_MAX_TABLE_CELLS).unwrap().unwrap();
        assert_eq!(solution.schedule.depth(0), Some(3));
    }

    #[test]
    fn test_binding_deadlines() {
        let tasks = vec![
            Task::new("a")
                .with_priority(1.0)
                .with_deadline(3.0)
                .with_stage(1.0, 0.25)
                .with_stage(3.0, 0.5),
            Task::new("b")
                .with_priority(1.0)
                .with_deadline(4.0)
                .with_stage(1.0, 0.25)
                .with_stage(2.0, 0.75),
        ];
        let scheduler = DynamicScheduler::new(DynamicConfig::default().with_delta(0.25));
        let solution = scheduler.solve(&tasks).unwrap().unwrap();
        // Refining both needs 5 > 4; refining b earns more than refining a.
        assert_eq!(solution.schedule.depths(), &[0, 1]);
        assert_eq!(solution.optimal_level, 4);
        assert_eq!(solution.cumulative_runtimes, vec![1.0, 3.0]);
    }

    #[test]
    fn test_infeasible_mandatory() {
        let tasks = vec![
            Task::new("a")
                .with_priority(0.5)
                .with_deadline(2.0)
                .with_stage(2.0, 0.1),
            Task::new("b")
                .with_priority(0.5)
                .with_deadline(3.0)
                .with_stage(2.0, 0.1),
        ];
        let outcome = DynamicScheduler::default()
            .schedule(&tasks, &ScheduleOptions::default())
            .unwrap();
        assert_eq!(outcome, ScheduleOutcome::Infeasible);
    }

    #[test]
    fn test_first_task_deadline_binds() {
        // Task a alone can only run its mandatory stage.
        let tasks = vec![
            Task::new("a")
                .with_priority(1.0)
                .with_deadline(1.0)
                .with_stage(1.0, 0.25)
                .with_stage(2.0, 0.5),
            Task::new("b")
                .with_priority(1.0)
                .with_deadline(10.0)
                .with_stage(1.0, 0.25),
        ];
        let scheduler = DynamicScheduler::new(DynamicConfig::default().with_delta(0.25));
        let outcome = scheduler.schedule(&tasks, &ScheduleOptions::default()).unwrap();
        assert_eq!(outcome.schedule().unwrap().depths(), &[0, 0]);
    }

    #[test]
    fn test_reward_model_changes_choice() {
        let tasks = vec![
            Task::new("important")
                .with_priority(1.0)
                .with_deadline(3.0)
                .with_stage(1.0, 0.25)
                .with_stage(2.0, 0.5),
            Task::new("minor")
                .with_priority(0.25)
                .with_deadline(3.0)
                .with_stage(1.0, 0.25)
                .with_stage(2.0, 0.75),
        ];
        let weighted = DynamicScheduler::new(DynamicConfig::default().with_delta(0.0625));
        let plain = DynamicScheduler::new(
            DynamicConfig::default()
                .with_delta(0.0625)
                .with_reward_model(RewardModel::PrecisionOnly),
        );
        let options = ScheduleOptions::default();

        let a = weighted.schedule(&tasks, &options).unwrap();
        let b = plain.schedule(&tasks, &options).unwrap();
        assert_eq!(a.schedule().unwrap().depths(), &[1, 0]);
        assert_eq!(b.schedule().unwrap().depths(), &[0, 1]);
    }

    #[test]
    fn test_verbose_does_not_change_result() {
        let scheduler = DynamicScheduler::new(DynamicConfig::default().with_delta(1.0 / 32.0));
        let tasks = worked_tasks();
        let quiet = scheduler.schedule(&tasks, &ScheduleOptions::default()).unwrap();
        let loud = scheduler.schedule(&tasks, &ScheduleOptions::verbose()).unwrap();
        assert_eq!(quiet, loud);
    }

    #[test]
    fn test_invalid_delta() {
        for delta in [0.0, -0.5, f64::NAN, f64::INFINITY] {
            let scheduler = DynamicScheduler::new(DynamicConfig::default().with_delta(delta));
            let err = scheduler.solve(&worked_tasks()).unwrap_err();
            assert!(matches!(err, SchedulingError::InvalidDelta(_)));
        }
    }

    #[test]
    fn test_table_too_large() {
        let scheduler = DynamicScheduler::new(
            DynamicConfig::default()
                .with_delta(1.0 / 32.0)
                .with_max_table_cells(100),
        );
        // 3 × (17 · 3 + 1) = 156 cells
        let err = scheduler.solve(&worked_tasks()).unwrap_err();
        assert_eq!(
            err,
            SchedulingError::TableTooLarge {
                cells: 156,
                limit: 100
            }
        );
    }

    #[test]
    fn test_quantized_problem_shape_errors() {
        let err = QuantizedProblem::new(vec![vec![1, 2]], vec![vec![1.0]], vec![5.0]).unwrap_err();
        assert!(matches!(err, SchedulingError::InvalidInput(_)));

        let err = QuantizedProblem::new(
            vec![vec![1], vec![1]],
            vec![vec![1.0], vec![1.0]],
            vec![5.0, 4.0],
        )
        .unwrap_err();
        let SchedulingError::InvalidInput(errors) = err else {
            panic!("expected invalid input");
        };
        assert_eq!(errors[0].kind, ValidationErrorKind::DeadlineOrder);
    }

    #[test]
    fn test_zero_reward_instance() {
        let tasks = vec![Task::new("a")
            .with_priority(0.0)
            .with_deadline(5.0)
            .with_stage(1.0, 0.2)
            .with_stage(2.0, 0.4)];
        let solution = DynamicScheduler::default().solve(&tasks).unwrap().unwrap();
        // Every depth is level 0; the fastest one wins.
        assert_eq!(solution.schedule.depths(), &[0]);
        assert_eq!(solution.optimal_level, 0);
    }

    #[test]
    fn test_quantized_problem_respects_cell_limit() {
        let problem = worked_problem();
        // 3 × (17 · 3 + 1) = 156 cells
        assert_eq!(problem.table_cells(), 156);
        assert!(problem.solve(156).unwrap().is_some());
        assert_eq!(
            problem.solve(155).unwrap_err(),
            SchedulingError::TableTooLarge {
                cells: 156,
                limit: 155
            }
        );
    }

    #[test]
    fn test_huge_levels_fail_without_allocating() {
        let problem = QuantizedProblem::new(
            vec![vec![u64::MAX / 2]; 2],
            vec![vec![1.0]; 2],
            vec![5.0, 5.0],
        )
        .unwrap();
        let err = problem.solve(u64::MAX).unwrap_err();
        assert!(matches!(err, SchedulingError::TableTooLarge { limit: u64::MAX, .. }));

        let problem = QuantizedProblem::new(vec![vec![u64::MAX]; 3], vec![vec![1.0]; 3], vec![5.0; 3]).unwrap();
        assert!(problem.solve(DEFAULT_MAX_TABLE_CELLS).is_err());
    }

    #[test]
    fn test_config_from_json() {
        let config: DynamicConfig =
            serde_json::from_str(r#"{"delta": 0.05, "reward_model": "precision_only"}"#).unwrap();
        assert!((config.delta - 0.05).abs() < 1e-12);
        assert_eq!(config.reward_model, RewardModel::PrecisionOnly);
        assert_eq!(config.max_table_cells, DEFAULT_MAX_TABLE_CELLS);
    }
}
