//! Scheduler comparison over random scenarios.
//!
//! Runs each configured scheduler on the same seeded scenarios and
//! aggregates both evaluation metrics per scheduler.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::generator::{generate_scenario, ScenarioConfig};
use crate::error::SchedulingError;
use crate::models::ScheduleOutcome;
use crate::scheduler::{DepthScheduler, ScheduleMetrics, ScheduleOptions, SchedulerKind};

/// What to compare, and on what.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    /// Number of generated scenarios.
    pub trials: usize,
    /// RNG seed; equal seeds give equal reports.
    pub seed: u64,
    /// Scenario shape.
    pub scenario: ScenarioConfig,
    /// Schedulers to run on every scenario.
    pub schedulers: Vec<SchedulerKind>,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            trials: 100,
            seed: 134_156,
            scenario: ScenarioConfig::default(),
            schedulers: SchedulerKind::all(0.01),
        }
    }
}

impl ComparisonConfig {
    /// Sets the number of trials.
    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    /// Sets the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the scenario shape.
    pub fn with_scenario(mut self, scenario: ScenarioConfig) -> Self {
        self.scenario = scenario;
        self
    }

    /// Sets the schedulers.
    pub fn with_schedulers(mut self, schedulers: Vec<SchedulerKind>) -> Self {
        self.schedulers = schedulers;
        self
    }
}

/// Aggregated results of one scheduler.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SchedulerSummary {
    /// Scheduler name.
    pub name: String,
    /// Scenarios run.
    pub trials: usize,
    /// Scenarios with a valid schedule.
    pub scheduled: usize,
    /// Scenarios reported infeasible.
    pub infeasible: usize,
    /// Scenarios whose schedule failed validation.
    pub invalid: usize,
    /// Mean weighted-sum metric over valid schedules.
    pub mean_weighted_sum: f64,
    /// Mean max-priority precision over valid schedules.
    pub mean_max_priority: f64,
}

/// Result of a comparison run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComparisonReport {
    /// One summary per scheduler, in configuration order.
    pub summaries: Vec<SchedulerSummary>,
    /// Task count of each generated scenario.
    pub task_counts: Vec<usize>,
}

impl ComparisonReport {
    /// Summary of the scheduler called `name`.
    pub fn summary(&self, name: &str) -> Option<&SchedulerSummary> {
        self.summaries.iter().find(|s| s.name == name)
    }
}

#[derive(Default)]
struct Tally {
    scheduled: usize,
    infeasible: usize,
    invalid: usize,
    weighted_sum: f64,
    max_priority: f64,
}

/// Runs the comparison described by `config`.
///
/// # Example
/// ```
/// use u_imprecise::simulation::{compare, ComparisonConfig, ScenarioConfig};
///
/// let config = ComparisonConfig::default()
///     .with_trials(3)
///     .with_scenario(ScenarioConfig::default().with_task_range(2, 5));
/// let report = compare(&config).unwrap();
/// assert_eq!(report.summary("DP").unwrap().trials, 3);
/// ```
pub fn compare(config: &ComparisonConfig) -> Result<ComparisonReport, SchedulingError> {
    let schedulers: Vec<Box<dyn DepthScheduler>> =
        config.schedulers.iter().map(SchedulerKind::build).collect();
    let mut rng = StdRng::seed_from_u64(config.seed);
    compare_with(&schedulers, &config.scenario, config.trials, &mut rng)
}

/// Runs `schedulers` on `trials` scenarios drawn from `rng`.
pub fn compare_with<R: Rng>(
    schedulers: &[Box<dyn DepthScheduler>],
    scenario: &ScenarioConfig,
    trials: usize,
    rng: &mut R,
) -> Result<ComparisonReport, SchedulingError> {
    let options = ScheduleOptions::default();
    let mut tallies: Vec<Tally> = schedulers.iter().map(|_| Tally::default()).collect();
    let mut task_counts = Vec::with_capacity(trials);

    for trial in 0..trials {
        let tasks = generate_scenario(scenario, rng)?;
        task_counts.push(tasks.len());

        for (scheduler, tally) in schedulers.iter().zip(&mut tallies) {
            match scheduler.schedule(&tasks, &options)? {
                ScheduleOutcome::Infeasible => tally.infeasible += 1,
                ScheduleOutcome::Scheduled(schedule) => {
                    match ScheduleMetrics::calculate(&schedule, &tasks) {
                        Some(metrics) => {
                            tally.scheduled += 1;
                            tally.weighted_sum += metrics.weighted_sum;
                            tally.max_priority += metrics.max_priority_precision;
                            debug!(
                                trial,
                                scheduler = scheduler.name(),
                                tasks = tasks.len(),
                                weighted_sum = metrics.weighted_sum,
                                "trial scored"
                            );
                        }
                        None => {
                            tally.invalid += 1;
                            warn!(trial, scheduler = scheduler.name(), "schedule failed validation");
                        }
                    }
                }
            }
        }
    }

    let summaries = schedulers
        .iter()
        .zip(tallies)
        .map(|(scheduler, tally)| {
            let mean = |total: f64| {
                if tally.scheduled == 0 {
                    0.0
                } else {
                    total / tally.scheduled as f64
                }
            };
            let summary = SchedulerSummary {
                name: scheduler.name().to_string(),
                trials,
                scheduled: tally.scheduled,
                infeasible: tally.infeasible,
                invalid: tally.invalid,
                mean_weighted_sum: mean(tally.weighted_sum),
                mean_max_priority: mean(tally.max_priority),
            };
            info!(
                scheduler = %summary.name,
                scheduled = summary.scheduled,
                infeasible = summary.infeasible,
                invalid = summary.invalid,
                mean_weighted_sum = summary.mean_weighted_sum,
                mean_max_priority = summary.mean_max_priority,
                "comparison summary"
            );
            summary
        })
        .collect();

    Ok(ComparisonReport {
        summaries,
        task_counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::PriorityDistribution;

    fn small_config() -> ComparisonConfig {
        ComparisonConfig::default()
            .with_trials(8)
            .with_seed(99)
            .with_scenario(ScenarioConfig::default().with_task_range(2, 8).with_stages(4))
    }

    #[test]
    fn test_every_scheduler_runs_every_trial() {
        let report = compare(&small_config()).unwrap();
        assert_eq!(report.summaries.len(), 4);
        assert_eq!(report.task_counts.len(), 8);
        for summary in &report.summaries {
            assert_eq!(summary.trials, 8);
            // Generated deadlines always cover the mandatory stages.
            assert_eq!(summary.scheduled, 8);
            assert_eq!(summary.infeasible, 0);
            assert_eq!(summary.invalid, 0);
            assert!(summary.mean_weighted_sum >= 0.0);
        }
    }

    #[test]
    fn test_greedy_valid_with_full_slack() {
        for slack in [1.0, 0.3] {
            let config = ComparisonConfig::default()
                .with_trials(300)
                .with_seed(2024)
                .with_scenario(ScenarioConfig::default().with_deadline_slack(slack))
                .with_schedulers(vec![
                    SchedulerKind::PriorityFill,
                    SchedulerKind::HeuristicSweep,
                    SchedulerKind::GlobalRanking,
                ]);
            let report = compare(&config).unwrap();
            for summary in &report.summaries {
                assert_eq!(summary.invalid, 0, "{} at slack {slack}", summary.name);
                assert_eq!(summary.scheduled, 300);
            }
        }
    }

    #[test]
    fn test_same_seed_same_report() {
        let a = compare(&small_config()).unwrap();
        let b = compare(&small_config()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_beta_priorities() {
        let config = small_config().with_scenario(
            ScenarioConfig::default()
                .with_task_range(2, 6)
                .with_priority(PriorityDistribution::bimodal()),
        );
        let report = compare(&config).unwrap();
        assert!(report.summary("GREEDY-RANK").is_some());
        assert!(report.summary("missing").is_none());
    }

    #[test]
    fn test_no_schedulers() {
        let report = compare(&small_config().with_schedulers(Vec::new())).unwrap();
        assert!(report.summaries.is_empty());
        assert_eq!(report.task_counts.len(), 8);
    }

    #[test]
    fn test_config_from_json() {
        let config: ComparisonConfig = serde_json::from_str(
            r#"{"trials": 5, "schedulers": [{"kind": "priority_fill"}]}"#,
        )
        .unwrap();
        assert_eq!(config.trials, 5);
        assert_eq!(config.seed, 134_156);
        assert_eq!(config.schedulers, vec![SchedulerKind::PriorityFill]);
    }
}
