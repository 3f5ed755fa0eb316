//! Random scenario generation.
//!
//! Draws task populations for comparing schedulers:
//!
//! - task count uniform in `[min_tasks, max_tasks]`,
//! - cumulative runtimes and precisions as sorted uniforms in `[0, 1)`
//!   (each stage draws between the previous value and 1),
//! - one shared deadline: mandatory total plus `deadline_slack` of the
//!   remaining worst-case runtime, so every scenario is feasible and
//!   the optional stages compete for the slack,
//! - priorities from a [`PriorityDistribution`], clipped to `[0, 1]`.

use rand::Rng;
use rand_distr::{Beta, Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::error::SchedulingError;
use crate::models::Task;

/// Largest precision a generated stage may reach.
const PRECISION_CEILING: f64 = 1.0 - f64::EPSILON;

/// Distribution of task priorities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PriorityDistribution {
    /// Uniform on `[0, 1)`.
    #[default]
    Uniform,
    /// Beta(alpha, beta).
    Beta {
        /// Shape α.
        alpha: f64,
        /// Shape β.
        beta: f64,
    },
    /// Normal(mean, std_dev) clipped to `[0, 1]`.
    Normal {
        /// Mean.
        mean: f64,
        /// Standard deviation.
        std_dev: f64,
    },
}

impl PriorityDistribution {
    /// Beta(0.1, 0.1): most priorities near 0 or 1.
    pub fn bimodal() -> Self {
        Self::Beta {
            alpha: 0.1,
            beta: 0.1,
        }
    }

    /// Beta(2, 8): mostly low priorities, a few high ones.
    pub fn skew_right() -> Self {
        Self::Beta {
            alpha: 2.0,
            beta: 8.0,
        }
    }

    fn sampler(&self) -> Result<PrioritySampler, SchedulingError> {
        match *self {
            Self::Uniform => Ok(PrioritySampler::Uniform),
            Self::Beta { alpha, beta } => Beta::new(alpha, beta)
                .map(PrioritySampler::Beta)
                .map_err(|e| SchedulingError::Simulation(format!("beta({alpha}, {beta}): {e}"))),
            Self::Normal { mean, std_dev } => Normal::new(mean, std_dev)
                .map(PrioritySampler::Normal)
                .map_err(|e| {
                    SchedulingError::Simulation(format!("normal({mean}, {std_dev}): {e}"))
                }),
        }
    }
}

enum PrioritySampler {
    Uniform,
    Beta(Beta<f64>),
    Normal(Normal<f64>),
}

impl PrioritySampler {
    fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        let value = match self {
            Self::Uniform => rng.random::<f64>(),
            Self::Beta(d) => d.sample(rng),
            Self::Normal(d) => d.sample(rng),
        };
        value.clamp(0.0, 1.0)
    }
}

/// Shape of generated scenarios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Fewest tasks per scenario.
    pub min_tasks: usize,
    /// Most tasks per scenario.
    pub max_tasks: usize,
    /// Stages per task.
    pub stages: usize,
    /// Fraction in `[0, 1]` of the optional worst-case runtime the deadline allows.
    pub deadline_slack: f64,
    /// Priority distribution.
    pub priority: PriorityDistribution,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            min_tasks: 2,
            max_tasks: 30,
            stages: 6,
            deadline_slack: 0.5,
            priority: PriorityDistribution::Uniform,
        }
    }
}

impl ScenarioConfig {
    /// Sets the task count range.
    pub fn with_task_range(mut self, min_tasks: usize, max_tasks: usize) -> Self {
        self.min_tasks = min_tasks;
        self.max_tasks = max_tasks;
        self
    }

    /// Sets the stages per task.
    pub fn with_stages(mut self, stages: usize) -> Self {
        self.stages = stages;
        self
    }

    /// Sets the deadline slack fraction.
    pub fn with_deadline_slack(mut self, deadline_slack: f64) -> Self {
        self.deadline_slack = deadline_slack;
        self
    }

    /// Sets the priority distribution.
    pub fn with_priority(mut self, priority: PriorityDistribution) -> Self {
        self.priority = priority;
        self
    }

    fn check(&self) -> Result<(), SchedulingError> {
        if self.min_tasks > self.max_tasks {
            return Err(SchedulingError::Simulation(format!(
                "task range {}..={} is empty",
                self.min_tasks, self.max_tasks
            )));
        }
        if self.stages == 0 {
            return Err(SchedulingError::Simulation(
                "tasks need at least one stage".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.deadline_slack) {
            return Err(SchedulingError::Simulation(format!(
                "deadline slack {} is outside [0, 1]",
                self.deadline_slack
            )));
        }
        Ok(())
    }
}

/// Draws one scenario; tasks come out in (trivially) deadline order.
pub fn generate_scenario<R: Rng>(
    config: &ScenarioConfig,
    rng: &mut R,
) -> Result<Vec<Task>, SchedulingError> {
    config.check()?;
    let sampler = config.priority.sampler()?;
    let n = rng.random_range(config.min_tasks..=config.max_tasks);

    let mut tasks: Vec<Task> = (0..n)
        .map(|i| {
            let runtimes = sorted_unit_samples(rng, config.stages, 1.0);
            let precisions = sorted_unit_samples(rng, config.stages, PRECISION_CEILING);
            let stages = runtimes.into_iter().zip(precisions);
            stages.fold(
                Task::new(format!("task-{i}")).with_priority(sampler.sample(rng)),
                |task, (runtime, precision)| task.with_stage(runtime, precision),
            )
        })
        .collect();

    let mandatory: f64 = tasks.iter().map(Task::mandatory_runtime).sum();
    let worst: f64 = tasks
        .iter()
        .map(|t| t.max_depth().map_or(0.0, |d| t.runtime_at(d)))
        .sum();
    let deadline = mandatory + config.deadline_slack * (worst - mandatory);
    for task in &mut tasks {
        task.deadline = deadline;
    }

    Ok(tasks)
}

/// `count` weakly increasing samples in `[0, 1)`, each capped at `ceiling`.
fn sorted_unit_samples<R: Rng>(rng: &mut R, count: usize, ceiling: f64) -> Vec<f64> {
    let mut values = Vec::with_capacity(count);
    let mut previous = 0.0;
    for _ in 0..count {
        let value = (previous + rng.random::<f64>() * (1.0 - previous)).min(ceiling);
        values.push(value);
        previous = value;
    }
    values
}
