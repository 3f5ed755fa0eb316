//! Scheduler evaluation harness.
//!
//! Generates synthetic task populations and runs every configured
//! scheduler on them, aggregating the evaluator's two metrics. This sits
//! outside the scheduling core: it only uses the public contract.
//!
//! # Usage
//!
//! ```
//! use u_imprecise::simulation::{compare, ComparisonConfig, PriorityDistribution, ScenarioConfig};
//!
//! let config = ComparisonConfig::default()
//!     .with_trials(2)
//!     .with_scenario(
//!         ScenarioConfig::default()
//!             .with_task_range(2, 4)
//!             .with_priority(PriorityDistribution::skew_right()),
//!     );
//! let report = compare(&config).unwrap();
//! assert_eq!(report.task_counts.len(), 2);
//! ```

mod compare;
mod generator;

pub use compare::{compare, compare_with, ComparisonConfig, ComparisonReport, SchedulerSummary};
pub use generator::{generate_scenario, PriorityDistribution, ScenarioConfig};
