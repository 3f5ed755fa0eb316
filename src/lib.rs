//! Depth scheduling for imprecise computations.
//!
//! Assigns each task a stopping depth among its refinement stages so that
//! total priority-weighted precision is maximized while cumulative
//! deadlines on a single shared timeline are met.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `Task`, `Stage`, `RewardModel`,
//!   `DepthSchedule`, `ScheduleOutcome`
//! - **`validation`**: Precondition checks (stage shapes, ranges, deadline order)
//! - **`scheduler`**: The `DepthScheduler` contract, the DP optimizer, the
//!   greedy family, and schedule metrics
//! - **`ordering`**: Priority and deadline orderings, submission-order mapping
//! - **`simulation`**: Random scenarios and scheduler comparison
//! - **`error`**: `SchedulingError`
//!
//! # Quick Start
//!
//! ```
//! use u_imprecise::models::Task;
//! use u_imprecise::scheduler::{is_valid, DepthScheduler, DynamicConfig, DynamicScheduler, ScheduleOptions};
//!
//! let tasks = vec![
//!     Task::new("detect").with_priority(0.9).with_deadline(4.0)
//!         .with_stage(1.0, 0.5).with_stage(3.0, 0.9),
//!     Task::new("caption").with_priority(0.3).with_deadline(6.0)
//!         .with_stage(1.0, 0.4).with_stage(2.0, 0.6),
//! ];
//! let scheduler = DynamicScheduler::new(DynamicConfig::default().with_delta(0.01));
//! let outcome = scheduler.schedule(&tasks, &ScheduleOptions::default()).unwrap();
//! let schedule = outcome.schedule().unwrap();
//! assert!(is_valid(schedule, &tasks));
//! ```
//!
//! # References
//!
//! - Yao et al. (2020), "Scheduling Real-time Deep Learning Services as
//!   Imprecise Computations"
//! - Liu et al. (1991), "Algorithms for Scheduling Imprecise Computations"

pub mod error;
pub mod models;
pub mod ordering;
pub mod scheduler;
pub mod simulation;
pub mod validation;

pub use error::SchedulingError;
