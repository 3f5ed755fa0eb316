//! Imprecise-computation domain models.
//!
//! Provides the task descriptor consumed by every scheduler, the reward
//! model, and the depth schedule they produce.
//!
//! # Domain Mappings
//!
//! | u-imprecise | Staged inference | Anytime planning |
//! |-------------|------------------|------------------|
//! | Task | Inference request | Planning query |
//! | Stage | Model block / exit | Refinement pass |
//! | Depth | Early-exit point | Iteration count |
//! | DepthSchedule | Per-request exit plan | Per-query budget |

mod reward;
mod schedule;
mod task;

pub use reward::{quantize, reward, RewardModel};
pub use schedule::{DepthSchedule, ScheduleOutcome};
pub use task::{Stage, Task};
