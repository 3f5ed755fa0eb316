//! Reward model and quantization.
//!
//! Reward is derived per (task, depth) from precision and priority.
//! The DP scheduler discretizes reward into integer levels
//! `floor(reward / delta)` to bound its table width.

use serde::{Deserialize, Serialize};

/// How precision and priority combine into reward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardModel {
    /// `precision * priority`.
    #[default]
    PrecisionTimesPriority,
    /// `precision` alone; priority ignored (classic Yao objective).
    PrecisionOnly,
}

impl RewardModel {
    /// Reward of reaching `precision` on a task with `priority`.
    #[inline]
    pub fn reward(self, precision: f64, priority: f64) -> f64 {
        match self {
            Self::PrecisionTimesPriority => reward(precision, priority),
            Self::PrecisionOnly => precision,
        }
    }
}

/// `precision * priority`.
#[inline]
pub fn reward(precision: f64, priority: f64) -> f64 {
    precision * priority
}

/// Quantized reward level `floor(reward / delta)`.
///
/// `delta` must be positive and `reward` non-negative; callers validate both.
#[inline]
pub fn quantize(reward: f64, delta: f64) -> u64 {
    (reward / delta).floor() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reward_models() {
        assert!((RewardModel::PrecisionTimesPriority.reward(0.5, 0.5) - 0.25).abs() < 1e-10);
        assert!((RewardModel::PrecisionOnly.reward(0.5, 0.1) - 0.5).abs() < 1e-10);
        assert_eq!(RewardModel::default(), RewardModel::PrecisionTimesPriority);
    }

    #[test]
    fn test_quantize_floors() {
        assert_eq!(quantize(0.375, 0.125), 3);
        assert_eq!(quantize(0.374, 0.125), 2);
        assert_eq!(quantize(0.0, 0.125), 0);
    }

    #[test]
    fn test_finer_delta_never_loses_level_value() {
        // Halving a dyadic delta refines the grid exactly.
        let r = 0.6875;
        let coarse = quantize(r, 0.25) as f64 * 0.25;
        let fine = quantize(r, 0.125) as f64 * 0.125;
        assert!(fine >= coarse);
    }
}
