use tracing::info;

use crate::env::BoxError;
use crate::types::PhysicsState;

pub const REWARD_GAIN: f64 = 5.0;

/// Reward for one step: positive when the distance to target shrank.
///
/// Zero when there is no previous state.
pub fn distance_reward(old: Option<&PhysicsState>, new: &PhysicsState) -> f64 {
    match old {
        None => 0.0,
        Some(old) => REWARD_GAIN * (old.distance_to_target - new.distance_to_target),
    }
}

/// Receives reward samples for visualization.
pub trait RewardDisplay: Send {
    fn add_reward(&mut self, reward: f64) -> Result<(), BoxError>;
    fn reset(&mut self);
}

/// Keeps running statistics and logs them every `log_every` samples.
#[derive(Debug, Clone)]
pub struct LogRewardDisplay {
    total: f64,
    samples: u64,
    log_every: u64,
}

impl LogRewardDisplay {
    pub fn new(log_every: u64) -> Self {
        Self {
            total: 0.0,
            samples: 0,
            log_every: log_every.max(1),
        }
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn samples(&self) -> u64 {
        self.samples
    }

    pub fn mean(&self) -> Option<f64> {
        (self.samples > 0).then(|| self.total / self.samples as f64)
    }
}

impl Default for LogRewardDisplay {
    fn default() -> Self {
        Self::new(40)
    }
}

impl RewardDisplay for LogRewardDisplay {
    fn add_reward(&mut self, reward: f64) -> Result<(), BoxError> {
        self.total += reward;
        self.samples += 1;
        if self.samples % self.log_every == 0 {
            info!(
                samples = self.samples,
                total = self.total,
                mean = self.total / self.samples as f64,
                "reward"
            );
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.total = 0.0;
        self.samples = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_step_reward_is_zero() {
        let new = PhysicsState::new(3.0);
        assert_eq!(distance_reward(None, &new), 0.0);
    }

    #[test]
    fn reward_sign_follows_distance() {
        let far = PhysicsState::new(4.0);
        let near = PhysicsState::new(3.5);

        assert_eq!(distance_reward(Some(&far), &near), 2.5);
        assert_eq!(distance_reward(Some(&near), &far), -2.5);
        assert_eq!(distance_reward(Some(&near), &near), 0.0);
    }

    #[test]
    fn display_tracks_running_mean() {
        let mut display = LogRewardDisplay::new(2);
        assert_eq!(display.mean(), None);
        display.add_reward(1.0).unwrap();
        display.add_reward(3.0).unwrap();
        assert_eq!(display.samples(), 2);
        assert_eq!(display.mean(), Some(2.0));

        display.reset();
        assert_eq!(display.total(), 0.0);
        assert_eq!(display.samples(), 0);
    }
}
