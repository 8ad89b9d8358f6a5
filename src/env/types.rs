use serde::{Deserialize, Serialize};

/// `(observation, reward, done, info)` as returned by `step`.
pub type Transition<O, I> = (O, f32, bool, I);

/// Distance-to-target before and after a step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepInfo {
    /// `None` on the first step after construction.
    pub state_old: Option<f64>,
    pub state_new: f64,
}
