use crate::env::BoxError;
use crate::types::{PhysicsState, Pose};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicsSettings {
    pub frame_rate: u32,
    pub debug: bool,
    /// Actions come from a human at the keyboard rather than an agent.
    pub human: bool,
}

/// Physics engine wrapper driven by the environment.
pub trait PhysicsRenderer: Send {
    type Action: Send + 'static;

    /// Seeds the simulation; called exactly once, before the first step.
    fn initialize(&mut self, pose: Pose) -> Result<(), BoxError>;

    /// Integrates one frame of `action`.
    fn render_offscreen(&mut self, action: Self::Action) -> Result<(Pose, PhysicsState), BoxError>;
}
