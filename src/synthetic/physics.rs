use serde_json::json;

use crate::env::BoxError;
use crate::physics::{PhysicsRenderer, PhysicsSettings};
use crate::types::{PhysicsState, Pose};

/// Point mass moved by velocity actions, integrated at the frame rate.
///
/// An action is `[vx, vy, vz]` in m/s; missing components are zero, so an
/// empty action holds position. Human input is clamped to unit speed per axis.
#[derive(Debug, Clone)]
pub struct KinematicPhysics {
    pose: Option<Pose>,
    initial: Option<Pose>,
    target: [f64; 3],
    settings: PhysicsSettings,
    frames: u64,
}

impl KinematicPhysics {
    pub fn new(target: [f64; 3], settings: PhysicsSettings) -> Self {
        Self {
            pose: None,
            initial: None,
            target,
            settings,
            frames: 0,
        }
    }

    /// Pose passed to [`PhysicsRenderer::initialize`], if any.
    pub fn initial_pose(&self) -> Option<Pose> {
        self.initial
    }

    pub fn settings(&self) -> PhysicsSettings {
        self.settings
    }

    fn dt(&self) -> f64 {
        1.0 / f64::from(self.settings.frame_rate.max(1))
    }
}

impl PhysicsRenderer for KinematicPhysics {
    type Action = Vec<f64>;

    fn initialize(&mut self, pose: Pose) -> Result<(), BoxError> {
        self.pose = Some(pose);
        self.initial = Some(pose);
        self.frames = 0;
        Ok(())
    }

    fn render_offscreen(&mut self, action: Vec<f64>) -> Result<(Pose, PhysicsState), BoxError> {
        let dt = self.dt();
        let human = self.settings.human;
        let pose = self.pose.as_mut().ok_or("physics stepped before initialize")?;

        for (axis, velocity) in pose.translation.iter_mut().zip(action.iter().copied()) {
            let velocity = if human { velocity.clamp(-1.0, 1.0) } else { velocity };
            *axis += velocity * dt;
        }
        self.frames += 1;

        let mut state = PhysicsState::new(pose.distance_to(self.target));
        state.extra.insert("frame".into(), json!(self.frames));
        state.extra.insert("position".into(), json!(pose.translation));
        Ok((*pose, state))
    }
}
