//! Self-contained collaborators for running the environment without external
//! assets: a procedurally generated dataset, a renderer that shades dataset
//! views by worker depth, and a kinematic point-mass physics.

mod dataset;
mod depth;
mod physics;
mod renderer;

use std::sync::Arc;

pub use dataset::SyntheticDataset;
pub use depth::depth_for_pose;
pub use physics::KinematicPhysics;
pub use renderer::SyntheticRenderer;

use crate::backend::Backend;
use crate::env::BoxError;
use crate::physics::PhysicsSettings;
use crate::scene::{ModelGeometry, SceneBundle, SceneDataset};

#[derive(Debug, Clone)]
pub struct SyntheticBackend {
    dataset: SyntheticDataset,
}

impl SyntheticBackend {
    pub fn new(dataset: SyntheticDataset) -> Self {
        Self { dataset }
    }
}

impl Default for SyntheticBackend {
    fn default() -> Self {
        Self::new(SyntheticDataset::default())
    }
}

impl Backend for SyntheticBackend {
    type Renderer = SyntheticRenderer;
    type Physics = KinematicPhysics;

    fn dataset(&self) -> &dyn SceneDataset {
        &self.dataset
    }

    fn build_renderer(&mut self, scene: Arc<SceneBundle>) -> Result<Self::Renderer, BoxError> {
        SyntheticRenderer::new(scene)
    }

    fn build_physics(
        &mut self,
        model: ModelGeometry,
        settings: PhysicsSettings,
    ) -> Result<Self::Physics, BoxError> {
        Ok(KinematicPhysics::new(model.target, settings))
    }
}
