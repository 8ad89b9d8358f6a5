use std::sync::Arc;

use crate::env::BoxError;
use crate::physics::{PhysicsRenderer, PhysicsSettings};
use crate::reward::{LogRewardDisplay, RewardDisplay};
use crate::scene::{ModelGeometry, SceneBundle, SceneDataset};
use crate::visual::PointCloudRenderer;

/// The external collaborators a [`crate::SimpleEnv`] is assembled from.
pub trait Backend: Send {
    type Renderer: PointCloudRenderer;
    type Physics: PhysicsRenderer;

    fn dataset(&self) -> &dyn SceneDataset;

    fn build_renderer(&mut self, scene: Arc<SceneBundle>) -> Result<Self::Renderer, BoxError>;

    fn build_physics(
        &mut self,
        model: ModelGeometry,
        settings: PhysicsSettings,
    ) -> Result<Self::Physics, BoxError>;

    fn build_reward_display(&mut self) -> Result<Box<dyn RewardDisplay>, BoxError> {
        Ok(Box::new(LogRewardDisplay::default()))
    }
}
