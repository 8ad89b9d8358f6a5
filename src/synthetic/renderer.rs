use std::sync::Arc;

use image::Rgb;
use tracing::debug;

use crate::env::BoxError;
use crate::scene::SceneBundle;
use crate::types::{DepthMap, Frame, Pose};
use crate::visual::PointCloudRenderer;

/// Returns the dataset view nearest to the requested pose, shaded by the
/// mean depth the worker reports for that pose.
#[derive(Debug)]
pub struct SyntheticRenderer {
    scene: Arc<SceneBundle>,
    onscreen: bool,
}

impl SyntheticRenderer {
    pub fn new(scene: Arc<SceneBundle>) -> Result<Self, BoxError> {
        if scene.is_empty() || scene.poses.len() != scene.targets.len() {
            return Err(format!("scene {:?} has no usable views", scene.model_id).into());
        }
        Ok(Self {
            scene,
            onscreen: false,
        })
    }

    pub fn is_onscreen(&self) -> bool {
        self.onscreen
    }

    fn nearest_view(&self, pose: &Pose) -> usize {
        self.scene
            .poses
            .iter()
            .map(|p| p.distance_to(pose.translation))
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map_or(0, |(i, _)| i)
    }
}

impl PointCloudRenderer for SyntheticRenderer {
    fn initial_pose(&mut self, _depth: &DepthMap) -> Result<Pose, BoxError> {
        Ok(self.scene.poses[0])
    }

    fn render_offscreen(&mut self, pose: &Pose, depth: &DepthMap) -> Result<Frame, BoxError> {
        if !pose.is_finite() {
            return Err(format!("cannot render non-finite pose {pose:?}").into());
        }
        let mean = depth.mean().ok_or("empty depth map")?;
        let shade = (1.0 / (1.0 + 0.1 * mean.max(0.0))).clamp(0.0, 1.0);

        let view = self.nearest_view(pose);
        let mut frame = self.scene.targets[view].clone();
        for Rgb(channels) in frame.pixels_mut() {
            for c in channels.iter_mut() {
                *c = (*c as f32 * shade) as u8;
            }
        }
        Ok(frame)
    }

    fn setup_onscreen(&mut self) -> Result<(), BoxError> {
        debug!(model_id = %self.scene.model_id, "onscreen surface ready");
        self.onscreen = true;
        Ok(())
    }
}
