use std::f64::consts::TAU;

use image::{ImageBuffer, Luma, Rgb};

use crate::config::DEFAULT_MODEL_ID;
use crate::env::BoxError;
use crate::scene::{ModelGeometry, SceneDataset, SceneIndex, SceneInfo, ViewRef, ViewSample};
use crate::types::Pose;

const RING_RADIUS: f64 = 2.0;
const CAMERA_HEIGHT: f64 = 1.0;

/// Scenes made of `views` cameras on a ring around a target at the origin.
#[derive(Debug, Clone)]
pub struct SyntheticDataset {
    scenes: Vec<String>,
    width: u32,
    height: u32,
    views: usize,
}

impl SyntheticDataset {
    pub fn new<I, S>(scenes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            scenes: scenes.into_iter().map(Into::into).collect(),
            width: 32,
            height: 24,
            views: 4,
        }
    }

    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    fn view_pose(&self, view: usize) -> Pose {
        let angle = TAU * view as f64 / self.views.max(1) as f64;
        let half = angle / 2.0;
        Pose {
            translation: [RING_RADIUS * angle.cos(), RING_RADIUS * angle.sin(), CAMERA_HEIGHT],
            // yaw about +z
            rotation: [half.cos(), 0.0, 0.0, half.sin()],
        }
    }

    fn check(&self, scene: SceneIndex) -> Result<&str, BoxError> {
        self.scenes
            .get(scene.0)
            .map(String::as_str)
            .ok_or_else(|| format!("no scene at index {}", scene.0).into())
    }
}

impl Default for SyntheticDataset {
    fn default() -> Self {
        Self::new([DEFAULT_MODEL_ID])
    }
}

impl SceneDataset for SyntheticDataset {
    fn scenes(&self) -> Vec<String> {
        self.scenes.clone()
    }

    fn scene_info(&self, scene: SceneIndex) -> Result<SceneInfo, BoxError> {
        let name = self.check(scene)?;
        let views = (0..self.views)
            .map(|i| ViewRef {
                uuid: format!("{name}-{i:03}"),
                index: scene.0 * self.views + i,
            })
            .collect();
        let transforms = (0..self.views).map(|i| self.view_pose(i)).collect();
        Ok(SceneInfo { views, transforms })
    }

    fn load_view(&self, view: &ViewRef) -> Result<ViewSample, BoxError> {
        let views = self.views.max(1);
        let (scene, i) = (view.index / views, view.index % views);
        self.check(SceneIndex(scene))?;

        let (w, h) = (self.width, self.height);
        let tint = (scene * 53 + i * 29) as u32;
        let target = ImageBuffer::from_fn(w, h, |x, y| {
            Rgb([
                ((x * 255 / w.max(1) + tint) % 256) as u8,
                ((y * 255 / h.max(1) + tint) % 256) as u8,
                (tint % 256) as u8,
            ])
        });
        let base = RING_RADIUS as f32 + 0.25 * i as f32;
        let target_depth = ImageBuffer::from_fn(w, h, |x, _| {
            Luma([base + x as f32 / w.max(1) as f32])
        });

        Ok(ViewSample {
            target,
            target_depth,
            pose: self.view_pose(i),
        })
    }

    fn model_geometry(&self, scene: SceneIndex) -> Result<ModelGeometry, BoxError> {
        let name = self.check(scene)?;
        Ok(ModelGeometry {
            model_id: name.to_string(),
            target: [0.0, 0.0, CAMERA_HEIGHT],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn views_are_deterministic() {
        let dataset = SyntheticDataset::new(["a", "b"]);
        let info = dataset.scene_info(SceneIndex(1)).unwrap();
        assert_eq!(info.views.len(), 4);
        assert_eq!(info.views[0].uuid, "b-000");

        let first = dataset.load_view(&info.views[2]).unwrap();
        let second = dataset.load_view(&info.views[2]).unwrap();
        assert_eq!(first.target, second.target);
        assert_eq!(first.pose, second.pose);
    }

    #[test]
    fn unknown_index_is_an_error() {
        let dataset = SyntheticDataset::new(["a"]);
        assert!(dataset.scene_info(SceneIndex(3)).is_err());
        assert!(dataset.model_geometry(SceneIndex(3)).is_err());
    }

    #[test]
    fn cameras_sit_on_the_ring() {
        let dataset = SyntheticDataset::new(["a"]);
        let geometry = dataset.model_geometry(SceneIndex(0)).unwrap();
        for i in 0..4 {
            let d = dataset.view_pose(i).distance_to(geometry.target);
            assert!((d - RING_RADIUS).abs() < 1e-9);
        }
    }
}
