use image::RgbImage;

use crate::env::BoxError;
use crate::types::{DepthImage, Pose};

/// Position of a scene in [`SceneDataset::scenes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneIndex(pub usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRef {
    pub uuid: String,
    pub index: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SceneInfo {
    pub views: Vec<ViewRef>,
    /// Relative camera transforms handed to the renderer as-is.
    pub transforms: Vec<Pose>,
}

/// One captured view of a scene.
#[derive(Debug, Clone)]
pub struct ViewSample {
    pub target: RgbImage,
    pub target_depth: DepthImage,
    pub pose: Pose,
}

/// Geometry the physics subsystem is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelGeometry {
    pub model_id: String,
    /// Point the agent is rewarded for approaching.
    pub target: [f64; 3],
}

/// Source of scene geometry, images, depth maps and camera poses.
pub trait SceneDataset: Send {
    /// Known scene identifiers, in index order.
    fn scenes(&self) -> Vec<String>;

    fn scene_info(&self, scene: SceneIndex) -> Result<SceneInfo, BoxError>;

    fn load_view(&self, view: &ViewRef) -> Result<ViewSample, BoxError>;

    fn model_geometry(&self, scene: SceneIndex) -> Result<ModelGeometry, BoxError>;
}
