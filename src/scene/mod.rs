mod dataset;
pub mod resize;

use image::RgbImage;
use thiserror::Error;
use tracing::debug;

pub use dataset::{ModelGeometry, SceneDataset, SceneIndex, SceneInfo, ViewRef, ViewSample};

use crate::env::BoxError;
use crate::types::{DepthImage, Pose};

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("dataset error: {0}")]
    Dataset(#[source] BoxError),

    #[error("scene {0:?} has no views")]
    Empty(String),

    #[error("scale factor {factor} leaves nothing of a {width}x{height} image")]
    Degenerate { width: u32, height: u32, factor: f64 },
}

/// Everything the renderer needs about one scene. Read-only once loaded.
#[derive(Debug, Clone)]
pub struct SceneBundle {
    pub model_id: String,
    pub targets: Vec<RgbImage>,
    pub sources: Vec<RgbImage>,
    pub source_depths: Vec<DepthImage>,
    pub poses: Vec<Pose>,
    pub transforms: Vec<Pose>,
}

impl SceneBundle {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

pub fn resolve_scene(dataset: &dyn SceneDataset, model_id: &str) -> Option<SceneIndex> {
    dataset
        .scenes()
        .iter()
        .position(|scene| scene == model_id)
        .map(SceneIndex)
}

/// Loads every view of `scene`, downscaling images by `scale_up`.
///
/// Sources are the target images themselves.
pub fn load_bundle(
    dataset: &dyn SceneDataset,
    scene: SceneIndex,
    model_id: &str,
    scale_up: f64,
) -> Result<SceneBundle, SceneError> {
    let info = dataset.scene_info(scene).map_err(SceneError::Dataset)?;
    if info.views.is_empty() {
        return Err(SceneError::Empty(model_id.to_string()));
    }

    let total = info.views.len();
    let mut targets = Vec::with_capacity(total);
    let mut sources = Vec::with_capacity(total);
    let mut source_depths = Vec::with_capacity(total);
    let mut poses = Vec::with_capacity(total);

    for (i, view) in info.views.iter().enumerate() {
        let sample = dataset.load_view(view).map_err(SceneError::Dataset)?;
        let target = resize::downscale_rgb(sample.target, scale_up)?;
        let depth = resize::downscale_depth(sample.target_depth, scale_up)?;

        targets.push(target.clone());
        sources.push(target);
        source_depths.push(depth);
        poses.push(sample.pose);
        debug!(view = %view.uuid, loaded = i + 1, total, "scene view loaded");
    }

    Ok(SceneBundle {
        model_id: model_id.to_string(),
        targets,
        sources,
        source_depths,
        poses,
        transforms: info.transforms,
    })
}
