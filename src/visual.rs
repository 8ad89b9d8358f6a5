use std::sync::Arc;

use tracing::debug;

use crate::config::WorkerConfig;
use crate::env::{BoxError, EnvError};
use crate::runtime::{DepthChannel, MessageChannel, SyncChannel, WorkerProcess};
use crate::scene::SceneBundle;
use crate::types::{DepthMap, Frame, Pose};

/// Point-cloud renderer fed with depth from the worker.
pub trait PointCloudRenderer: Send {
    /// Pose the episode starts from, chosen without any prior pose.
    fn initial_pose(&mut self, depth: &DepthMap) -> Result<Pose, BoxError>;

    fn render_offscreen(&mut self, pose: &Pose, depth: &DepthMap) -> Result<Frame, BoxError>;

    /// Prepares an onscreen surface. Only called in debug mode.
    fn setup_onscreen(&mut self) -> Result<(), BoxError> {
        Ok(())
    }
}

/// Renderer plus the two worker endpoints it depends on.
pub struct VisualSubsystem<R> {
    renderer: R,
    depth: DepthChannel,
    sync: SyncChannel,
    scene: Arc<SceneBundle>,
}

impl<R: PointCloudRenderer> VisualSubsystem<R> {
    /// Connects to the worker, announces the scene on the coordination
    /// endpoint, then builds the renderer from the bundle.
    pub async fn open<F>(
        scene: SceneBundle,
        scale_up: f64,
        worker: &WorkerProcess,
        config: &WorkerConfig,
        build_renderer: F,
    ) -> Result<Self, EnvError>
    where
        F: FnOnce(Arc<SceneBundle>) -> Result<R, BoxError>,
    {
        let depth = MessageChannel::connect(
            worker.depth_addr(),
            config.connect_timeout(),
            config.reply_timeout(),
        )
        .await?;
        let sync = MessageChannel::connect(
            worker.sync_addr(),
            config.connect_timeout(),
            config.reply_timeout(),
        )
        .await?;
        let mut sync = SyncChannel::new(sync);
        sync.hello(&scene.model_id, scale_up).await?;

        let scene = Arc::new(scene);
        let renderer = build_renderer(Arc::clone(&scene)).map_err(EnvError::Render)?;
        debug!(views = scene.len(), "renderer built");

        Ok(Self {
            renderer,
            depth: DepthChannel::new(depth),
            sync,
            scene,
        })
    }

    pub async fn initial_pose(&mut self) -> Result<Pose, EnvError> {
        let depth = self.depth.render(None).await?;
        self.renderer.initial_pose(&depth).map_err(EnvError::Render)
    }

    pub async fn render_offscreen(&mut self, pose: Pose) -> Result<Frame, EnvError> {
        self.sync.publish_pose(pose).await?;
        let depth = self.depth.render(Some(pose)).await?;
        self.renderer
            .render_offscreen(&pose, &depth)
            .map_err(EnvError::Render)
    }

    pub fn setup_onscreen(&mut self) -> Result<(), EnvError> {
        self.renderer.setup_onscreen().map_err(EnvError::Render)
    }

    pub fn scene(&self) -> &Arc<SceneBundle> {
        &self.scene
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }
}
