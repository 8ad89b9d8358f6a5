use thiserror::Error;

use crate::config::ConfigError;
use crate::runtime::{ChannelError, WorkerError};
use crate::scene::SceneError;

/// Error type collaborators report through.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum EnvError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("model {model_id:?} not found in dataset")]
    UnknownScene { model_id: String },

    #[error("depth worker: {0}")]
    Worker(#[from] WorkerError),

    #[error("message channel: {0}")]
    Channel(#[from] ChannelError),

    #[error("scene: {0}")]
    Scene(#[from] SceneError),

    #[error("renderer: {0}")]
    Render(#[source] BoxError),

    #[error("physics: {0}")]
    Physics(#[source] BoxError),

    #[error("reward display: {0}")]
    Display(#[source] BoxError),

    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("environment has ended")]
    Ended,
}

impl EnvError {
    /// Configuration problems are reported before anything is spawned.
    pub fn is_config_error(&self) -> bool {
        matches!(self, EnvError::Config(_) | EnvError::UnknownScene { .. })
    }
}
