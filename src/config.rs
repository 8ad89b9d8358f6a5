use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_MODEL_ID: &str = "11HB6XZSh1Q";
pub const DEFAULT_FRAME_RATE: u32 = 13;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Public configuration surface of a [`crate::SimpleEnv`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Scene to load from the dataset.
    pub model_id: String,
    pub human: bool,
    /// Enables the onscreen surface and the reward display.
    pub debug: bool,
    /// Every target and depth image is downscaled by this divisor.
    pub scale_up: f64,
    pub frame_rate: u32,
    pub worker: WorkerConfig,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            human: false,
            debug: true,
            scale_up: 1.0,
            frame_rate: DEFAULT_FRAME_RATE,
            worker: WorkerConfig::default(),
        }
    }
}

impl EnvConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model_id.is_empty() {
            return Err(ConfigError::Invalid("model_id must not be empty".into()));
        }
        if !(self.scale_up.is_finite() && self.scale_up > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "scale_up must be a positive number, got {}",
                self.scale_up
            )));
        }
        if self.frame_rate == 0 {
            return Err(ConfigError::Invalid("frame_rate must be at least 1".into()));
        }
        self.worker.validate()
    }
}

/// How to launch and talk to the depth worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// `0` lets the worker pick a free port, which keeps concurrent
    /// environments from colliding.
    pub depth_port: u16,
    pub sync_port: u16,
    pub startup_timeout_ms: u64,
    pub connect_timeout_ms: u64,
    pub reply_timeout_ms: u64,
    pub shutdown_grace_ms: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("depth_worker"),
            args: Vec::new(),
            depth_port: 0,
            sync_port: 0,
            startup_timeout_ms: 10_000,
            connect_timeout_ms: 2_000,
            reply_timeout_ms: 5_000,
            shutdown_grace_ms: 2_000,
        }
    }
}

impl WorkerConfig {
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    pub fn startup_timeout(&self) -> Duration {
        Duration::from_millis(self.startup_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn reply_timeout(&self) -> Duration {
        Duration::from_millis(self.reply_timeout_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.program.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("worker.program must not be empty".into()));
        }
        if self.depth_port != 0 && self.depth_port == self.sync_port {
            return Err(ConfigError::Invalid(format!(
                "depth and sync endpoints share port {}",
                self.depth_port
            )));
        }
        for (name, value) in [
            ("startup_timeout_ms", self.startup_timeout_ms),
            ("connect_timeout_ms", self.connect_timeout_ms),
            ("reply_timeout_ms", self.reply_timeout_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("worker.{name} must be positive")));
            }
        }
        Ok(())
    }
}
