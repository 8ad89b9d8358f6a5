use serde::{Deserialize, Serialize};

use crate::types::{DepthMap, Pose};

/// First line a depth worker prints on stdout once both endpoints are bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerReady {
    pub depth_port: u16,
    pub sync_port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DepthRequest {
    /// `pose: None` asks for the initial view.
    Render { pose: Option<Pose> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DepthReply {
    Depth(DepthMap),
    Error { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncRequest {
    Hello { model_id: String, scale_up: f64 },
    Pose(Pose),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncReply {
    Ready,
    Ack,
    Error { message: String },
}
