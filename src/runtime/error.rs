use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("failed to spawn depth worker {program:?}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("depth worker did not report ready within {0:?}")]
    StartupTimeout(Duration),

    #[error("depth worker exited before reporting ready ({0:?})")]
    ExitedBeforeReady(Option<ExitStatus>),

    #[error("invalid ready line from depth worker: {0}")]
    Handshake(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("no reply within {0:?}")]
    Timeout(Duration),

    #[error("channel closed by peer")]
    Closed,

    #[error("frame of {0} bytes exceeds limit")]
    FrameTooLarge(usize),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("deserialization error: {0}")]
    Deserialize(String),

    #[error("worker reported: {0}")]
    Remote(String),

    #[error("unexpected reply: {0}")]
    UnexpectedReply(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

