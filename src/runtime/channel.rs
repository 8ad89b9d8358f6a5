use std::net::SocketAddr;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::runtime::codec::{read_frame, write_frame};
use crate::runtime::error::ChannelError;
use crate::runtime::protocol::{DepthReply, DepthRequest, SyncReply, SyncRequest};
use crate::types::{DepthMap, Pose};

/// A request/reply connection to one worker endpoint.
///
/// Strictly sequential: one request is written, then exactly one reply is
/// read. Every exchange is bounded by the reply timeout, after which the
/// channel must be considered unusable.
#[derive(Debug)]
pub struct MessageChannel {
    addr: SocketAddr,
    stream: TcpStream,
    reply_timeout: Duration,
}

impl MessageChannel {
    pub async fn connect(
        addr: SocketAddr,
        connect_timeout: Duration,
        reply_timeout: Duration,
    ) -> Result<Self, ChannelError> {
        let stream = match timeout(connect_timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => return Err(ChannelError::Connect { addr, source }),
            Err(_) => return Err(ChannelError::Timeout(connect_timeout)),
        };
        stream.set_nodelay(true)?;
        debug!(%addr, "channel connected");

        Ok(Self {
            addr,
            stream,
            reply_timeout,
        })
    }

    pub async fn request<Req, Rep>(&mut self, request: &Req) -> Result<Rep, ChannelError>
    where
        Req: Serialize + Sync,
        Rep: DeserializeOwned,
    {
        let wait = self.reply_timeout;
        let stream = &mut self.stream;
        let exchange = async move {
            write_frame(&mut *stream, request).await?;
            read_frame(stream).await?.ok_or(ChannelError::Closed)
        };

        match timeout(wait, exchange).await {
            Ok(reply) => reply,
            Err(_) => {
                warn!(addr = %self.addr, ?wait, "no reply from worker");
                Err(ChannelError::Timeout(wait))
            }
        }
    }
}

/// Depth endpoint of the worker.
#[derive(Debug)]
pub struct DepthChannel {
    inner: MessageChannel,
}

impl DepthChannel {
    pub fn new(inner: MessageChannel) -> Self {
        Self { inner }
    }

    pub async fn render(&mut self, pose: Option<Pose>) -> Result<DepthMap, ChannelError> {
        match self.inner.request(&DepthRequest::Render { pose }).await? {
            DepthReply::Depth(depth) if depth.is_consistent() => Ok(depth),
            DepthReply::Depth(depth) => Err(ChannelError::UnexpectedReply(format!(
                "{}x{} depth map carries {} samples",
                depth.width,
                depth.height,
                depth.data.len()
            ))),
            DepthReply::Error { message } => Err(ChannelError::Remote(message)),
        }
    }
}

/// Coordination endpoint used to keep the render process aligned with the core.
#[derive(Debug)]
pub struct SyncChannel {
    inner: MessageChannel,
}

impl SyncChannel {
    pub fn new(inner: MessageChannel) -> Self {
        Self { inner }
    }

    pub async fn hello(&mut self, model_id: &str, scale_up: f64) -> Result<(), ChannelError> {
        let request = SyncRequest::Hello {
            model_id: model_id.to_string(),
            scale_up,
        };
        match self.inner.request(&request).await? {
            SyncReply::Ready => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    pub async fn publish_pose(&mut self, pose: Pose) -> Result<(), ChannelError> {
        match self.inner.request(&SyncRequest::Pose(pose)).await? {
            SyncReply::Ack => Ok(()),
            other => Err(unexpected(other)),
        }
    }
}

fn unexpected(reply: SyncReply) -> ChannelError {
    match reply {
        SyncReply::Error { message } => ChannelError::Remote(message),
        other => ChannelError::UnexpectedReply(format!("{other:?}")),
    }
}
