//! Length-prefixed JSON framing shared by the core and the depth worker.
//!
//! Every message is a 4-byte big-endian length followed by a `serde_json`
//! body of exactly that many bytes.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::runtime::error::ChannelError;

pub const MAX_FRAME_LEN: usize = 64 * 1024 * 1024;

pub async fn write_frame<W, T>(writer: &mut W, message: &T) -> Result<(), ChannelError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let body = serde_json::to_vec(message).map_err(|e| ChannelError::Serialize(e.to_string()))?;
    if body.len() > MAX_FRAME_LEN {
        return Err(ChannelError::FrameTooLarge(body.len()));
    }

    writer.write_u32(body.len() as u32).await?;
    writer.write_all(&body).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads one frame. `Ok(None)` means the peer closed the stream cleanly
/// between frames.
pub async fn read_frame<R, T>(reader: &mut R) -> Result<Option<T>, ChannelError>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let len = match reader.read_u32().await {
        Ok(len) => len as usize,
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    if len > MAX_FRAME_LEN {
        return Err(ChannelError::FrameTooLarge(len));
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            ChannelError::Closed
        } else {
            e.into()
        }
    })?;

    serde_json::from_slice(&body)
        .map(Some)
        .map_err(|e| ChannelError::Deserialize(e.to_string()))
}
