//! Length-prefixed JSON framing for the engine channel.
//!
//! Raw pipes give no message boundaries, so every frame is a 4-byte
//! little-endian payload length followed by exactly one JSON object.
//! Frames above [`MAX_FRAME_BYTES`] are rejected before any write happens.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::BridgeError;

/// Upper bound on a single frame's JSON payload.
pub const MAX_FRAME_BYTES: usize = 1024 * 1024;

/// Serialize `value` and write it as one frame.
pub async fn write_frame<W, T>(writer: &mut W, value: &T) -> Result<(), BridgeError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let payload = serde_json::to_vec(value)?;
    if payload.len() > MAX_FRAME_BYTES {
        return Err(BridgeError::FrameTooLarge {
            size: payload.len(),
            limit: MAX_FRAME_BYTES,
        });
    }

    writer.write_all(&(payload.len() as u32).to_le_bytes()).await?;
    writer.write_all(&payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one frame and deserialize its payload.
///
/// Returns `Ok(None)` when the stream ends cleanly on a frame boundary.
/// EOF in the middle of a frame is an error.
pub async fn read_frame<R, T>(reader: &mut R) -> Result<Option<T>, BridgeError>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let len = u32::from_le_bytes(len_buf) as usize;
    if len > MAX_FRAME_BYTES {
        return Err(BridgeError::FrameTooLarge {
            size: len,
            limit: MAX_FRAME_BYTES,
        });
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;
    Ok(Some(serde_json::from_slice(&payload)?))
}
