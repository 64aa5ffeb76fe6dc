//! Length-prefixed frames for the agent-to-worker pipe.
//!
//! Each frame is a big-endian `u32` byte count followed by an encoded
//! [`WireSessionMessage`].

use crate::error::transport::TransportError;
use crate::wire::WireSessionMessage;

use common::ErrorLocation;

use std::io::ErrorKind;
use std::panic::Location;

use prost::Message as ProstMessage;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub const MAX_FRAME_LEN: usize = 1024 * 1024;

/// Write one frame and flush.
pub async fn write_frame<W>(writer: &mut W, message: &WireSessionMessage) -> Result<(), TransportError>
where
    W: AsyncWrite + Unpin,
{
    let payload = message.encode_to_vec();
    if payload.len() > MAX_FRAME_LEN {
        return Err(TransportError::Frame {
            message: format!(
                "Frame of {} bytes exceeds limit of {MAX_FRAME_LEN}",
                payload.len()
            ),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    writer.write_u32(payload.len() as u32).await?;
    writer.write_all(&payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one frame's payload; `Ok(None)` on clean end of stream before a
/// length prefix.
///
/// The payload is not decoded, so a frame that is intact but undecodable
/// does not fail the stream.
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<Vec<u8>>, TransportError>
where
    R: AsyncRead + Unpin,
{
    let len = match reader.read_u32().await {
        Ok(len) => len as usize,
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    if len > MAX_FRAME_LEN {
        return Err(TransportError::Frame {
            message: format!("Frame length {len} exceeds limit of {MAX_FRAME_LEN}"),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;
    Ok(Some(payload))
}
