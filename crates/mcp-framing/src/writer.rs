//! Frame writer.

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::header::encode_header;
use crate::types::FrameResult;

/// Build a complete frame (header block plus payload) in memory.
pub fn encode_frame(payload: &[u8]) -> Vec<u8> {
    let header = encode_header(payload.len());
    let mut frame = Vec::with_capacity(header.len() + payload.len());
    frame.extend_from_slice(header.as_bytes());
    frame.extend_from_slice(payload);
    frame
}

/// Writes framed payloads to a byte stream, flushing after every frame.
pub struct FrameWriter<W> {
    inner: W,
}

impl<W> FrameWriter<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Write one frame. The payload is sent as-is; no validation happens here.
    pub async fn write_frame(&mut self, payload: &[u8]) -> FrameResult<()> {
        self.inner
            .write_all(encode_header(payload.len()).as_bytes())
            .await?;
        self.inner.write_all(payload).await?;
        self.inner.flush().await?;
        tracing::trace!(len = payload.len(), "wrote frame");
        Ok(())
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}
