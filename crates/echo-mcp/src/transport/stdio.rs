//! Stdio transport. Reads Content-Length framed JSON-RPC and writes framed responses.
//!
//! Generic over the byte streams so tests can drive it with in-memory buffers.

use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncWrite, BufReader, Stdin, Stdout};

use mcp_framing::{FrameReader, FrameWriter};

use crate::config::ServerConfig;
use crate::protocol::ProtocolHandler;
use crate::types::{McpError, McpResult};

/// Serves one peer over a duplex byte stream, one message at a time.
pub struct StdioTransport<R, W> {
    handler: ProtocolHandler,
    reader: FrameReader<R>,
    writer: FrameWriter<W>,
    read_timeout: Option<Duration>,
}

impl StdioTransport<BufReader<Stdin>, Stdout> {
    /// Transport bound to the process's stdin and stdout.
    pub fn stdio(handler: ProtocolHandler, config: &ServerConfig) -> Self {
        Self::new(
            handler,
            BufReader::new(tokio::io::stdin()),
            tokio::io::stdout(),
            config,
        )
    }
}

impl<R, W> StdioTransport<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(handler: ProtocolHandler, reader: R, writer: W, config: &ServerConfig) -> Self {
        Self {
            handler,
            reader: FrameReader::new(reader).with_max_content_length(config.max_content_length),
            writer: FrameWriter::new(writer),
            read_timeout: config.read_timeout,
        }
    }

    pub fn handler(&self) -> &ProtocolHandler {
        &self.handler
    }

    pub fn writer(&self) -> &W {
        self.writer.get_ref()
    }

    pub fn into_parts(self) -> (ProtocolHandler, W) {
        (self.handler, self.writer.into_inner())
    }

    /// Run the transport loop until the input ends or the stream breaks.
    ///
    /// A clean end of input returns `Ok(())`. Framing, read-deadline and stream
    /// write failures are returned as errors; every other problem is answered on
    /// the wire, or logged, and the loop continues.
    pub async fn run(&mut self) -> McpResult<()> {
        tracing::info!(
            max_content_length = self.reader.max_content_length(),
            read_timeout_ms = self.read_timeout.map(|t| t.as_millis() as u64),
            "Stdio transport started"
        );

        loop {
            let payload = match self.next_frame().await {
                Ok(Some(payload)) => payload,
                Ok(None) => {
                    tracing::info!("EOF on input, shutting down");
                    return Ok(());
                }
                Err(e) => {
                    tracing::error!("Transport error: {e}");
                    return Err(e);
                }
            };

            if let Some(response) = self.handler.handle_payload(&payload) {
                if let Err(e) = self.send(&response).await {
                    if e.is_fatal() {
                        tracing::error!("Failed to write response: {e}");
                        return Err(e);
                    }
                    tracing::warn!("Dropping response that could not be encoded: {e}");
                }
            }
        }
    }

    async fn next_frame(&mut self) -> McpResult<Option<Vec<u8>>> {
        match self.read_timeout {
            None => Ok(self.reader.read_frame().await?),
            Some(limit) => match tokio::time::timeout(limit, self.reader.read_frame()).await {
                Ok(frame) => Ok(frame?),
                Err(_) => Err(McpError::Transport(format!(
                    "no complete frame received within {} ms",
                    limit.as_millis()
                ))),
            },
        }
    }

    async fn send(&mut self, response: &serde_json::Value) -> McpResult<()> {
        let bytes = serde_json::to_vec(response)?;
        self.writer.write_frame(&bytes).await?;
        Ok(())
    }
}
