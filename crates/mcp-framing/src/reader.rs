//! Frame reader: header block, blank line, then exactly `Content-Length` bytes.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::header::{is_content_length, parse_content_length, parse_header_line};
use crate::types::{FrameError, FrameResult, DEFAULT_MAX_CONTENT_LENGTH, MAX_HEADER_LINE_LENGTH};

/// Reads framed payloads from a buffered byte stream.
pub struct FrameReader<R> {
    inner: R,
    max_content_length: usize,
    line: Vec<u8>,
}

impl<R> FrameReader<R>
where
    R: AsyncBufRead + Unpin,
{
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            max_content_length: DEFAULT_MAX_CONTENT_LENGTH,
            line: Vec::new(),
        }
    }

    /// Reject frames that declare more than `max` payload bytes.
    pub fn with_max_content_length(mut self, max: usize) -> Self {
        self.max_content_length = max;
        self
    }

    pub fn max_content_length(&self) -> usize {
        self.max_content_length
    }

    /// Read the next frame's payload.
    ///
    /// Returns `Ok(None)` when the stream ends before any header line of a new
    /// frame. Any other early end, malformed header or bad length is an error and
    /// leaves the stream unusable.
    pub async fn read_frame(&mut self) -> FrameResult<Option<Vec<u8>>> {
        let mut content_length: Option<usize> = None;
        let mut saw_header = false;

        loop {
            self.line.clear();
            let read = (&mut self.inner)
                .take(MAX_HEADER_LINE_LENGTH as u64)
                .read_until(b'\n', &mut self.line)
                .await?;

            if read == 0 {
                if saw_header {
                    return Err(FrameError::UnexpectedEof);
                }
                return Ok(None);
            }

            if self.line.last() != Some(&b'\n') {
                if read >= MAX_HEADER_LINE_LENGTH {
                    return Err(FrameError::InvalidHeader(format!(
                        "header line exceeds {MAX_HEADER_LINE_LENGTH} bytes"
                    )));
                }
                // A line cut off by end-of-stream can never complete a header block.
                return Err(FrameError::UnexpectedEof);
            }

            let text = std::str::from_utf8(&self.line).map_err(|_| {
                FrameError::InvalidHeader(String::from_utf8_lossy(&self.line).trim().to_string())
            })?;
            let text = text.trim();

            if text.is_empty() {
                if !saw_header {
                    continue;
                }
                break;
            }

            saw_header = true;
            let (name, value) = parse_header_line(text)?;
            if is_content_length(name) {
                content_length = Some(parse_content_length(value)?);
            } else {
                tracing::trace!(header = name, "ignoring header");
            }
        }

        let expected = content_length.ok_or(FrameError::MissingContentLength)?;
        if expected > self.max_content_length {
            return Err(FrameError::ContentTooLarge {
                size: expected,
                max: self.max_content_length,
            });
        }

        let mut payload = Vec::with_capacity(expected);
        let received = (&mut self.inner)
            .take(expected as u64)
            .read_to_end(&mut payload)
            .await?;
        if received != expected {
            return Err(FrameError::TruncatedPayload { expected, received });
        }

        tracing::trace!(len = expected, "read frame");
        Ok(Some(payload))
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}
