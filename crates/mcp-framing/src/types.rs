//! Error and constant definitions shared by the reader and writer.

/// The only header the framing layer interprets.
pub const CONTENT_LENGTH: &str = "Content-Length";

/// Upper bound on a declared payload length unless the reader is told otherwise.
pub const DEFAULT_MAX_CONTENT_LENGTH: usize = 64 * 1024 * 1024;

/// Longest header line accepted, terminator included.
pub const MAX_HEADER_LINE_LENGTH: usize = 8 * 1024;

/// Errors raised while reading or writing frames.
///
/// Every variant is fatal for the stream: once a frame is malformed the byte
/// position of the next frame is unknown.
#[derive(thiserror::Error, Debug)]
pub enum FrameError {
    #[error("unexpected end of stream while reading headers")]
    UnexpectedEof,

    #[error("invalid header line: {0:?}")]
    InvalidHeader(String),

    #[error("invalid Content-Length value: {0:?}")]
    InvalidContentLength(String),

    #[error("missing Content-Length header")]
    MissingContentLength,

    #[error("content too large: {size} bytes exceeds {max} bytes")]
    ContentTooLarge { size: usize, max: usize },

    #[error("failed to read payload: expected {expected} bytes, received {received}")]
    TruncatedPayload { expected: usize, received: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type FrameResult<T> = Result<T, FrameError>;
