//! Header line parsing and encoding.

use crate::types::{FrameError, FrameResult, CONTENT_LENGTH};

/// Split a header line into its trimmed name and value.
///
/// The caller strips line terminators and skips the blank separator line.
pub fn parse_header_line(line: &str) -> FrameResult<(&str, &str)> {
    let (name, value) = line
        .split_once(':')
        .ok_or_else(|| FrameError::InvalidHeader(line.to_string()))?;
    Ok((name.trim(), value.trim()))
}

/// Parse a `Content-Length` value as a non-negative decimal byte count.
pub fn parse_content_length(value: &str) -> FrameResult<usize> {
    value
        .parse::<usize>()
        .map_err(|_| FrameError::InvalidContentLength(value.to_string()))
}

/// Returns true when `name` is the Content-Length header, ignoring case.
pub fn is_content_length(name: &str) -> bool {
    name.eq_ignore_ascii_case(CONTENT_LENGTH)
}

/// Render the header block for a payload of `len` bytes, separator included.
pub fn encode_header(len: usize) -> String {
    format!("{CONTENT_LENGTH}: {len}\r\n\r\n")
}
