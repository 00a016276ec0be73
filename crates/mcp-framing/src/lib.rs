//! Content-Length framing for message streams.
//!
//! Each frame is a block of `Name: value` header lines closed by a blank line,
//! followed by exactly `Content-Length` payload bytes:
//!
//! ```text
//! Content-Length: 40\r\n
//! \r\n
//! {"jsonrpc":"2.0","method":"ping","id":1}
//! ```
//!
//! The crate knows nothing about the payload. Anything that can be carried as
//! bytes can be framed.

pub mod header;
pub mod reader;
pub mod types;
pub mod writer;

pub use header::{encode_header, parse_content_length, parse_header_line};
pub use reader::FrameReader;
pub use types::*;
pub use writer::{encode_frame, FrameWriter};
