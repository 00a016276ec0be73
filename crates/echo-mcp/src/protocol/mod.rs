//! MCP protocol handling: JSON-RPC dispatch.

pub mod handler;
pub mod methods;
pub mod session;

pub use handler::ProtocolHandler;
pub use methods::{MethodHandler, NotificationHandler};
pub use session::{Session, SessionState};
