//! Per-connection session state and the initialize handshake.

use serde_json::Value;

use crate::types::{Implementation, InitializeParams, InitializeResult, MCP_VERSION};

/// Two-phase session lifecycle. `Ready` is entered once and never left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Uninitialized,
    Ready,
}

/// State owned by one protocol handler, i.e. one peer.
#[derive(Debug, Clone, Default)]
pub struct Session {
    state: SessionState,
    client: Option<Implementation>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == SessionState::Ready
    }

    /// Client identity reported in `initialize`, if it sent one.
    pub fn client(&self) -> Option<&Implementation> {
        self.client.as_ref()
    }

    /// Run the handshake and move to `Ready`.
    ///
    /// Params are informational only: unknown or malformed params are logged
    /// and the handshake still succeeds.
    pub fn initialize(&mut self, params: Option<Value>) -> InitializeResult {
        let params = match params {
            None | Some(Value::Null) => InitializeParams::default(),
            Some(raw) => serde_json::from_value(raw).unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable initialize params: {e}");
                InitializeParams::default()
            }),
        };

        if let Some(version) = params.protocol_version.as_deref() {
            if version != MCP_VERSION {
                tracing::warn!(
                    "Client requested protocol version {version}, server supports {MCP_VERSION}. Proceeding with server version."
                );
            }
        }

        match &params.client_info {
            Some(client) => {
                tracing::info!("Initialized with client: {} v{}", client.name, client.version)
            }
            None => tracing::info!("Initialized with anonymous client"),
        }

        self.client = params.client_info;
        self.state = SessionState::Ready;

        InitializeResult::default_result()
    }
}
