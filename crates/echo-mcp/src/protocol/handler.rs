//! Main request dispatcher. Receives JSON-RPC messages and routes them to handlers.

use std::collections::HashMap;

use serde_json::Value;

use crate::tools::ToolRegistry;
use crate::types::*;

use super::methods::{default_methods, default_notifications, MethodHandler, NotificationHandler};
use super::session::Session;

/// Dispatches JSON-RPC messages for a single peer.
///
/// Owns the session, so one handler must never be shared between peers.
pub struct ProtocolHandler {
    tools: ToolRegistry,
    session: Session,
    methods: HashMap<&'static str, MethodHandler>,
    notifications: HashMap<&'static str, NotificationHandler>,
}

impl ProtocolHandler {
    pub fn new(tools: ToolRegistry) -> Self {
        Self {
            tools,
            session: Session::new(),
            methods: default_methods(),
            notifications: default_notifications(),
        }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Add or replace a request method. The first `initialize` always goes to
    /// the session handshake regardless of this table.
    pub fn register_method(&mut self, method: &'static str, handler: MethodHandler) {
        self.methods.insert(method, handler);
    }

    pub fn register_notification(&mut self, method: &'static str, handler: NotificationHandler) {
        self.notifications.insert(method, handler);
    }

    /// Decode one frame payload and handle it.
    ///
    /// Returns the response to send, if any. Undecodable payloads are answered
    /// with a parse error carrying a null id.
    pub fn handle_payload(&mut self, payload: &[u8]) -> Option<Value> {
        match Envelope::parse(payload) {
            Ok(envelope) => self.handle_envelope(envelope),
            Err(e) => {
                tracing::warn!("Failed to parse payload: {e}");
                Some(e.to_json_rpc_error(RequestId::Null).into_value())
            }
        }
    }

    pub fn handle_envelope(&mut self, envelope: Envelope) -> Option<Value> {
        if !envelope.has_supported_version() {
            tracing::warn!(
                "Dropping message with unsupported jsonrpc version: {:?}",
                envelope.jsonrpc
            );
            return None;
        }

        match envelope.classify() {
            MessageKind::Request(req) => Some(self.handle_request(req)),
            MessageKind::Notification(notif) => {
                self.handle_notification(notif);
                None
            }
            MessageKind::Response => {
                tracing::debug!("Ignoring response-shaped message");
                None
            }
            MessageKind::Malformed => {
                tracing::warn!("Unrecognized message shape");
                None
            }
        }
    }

    fn handle_request(&mut self, request: JsonRpcRequest) -> Value {
        let id = request.id.clone();
        tracing::debug!(id = %id, method = %request.method, "Handling request");

        match self.dispatch_request(request) {
            Ok(value) => JsonRpcResponse::new(id, value).into_value(),
            Err(e) => {
                tracing::debug!(id = %id, "Request failed: {e}");
                e.to_json_rpc_error(id).into_value()
            }
        }
    }

    fn dispatch_request(&mut self, request: JsonRpcRequest) -> McpResult<Value> {
        if request.method == "initialize" && !self.session.is_ready() {
            let result = self.session.initialize(request.params);
            return serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()));
        }

        if !self.session.is_ready() {
            return Err(McpError::InvalidRequest(
                "Server has not been initialized".to_string(),
            ));
        }

        let handler = self
            .methods
            .get(request.method.as_str())
            .copied()
            .ok_or_else(|| McpError::MethodNotFound(request.method.clone()))?;

        handler(self, request.params)
    }

    fn handle_notification(&mut self, notification: JsonRpcNotification) {
        match self.notifications.get(notification.method.as_str()).copied() {
            Some(handler) => handler(self, notification.params),
            None => tracing::debug!("Ignoring notification: {}", notification.method),
        }
    }
}

impl Default for ProtocolHandler {
    fn default() -> Self {
        Self::new(ToolRegistry::builtin())
    }
}
