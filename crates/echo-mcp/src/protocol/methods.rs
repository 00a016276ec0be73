//! Request and notification handlers, keyed by method name.
//!
//! `initialize` is deliberately absent: the handler intercepts the first one,
//! and any later one falls through to the table and is not found.

use std::collections::HashMap;

use serde_json::{json, Value};

use crate::types::{CancelledParams, McpError, McpResult, ToolCallParams, ToolListResult};

use super::handler::ProtocolHandler;

/// Handles a request once the session is ready.
pub type MethodHandler = fn(&ProtocolHandler, Option<Value>) -> McpResult<Value>;

/// Handles a notification. There is no response channel, so nothing is returned.
pub type NotificationHandler = fn(&ProtocolHandler, Option<Value>);

pub fn default_methods() -> HashMap<&'static str, MethodHandler> {
    let mut methods: HashMap<&'static str, MethodHandler> = HashMap::new();
    methods.insert("ping", handle_ping);
    methods.insert("tools/list", handle_tools_list);
    methods.insert("tools/call", handle_tools_call);
    methods.insert("shutdown", handle_shutdown);
    methods
}

pub fn default_notifications() -> HashMap<&'static str, NotificationHandler> {
    let mut notifications: HashMap<&'static str, NotificationHandler> = HashMap::new();
    notifications.insert("notifications/initialized", handle_initialized);
    notifications.insert("notifications/cancelled", handle_cancelled);
    notifications
}

pub fn handle_ping(_handler: &ProtocolHandler, _params: Option<Value>) -> McpResult<Value> {
    Ok(json!({ "result": "pong" }))
}

pub fn handle_tools_list(handler: &ProtocolHandler, _params: Option<Value>) -> McpResult<Value> {
    let result = ToolListResult {
        tools: handler.tools().list_tools(),
        next_cursor: None,
    };
    serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
}

pub fn handle_tools_call(handler: &ProtocolHandler, params: Option<Value>) -> McpResult<Value> {
    let params = match params {
        None | Some(Value::Null) => {
            return Err(McpError::InvalidRequest(
                "Missing params for tools/call".to_string(),
            ))
        }
        Some(params) => params,
    };

    let call_params: ToolCallParams =
        serde_json::from_value(params).map_err(|e| McpError::InternalError(e.to_string()))?;

    let result = handler
        .tools()
        .call(&call_params.name, call_params.arguments)
        .map_err(|e| match e {
            McpError::ToolNotFound(_) | McpError::InternalError(_) => e,
            other => McpError::InternalError(other.to_string()),
        })?;

    serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
}

/// Acknowledge only; the embedding process decides when to exit.
pub fn handle_shutdown(_handler: &ProtocolHandler, _params: Option<Value>) -> McpResult<Value> {
    tracing::info!("Shutdown requested");
    Ok(Value::Object(serde_json::Map::new()))
}

pub fn handle_initialized(handler: &ProtocolHandler, _params: Option<Value>) {
    if handler.session().is_ready() {
        tracing::info!("Client signalled that initialization is complete");
    } else {
        tracing::warn!("Received initialized notification before initialize");
    }
}

pub fn handle_cancelled(_handler: &ProtocolHandler, params: Option<Value>) {
    // Requests finish before the next frame is read, so there is never anything in flight.
    match params.map(serde_json::from_value::<CancelledParams>) {
        Some(Ok(p)) => tracing::info!(
            request_id = %p.request_id,
            reason = p.reason.as_deref().unwrap_or(""),
            "Received cancellation for a request that already completed"
        ),
        _ => tracing::info!("Received cancellation notification"),
    }
}
