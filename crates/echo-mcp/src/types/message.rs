//! JSON-RPC 2.0 envelope types.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::error::{McpError, McpResult};

/// JSON-RPC 2.0 protocol version.
pub const JSONRPC_VERSION: &str = "2.0";

/// Request identifier: any JSON scalar or an explicit null.
///
/// Numbers keep their original digits (serde_json `arbitrary_precision`), so
/// responses echo the id verbatim even past the range of `u64`/`f64`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RequestId {
    String(String),
    Number(serde_json::Number),
    Bool(bool),
    Null,
}

impl<'de> Deserialize<'de> for RequestId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(RequestId::String(s)),
            Value::Number(n) => Ok(RequestId::Number(n)),
            Value::Bool(b) => Ok(RequestId::Bool(b)),
            Value::Null => Ok(RequestId::Null),
            Value::Array(_) | Value::Object(_) => {
                Err(D::Error::custom("request id must be a JSON scalar or null"))
            }
        }
    }
}

impl From<RequestId> for Value {
    fn from(id: RequestId) -> Self {
        match id {
            RequestId::String(s) => Value::String(s),
            RequestId::Number(n) => Value::Number(n),
            RequestId::Bool(b) => Value::Bool(b),
            RequestId::Null => Value::Null,
        }
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestId::String(s) => write!(f, "{s}"),
            RequestId::Number(n) => write!(f, "{n}"),
            RequestId::Bool(b) => write!(f, "{b}"),
            RequestId::Null => write!(f, "null"),
        }
    }
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        RequestId::Number(n.into())
    }
}

/// Any inbound JSON-RPC message before it has been classified.
///
/// `id` is `None` only when the field is absent; `"id": null` decodes to
/// `Some(RequestId::Null)`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub id: Option<RequestId>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub params: Option<Value>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<RequestId>, D::Error>
where
    D: Deserializer<'de>,
{
    RequestId::deserialize(deserializer).map(Some)
}

/// What an envelope turned out to be.
#[derive(Debug, Clone)]
pub enum MessageKind {
    Request(JsonRpcRequest),
    Notification(JsonRpcNotification),
    /// Carries `result` or `error`; this server never issues requests, so these are dropped.
    Response,
    Malformed,
}

impl Envelope {
    /// Decode a payload. Anything but a JSON object with well-typed fields is a parse error.
    pub fn parse(payload: &[u8]) -> McpResult<Self> {
        let value: Value =
            serde_json::from_slice(payload).map_err(|e| McpError::ParseError(e.to_string()))?;
        if !value.is_object() {
            return Err(McpError::ParseError(
                "expected a JSON object".to_string(),
            ));
        }
        serde_json::from_value(value).map_err(|e| McpError::ParseError(e.to_string()))
    }

    pub fn has_supported_version(&self) -> bool {
        self.jsonrpc.as_deref() == Some(JSONRPC_VERSION)
    }

    pub fn classify(self) -> MessageKind {
        let jsonrpc = self.jsonrpc.unwrap_or_default();
        let method = self.method.filter(|m| !m.is_empty());

        match (method, self.id) {
            (Some(method), Some(id)) => MessageKind::Request(JsonRpcRequest {
                jsonrpc,
                id,
                method,
                params: self.params,
            }),
            (Some(method), None) => MessageKind::Notification(JsonRpcNotification {
                jsonrpc,
                method,
                params: self.params,
            }),
            (None, _) if self.result.is_some() || self.error.is_some() => MessageKind::Response,
            (None, _) => MessageKind::Malformed,
        }
    }
}

/// A JSON-RPC 2.0 request message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: RequestId,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// A JSON-RPC 2.0 success response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: RequestId,
    pub result: Value,
}

/// A JSON-RPC 2.0 error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub jsonrpc: String,
    pub id: RequestId,
    pub error: JsonRpcErrorObject,
}

/// Error object within a JSON-RPC error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i32,
    pub message: String,
}

/// A JSON-RPC 2.0 notification (no id, no response expected).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcNotification {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn new(id: RequestId, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}

impl JsonRpcResponse {
    pub fn new(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result,
        }
    }

    /// Build the wire object directly; unlike `serde_json::to_value` this cannot fail.
    pub fn into_value(self) -> Value {
        let mut obj = Map::new();
        obj.insert("jsonrpc".to_string(), Value::String(self.jsonrpc));
        obj.insert("id".to_string(), self.id.into());
        obj.insert("result".to_string(), self.result);
        Value::Object(obj)
    }
}

impl JsonRpcError {
    pub fn new(id: RequestId, code: i32, message: String) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            error: JsonRpcErrorObject { code, message },
        }
    }

    /// Build the wire object directly; unlike `serde_json::to_value` this cannot fail.
    pub fn into_value(self) -> Value {
        let mut error = Map::new();
        error.insert("code".to_string(), Value::from(self.error.code));
        error.insert("message".to_string(), Value::String(self.error.message));

        let mut obj = Map::new();
        obj.insert("jsonrpc".to_string(), Value::String(self.jsonrpc));
        obj.insert("id".to_string(), self.id.into());
        obj.insert("error".to_string(), Value::Object(error));
        Value::Object(obj)
    }
}
