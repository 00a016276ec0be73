//! Tool: echo. Returns the caller's text unchanged.

use serde_json::{json, Map, Value};

use crate::types::{McpResult, ToolCallResult, ToolDefinition};

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "echo".to_string(),
        description: Some("Return the same text that the caller provides.".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "text": {
                    "type": "string",
                    "description": "Text to echo back to the caller."
                }
            },
            "required": ["text"]
        }),
    }
}

/// A missing or non-string `text` echoes an empty string instead of failing.
pub fn execute(args: &Map<String, Value>) -> McpResult<ToolCallResult> {
    let text = match args.get("text") {
        Some(Value::String(text)) => text.clone(),
        other => {
            tracing::debug!(?other, "echo called without a string `text`, using empty string");
            String::new()
        }
    };

    Ok(ToolCallResult::text(text))
}
