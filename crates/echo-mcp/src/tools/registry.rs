//! Tool registration and dispatch.

use serde_json::{Map, Value};

use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

use super::echo;

/// Tool entry point. Receives the `arguments` object of a `tools/call` request.
pub type ToolFn = fn(&Map<String, Value>) -> McpResult<ToolCallResult>;

/// A registered tool: its advertised descriptor and the function behind it.
#[derive(Clone)]
pub struct Tool {
    pub definition: ToolDefinition,
    pub invoke: ToolFn,
}

/// Name-indexed tool table, kept in definition order.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Tool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The tools this server ships with.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(echo::definition(), echo::execute);
        registry
    }

    /// Add a tool. A tool with the same name is replaced where it stands.
    pub fn register(&mut self, definition: ToolDefinition, invoke: ToolFn) {
        let tool = Tool { definition, invoke };
        match self
            .tools
            .iter_mut()
            .find(|t| t.definition.name == tool.definition.name)
        {
            Some(existing) => *existing = tool,
            None => self.tools.push(tool),
        }
    }

    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition.clone()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.iter().find(|t| t.definition.name == name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn call(&self, name: &str, arguments: Option<Map<String, Value>>) -> McpResult<ToolCallResult> {
        let tool = self
            .get(name)
            .ok_or_else(|| McpError::ToolNotFound(name.to_string()))?;
        let args = arguments.unwrap_or_default();

        tracing::debug!(tool = name, "invoking tool");
        (tool.invoke)(&args)
    }
}
