//! Tool abstraction and registry.
//!
//! Tools are the invocable capabilities exposed through `tools/list` and
//! `tools/call`. Each tool implements the [`Tool`] trait; the dispatcher
//! only talks to the [`ToolRegistry`], so new tools register without any
//! dispatcher change.
//!
//! The registry is built once at startup and is read-only afterwards.
//! There are no writers after construction, so sharing it across
//! connection handlers needs no locking.

pub mod echo;

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub use echo::{EchoTool, PipeEchoTool};

/// Describes a tool for the `tools/list` response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON Schema for the tool's input arguments.
    pub input_schema: Value,
}

/// Content item in a tool call result.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
}

/// Result of a successful tool invocation: a sequence of content blocks.
#[derive(Debug, Clone, Serialize)]
pub struct ToolCallResult {
    /// Content returned by the tool.
    pub content: Vec<ToolContent>,
}

impl ToolCallResult {
    /// Creates a result holding a single text content block.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
        }
    }
}

/// Errors surfaced by the tool registry.
#[derive(Debug, Error)]
pub enum ToolError {
    /// No tool is registered under the requested name.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// The tool was found but failed while running.
    #[error("{0}")]
    Invocation(String),
}

/// An invocable capability.
///
/// Implementations must be `Send + Sync`: one registry is shared across
/// all concurrent connection handlers.
pub trait Tool: Send + Sync {
    /// The name this tool registers under.
    fn name(&self) -> &str;

    /// The descriptor advertised through `tools/list`.
    fn descriptor(&self) -> ToolDescriptor;

    /// Runs the tool against the given arguments object.
    ///
    /// # Errors
    ///
    /// Returns a [`ToolError::Invocation`] when the tool cannot produce a
    /// result.
    fn invoke(&self, arguments: &Value) -> Result<ToolCallResult, ToolError>;
}

/// A fixed, name-keyed collection of tools.
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tool under its own name, replacing any previous entry.
    pub fn register(&mut self, tool: impl Tool + 'static) {
        self.tools.insert(tool.name().to_string(), Box::new(tool));
    }

    /// Builds a single-tool registry.
    #[must_use]
    pub fn with_tool(tool: impl Tool + 'static) -> Self {
        let mut registry = Self::new();
        registry.register(tool);
        registry
    }

    /// Returns the descriptors of all registered tools, in name order.
    #[must_use]
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools.values().map(|tool| tool.descriptor()).collect()
    }

    /// Looks up and invokes a tool by name.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::UnknownTool`] when no tool is registered under
    /// `name`, or the tool's own [`ToolError::Invocation`] failure.
    pub fn invoke(&self, name: &str, arguments: &Value) -> Result<ToolCallResult, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        tool.invoke(arguments)
    }

    /// Returns the number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns `true` when no tools are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
