//! The echo tools.
//!
//! One per transport demo: `echo` is served by the stdio binary,
//! `pipe_echo` by the socket binary. Both read a single string argument
//! (empty string when absent) and return it behind a fixed prefix as one
//! text content block.

use serde_json::{json, Value};

use crate::tools::{Tool, ToolCallResult, ToolDescriptor, ToolError};

/// `echo` — echoes the `text` argument behind an `Echo: ` prefix.
pub struct EchoTool;

impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "echo".to_string(),
            description: "Echo back the input text".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "text": {
                        "type": "string",
                        "description": "Text to echo back"
                    }
                },
                "required": ["text"]
            }),
        }
    }

    fn invoke(&self, arguments: &Value) -> Result<ToolCallResult, ToolError> {
        let text = arguments.get("text").and_then(Value::as_str).unwrap_or_default();
        Ok(ToolCallResult::text(format!("Echo: {text}")))
    }
}

/// `pipe_echo` — echoes the `message` argument behind a
/// `Named Pipe Echo: ` prefix.
pub struct PipeEchoTool;

impl Tool for PipeEchoTool {
    fn name(&self) -> &str {
        "pipe_echo"
    }

    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "pipe_echo".to_string(),
            description: "Echo text through named pipe".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "message": {
                        "type": "string",
                        "description": "Message to echo back"
                    }
                },
                "required": ["message"]
            }),
        }
    }

    fn invoke(&self, arguments: &Value) -> Result<ToolCallResult, ToolError> {
        let message = arguments
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default();
        Ok(ToolCallResult::text(format!("Named Pipe Echo: {message}")))
    }
}
