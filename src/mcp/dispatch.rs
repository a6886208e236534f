//! Transport-agnostic request dispatcher.
//!
//! Both transports hand framed text units to the same [`Dispatcher`]. It
//! decodes the unit, classifies it, routes requests through the method
//! table, and produces at most one [`Reply`]:
//!
//! - a request yields exactly one reply (result or error);
//! - the `notifications/initialized` notification yields `None` and the
//!   caller must emit nothing for it;
//! - undecodable input yields a parse-error reply so the peer's read loop
//!   never stalls waiting for an answer.
//!
//! The dispatcher holds no per-request state and is shared across
//! connection handlers behind an `Arc`; every method answers from the
//! immutable [`ToolRegistry`] and [`ServerInfo`] captured at startup.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::mcp::protocol::{
    JsonRpcError, JsonRpcResponse, Message, Reply, MCP_PROTOCOL_VERSION, NOTIFICATION_INITIALIZED,
};
use crate::tools::{ToolError, ToolRegistry};

/// Server identity advertised in the `initialize` response.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
}

impl ServerInfo {
    /// Creates a server identity with this crate's version.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Parameters of a `tools/call` request.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    /// Name of the tool to call.
    #[serde(default)]
    pub name: String,
    /// Arguments for the tool.
    #[serde(default)]
    pub arguments: Value,
}

/// Routes decoded messages to method handlers.
pub struct Dispatcher {
    info: ServerInfo,
    tools: ToolRegistry,
}

impl Dispatcher {
    /// Creates a dispatcher over the given identity and tool set.
    #[must_use]
    pub fn new(info: ServerInfo, tools: ToolRegistry) -> Self {
        Self { info, tools }
    }

    /// Decodes and dispatches one framed text unit.
    ///
    /// Returns `None` when the unit is a notification; otherwise exactly
    /// one reply, including the parse-error reply for undecodable input.
    #[must_use]
    pub fn dispatch_text(&self, text: &str) -> Option<Reply> {
        match Message::decode(text) {
            Ok(msg) => self.dispatch(&msg),
            Err(e) => {
                warn!(error = %e, "failed to decode incoming message");
                Some(Reply::Error(JsonRpcError::parse_error(e)))
            }
        }
    }

    /// Dispatches a decoded message through the method table.
    ///
    /// Method lookup is an exact, case-sensitive string match.
    #[must_use]
    pub fn dispatch(&self, msg: &Message) -> Option<Reply> {
        // Classification is by method name, not id presence (see the
        // protocol module docs).
        if msg.method == NOTIFICATION_INITIALIZED {
            debug!("received initialized notification");
            return None;
        }

        debug!(method = %msg.method, id = %msg.id, "dispatching request");

        let reply = match msg.method.as_str() {
            "initialize" => Ok(self.handle_initialize(msg)),
            "tools/list" => Ok(self.handle_tools_list(msg)),
            "tools/call" => self.handle_tools_call(msg),
            other => Err(JsonRpcError::method_not_found(msg.id.clone(), other)),
        };

        Some(match reply {
            Ok(resp) => Reply::Result(resp),
            Err(error) => Reply::Error(error),
        })
    }

    /// Handles the `initialize` request with the static capability
    /// descriptor.
    fn handle_initialize(&self, msg: &Message) -> JsonRpcResponse {
        let result = json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": {
                "tools": {
                    "listChanged": true
                },
                "logging": {}
            },
            "serverInfo": &self.info,
        });

        JsonRpcResponse::success(msg.id.clone(), result)
    }

    /// Handles the `tools/list` request.
    fn handle_tools_list(&self, msg: &Message) -> JsonRpcResponse {
        let result = json!({
            "tools": self.tools.descriptors(),
        });

        JsonRpcResponse::success(msg.id.clone(), result)
    }

    /// Handles the `tools/call` request.
    fn handle_tools_call(&self, msg: &Message) -> Result<JsonRpcResponse, JsonRpcError> {
        let params: ToolCallParams = serde_json::from_value(msg.params.clone()).map_err(|e| {
            JsonRpcError::invalid_params(msg.id.clone(), format!("Invalid tool call params: {e}"))
        })?;

        let result = match self.tools.invoke(&params.name, &params.arguments) {
            Ok(result) => result,
            Err(ToolError::UnknownTool(name)) => {
                return Err(JsonRpcError::unknown_tool(msg.id.clone(), &name));
            }
            Err(ToolError::Invocation(message)) => {
                warn!(tool = %params.name, error = %message, "tool invocation failed");
                return Err(JsonRpcError::internal_error(msg.id.clone(), message));
            }
        };

        let result_value = serde_json::to_value(&result)
            .map_err(|e| JsonRpcError::internal_error(msg.id.clone(), e.to_string()))?;

        Ok(JsonRpcResponse::success(msg.id.clone(), result_value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::protocol::RequestId;
    use crate::tools::EchoTool;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(
            ServerInfo::new("echo-mcp-server"),
            ToolRegistry::with_tool(EchoTool),
        )
    }

    fn reply_value(reply: &Reply) -> Value {
        serde_json::to_value(reply).unwrap()
    }

    #[test]
    fn initialize_reports_capabilities_and_echoes_id() {
        let reply = dispatcher()
            .dispatch_text(r#"{"jsonrpc":"2.0","id":5,"method":"initialize","params":{}}"#)
            .unwrap();
        let value = reply_value(&reply);

        assert_eq!(value["id"], 5);
        assert_eq!(value["result"]["protocolVersion"], MCP_PROTOCOL_VERSION);
        assert_eq!(value["result"]["capabilities"]["tools"]["listChanged"], true);
        assert_eq!(value["result"]["capabilities"]["logging"], json!({}));
        assert_eq!(value["result"]["serverInfo"]["name"], "echo-mcp-server");
    }

    #[test]
    fn tools_list_returns_registry_contents() {
        let reply = dispatcher()
            .dispatch_text(r#"{"jsonrpc":"2.0","id":2,"method":"tools/list","params":{}}"#)
            .unwrap();
        let value = reply_value(&reply);

        let tools = value["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["name"], "echo");
        assert_eq!(tools[0]["inputSchema"]["required"], json!(["text"]));
    }

    #[test]
    fn tools_call_invokes_echo() {
        let reply = dispatcher()
            .dispatch_text(
                r#"{"jsonrpc":"2.0","id":7,"method":"tools/call","params":{"name":"echo","arguments":{"text":"hi"}}}"#,
            )
            .unwrap();
        let value = reply_value(&reply);

        assert_eq!(value["id"], 7);
        assert_eq!(value["result"]["content"][0]["text"], "Echo: hi");
    }

    #[test]
    fn tools_call_unknown_tool() {
        let reply = dispatcher()
            .dispatch_text(
                r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"nope","arguments":{}}}"#,
            )
            .unwrap();
        let value = reply_value(&reply);

        assert_eq!(value["error"]["code"], -32601);
        assert_eq!(value["error"]["message"], "Unknown tool: nope");
    }

    #[test]
    fn tools_call_with_undecodable_params() {
        let reply = dispatcher()
            .dispatch_text(r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":[1,2]}"#)
            .unwrap();
        let value = reply_value(&reply);

        assert_eq!(value["id"], 4);
        assert_eq!(value["error"]["code"], -32602);
    }

    #[test]
    fn unknown_method_embeds_name() {
        let reply = dispatcher()
            .dispatch_text(r#"{"jsonrpc":"2.0","id":9,"method":"resources/list"}"#)
            .unwrap();
        let value = reply_value(&reply);

        assert_eq!(value["error"]["code"], -32601);
        assert_eq!(value["error"]["message"], "Method not found: resources/list");
    }

    #[test]
    fn method_lookup_is_case_sensitive() {
        let reply = dispatcher()
            .dispatch_text(r#"{"jsonrpc":"2.0","id":1,"method":"Initialize"}"#)
            .unwrap();
        let value = reply_value(&reply);
        assert_eq!(value["error"]["code"], -32601);
    }

    #[test]
    fn initialized_notification_is_suppressed() {
        let reply = dispatcher()
            .dispatch_text(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#);
        assert!(reply.is_none());
    }

    #[test]
    fn parse_failure_still_yields_one_reply() {
        let reply = dispatcher().dispatch_text("{invalid").unwrap();
        let value = reply_value(&reply);

        assert_eq!(value["id"], 1);
        assert_eq!(value["error"]["code"], -32700);
        assert!(value["error"]["message"]
            .as_str()
            .unwrap()
            .starts_with("Parse error: "));
    }

    #[test]
    fn string_id_is_echoed_verbatim() {
        let reply = dispatcher()
            .dispatch_text(r#"{"jsonrpc":"2.0","id":"req-1","method":"initialize"}"#)
            .unwrap();
        assert_eq!(reply.id(), &RequestId::String("req-1".to_string()));
    }

    #[test]
    fn missing_id_defaults_to_one() {
        let reply = dispatcher()
            .dispatch_text(r#"{"jsonrpc":"2.0","method":"tools/list"}"#)
            .unwrap();
        assert_eq!(reply.id(), &RequestId::Number(1));
    }
}
