//! JSON-RPC 2.0 message types for the MCP echo server.
//!
//! This module defines the wire types shared by both transports and the
//! decoder that turns one framed text unit into a [`Message`].
//!
//! # Message Types
//!
//! - **Message**: a decoded incoming unit (request or notification)
//! - **Reply**: an outgoing unit, either a result or an error response
//!
//! # Dialect Constraints
//!
//! This server speaks a relaxed dialect rather than strict JSON-RPC, for
//! compatibility with existing clients of this wire format:
//!
//! - The `jsonrpc` field of incoming messages is not enforced; outgoing
//!   messages always carry `"2.0"`.
//! - A message is a notification iff its method is
//!   `notifications/initialized`; id presence plays no part in
//!   classification.
//! - When no usable `id` is present (including the parse-failure path,
//!   where none can be recovered), replies carry the fallback id `1`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// The MCP protocol version this implementation supports.
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

/// The only incoming method treated as a notification (no reply emitted).
pub const NOTIFICATION_INITIALIZED: &str = "notifications/initialized";

/// A JSON-RPC 2.0 request ID.
///
/// Per the MCP specification, IDs must be strings or integers. Other id
/// shapes in incoming messages fall back to [`RequestId::FALLBACK`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// Numeric request ID.
    Number(i64),
    /// String request ID.
    String(String),
}

impl RequestId {
    /// The id used when a message carries none, or none that can be
    /// recovered (as after a parse failure).
    pub const FALLBACK: Self = Self::Number(1);
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
        }
    }
}

/// Failure to turn a framed text unit into a [`Message`].
///
/// Carries the underlying diagnostic so the error reply can embed it.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The text is not syntactically valid JSON.
    #[error("{0}")]
    Syntax(#[from] serde_json::Error),

    /// The text parsed but the top-level value is not an object.
    #[error("top-level JSON value is not an object")]
    NotAnObject,
}

/// A decoded incoming message.
///
/// Immutable once decoded; the dispatcher never mutates it. Whether it is
/// a request or a notification is decided by the dispatcher from the
/// method name alone.
#[derive(Debug, Clone)]
pub struct Message {
    /// The method to invoke. Empty when the payload had no `method` field.
    pub method: String,
    /// Method parameters; an empty object when absent.
    pub params: Value,
    /// The request id to echo in the reply; [`RequestId::FALLBACK`] when
    /// absent or not a string/integer.
    pub id: RequestId,
}

impl Message {
    /// Decodes one framed text unit.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] when `text` is not a JSON object.
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_str(text)?;
        let obj = value.as_object().ok_or(DecodeError::NotAnObject)?;

        let method = obj
            .get("method")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let params = obj
            .get("params")
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));

        let id = match obj.get("id") {
            Some(Value::Number(n)) => n.as_i64().map_or(RequestId::FALLBACK, RequestId::Number),
            Some(Value::String(s)) => RequestId::String(s.clone()),
            _ => RequestId::FALLBACK,
        };

        Ok(Self { method, params, id })
    }
}

/// A successful JSON-RPC 2.0 response.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    /// Always "2.0".
    pub jsonrpc: &'static str,

    /// The request ID this response corresponds to.
    pub id: RequestId,

    /// The result of the method call.
    pub result: Value,
}

impl JsonRpcResponse {
    /// Creates a new success response.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Value is not const-compatible
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result,
        }
    }
}

/// Standard JSON-RPC 2.0 error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Invalid JSON was received by the server.
    ParseError,
    /// The method or tool does not exist.
    MethodNotFound,
    /// Invalid method parameters.
    InvalidParams,
    /// Internal JSON-RPC error.
    InternalError,
}

impl ErrorCode {
    /// Returns the numeric code for this error.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::ParseError => -32700,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
        }
    }
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcErrorData {
    /// The error code.
    pub code: i32,

    /// A short description of the error.
    pub message: String,
}

impl JsonRpcErrorData {
    /// Creates a new error with the given code and message.
    #[must_use]
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            message: message.into(),
        }
    }
}

/// A JSON-RPC 2.0 error response.
///
/// The id is always present in this dialect: when the originating request
/// id cannot be recovered the fallback id `1` is used.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    /// Always "2.0".
    pub jsonrpc: &'static str,

    /// The request ID this error corresponds to.
    pub id: RequestId,

    /// The error details.
    pub error: JsonRpcErrorData,
}

impl JsonRpcError {
    /// Creates a new error response.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // JsonRpcErrorData contains String
    pub fn new(id: RequestId, error: JsonRpcErrorData) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            error,
        }
    }

    /// Creates a parse error response carrying the decoder diagnostic.
    ///
    /// The originating id is unrecoverable, so the fallback id is used.
    #[must_use]
    pub fn parse_error(diagnostic: impl std::fmt::Display) -> Self {
        Self::new(
            RequestId::FALLBACK,
            JsonRpcErrorData::with_message(
                ErrorCode::ParseError,
                format!("Parse error: {diagnostic}"),
            ),
        )
    }

    /// Creates a method not found error response.
    #[must_use]
    pub fn method_not_found(id: RequestId, method: &str) -> Self {
        Self::new(
            id,
            JsonRpcErrorData::with_message(
                ErrorCode::MethodNotFound,
                format!("Method not found: {method}"),
            ),
        )
    }

    /// Creates an unknown tool error response.
    #[must_use]
    pub fn unknown_tool(id: RequestId, name: &str) -> Self {
        Self::new(
            id,
            JsonRpcErrorData::with_message(
                ErrorCode::MethodNotFound,
                format!("Unknown tool: {name}"),
            ),
        )
    }

    /// Creates an invalid params error response.
    #[must_use]
    pub fn invalid_params(id: RequestId, message: impl Into<String>) -> Self {
        Self::new(
            id,
            JsonRpcErrorData::with_message(ErrorCode::InvalidParams, message),
        )
    }

    /// Creates an internal error response.
    #[must_use]
    pub fn internal_error(id: RequestId, message: impl Into<String>) -> Self {
        Self::new(
            id,
            JsonRpcErrorData::with_message(ErrorCode::InternalError, message),
        )
    }
}

/// An outgoing message: exactly one of result or error.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Reply {
    /// A result response.
    Result(JsonRpcResponse),
    /// An error response.
    Error(JsonRpcError),
}

impl Reply {
    /// Returns the id this reply will be delivered under.
    #[must_use]
    pub const fn id(&self) -> &RequestId {
        match self {
            Self::Result(resp) => &resp.id,
            Self::Error(err) => &err.id,
        }
    }
}
