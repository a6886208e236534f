//! Model Context Protocol (MCP) echo server implementation.
//!
//! This module implements the MCP handshake/tool dialect of JSON-RPC 2.0
//! over two interchangeable transports: newline-delimited stdio and a
//! Unix domain socket. Both feed the same transport-agnostic dispatcher.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Echo MCP Server                       │
//! │                                                              │
//! │   ┌──────────────┐     ┌────────────┐     ┌─────────────┐    │
//! │   │  Transport   │────▶│ Dispatcher │────▶│    Tool     │    │
//! │   │ stdio/socket │     │ (methods)  │     │  Registry   │    │
//! │   └──────────────┘     └────────────┘     └─────────────┘    │
//! │          │                    │                   │          │
//! │          ▼                    ▼                   ▼          │
//! │   ┌──────────────────────────────────────────────────┐       │
//! │   │               JSON-RPC Messages                  │       │
//! │   └──────────────────────────────────────────────────┘       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Protocol Version
//!
//! This implementation targets MCP protocol version 2024-11-05.

pub mod dispatch;
pub mod protocol;
pub mod server;
#[cfg(unix)]
pub mod socket;
pub mod transport;

pub use dispatch::{Dispatcher, ServerInfo};
pub use protocol::{JsonRpcError, JsonRpcResponse, Message, Reply, MCP_PROTOCOL_VERSION};
pub use server::StdioServer;
#[cfg(unix)]
pub use socket::SocketServer;
pub use transport::StdioTransport;
