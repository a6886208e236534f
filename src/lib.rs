//! echo-mcp: a minimal MCP echo server over two transports
//!
//! This library implements the Model Context Protocol handshake/tool
//! dialect of JSON-RPC 2.0 and exposes it over newline-delimited stdio
//! and over a Unix domain socket. Both transports feed the same
//! transport-agnostic dispatcher, which routes requests through a fixed
//! method table and a pluggable tool registry.
//!
//! # Modules
//!
//! - [`config`] — Configuration loading and validation
//! - [`error`] — Error types
//! - [`mcp`] — Protocol types, dispatcher, and transports
//! - [`tools`] — Tool trait, registry, and the echo tools

pub mod config;
pub mod error;
pub mod mcp;
pub mod tools;
