//! MCP (Model Context Protocol) server implementation.
//!
//! Provides a JSON-RPC over stdio server that exposes the person record
//! tools to MCP clients.
//!
//! Architecture:
//! - `server.rs` -- JSON-RPC protocol handler (stdin/stdout)
//! - `tools.rs`  -- Tool definitions and input schemas
//! - `handlers/` -- Tool handler implementations

pub mod handlers;
pub mod server;
pub mod tools;
