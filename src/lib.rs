//! Personal record store with fuzzy name search, served as an MCP tool
//! server over stdio.
//!
//! - [`store`] -- name-keyed records persisted to one JSON file
//! - [`matcher`] -- prefix/suffix/substring name matching, with pinyin
//!   fallback for Chinese names
//! - [`mcp`] -- JSON-RPC framing and the six person tools

pub mod config;
pub mod matcher;
pub mod mcp;
pub mod services;
pub mod store;
