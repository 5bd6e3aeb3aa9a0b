//! MCP JSON-RPC protocol handler over stdio.
//!
//! Reads one JSON-RPC request per line, routes tool calls to the person
//! handlers, and writes one response line per request. Implements the MCP
//! methods: `initialize`, `notifications/initialized`, `ping`, `tools/list`,
//! `tools/call`. Diagnostics go to stderr through `tracing`.

use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{error, info, warn};

use super::handlers::{person, McpToolResult};
use super::tools;
use crate::matcher::Romanizer;
use crate::store::PersonStore;

const PROTOCOL_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "person-info-mcp-server";

const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;
const INTERNAL_ERROR: i64 = -32603;

// ---------------------------------------------------------------------------
// JSON-RPC message types
// ---------------------------------------------------------------------------

/// Incoming JSON-RPC request.
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    #[serde(default)]
    jsonrpc: Option<String>,
    #[serde(default)]
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

/// Outgoing JSON-RPC response.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    jsonrpc: String,
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

/// JSON-RPC error object.
#[derive(Debug, Serialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

impl JsonRpcResponse {
    fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            result: Some(result),
            error: None,
        }
    }

    fn error(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// MCP Server
// ---------------------------------------------------------------------------

/// Everything a request needs: the store and the search romanizer.
pub struct McpServerState {
    store: PersonStore,
    romanizer: Box<dyn Romanizer>,
}

impl McpServerState {
    pub fn new(store: PersonStore, romanizer: Box<dyn Romanizer>) -> Self {
        Self { store, romanizer }
    }

    pub fn store(&self) -> &PersonStore {
        &self.store
    }
}

/// Run the MCP server on stdin/stdout until stdin closes.
pub async fn run_server(state: McpServerState) -> std::io::Result<()> {
    let reader = BufReader::new(tokio::io::stdin());
    let writer = tokio::io::stdout();
    serve(state, reader, writer).await
}

/// Serve line-delimited JSON-RPC from `reader` to `writer`.
///
/// Requests are handled strictly one at a time; returns once the reader is
/// exhausted.
pub async fn serve<R, W>(
    mut state: McpServerState,
    reader: R,
    mut writer: W,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    info!(
        data_file = %state.store.path().display(),
        records = state.store.len(),
        transliteration = state.romanizer.is_available(),
        "Person info MCP server running"
    );

    let mut lines = reader.lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!("[MCP] Failed to read stdin: {}", e);
                return Err(e);
            }
        };
        if let Some(resp) = handle_line(&mut state, &line) {
            write_response(&mut writer, &resp).await;
        }
    }

    info!("MCP server stdin closed, shutting down");
    Ok(())
}

/// Handle one raw input line. `None` means nothing should be written back.
pub fn handle_line(state: &mut McpServerState, line: &str) -> Option<JsonRpcResponse> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let raw: Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => {
            warn!("[MCP] Parse error: {}", e);
            return Some(JsonRpcResponse::error(Value::Null, PARSE_ERROR, "Parse error"));
        }
    };

    let raw_id = raw.get("id").cloned();
    let request: JsonRpcRequest = match serde_json::from_value(raw) {
        Ok(req) => req,
        Err(e) => {
            return Some(JsonRpcResponse::error(
                raw_id.unwrap_or(Value::Null),
                INVALID_REQUEST,
                format!("Invalid request: {}", e),
            ));
        }
    };

    if let Some(version) = request.jsonrpc.as_deref() {
        if version != "2.0" {
            return request.id.map(|id| {
                JsonRpcResponse::error(id, INVALID_REQUEST, "Invalid JSON-RPC version")
            });
        }
    }

    let id = request.id.clone().unwrap_or(Value::Null);
    let response = match catch_unwind(AssertUnwindSafe(|| handle_request(state, &request))) {
        Ok(response) => response,
        Err(_) => {
            error!("[MCP] Handler panicked on method {}", request.method);
            Some(JsonRpcResponse::error(id, INTERNAL_ERROR, "Internal error"))
        }
    };

    // Notifications (no id) don't get a response
    if request.id.is_none() {
        return None;
    }
    response
}

/// Handle a single JSON-RPC request and return a response.
fn handle_request(state: &mut McpServerState, request: &JsonRpcRequest) -> Option<JsonRpcResponse> {
    let id = request.id.clone().unwrap_or(Value::Null);

    match request.method.as_str() {
        "initialize" => Some(handle_initialize(id)),
        "initialized" | "notifications/initialized" => {
            info!("[MCP] Client sent 'initialized' notification");
            None
        }
        "notifications/cancelled" => {
            info!("[MCP] Request cancelled: {:?}", request.params);
            None
        }
        "ping" => Some(JsonRpcResponse::success(id, json!({}))),
        "tools/list" => Some(handle_tools_list(id)),
        "tools/call" => Some(handle_tools_call(state, id, &request.params)),
        _ => Some(JsonRpcResponse::error(
            id,
            METHOD_NOT_FOUND,
            format!("Method not found: {}", request.method),
        )),
    }
}

/// Handle `initialize` -- return server capabilities.
fn handle_initialize(id: Value) -> JsonRpcResponse {
    JsonRpcResponse::success(
        id,
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION"),
                "description": "Personal record server: add, get, search, list, update and delete people"
            }
        }),
    )
}

/// Handle `tools/list` -- return the person tool definitions.
fn handle_tools_list(id: Value) -> JsonRpcResponse {
    JsonRpcResponse::success(id, json!({ "tools": tools::person_tools() }))
}

/// Handle `tools/call` -- dispatch to the appropriate tool handler.
fn handle_tools_call(state: &mut McpServerState, id: Value, params: &Value) -> JsonRpcResponse {
    let tool_name = params.get("name").and_then(|v| v.as_str()).unwrap_or("");
    if tool_name.is_empty() {
        return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing tool name in params");
    }

    let args = match params.get("arguments") {
        None | Some(Value::Null) => json!({}),
        Some(v @ Value::Object(_)) => v.clone(),
        Some(_) => {
            return JsonRpcResponse::error(id, INVALID_PARAMS, "Tool arguments must be an object");
        }
    };

    let result = route_tool_call(state, tool_name, &args);
    match serde_json::to_value(&result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => {
            error!("[MCP] Failed to encode {} result: {}", tool_name, e);
            JsonRpcResponse::error(id, INTERNAL_ERROR, format!("Internal error: {}", e))
        }
    }
}

/// Route a tool call to its handler.
fn route_tool_call(state: &mut McpServerState, name: &str, args: &Value) -> McpToolResult {
    let store = &mut state.store;
    match name {
        "add_person" => person::handle_add_person(args, store),
        "get_person" => person::handle_get_person(args, store),
        "search_persons" => person::handle_search_persons(args, store, state.romanizer.as_ref()),
        "list_all_persons" => person::handle_list_all_persons(args, store),
        "update_person" => person::handle_update_person(args, store),
        "delete_person" => person::handle_delete_person(args, store),
        _ => super::handlers::ToolOutcome::failed(format!("Unknown tool: {}", name)).into(),
    }
}

/// Write a JSON-RPC response as one line.
async fn write_response<W: AsyncWrite + Unpin>(writer: &mut W, response: &JsonRpcResponse) {
    match serde_json::to_string(response) {
        Ok(json) => {
            let line = format!("{}\n", json);
            if let Err(e) = writer.write_all(line.as_bytes()).await {
                error!("[MCP] Failed to write response: {}", e);
            }
            if let Err(e) = writer.flush().await {
                error!("[MCP] Failed to flush stdout: {}", e);
            }
        }
        Err(e) => {
            error!("[MCP] Failed to serialize response: {}", e);
        }
    }
}
