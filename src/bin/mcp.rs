//! Standalone MCP server binary for the person record store.
//!
//! Spawned by an MCP client as a tool server; speaks JSON-RPC 2.0 over
//! **stdio**, one message per line. Logs go to stderr.
//!
//! Environment variables:
//! - `PERSON_INFO_DATA_FILE` -- backing JSON file (default: `person_data.json` next to this binary)
//! - `PERSON_INFO_LOG_DIR` -- also write daily-rotated log files here
//! - `PERSON_INFO_TRANSLITERATION` -- set to `off` to disable pinyin matching
//! - `RUST_LOG` -- log filter (default `info`)

use person_info_lib::config::ServerConfig;
use person_info_lib::matcher::default_romanizer;
use person_info_lib::mcp::server::{run_server, McpServerState};
use person_info_lib::services::logger;
use person_info_lib::store::PersonStore;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let config = ServerConfig::from_env();

    if let Err(e) = logger::init(config.log_dir.as_deref()) {
        eprintln!("[MCP] {}", e);
    }
    config.report_warnings();

    let store = PersonStore::open(&config.data_file);
    let romanizer = default_romanizer(config.transliteration);
    let state = McpServerState::new(store, romanizer);

    // Blocks until stdin closes
    if let Err(e) = run_server(state).await {
        tracing::error!("[MCP] Server error: {}", e);
        std::process::exit(1);
    }
}
