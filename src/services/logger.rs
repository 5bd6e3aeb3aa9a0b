use std::fs;
use std::path::Path;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging for the stdio server.
///
/// Sets up:
/// - Console output on **stderr** (stdout carries JSON-RPC), no ANSI colors
///   since MCP clients usually capture it into their own log.
/// - Optional file output: `{log_dir}/person-info.YYYY-MM-DD.log`, daily
///   rotation, keeping the latest 5 files.
/// - Environment filter: defaults to `info`, configurable via `RUST_LOG`.
///
/// Returns an error if a global subscriber is already installed.
pub fn init(log_dir: Option<&Path>) -> Result<(), String> {
    let file_layer = log_dir.and_then(|dir| {
        if let Err(e) = fs::create_dir_all(dir) {
            eprintln!("[Logger] Cannot create {}: {}", dir.display(), e);
            return None;
        }
        match RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("person-info")
            .filename_suffix("log")
            .max_log_files(5)
            .build(dir)
        {
            Ok(appender) => Some(
                fmt::layer()
                    .with_writer(appender)
                    .with_ansi(false)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            ),
            Err(e) => {
                eprintln!("[Logger] File logging disabled: {}", e);
                None
            }
        }
    });

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true)
        .compact();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| format!("Logger already initialized: {}", e))?;

    if let Some(dir) = log_dir {
        tracing::info!(log_dir = %dir.display(), "Logger initialized");
    }
    Ok(())
}
