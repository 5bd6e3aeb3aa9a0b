//! Default on-disk locations.
//!
//! The backing file lives next to the service executable, so each install
//! keeps its own records:
//!   <exe dir>/person_data.json
//! If the executable path cannot be resolved, fall back to the platform data
//! directory:
//!   Linux:   $XDG_DATA_HOME/person-info-mcp (default ~/.local/share)
//!   macOS:   ~/Library/Application Support/person-info-mcp
//!   Windows: %APPDATA%/person-info-mcp

use std::path::PathBuf;

/// File name of the backing store.
pub const DATA_FILE_NAME: &str = "person_data.json";

const APP_DIR_NAME: &str = "person-info-mcp";

/// Default path of the backing file.
pub fn default_data_file() -> PathBuf {
    exe_dir()
        .unwrap_or_else(fallback_data_dir)
        .join(DATA_FILE_NAME)
}

fn exe_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(PathBuf::from))
}

fn fallback_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}
