//! Utility functions used by the binary

use std::path::PathBuf;

/// Get platform-specific debug log path
pub fn get_debug_log_path() -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push("listrender-debug.log");
    path
}

/// Candidate settings files, most specific first
pub fn settings_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("listrender").join("settings.yaml"));
    }
    paths.push(PathBuf::from("settings.yaml"));
    paths
}
