//! Data directory layout.
//!
//! Everything the manager stores lives under one data directory:
//! `convs.db` (SQLite) and `config.toml`.

use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "CONVS_DATA_DIR";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `CONVS_DATA_DIR` environment variable
/// 2. `~/.convs`
/// 3. `./.convs` when no home directory is known
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".convs");
    }

    PathBuf::from(".convs")
}

/// SQLite connection URL for the database inside `data_dir`.
pub fn database_url(data_dir: &Path) -> String {
    format!("sqlite://{}?mode=rwc", data_dir.join("convs.db").display())
}
