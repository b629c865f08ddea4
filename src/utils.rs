//! Directory helpers following the XDG Base Directory specification
//!
//! - Config: `~/.config/slcheck/` - `config.json`
//! - Data: `~/.local/share/slcheck/` - default location for snapshots
//!
//! # Example
//!
//! ```
//! use slcheck::utils::get_config_dir;
//!
//! if let Some(dir) = get_config_dir() {
//!     println!("config lives in {}", dir.display());
//! }
//! ```

use directories::ProjectDirs;
use std::path::PathBuf;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "slcheck", "slcheck")
}

pub fn get_config_dir() -> Option<PathBuf> {
    project_dirs().map(|pd| pd.config_dir().to_path_buf())
}

pub fn get_data_dir() -> Option<PathBuf> {
    project_dirs().map(|pd| pd.data_dir().to_path_buf())
}

/// Resolves a snapshot argument: existing paths are used as given, bare
/// file names fall back to the data directory.
pub fn resolve_snapshot(path: &std::path::Path) -> PathBuf {
    if path.exists() || path.components().count() > 1 {
        return path.to_path_buf();
    }
    get_data_dir()
        .map(|dir| dir.join(path))
        .filter(|candidate| candidate.exists())
        .unwrap_or_else(|| path.to_path_buf())
}
