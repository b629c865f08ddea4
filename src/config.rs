use crate::core::address::MembershipPolicy;
use crate::core::rule::InvalidRulePolicy;
use crate::format::DEFAULT_COLUMN_WIDTH;
use crate::utils::get_config_dir;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name of the configuration inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Widest column accepted for listing output
pub const MAX_COLUMN_WIDTH: usize = 200;

/// Complete application configuration
///
/// Every field has a default so a partial file only overrides what it names.
/// Command-line flags take precedence over the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory that receives matched lists and route tables
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Let `0.0.0.0/0` match IP searches
    #[serde(default)]
    pub include_full_range: bool,
    /// Width of one padded column in listing output (clamped to 1..=200)
    #[serde(default = "default_column_width")]
    pub column_width: usize,
    /// Skip rules that fail to normalize instead of aborting the run
    #[serde(default)]
    pub skip_invalid: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            include_full_range: false,
            column_width: DEFAULT_COLUMN_WIDTH,
            skip_invalid: false,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_column_width() -> usize {
    DEFAULT_COLUMN_WIDTH
}

impl AppConfig {
    pub fn membership_policy(&self) -> MembershipPolicy {
        MembershipPolicy {
            include_full_range: self.include_full_range,
        }
    }

    pub fn invalid_rule_policy(&self) -> InvalidRulePolicy {
        if self.skip_invalid {
            InvalidRulePolicy::Skip
        } else {
            InvalidRulePolicy::Abort
        }
    }

    pub fn column_width(&self) -> usize {
        self.column_width.clamp(1, MAX_COLUMN_WIDTH)
    }
}

/// Default location of the config file, if a home directory is known.
pub fn default_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

/// Loads the config from `path`, or from the default location when `None`.
///
/// A missing or unreadable default file yields the defaults. An explicitly
/// given file that cannot be read or parsed is an error.
///
/// # Async
/// Uses `tokio::fs` for non-blocking I/O.
pub async fn load_config(path: Option<&Path>) -> crate::Result<AppConfig> {
    if let Some(path) = path {
        let json = tokio::fs::read_to_string(path).await?;
        let config = serde_json::from_str(&json)?;
        debug!("Loaded config from {}", path.display());
        return Ok(config);
    }

    if let Some(path) = default_config_path()
        && let Ok(json) = tokio::fs::read_to_string(&path).await
    {
        match serde_json::from_str::<AppConfig>(&json) {
            Ok(config) => {
                debug!("Loaded config from {}", path.display());
                return Ok(config);
            }
            Err(e) => warn!("Ignoring invalid config {}: {e}", path.display()),
        }
    }
    Ok(AppConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert!(!config.include_full_range);
        assert_eq!(config.column_width(), 25);
        assert_eq!(config.invalid_rule_policy(), InvalidRulePolicy::Abort);
        assert_eq!(config.membership_policy(), MembershipPolicy::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "include_full_range": true }"#).unwrap();
        assert!(config.include_full_range);
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert_eq!(config.column_width, DEFAULT_COLUMN_WIDTH);
        assert_eq!(
            config.membership_policy(),
            MembershipPolicy::including_full_range()
        );
    }

    #[test]
    fn test_column_width_is_clamped() {
        let mut config = AppConfig {
            column_width: 0,
            ..AppConfig::default()
        };
        assert_eq!(config.column_width(), 1);
        config.column_width = 10_000;
        assert_eq!(config.column_width(), MAX_COLUMN_WIDTH);
    }

    #[tokio::test]
    async fn test_load_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.json");
        std::fs::write(&path, r#"{ "output_dir": "/tmp/sl", "skip_invalid": true }"#).unwrap();

        let config = load_config(Some(&path)).await.unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/tmp/sl"));
        assert_eq!(config.invalid_rule_policy(), InvalidRulePolicy::Skip);
    }

    #[tokio::test]
    async fn test_explicit_file_errors_are_reported() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(load_config(Some(&missing)).await.is_err());

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(
            load_config(Some(&broken)).await,
            Err(crate::Error::Serialization(_))
        ));
    }
}
