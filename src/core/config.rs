//! Scan settings loaded from a TOML file
//!
//! ```toml
//! scan_folders = ["~/code", "/srv/work"]
//! scan_depth = 3
//! scan_interval_minutes = 10
//! exclude_patterns = ["node_modules", ".git", "target"]
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::error::{Error, Result};
use crate::core::model::ScanConfig;

pub const DEFAULT_SCAN_DEPTH: usize = 3;
pub const DEFAULT_SCAN_INTERVAL_MINUTES: u64 = 10;
/// Largest interval whose length in seconds still fits a `u64`
pub const MAX_SCAN_INTERVAL_MINUTES: u64 = u64::MAX / 60;

/// Directory names skipped by default during project discovery
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "node_modules",
    "vendor",
    ".git",
    "venv",
    ".venv",
    "__pycache__",
    "build",
    "dist",
    ".next",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub scan_folders: Vec<PathBuf>,
    pub scan_depth: usize,
    pub scan_interval_minutes: u64,
    pub exclude_patterns: Vec<String>,
    pub follow_links: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scan_folders: Vec::new(),
            scan_depth: DEFAULT_SCAN_DEPTH,
            scan_interval_minutes: DEFAULT_SCAN_INTERVAL_MINUTES,
            exclude_patterns: DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect(),
            follow_links: false,
        }
    }
}

impl Settings {
    /// Load settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(Error::ConfigRead {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let settings: Settings = toml::from_str(&text).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.scan_depth == 0 {
            return Err(Error::InvalidConfig(
                "scan_depth must be a positive integer".to_string(),
            ));
        }
        if self.scan_interval_minutes == 0 {
            return Err(Error::InvalidConfig(
                "scan_interval_minutes must be a positive integer".to_string(),
            ));
        }
        if self.scan_interval_minutes > MAX_SCAN_INTERVAL_MINUTES {
            return Err(Error::InvalidConfig(format!(
                "scan_interval_minutes must be at most {}",
                MAX_SCAN_INTERVAL_MINUTES
            )));
        }
        Ok(())
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_minutes.saturating_mul(60))
    }

    /// Build the scan configuration.
    ///
    /// A leading `~/` is expanded and existing folders are canonicalized, so
    /// project paths match the keys of the pin store.
    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig::new(
            self.scan_folders.iter().map(|p| {
                let path = expand_home(p);
                fs::canonicalize(&path).unwrap_or(path)
            }),
            self.scan_depth,
            self.exclude_patterns.iter().cloned(),
        )
        .with_follow_links(self.follow_links)
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), std::env::var_os("HOME")) {
        (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.scan_depth, 3);
        assert_eq!(settings.scan_interval(), Duration::from_secs(600));
        assert!(settings.exclude_patterns.contains(&"node_modules".to_string()));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let temp = tempdir().unwrap();
        let settings = Settings::load(&temp.path().join("absent.toml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_partial_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "scan_folders = [\"/srv/code\"]\nscan_depth = 5\n").unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.scan_folders, vec![PathBuf::from("/srv/code")]);
        assert_eq!(settings.scan_depth, 5);
        assert_eq!(settings.scan_interval_minutes, DEFAULT_SCAN_INTERVAL_MINUTES);
    }

    #[test]
    fn test_load_rejects_zero_depth() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "scan_depth = 0\n").unwrap();

        let err = Settings::load(&path).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_load_rejects_oversized_interval() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "scan_interval_minutes = 9223372036854775807\n").unwrap();

        let err = Settings::load(&path).unwrap_err();
        assert!(
            matches!(err, Error::InvalidConfig(ref msg) if msg.contains("scan_interval_minutes"))
        );
    }

    #[test]
    fn test_interval_bound() {
        let mut settings = Settings {
            scan_interval_minutes: MAX_SCAN_INTERVAL_MINUTES,
            ..Default::default()
        };
        assert!(settings.validate().is_ok());
        assert_eq!(
            settings.scan_interval(),
            Duration::from_secs(MAX_SCAN_INTERVAL_MINUTES * 60)
        );

        settings.scan_interval_minutes = MAX_SCAN_INTERVAL_MINUTES + 1;
        assert!(matches!(settings.validate(), Err(Error::InvalidConfig(_))));
        assert_eq!(settings.scan_interval(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "scan_depth = \"deep\"\n").unwrap();

        let err = Settings::load(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn test_scan_config_from_settings() {
        let settings = Settings {
            scan_folders: vec![PathBuf::from("/a"), PathBuf::from("/a")],
            exclude_patterns: vec!["target".to_string()],
            follow_links: true,
            ..Default::default()
        };
        let config = settings.scan_config();
        assert_eq!(config.roots, vec![PathBuf::from("/a")]);
        assert_eq!(config.max_depth, 3);
        assert!(config.excluded.contains("target"));
        assert!(config.follow_links);
    }

    #[test]
    fn test_expand_home_leaves_absolute_paths() {
        assert_eq!(expand_home(Path::new("/srv/x")), PathBuf::from("/srv/x"));
    }
}
