//! Config file discovery and loading.
//!
//! The search order is:
//!
//! 1. `$XDG_CONFIG_HOME/bastionctl/config.toml`
//! 2. `~/.config/bastionctl/config.toml`
//! 3. Platform default (e.g., `~/Library/Application Support` on macOS)

use crate::config::Config;
use crate::error::{BastionError, Result};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "bastionctl";
const CONFIG_FILE: &str = "config.toml";

/// Determine the config file path.
///
/// Checks locations in order of preference and returns the first that
/// exists. If none exists, the platform config directory is returned so
/// the caller can report where the file was expected.
///
/// # Errors
///
/// Returns [`BastionError::NoConfigDir`] if no config directory can be
/// determined.
pub fn default_config_path() -> Result<PathBuf> {
    candidate_paths()
        .into_iter()
        .find(|p| p.exists())
        .or_else(|| dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE)))
        .ok_or(BastionError::NoConfigDir)
}

fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        paths.push(PathBuf::from(xdg).join(APP_DIR).join(CONFIG_FILE));
    }
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".config").join(APP_DIR).join(CONFIG_FILE));
    }
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join(APP_DIR).join(CONFIG_FILE));
    }
    paths
}

/// Load and parse a config file from the given path.
///
/// # Errors
///
/// - [`BastionError::ConfigNotFound`] if the file doesn't exist
/// - [`BastionError::IoError`] if reading fails
/// - [`BastionError::ParseError`] if TOML parsing fails
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Err(BastionError::ConfigNotFound(path.to_path_buf()));
    }
    let contents = std::fs::read_to_string(path)?;
    let config = Config::from_str(&contents)?;
    tracing::debug!(path = %path.display(), "loaded profile");
    Ok(config)
}

/// Load config from `path`, or from the default location when `None`.
pub fn load(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(p) => load_config(p),
        None => load_config(&default_config_path()?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[profile]\nproxy = \"p.example.com:3023\"\nuser = \"bob\"").unwrap();

        let config = load(Some(file.path())).unwrap();
        assert_eq!(config.profile.user.as_deref(), Some("bob"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(matches!(
            load_config(&path),
            Err(BastionError::ConfigNotFound(p)) if p == path
        ));
    }

    #[test]
    fn test_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[profile").unwrap();
        assert!(matches!(
            load_config(file.path()),
            Err(BastionError::ParseError(_))
        ));
    }
}
