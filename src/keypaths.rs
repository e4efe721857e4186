//! Locations of key material inside a profile's key directory.
//!
//! ```text
//! <keys_dir>/
//! ├── known_hosts
//! └── keys/<proxy_host>/
//!     ├── <user>                          private key
//!     └── <user>-ssh/<cluster>-cert.pub   SSH certificate per root cluster
//! ```

use crate::error::{BastionError, Result};
use std::path::{Path, PathBuf};

const KNOWN_HOSTS: &str = "known_hosts";
const KEYS_DIR: &str = "keys";
const SSH_DIR_SUFFIX: &str = "-ssh";
const SSH_CERT_SUFFIX: &str = "-cert.pub";

/// Default profile directory name under the user's home.
pub const PROFILE_DIR: &str = ".bastion";

/// `<keys_dir>/known_hosts`
pub fn known_hosts_path(keys_dir: &Path) -> PathBuf {
    keys_dir.join(KNOWN_HOSTS)
}

/// `<keys_dir>/keys/<proxy_host>`
pub fn proxy_key_dir(keys_dir: &Path, proxy_host: &str) -> PathBuf {
    keys_dir.join(KEYS_DIR).join(proxy_host)
}

/// `<keys_dir>/keys/<proxy_host>/<user>`
pub fn user_key_path(keys_dir: &Path, proxy_host: &str, user: &str) -> PathBuf {
    proxy_key_dir(keys_dir, proxy_host).join(user)
}

/// `<keys_dir>/keys/<proxy_host>/<user>-ssh/<cluster>-cert.pub`
pub fn ssh_cert_path(keys_dir: &Path, proxy_host: &str, user: &str, cluster: &str) -> PathBuf {
    proxy_key_dir(keys_dir, proxy_host)
        .join(format!("{user}{SSH_DIR_SUFFIX}"))
        .join(format!("{cluster}{SSH_CERT_SUFFIX}"))
}

/// `~/.bastion`
///
/// # Errors
///
/// Returns [`BastionError::NoConfigDir`] if the home directory is unknown.
pub fn default_keys_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(PROFILE_DIR))
        .ok_or(BastionError::NoConfigDir)
}

/// Resolve a configured key directory, expanding a leading `~`.
///
/// `None` yields [`default_keys_dir`].
pub fn full_profile_path(dir: Option<&str>) -> Result<PathBuf> {
    match dir {
        None => default_keys_dir(),
        Some("~") => dirs::home_dir().ok_or(BastionError::NoConfigDir),
        Some(d) => match d.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .ok_or(BastionError::NoConfigDir),
            None => Ok(PathBuf::from(d)),
        },
    }
}
