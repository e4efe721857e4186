//! Configuration types for bastionctl.
//!
//! The profile file records which proxy the user logged in to and what the
//! cluster topology behind it looks like.
//!
//! # Config Format
//!
//! ```toml
//! [profile]
//! proxy = "proxy.example.com:3023"
//! web_proxy = "proxy.example.com:3080"
//! user = "alice"
//! keys_dir = "~/.bastion"
//!
//! [clusters]
//! root = "main"
//! leaves = ["east", "west"]
//! ```

use serde::Deserialize;

/// Login details for one proxy.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Profile {
    /// SSH proxy address in `host:port` form.
    #[serde(default)]
    pub proxy: Option<String>,
    /// Web proxy address, shown in the generated header. Defaults to `proxy`.
    #[serde(default)]
    pub web_proxy: Option<String>,
    /// Cluster login name.
    #[serde(default)]
    pub user: Option<String>,
    /// Directory holding keys and certificates (`~` is expanded).
    #[serde(default)]
    pub keys_dir: Option<String>,
}

impl Profile {
    /// The address used to label generated config.
    pub fn web_proxy_addr(&self) -> Option<&str> {
        self.web_proxy.as_deref().or(self.proxy.as_deref())
    }
}

/// Clusters reachable through the proxy.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Clusters {
    /// The cluster the proxy belongs to.
    #[serde(default)]
    pub root: Option<String>,
    /// Federated leaf clusters, in the order they should be emitted.
    #[serde(default)]
    pub leaves: Vec<String>,
}

/// Top-level configuration structure.
///
/// Parsed from `~/.config/bastionctl/config.toml` (or XDG equivalent).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub profile: Profile,
    #[serde(default)]
    pub clusters: Clusters,
}

impl Config {
    /// Parse config from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `toml::de::Error` if the TOML is malformed or doesn't match
    /// the expected structure.
    pub fn from_str(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full() {
        let config = Config::from_str(
            r#"
            [profile]
            proxy = "proxy.example.com:3023"
            web_proxy = "proxy.example.com:3080"
            user = "alice"
            keys_dir = "/tmp/keys"

            [clusters]
            root = "main"
            leaves = ["east", "west"]
            "#,
        )
        .unwrap();

        assert_eq!(config.profile.proxy.as_deref(), Some("proxy.example.com:3023"));
        assert_eq!(config.profile.web_proxy_addr(), Some("proxy.example.com:3080"));
        assert_eq!(config.profile.user.as_deref(), Some("alice"));
        assert_eq!(config.clusters.root.as_deref(), Some("main"));
        assert_eq!(config.clusters.leaves, vec!["east", "west"]);
    }

    #[test]
    fn test_web_proxy_falls_back_to_proxy() {
        let config = Config::from_str("[profile]\nproxy = \"p:3023\"\n").unwrap();
        assert_eq!(config.profile.web_proxy_addr(), Some("p:3023"));
        assert!(config.clusters.leaves.is_empty());
    }

    #[test]
    fn test_wrong_type_rejected() {
        assert!(Config::from_str("[clusters]\nleaves = \"east\"\n").is_err());
    }
}
