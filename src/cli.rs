//! Command-line interface for bastionctl.
//!
//! Parses arguments using clap and provides the [`Cli`] struct containing
//! all user-specified options.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for bastionctl.
///
/// # Examples
///
/// ```bash
/// # Append config for every cluster behind the proxy
/// bastionctl config >> ~/.ssh/config
///
/// # Then connect to a node in a leaf cluster
/// ssh root@node1.east
/// ```
#[derive(Parser, Debug)]
#[command(name = "bastionctl")]
#[command(version)]
#[command(about = "Generate OpenSSH config for clusters behind a bastion proxy")]
#[command(long_about = "bastionctl prints an OpenSSH client config section that routes\n\
    connections to cluster nodes through the bastion proxy, using the keys\n\
    and certificates of your current login.")]
pub struct Cli {
    /// Profile file to read instead of the default location.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print OpenSSH configuration for the root and leaf clusters.
    Config {
        /// SSH proxy address, overriding the profile.
        #[arg(long, value_name = "HOST:PORT")]
        proxy: Option<String>,

        /// Cluster login, overriding the profile.
        #[arg(long, value_name = "NAME")]
        user: Option<String>,
    },

    /// Connect stdio to a cluster node through the proxy (used as ProxyCommand).
    #[command(name = "config-proxy", hide = true)]
    ConfigProxy {
        /// SSH proxy address.
        #[arg(long, value_name = "HOST:PORT")]
        proxy: String,

        /// Destination as given by ssh (`%h:%p`).
        #[arg(value_name = "HOST:PORT")]
        target: String,

        /// Cluster the destination belongs to.
        #[arg(value_name = "CLUSTER")]
        site: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_proxy() {
        let cli = Cli::try_parse_from([
            "bastionctl",
            "config-proxy",
            "--proxy=proxy.example.com:3023",
            "node1.main:3022",
            "main",
        ])
        .unwrap();

        match cli.command {
            Command::ConfigProxy { proxy, target, site } => {
                assert_eq!(proxy, "proxy.example.com:3023");
                assert_eq!(target, "node1.main:3022");
                assert_eq!(site, "main");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_config_proxy_requires_proxy() {
        assert!(Cli::try_parse_from(["bastionctl", "config-proxy", "n:22", "main"]).is_err());
    }

    #[test]
    fn test_parse_config_with_globals() {
        let cli = Cli::try_parse_from([
            "bastionctl",
            "config",
            "--user",
            "alice",
            "-v",
            "--config",
            "/tmp/p.toml",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/p.toml")));
        assert!(matches!(
            cli.command,
            Command::Config { proxy: None, user: Some(ref u) } if u == "alice"
        ));
    }
}
