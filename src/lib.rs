//! # bastionctl
//!
//! OpenSSH client integration for clusters that sit behind a bastion proxy.
//!
//! `bastionctl config` prints a config section that lets a plain `ssh`
//! reach any node of the root cluster or its leaf clusters by name.
//! `bastionctl config-proxy` is what that config runs as its `ProxyCommand`.
//!
//! ## Quick Example
//!
//! ```toml
//! # ~/.config/bastionctl/config.toml
//!
//! [profile]
//! proxy = "proxy.example.com:3023"
//! user = "alice"
//!
//! [clusters]
//! root = "main"
//! leaves = ["east"]
//! ```
//!
//! ```bash
//! bastionctl config >> ~/.ssh/config
//! ssh root@node1.east
//! ```
//!
//! ## Architecture
//!
//! The crate is organized into these modules:
//!
//! - [`config`]: TOML profile data structures
//! - [`cli`]: Command-line argument parsing with clap
//! - [`loader`]: Config file discovery and loading
//! - [`cluster`]: Root and leaf cluster discovery
//! - [`keypaths`]: Key, certificate and known-hosts locations
//! - [`template`]: `{{ .Field }}` placeholder templates
//! - [`sshconfig`]: Generated OpenSSH config
//! - [`address`]: `host:port` splitting
//! - [`proxy`]: `config-proxy` argument building and ssh delegation
//! - [`error`]: Error types

pub mod address;
pub mod cli;
pub mod cluster;
pub mod config;
pub mod error;
pub mod keypaths;
pub mod loader;
pub mod proxy;
pub mod sshconfig;
pub mod template;

pub use config::{Clusters, Config, Profile};
pub use error::{BastionError, Result};
pub use sshconfig::HostConfigParameters;
