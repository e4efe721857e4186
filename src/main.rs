//! bastionctl CLI entry point.
//!
//! This binary provides the `bastionctl` command for generating OpenSSH
//! config and for acting as the `ProxyCommand` that config points at.

use bastionctl::address::split_host_port;
use bastionctl::cli::{Cli, Command};
use bastionctl::cluster::{self, StaticTopology};
use bastionctl::error::Result;
use bastionctl::sshconfig::{self, HostConfigParameters};
use bastionctl::{keypaths, loader, proxy, BastionError};
use clap::Parser;
use std::path::Path;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Send logs to stderr; stdout carries generated config or the proxied
/// ssh stream.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Main application logic. Returns the process exit code.
fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::Config { proxy, user } => {
            on_config(cli.config.as_deref(), proxy, user)?;
            Ok(0)
        }
        Command::ConfigProxy {
            proxy,
            target,
            site,
        } => proxy::run_config_proxy(&proxy, &target, &site),
    }
}

/// Print the generated config section for the current profile.
fn on_config(
    config_path: Option<&Path>,
    proxy_flag: Option<String>,
    user_flag: Option<String>,
) -> Result<()> {
    let config = loader::load(config_path)?;
    let profile = &config.profile;

    // A proxy given on the command line also labels the header.
    let source_addr = proxy_flag
        .clone()
        .or_else(|| profile.web_proxy_addr().map(str::to_string));
    let proxy_addr = proxy_flag
        .or_else(|| profile.proxy.clone())
        .ok_or(BastionError::MissingProfileField("proxy"))?;
    let user = user_flag
        .or_else(|| profile.user.clone())
        .ok_or(BastionError::MissingProfileField("user"))?;

    let (proxy_host, proxy_port) = split_host_port(&proxy_addr)?;

    let topology = cluster::discover(&StaticTopology::new(
        proxy_addr.as_str(),
        config.clusters.clone(),
    ))?;
    tracing::debug!(
        root = %topology.root,
        leaves = topology.leaves.len(),
        "discovered clusters"
    );

    let keys_dir = keypaths::full_profile_path(profile.keys_dir.as_deref())?;
    tracing::debug!(keys_dir = %keys_dir.display(), "resolved key directory");

    let tsh_path = std::env::current_exe()?;

    let root = HostConfigParameters::for_root(
        &keys_dir,
        &proxy_host,
        &proxy_port,
        &user,
        &topology.root,
        &tsh_path.display().to_string(),
    );

    let text = sshconfig::render_config(
        source_addr.as_deref().unwrap_or(&proxy_addr),
        &root,
        &topology.leaves,
    )?;
    print!("{}", text);
    Ok(())
}
