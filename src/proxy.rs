//! `config-proxy`: tunnel an ssh connection through the bastion.
//!
//! Generated config installs `bastionctl config-proxy` as the `ProxyCommand`
//! for cluster hosts. ssh runs it with the destination as `%h:%p`; we turn
//! that into a subsystem request against the proxy and hand the terminal to
//! the system ssh client for the rest of the connection.

use crate::address::split_host_port;
use crate::error::{BastionError, Result};
use std::process::{Command, Stdio};

/// ssh client location per `std::env::consts::OS`.
const SSH_PATHS: &[(&str, &str)] = &[("windows", r"C:\Windows\System32\OpenSSH\ssh.exe")];

/// ssh client location on every OS not listed in the table.
pub const UNIX_SSH_PATH: &str = "/usr/bin/ssh";

/// Default ssh client path for the given OS identifier.
///
/// # Examples
///
/// ```
/// use bastionctl::proxy::ssh_path_for;
///
/// assert_eq!(ssh_path_for("linux"), "/usr/bin/ssh");
/// assert_eq!(ssh_path_for("windows"), r"C:\Windows\System32\OpenSSH\ssh.exe");
/// ```
pub fn ssh_path_for(os: &str) -> &'static str {
    SSH_PATHS
        .iter()
        .find(|(name, _)| *name == os)
        .map(|(_, path)| *path)
        .unwrap_or(UNIX_SSH_PATH)
}

/// Default ssh client path for the running platform.
pub fn default_ssh_path() -> &'static str {
    ssh_path_for(std::env::consts::OS)
}

/// Remove a trailing `.<proxy_host>`, then a trailing `.<site>`, from `host`.
///
/// Each suffix is removed at most once.
///
/// # Examples
///
/// ```
/// use bastionctl::proxy::strip_cluster_suffix;
///
/// assert_eq!(strip_cluster_suffix("node1.proxy.example.com", "proxy.example.com", "main"), "node1");
/// assert_eq!(strip_cluster_suffix("node1.main", "proxy.example.com", "main"), "node1");
/// assert_eq!(strip_cluster_suffix("node1", "proxy.example.com", "main"), "node1");
/// ```
pub fn strip_cluster_suffix<'a>(host: &'a str, proxy_host: &str, site: &str) -> &'a str {
    let host = host
        .strip_suffix(proxy_host)
        .and_then(|h| h.strip_suffix('.'))
        .unwrap_or(host);
    host.strip_suffix(site)
        .and_then(|h| h.strip_suffix('.'))
        .unwrap_or(host)
}

/// Arguments for the ssh client that reach `target` in cluster `site`
/// through the proxy at `proxy`.
///
/// The result is `-p <proxy port> <proxy host> -s proxy:<host>:<port>@<site>`.
///
/// # Errors
///
/// Returns [`BastionError::AddressFormat`] if either address is not
/// `host:port`.
pub fn build_proxy_args(proxy: &str, target: &str, site: &str) -> Result<Vec<String>> {
    let (proxy_host, proxy_port) = split_host_port(proxy)?;
    let (target_host, target_port) = split_host_port(target)?;

    let target_host = strip_cluster_suffix(&target_host, &proxy_host, site);

    Ok(vec![
        "-p".to_string(),
        proxy_port,
        proxy_host,
        "-s".to_string(),
        format!("proxy:{}:{}@{}", target_host, target_port, site),
    ])
}

/// Run `program` with `args`, sharing this process's stdin, stdout and
/// stderr, and wait for it to exit.
///
/// Returns the child's exit code. A child killed by a signal is reported
/// as `128 + signal`, the way shells do.
///
/// # Errors
///
/// Returns [`BastionError::ChildProcess`] if the program cannot be started.
pub fn run_ssh(program: &str, args: &[String]) -> Result<i32> {
    tracing::debug!(program, ?args, "running ssh client");

    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|source| BastionError::ChildProcess {
            program: program.to_string(),
            source,
        })?;

    if let Some(code) = status.code() {
        return Ok(code);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            tracing::debug!(signal, "ssh client terminated by signal");
            return Ok(128 + signal);
        }
    }

    Ok(1)
}

/// Handle `config-proxy`: build the ssh arguments and run the default ssh
/// client with them.
///
/// Address errors are returned before anything is spawned.
pub fn run_config_proxy(proxy: &str, target: &str, site: &str) -> Result<i32> {
    let args = build_proxy_args(proxy, target, site)?;
    run_ssh(default_ssh_path(), &args)
}
