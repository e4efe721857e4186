//! OpenSSH client config generation.
//!
//! Each cluster gets two `Host` stanzas: one carrying the key, certificate
//! and known-hosts settings for every host in the cluster (and the proxy),
//! and one routing every host except the proxy through
//! `bastionctl config-proxy`.
//!
//! [`render_config`] wraps the per-cluster blocks between a header and a
//! footer comment so the whole section can be found again in an existing
//! `~/.ssh/config`.

use crate::address::{is_numeric_port, join_host_port};
use crate::error::{BastionError, Result};
use crate::keypaths;
use crate::template::{Template, TemplateData};
use std::fmt::Write;
use std::path::Path;

/// SSH port nodes listen on inside a cluster.
pub const DEFAULT_NODE_PORT: &str = "3022";

/// First line of the footer; anything between header and footer is ours.
pub const END_MARKER: &str = "# End generated bastionctl configuration";

const SSH_CONFIG_TEMPLATE: &str = r#"
# Common flags for all {{ .ClusterName }} hosts
Host *.{{ .ClusterName }} {{ .ProxyHost }}
    UserKnownHostsFile "{{ .KnownHostsPath }}"
    IdentityFile "{{ .IdentityFilePath }}"
    CertificateFile "{{ .CertificateFilePath }}"

# Flags for all {{ .ClusterName }} hosts except the proxy
Host *.{{ .ClusterName }} !{{ .ProxyHost }}
    Port {{ .NodePort }}
    ProxyCommand {{ .TSHPath }} config-proxy --proxy={{ .ProxyAddr }} %h:%p "{{ .ClusterName }}"
"#;

/// Values substituted into one cluster's config block.
///
/// `proxy_addr` is derived from `proxy_host` and `proxy_port`, so values are
/// built through [`HostConfigParameters::for_root`] and
/// [`HostConfigParameters::for_cluster`].
#[derive(Debug, Clone, PartialEq)]
pub struct HostConfigParameters {
    pub cluster_name: String,
    pub known_hosts_path: String,
    pub identity_file_path: String,
    /// Certificate issued by the root cluster; leaf clusters share it.
    pub certificate_file_path: String,
    pub proxy_host: String,
    pub proxy_port: String,
    proxy_addr: String,
    /// Executable that ssh re-invokes as its `ProxyCommand`.
    pub tsh_path: String,
}

impl HostConfigParameters {
    /// Parameters for the root cluster, with key paths resolved under
    /// `keys_dir` for `user` on `proxy_host`.
    pub fn for_root(
        keys_dir: &Path,
        proxy_host: &str,
        proxy_port: &str,
        user: &str,
        root_cluster: &str,
        tsh_path: &str,
    ) -> Self {
        let display = |p: std::path::PathBuf| p.display().to_string();
        HostConfigParameters {
            cluster_name: root_cluster.to_string(),
            known_hosts_path: display(keypaths::known_hosts_path(keys_dir)),
            identity_file_path: display(keypaths::user_key_path(keys_dir, proxy_host, user)),
            certificate_file_path: display(keypaths::ssh_cert_path(
                keys_dir,
                proxy_host,
                user,
                root_cluster,
            )),
            proxy_host: proxy_host.to_string(),
            proxy_port: proxy_port.to_string(),
            proxy_addr: join_host_port(proxy_host, proxy_port),
            tsh_path: tsh_path.to_string(),
        }
    }

    /// Same settings, different cluster.
    pub fn for_cluster(&self, cluster_name: &str) -> Self {
        HostConfigParameters {
            cluster_name: cluster_name.to_string(),
            ..self.clone()
        }
    }

    /// Check the values are safe to place into ssh config.
    ///
    /// # Errors
    ///
    /// Returns [`BastionError::AddressFormat`] for an empty cluster name, a
    /// cluster name containing whitespace or `Host` pattern metacharacters,
    /// or a non-numeric proxy port.
    pub fn validate(&self) -> Result<()> {
        let name = &self.cluster_name;
        if name.is_empty() {
            return Err(BastionError::address(name, "empty cluster name"));
        }
        if name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '*' | '?' | '!' | ',' | '"'))
        {
            return Err(BastionError::address(
                name,
                "cluster name contains whitespace or host pattern characters",
            ));
        }
        if !is_numeric_port(&self.proxy_port) {
            return Err(BastionError::address(
                &format!("{}:{}", self.proxy_host, self.proxy_port),
                "proxy port is not numeric",
            ));
        }
        Ok(())
    }
}

impl TemplateData for HostConfigParameters {
    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "ClusterName" => Some(self.cluster_name.as_str()),
            "KnownHostsPath" => Some(unquote(&self.known_hosts_path)),
            "IdentityFilePath" => Some(unquote(&self.identity_file_path)),
            "CertificateFilePath" => Some(unquote(&self.certificate_file_path)),
            "ProxyHost" => Some(self.proxy_host.as_str()),
            "ProxyPort" => Some(self.proxy_port.as_str()),
            "ProxyAddr" => Some(self.proxy_addr.as_str()),
            "TSHPath" => Some(self.tsh_path.as_str()),
            "NodePort" => Some(DEFAULT_NODE_PORT),
            _ => None,
        }
    }
}

/// Strip one pair of surrounding double quotes; the template adds its own.
fn unquote(path: &str) -> &str {
    if path.len() < 2 {
        return path;
    }
    path.strip_prefix('"')
        .and_then(|p| p.strip_suffix('"'))
        .unwrap_or(path)
}

/// Append one cluster's config block to `out`.
///
/// # Errors
///
/// Returns [`BastionError::AddressFormat`] if `params` fails
/// [`HostConfigParameters::validate`], and [`BastionError::Template`] if the
/// template cannot be parsed or writing to `out` fails.
pub fn write_ssh_config<W: Write + ?Sized>(
    out: &mut W,
    params: &HostConfigParameters,
) -> Result<()> {
    params.validate()?;
    parse_template(SSH_CONFIG_TEMPLATE, params)?.execute(out, params)
}

/// Parse `src`, rejecting fields `params` does not define.
fn parse_template(src: &str, params: &HostConfigParameters) -> Result<Template> {
    let template = Template::parse("ssh-config", src)?;
    if let Some(unknown) = template.fields().find(|f| params.field(f).is_none()) {
        return Err(BastionError::Template(format!(
            "ssh-config: unknown field {unknown}"
        )));
    }
    Ok(template)
}

/// Render the full generated section: header, `root` block, a block per
/// leaf cluster in the given order, then the footer.
///
/// Leaf blocks reuse every setting in `root`, including its certificate.
/// `source_addr` names the proxy in the header.
pub fn render_config(
    source_addr: &str,
    root: &HostConfigParameters,
    leaves: &[String],
) -> Result<String> {
    let mut clusters = Vec::with_capacity(leaves.len() + 1);
    clusters.push(root.clone());
    clusters.extend(leaves.iter().map(|leaf| root.for_cluster(leaf)));
    // Validate every cluster before writing anything.
    for params in &clusters {
        params.validate()?;
    }

    let mut sb = String::new();
    let write_err =
        |_: std::fmt::Error| BastionError::Template("failed to write config header".into());

    // Leading newline in case the existing config does not end with one.
    writeln!(sb).map_err(write_err)?;
    write!(
        sb,
        "#\n# Begin generated bastionctl configuration for {source_addr} from `bastionctl config`\n#\n"
    )
    .map_err(write_err)?;

    for params in &clusters {
        write_ssh_config(&mut sb, params)?;
    }

    write!(sb, "\n{END_MARKER}\n").map_err(write_err)?;
    tracing::debug!(clusters = clusters.len(), "rendered ssh config");
    Ok(sb)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> HostConfigParameters {
        let mut p = HostConfigParameters::for_root(
            Path::new("/home/alice/.bastion"),
            "proxy.example.com",
            "3023",
            "alice",
            "main",
            "/usr/local/bin/bastionctl",
        );
        p.known_hosts_path = "/home/alice/.bastion/known_hosts".into();
        p.identity_file_path = "/home/alice/.bastion/keys/proxy.example.com/alice".into();
        p.certificate_file_path =
            "/home/alice/.bastion/keys/proxy.example.com/alice-ssh/main-cert.pub".into();
        p
    }

    fn render_one(p: &HostConfigParameters) -> String {
        let mut out = String::new();
        write_ssh_config(&mut out, p).unwrap();
        out
    }

    #[test]
    fn test_block_exact() {
        let expected = "
# Common flags for all main hosts
Host *.main proxy.example.com
    UserKnownHostsFile \"/home/alice/.bastion/known_hosts\"
    IdentityFile \"/home/alice/.bastion/keys/proxy.example.com/alice\"
    CertificateFile \"/home/alice/.bastion/keys/proxy.example.com/alice-ssh/main-cert.pub\"

# Flags for all main hosts except the proxy
Host *.main !proxy.example.com
    Port 3022
    ProxyCommand /usr/local/bin/bastionctl config-proxy --proxy=proxy.example.com:3023 %h:%p \"main\"
";
        assert_eq!(render_one(&params()), expected);
    }

    #[cfg(unix)]
    #[test]
    fn test_for_root_matches_key_layout() {
        let p = HostConfigParameters::for_root(
            Path::new("/home/alice/.bastion"),
            "proxy.example.com",
            "3023",
            "alice",
            "main",
            "/usr/local/bin/bastionctl",
        );
        assert_eq!(p, params());
    }

    #[test]
    fn test_two_host_stanzas() {
        let out = render_one(&params());
        let hosts: Vec<&str> = out.lines().filter(|l| l.starts_with("Host ")).collect();
        assert_eq!(
            hosts,
            vec!["Host *.main proxy.example.com", "Host *.main !proxy.example.com"]
        );
    }

    #[test]
    fn test_render_idempotent() {
        assert_eq!(render_one(&params()), render_one(&params()));
    }

    #[test]
    fn test_prequoted_paths_not_double_quoted() {
        let mut p = params();
        p.known_hosts_path = "\"/Users/a b/known_hosts\"".into();
        p.identity_file_path = "\"/Users/a b/key\"".into();
        let out = render_one(&p);
        assert!(out.contains("UserKnownHostsFile \"/Users/a b/known_hosts\"\n"));
        assert!(out.contains("IdentityFile \"/Users/a b/key\"\n"));
        assert!(!out.contains("\"\""));
    }

    #[test]
    fn test_full_render_order_and_markers() {
        let leaves = vec!["west".to_string(), "east".to_string()];
        let out = render_config("proxy.example.com:3080", &params(), &leaves).unwrap();

        assert!(out.starts_with(
            "\n#\n# Begin generated bastionctl configuration for proxy.example.com:3080 from `bastionctl config`\n#\n"
        ));
        assert!(out.ends_with("\n# End generated bastionctl configuration\n"));

        let common: Vec<&str> = out
            .lines()
            .filter(|l| l.starts_with("# Common flags for all "))
            .collect();
        assert_eq!(
            common,
            vec![
                "# Common flags for all main hosts",
                "# Common flags for all west hosts",
                "# Common flags for all east hosts",
            ]
        );

        // Every block shares the root cluster's key material.
        let certs = out
            .lines()
            .filter(|l| l.trim() == "CertificateFile \"/home/alice/.bastion/keys/proxy.example.com/alice-ssh/main-cert.pub\"")
            .count();
        assert_eq!(certs, 3);
        assert_eq!(out.matches("UserKnownHostsFile \"/home/alice/.bastion/known_hosts\"").count(), 3);
        assert!(out.contains("%h:%p \"east\"\n"));
    }

    #[test]
    fn test_root_only() {
        let out = render_config("p:3080", &params(), &[]).unwrap();
        assert_eq!(out.lines().filter(|l| l.starts_with("Host ")).count(), 2);
    }

    #[test]
    fn test_invalid_cluster_name_rejected() {
        for bad in ["", "has space", "glob*", "neg!"] {
            let p = params().for_cluster(bad);
            assert!(
                matches!(p.validate(), Err(BastionError::AddressFormat { .. })),
                "{bad:?} accepted"
            );
        }
        let leaves = vec!["ok".to_string(), "not ok".to_string()];
        assert!(render_config("p:3080", &params(), &leaves).is_err());
    }

    #[test]
    fn test_write_block_rejects_invalid_params() {
        let mut out = String::new();
        let err = write_ssh_config(&mut out, &params().for_cluster("bad name*")).unwrap_err();
        assert!(matches!(err, BastionError::AddressFormat { ref addr, .. } if addr == "bad name*"));
        assert!(out.is_empty());

        let mut p = params();
        p.proxy_port = "https".into();
        assert!(matches!(
            write_ssh_config(&mut out, &p),
            Err(BastionError::AddressFormat { .. })
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn test_ipv6_proxy_command_round_trips() {
        let p = HostConfigParameters::for_root(
            Path::new("/k"),
            "::1",
            "3023",
            "alice",
            "main",
            "/usr/bin/bastionctl",
        );
        let out = render_one(&p);
        let proxy = out
            .split_whitespace()
            .find_map(|w| w.strip_prefix("--proxy="))
            .unwrap();
        assert_eq!(proxy, "[::1]:3023");
        assert_eq!(
            crate::proxy::build_proxy_args(proxy, "node1.main:3022", "main").unwrap(),
            vec!["-p", "3023", "::1", "-s", "proxy:node1:3022@main"]
        );
    }

    #[test]
    fn test_unknown_template_field_rejected_at_parse() {
        let err = parse_template("Host {{ .Nope }}", &params()).unwrap_err();
        assert!(matches!(err, BastionError::Template(ref m) if m.contains("unknown field Nope")));
        assert!(parse_template(SSH_CONFIG_TEMPLATE, &params()).is_ok());
    }

    #[test]
    fn test_unquote_lone_quote() {
        assert_eq!(unquote("\""), "\"");
        assert_eq!(unquote("\"\""), "");
        assert_eq!(unquote("\"/a b\""), "/a b");
        assert_eq!(unquote("/plain"), "/plain");
    }

    #[test]
    fn test_non_numeric_proxy_port_rejected() {
        let mut p = params();
        p.proxy_port = "https".into();
        assert!(matches!(p.validate(), Err(BastionError::AddressFormat { .. })));
    }
}
