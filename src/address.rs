//! `host:port` address splitting.
//!
//! Both the proxy address and the connection target handed to us by ssh
//! (`%h:%p`) go through [`split_host_port`]. IPv6 literals must be bracketed.
//!
//! # Example
//!
//! ```
//! use bastionctl::address::split_host_port;
//!
//! let (host, port) = split_host_port("proxy.example.com:3023").unwrap();
//! assert_eq!(host, "proxy.example.com");
//! assert_eq!(port, "3023");
//!
//! let (host, port) = split_host_port("[::1]:22").unwrap();
//! assert_eq!(host, "::1");
//! assert_eq!(port, "22");
//! ```

use crate::error::{BastionError, Result};

const MISSING_PORT: &str = "missing port in address";
const TOO_MANY_COLONS: &str = "too many colons in address";

/// Split `addr` into host and port at the last colon.
///
/// The port is returned as text and may be empty (`"host:"`); callers that
/// need a number validate it themselves.
///
/// # Errors
///
/// Returns [`BastionError::AddressFormat`] when there is no colon, when an
/// unbracketed host contains a colon, or when brackets are misplaced.
pub fn split_host_port(addr: &str) -> Result<(String, String)> {
    let colon = addr
        .rfind(':')
        .ok_or_else(|| BastionError::address(addr, MISSING_PORT))?;

    // Offsets past which no '[' / ']' may appear.
    let (host, open_from, close_from) = if addr.starts_with('[') {
        let end = addr
            .find(']')
            .ok_or_else(|| BastionError::address(addr, "missing ']' in address"))?;
        if end + 1 == addr.len() {
            return Err(BastionError::address(addr, MISSING_PORT));
        }
        if end + 1 != colon {
            if addr.as_bytes()[end + 1] == b':' {
                return Err(BastionError::address(addr, TOO_MANY_COLONS));
            }
            return Err(BastionError::address(addr, MISSING_PORT));
        }
        (&addr[1..end], 1, end + 1)
    } else {
        let host = &addr[..colon];
        if host.contains(':') {
            return Err(BastionError::address(addr, TOO_MANY_COLONS));
        }
        (host, 0, 0)
    };

    if addr[open_from..].contains('[') {
        return Err(BastionError::address(addr, "unexpected '[' in address"));
    }
    if addr[close_from..].contains(']') {
        return Err(BastionError::address(addr, "unexpected ']' in address"));
    }

    Ok((host.to_string(), addr[colon + 1..].to_string()))
}

/// Join a host and port into an address [`split_host_port`] accepts,
/// bracketing hosts that contain a colon.
///
/// # Examples
///
/// ```
/// use bastionctl::address::join_host_port;
///
/// assert_eq!(join_host_port("proxy.example.com", "3023"), "proxy.example.com:3023");
/// assert_eq!(join_host_port("::1", "3023"), "[::1]:3023");
/// ```
pub fn join_host_port(host: &str, port: &str) -> String {
    if host.contains(':') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}

/// Returns true if `port` is a non-empty run of ASCII digits.
pub fn is_numeric_port(port: &str) -> bool {
    !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit())
}
