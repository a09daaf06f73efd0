//! Name and namespace validation.
//!
//! Project names and namespaces share the DNS label rules the cluster
//! enforces; validating up front means a bad name is rejected before any
//! file or cluster mutation happens.

use crate::error::{Error, Result};

/// Maximum length of a DNS label.
const MAX_LABEL_LEN: usize = 63;

/// Namespaces the cluster reserves for itself. Creating project resources in
/// these is always rejected.
const RESERVED_NAMESPACES: &[&str] = &["kube-system", "kube-public", "kube-node-lease"];

/// Check that a string is a valid DNS label: lowercase alphanumerics and
/// hyphens, starting and ending alphanumeric, at most 63 characters.
pub fn is_dns_label(s: &str) -> bool {
    if s.is_empty() || s.len() > MAX_LABEL_LEN {
        return false;
    }
    let bytes = s.as_bytes();
    let inner_ok = bytes
        .iter()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-');
    let edge_ok = |b: u8| b.is_ascii_lowercase() || b.is_ascii_digit();
    inner_ok && edge_ok(bytes[0]) && edge_ok(bytes[bytes.len() - 1])
}

/// Validate a project name.
pub fn validate_project_name(name: &str) -> Result<()> {
    if !is_dns_label(name) {
        return Err(Error::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Validate a cluster namespace: DNS label plus the reserved denylist.
pub fn validate_namespace(namespace: &str) -> Result<()> {
    if !is_dns_label(namespace) {
        return Err(Error::InvalidName(namespace.to_string()));
    }
    if RESERVED_NAMESPACES.contains(&namespace) {
        return Err(Error::ReservedNamespace(namespace.to_string()));
    }
    Ok(())
}
