//! Client Records and DNS Entries
//!
//! Maps controller client records to hosts-file entries. The name is taken
//! from the first non-empty of the user-assigned name, the reported
//! hostname, then the MAC address.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One client as reported by the controller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRecord {
    /// Last IP address the client was seen with
    #[serde(default)]
    pub last_ip: Option<String>,
    /// Name assigned in the controller UI
    #[serde(default)]
    pub name: Option<String>,
    /// Hostname reported by the client over DHCP
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub mac: Option<String>,
}

/// A single `<ip> <name>` mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsEntry {
    pub ip_address: String,
    pub dns_name: String,
}

impl fmt::Display for DnsEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ip_address, self.dns_name)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Lowercase and replace spaces with hyphens
fn normalize_name(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

/// Strip colons and lowercase
fn normalize_mac(mac: &str) -> String {
    mac.replace(':', "").to_lowercase()
}

impl ClientRecord {
    /// Derive the DNS name for this client, if it carries any identifier
    pub fn dns_name(&self) -> Option<String> {
        if let Some(name) = non_empty(&self.name) {
            return Some(normalize_name(name));
        }
        if let Some(hostname) = non_empty(&self.hostname) {
            return Some(normalize_name(hostname));
        }
        non_empty(&self.mac).map(normalize_mac)
    }

    /// Build the DNS entry for this client
    ///
    /// Returns `None` when the client has no IP, or has an IP but no name,
    /// hostname, or MAC to derive a name from.
    pub fn to_entry(&self) -> Option<DnsEntry> {
        let ip = non_empty(&self.last_ip)?;

        let Some(dns_name) = self.dns_name() else {
            warn!(ip = %ip, "Client has no name, hostname or MAC, skipping");
            return None;
        };

        Some(DnsEntry {
            ip_address: ip.to_string(),
            dns_name,
        })
    }
}

/// Convert client records into DNS entries, preserving controller order
///
/// No deduplication is done: clients sharing an IP produce one line each.
pub fn build_entries(clients: &[ClientRecord]) -> Vec<DnsEntry> {
    let mut entries = Vec::with_capacity(clients.len());

    for client in clients {
        if let Some(entry) = client.to_entry() {
            debug!("Added entry: {}", entry);
            entries.push(entry);
        }
    }

    entries
}
