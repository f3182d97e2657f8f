//! UniFi to Pi-hole DNS Sync
//!
//! Reads the client list from a UniFi controller and writes one
//! `<ip> <name>` line per client into Pi-hole's static hosts file, then
//! restarts Pi-hole's DNS service so the names resolve.

pub mod config;
pub mod controller;
pub mod error;
pub mod hosts;
pub mod records;
pub mod reload;
pub mod sync;

pub use config::{CredentialSources, Credentials};
pub use controller::{ControllerClient, ControllerConfig};
pub use error::SyncError;
pub use hosts::HostsFile;
pub use reload::{CommandReloader, Reloader};
pub use sync::{run_sync, SyncOptions};
