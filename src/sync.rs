//! Sync Pipeline
//!
//! login -> fetch clients -> build entries -> write hosts file -> reload.
//! Each step runs to completion before the next starts.

use tracing::info;

use crate::config::Credentials;
use crate::controller::ControllerClient;
use crate::error::SyncError;
use crate::hosts::{HostsFile, WriteOutcome};
use crate::records::{build_entries, DnsEntry};
use crate::reload::{reload_with_policy, ReloadFailurePolicy, Reloader};

/// Knobs for a single run
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Log the entries instead of writing them
    pub dry_run: bool,
    /// Skip the resolver restart after writing
    pub skip_reload: bool,
    pub reload_failure: ReloadFailurePolicy,
}

/// What a run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub clients: usize,
    pub entries: Vec<DnsEntry>,
    pub outcome: WriteOutcome,
    pub reloaded: bool,
}

/// Run one full sync against the controller
pub async fn run_sync(
    controller: &ControllerClient,
    credentials: &Credentials,
    hosts: &HostsFile,
    reloader: &dyn Reloader,
    options: SyncOptions,
) -> Result<SyncReport, SyncError> {
    controller.login(credentials).await?;
    let clients = controller.fetch_clients().await?;

    info!("Processing client data...");
    let entries = build_entries(&clients);

    info!(path = %hosts.path().display(), "Using hosts file");
    info!(count = entries.len(), "Found DNS entries");

    if options.dry_run {
        for entry in &entries {
            info!("DRY RUN - would write: {}", entry);
        }
        return Ok(SyncReport {
            clients: clients.len(),
            entries,
            outcome: WriteOutcome::Skipped,
            reloaded: false,
        });
    }

    let outcome = hosts.write(&entries)?;

    let reloaded = match outcome {
        WriteOutcome::Written(_) if !options.skip_reload => {
            reload_with_policy(reloader, options.reload_failure).await?;
            true
        }
        _ => false,
    };

    Ok(SyncReport {
        clients: clients.len(),
        entries,
        outcome,
        reloaded,
    })
}
