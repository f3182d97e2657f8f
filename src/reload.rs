//! Resolver Reload
//!
//! Pi-hole only picks up `lan.list` changes after its DNS service restarts.
//! The restart is a [`Reloader`] so the sync pipeline can run without
//! shelling out.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{info, warn};

use crate::error::ReloadError;

/// Default Pi-hole restart command
pub const DEFAULT_RELOAD_COMMAND: &str = "pihole restartdns";

/// Restarts the DNS resolver so it re-reads the hosts file
#[async_trait]
pub trait Reloader: Send + Sync {
    async fn reload(&self) -> Result<(), ReloadError>;
}

/// What to do when the restart command fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReloadFailurePolicy {
    /// Log a warning and exit successfully
    #[default]
    Ignore,
    /// Treat the failure as fatal
    Fail,
}

/// Runs an external command, e.g. `pihole restartdns`
#[derive(Debug, Clone)]
pub struct CommandReloader {
    program: String,
    args: Vec<String>,
}

impl CommandReloader {
    /// Split a command line on whitespace into program and arguments
    pub fn parse(command_line: &str) -> Result<Self, ReloadError> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or(ReloadError::EmptyCommand)?;

        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[async_trait]
impl Reloader for CommandReloader {
    async fn reload(&self) -> Result<(), ReloadError> {
        let command = self.display();
        info!(command = %command, "Restarting Pi-hole DNS...");

        let status = Command::new(&self.program)
            .args(&self.args)
            .status()
            .await
            .map_err(|source| ReloadError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !status.success() {
            return Err(ReloadError::Status {
                command,
                status: status.to_string(),
            });
        }

        info!("Pi-hole DNS restarted");
        Ok(())
    }
}

/// Run `reloader` and apply `policy` to any failure
pub async fn reload_with_policy(
    reloader: &dyn Reloader,
    policy: ReloadFailurePolicy,
) -> Result<(), ReloadError> {
    match reloader.reload().await {
        Ok(()) => Ok(()),
        Err(e) if policy == ReloadFailurePolicy::Ignore => {
            warn!(error = %e, "Resolver restart failed, ignoring");
            Ok(())
        }
        Err(e) => Err(e),
    }
}
