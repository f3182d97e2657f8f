//! Sync Error Types
//!
//! One error enum per pipeline stage, unified into [`SyncError`] for the
//! driver. Every variant is terminal for a run.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while resolving credentials
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading an interactive answer failed
    #[error("Failed to read {field} from prompt: {source}")]
    Prompt {
        field: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by the controller client
#[derive(Debug, Error)]
pub enum ControllerError {
    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Login was rejected or the controller was unreachable
    #[error("Error connecting to UniFi Controller: {0}")]
    Auth(#[source] reqwest::Error),

    /// The client list query was rejected, unreachable, or not JSON
    #[error("Error querying UniFi Controller: {0}")]
    Query(#[source] reqwest::Error),
}

/// Errors raised while writing the hosts file
#[derive(Debug, Error)]
pub enum HostsError {
    /// The current user may not write the target path
    #[error("You need root permissions to write to {}", .path.display())]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Any other I/O failure during the write
    #[error("An error occurred while writing to {}: {source}", .path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl HostsError {
    /// Classify an I/O error raised while writing `path`
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::PermissionDenied {
            HostsError::PermissionDenied { path, source }
        } else {
            HostsError::WriteFailure { path, source }
        }
    }
}

/// Errors raised by the resolver restart command
#[derive(Debug, Error)]
pub enum ReloadError {
    /// The reload command line was empty
    #[error("Reload command is empty")]
    EmptyCommand,

    /// The command could not be started
    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The command ran but reported failure
    #[error("`{command}` exited with {status}")]
    Status { command: String, status: String },
}

/// Any failure that terminates a sync run
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Controller(#[from] ControllerError),

    #[error(transparent)]
    Hosts(#[from] HostsError),

    #[error(transparent)]
    Reload(#[from] ReloadError),
}

impl SyncError {
    /// Returns `true` if the controller rejected the login
    pub fn is_auth(&self) -> bool {
        matches!(self, SyncError::Controller(ControllerError::Auth(_)))
    }

    /// Returns `true` if the hosts file was not writable by the current user
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, SyncError::Hosts(HostsError::PermissionDenied { .. }))
    }
}
