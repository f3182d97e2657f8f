//! Pi-hole Hosts File Writer
//!
//! Writes entries as `<ip> <name>` lines, replacing whatever the file held
//! before. An empty entry list leaves the file untouched.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::HostsError;
use crate::records::DnsEntry;

/// What a write attempt did to the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file was replaced with this many lines
    Written(usize),
    /// There was nothing to write, the file was not opened
    Skipped,
}

/// Render entries in hosts-file format, one LF-terminated line each
pub fn render(entries: &[DnsEntry]) -> String {
    entries.iter().map(|entry| format!("{}\n", entry)).collect()
}

/// A static hosts file on disk
#[derive(Debug, Clone)]
pub struct HostsFile {
    path: PathBuf,
}

impl HostsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Truncate the file and write every entry in order
    ///
    /// Not atomic: a crash mid-write can leave a partial file.
    pub fn write(&self, entries: &[DnsEntry]) -> Result<WriteOutcome, HostsError> {
        if entries.is_empty() {
            info!("No DNS entries found to update");
            return Ok(WriteOutcome::Skipped);
        }

        info!(path = %self.path.display(), "Attempting to write DNS entries to file...");

        self.write_lines(entries)
            .map_err(|e| HostsError::from_io(&self.path, e))?;

        info!(count = entries.len(), "Hosts file updated successfully");
        Ok(WriteOutcome::Written(entries.len()))
    }

    fn write_lines(&self, entries: &[DnsEntry]) -> std::io::Result<()> {
        let mut writer = BufWriter::new(File::create(&self.path)?);
        for entry in entries {
            writeln!(writer, "{}", entry)?;
        }
        writer.flush()
    }
}
