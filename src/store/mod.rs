//! Tunnel configuration store.
//!
//! # Data Flow
//! ```text
//! frpc.toml on disk
//!     → read() (parse into an ordered Document)
//!     → registry applies one CRUD mutation in memory
//!     → write() (backup.rs rotates a timestamped copy,
//!                writer.rs renders scalars-then-sections,
//!                temp file + rename replaces the original)
//! ```
//!
//! # Design Decisions
//! - The document is read fresh from disk for every request and never cached
//! - Writes go through a temp file and an atomic rename so a crash mid-write
//!   cannot leave a truncated config behind
//! - The backup copy is taken from the on-disk file before the rewrite, so a
//!   failed write always leaves a recoverable snapshot

pub mod backup;
pub mod writer;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use toml::Table;

use crate::config::schema::BackupSettings;

/// The full in-memory representation of the tunnel config file for one
/// read/write cycle: an ordered mapping of top-level key to value.
pub type Document = Table;

/// Errors from reading or writing the tunnel configuration file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("error reading frpc config: {0}")]
    Read(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("error writing frpc config: {0}")]
    Write(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Read/write adapter for the tunnel configuration file.
pub struct ConfigStore {
    path: PathBuf,
    backups: BackupSettings,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>, backups: BackupSettings) -> Self {
        Self {
            path: path.into(),
            backups,
        }
    }

    /// Path of the managed config file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and parse the config file into a [`Document`].
    pub fn read(&self) -> Result<Document, StoreError> {
        let content = fs::read_to_string(&self.path).map_err(|e| StoreError::Read(e.into()))?;
        content.parse::<Table>().map_err(|e| StoreError::Read(e.into()))
    }

    /// Serialize `document` back to disk, rotating a backup first.
    ///
    /// The backup step copies the current on-disk file; if the subsequent
    /// rewrite fails, the original file is untouched and the backup remains.
    pub fn write(&self, document: &Document) -> Result<(), StoreError> {
        if self.backups.enabled {
            backup::rotate(&self.path, self.backups.dir.as_deref())
                .map_err(|e| StoreError::Write(e.into()))?;
        }

        let rendered = writer::render(document);
        let tmp = self.path.with_file_name(format!(
            "{}.tmp",
            self.path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "frpc.toml".to_string())
        ));
        fs::write(&tmp, rendered).map_err(|e| StoreError::Write(e.into()))?;
        fs::rename(&tmp, &self.path).map_err(|e| StoreError::Write(e.into()))?;

        tracing::debug!(path = %self.path.display(), "tunnel config rewritten");
        Ok(())
    }
}
