use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use engine_logging::{engine_error, engine_info, engine_warn};
use harvester_core::{Profile, ProgressSnapshot};
use thiserror::Error;

use crate::persist::{AtomicFileWriter, PersistError};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("no snapshot at {0}")]
    Missing(PathBuf),
    #[error("failed while decoding {path} as a JSON file: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to write snapshot: {0}")]
    Persist(#[from] PersistError),
}

/// Reads and writes `{root}/{profile}/{profile}-profile.json`.
#[derive(Debug, Clone)]
pub struct ProgressStore {
    root: PathBuf,
}

impl ProgressStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn snapshot_path(&self, profile: &Profile) -> PathBuf {
        self.root.join(profile.snapshot_file())
    }

    pub fn read(&self, profile: &Profile) -> Result<ProgressSnapshot, SnapshotError> {
        let path = self.snapshot_path(profile);
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(SnapshotError::Missing(path));
            }
            Err(source) => return Err(SnapshotError::Io { path, source }),
        };
        serde_json::from_str(&content).map_err(|source| SnapshotError::Corrupt { path, source })
    }

    pub fn write(&self, profile: &Profile) -> Result<ProgressSnapshot, SnapshotError> {
        let snapshot = ProgressSnapshot::capture(profile);
        // serde_json pretty printing indents with two spaces.
        let content = serde_json::to_string_pretty(&snapshot).map_err(SnapshotError::Encode)?;
        let (writer, filename) = AtomicFileWriter::for_path(&self.snapshot_path(profile))?;
        writer.write(&filename, &content)?;
        Ok(snapshot)
    }

    /// Seeds the profile's registry from its last snapshot. A missing or
    /// unreadable snapshot leaves the registry empty.
    pub fn restore(&self, profile: &mut Profile) {
        match self.read(profile) {
            Ok(snapshot) => {
                snapshot.restore_into(profile);
                engine_info!(
                    "read {} links from {}",
                    profile.registry().available().len(),
                    self.snapshot_path(profile).display()
                );
            }
            Err(SnapshotError::Missing(path)) => {
                engine_info!("no posts to read from {}", path.display());
            }
            Err(err @ SnapshotError::Corrupt { .. }) => {
                engine_error!("{err}");
            }
            Err(err) => {
                engine_warn!("{err}");
            }
        }
    }

    /// Writes a fresh snapshot, logging instead of failing.
    pub fn save(&self, profile: &Profile) {
        match self.write(profile) {
            Ok(snapshot) => engine_info!(
                "saved {} with progress {:.2}% ({}/{})",
                snapshot.profile,
                snapshot.progress,
                snapshot.total_downloaded,
                snapshot.total
            ),
            Err(err) => engine_error!(
                "failed to save progress of {} to {}: {}",
                profile.name(),
                self.snapshot_path(profile).display(),
                err
            ),
        }
    }
}
