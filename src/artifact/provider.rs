use super::ArtifactDescriptor;
use crate::{Error, Result};

use std::path::{Path, PathBuf};

use tracing::debug;

/// Supplies this node's own artifact when a peer probes it or pulls from it.
pub trait ArtifactProvider: Send + Sync {
    fn current_descriptor(&self) -> Result<ArtifactDescriptor>;

    fn current_payload(&self) -> Result<Vec<u8>>;
}

/// Reads the host model from the files a training process keeps up to date.
///
/// Both files are re-read on every request so that a newly trained model is served without a
/// restart.
#[derive(Debug, Clone)]
pub struct FsArtifactProvider {
    weights_path: PathBuf,
    metadata_path: PathBuf,
}

impl FsArtifactProvider {
    pub fn new(weights_path: impl Into<PathBuf>, metadata_path: impl Into<PathBuf>) -> Self {
        FsArtifactProvider { weights_path: weights_path.into(), metadata_path: metadata_path.into() }
    }

    /// Checks that the host artifact can be served at all. A node failing this check must not
    /// start.
    pub fn validate(&self) -> Result<ArtifactDescriptor> {
        for path in [&self.weights_path, &self.metadata_path].iter() {
            if !path.is_file() {
                return Err(Error::MissingHostArtifact(path.to_path_buf()));
            }
        }
        self.current_descriptor()
    }

    pub fn weights_path(&self) -> &Path {
        &self.weights_path
    }

    pub fn metadata_path(&self) -> &Path {
        &self.metadata_path
    }
}

impl ArtifactProvider for FsArtifactProvider {
    fn current_descriptor(&self) -> Result<ArtifactDescriptor> {
        let raw = std::fs::read(&self.metadata_path).map_err(|err| {
            Error::ArtifactUnavailable(format!("{}: {}", self.metadata_path.display(), err))
        })?;
        let descriptor: ArtifactDescriptor = serde_json::from_slice(&raw)?;
        debug!("host artifact is {}", descriptor);
        Ok(descriptor)
    }

    fn current_payload(&self) -> Result<Vec<u8>> {
        std::fs::read(&self.weights_path).map_err(|err| {
            Error::ArtifactUnavailable(format!("{}: {}", self.weights_path.display(), err))
        })
    }
}
