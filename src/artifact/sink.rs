use super::{ArtifactDescriptor, METADATA_FILENAME, WEIGHTS_FILENAME};
use crate::id::PeerId;
use crate::Result;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Destination of artifacts pulled from peers.
///
/// The sync engine always calls `write_payload` before `write_metadata`, so a crash in between
/// leaves fresh weights next to stale metadata, never metadata describing weights that are not
/// there.
pub trait ArtifactSink: Send + Sync {
    fn write_payload(&self, peer: &PeerId, payload: &[u8]) -> Result<()>;

    fn write_metadata(&self, peer: &PeerId, descriptor: &ArtifactDescriptor) -> Result<()>;
}

/// A synced peer artifact found on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct PeerArtifact {
    pub peer: PeerId,
    pub descriptor: ArtifactDescriptor,
    pub weights_path: PathBuf,
}

/// Writes each peer's artifact to `<root>/<peer id>/{weights.h5, metadata.json}`.
#[derive(Debug, Clone)]
pub struct FsArtifactSink {
    root: PathBuf,
}

impl FsArtifactSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsArtifactSink { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn peer_dir(&self, peer: &PeerId) -> PathBuf {
        self.root.join(peer.to_string())
    }

    pub fn weights_path(&self, peer: &PeerId) -> PathBuf {
        self.peer_dir(peer).join(WEIGHTS_FILENAME)
    }

    pub fn metadata_path(&self, peer: &PeerId) -> PathBuf {
        self.peer_dir(peer).join(METADATA_FILENAME)
    }

    /// Lists every peer which has both a weights file and readable metadata, ordered by peer.
    ///
    /// Directories that are not named after a peer id, or that hold a partial artifact, are
    /// skipped.
    pub fn catalog(&self) -> Result<Vec<PeerArtifact>> {
        let mut artifacts = vec![];
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let peer = match entry.file_name().to_str().map(|name| name.parse::<PeerId>()) {
                Some(Ok(peer)) => peer,
                _ => {
                    debug!("skipping {:?}", entry.path());
                    continue;
                }
            };
            let weights_path = self.weights_path(&peer);
            if !weights_path.is_file() {
                continue;
            }
            let descriptor = match fs::read(self.metadata_path(&peer)) {
                Ok(raw) => match serde_json::from_slice::<ArtifactDescriptor>(&raw) {
                    Ok(descriptor) => descriptor,
                    Err(err) => {
                        warn!("unreadable metadata for {}: {}", peer, err);
                        continue;
                    }
                },
                Err(_) => continue,
            };
            artifacts.push(PeerArtifact { peer, descriptor, weights_path });
        }
        artifacts.sort_by(|a, b| a.peer.cmp(&b.peer));
        Ok(artifacts)
    }
}

/// Replaces `path` with `contents` so that readers only ever observe the old or the new file.
fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;
    let mut partial = path.as_os_str().to_owned();
    partial.push(".partial");
    let partial = PathBuf::from(partial);
    {
        let mut file = fs::File::create(&partial)?;
        file.write_all(contents)?;
        file.sync_all()?;
    }
    fs::rename(&partial, path)?;
    sync_dir(dir)
}

/// Persists the directory entries, so a renamed file survives a power loss.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<()> {
    fs::File::open(dir)?.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<()> {
    Ok(())
}

impl ArtifactSink for FsArtifactSink {
    fn write_payload(&self, peer: &PeerId, payload: &[u8]) -> Result<()> {
        let path = self.weights_path(peer);
        write_atomically(&path, payload)?;
        debug!("wrote {} bytes to {:?}", payload.len(), path);
        Ok(())
    }

    fn write_metadata(&self, peer: &PeerId, descriptor: &ArtifactDescriptor) -> Result<()> {
        let encoded = serde_json::to_vec(descriptor)?;
        write_atomically(&self.metadata_path(peer), &encoded)
    }
}
