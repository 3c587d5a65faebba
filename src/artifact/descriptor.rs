/// A node's claim about the freshness of its model artifact.
///
/// `version` is owned by whatever process produces the artifact; sync only ever compares it. Both
/// fields are part of the wire format and of the `metadata.json` written next to synced weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ArtifactDescriptor {
    pub version: u64,
    pub sample_size: u64,
}

impl ArtifactDescriptor {
    pub fn new(version: u64, sample_size: u64) -> Self {
        ArtifactDescriptor { version, sample_size }
    }

    /// Whether `self`, freshly observed from a peer, should replace `stored`.
    ///
    /// Absence of a stored descriptor always counts as older, including against version 0.
    pub fn supersedes(&self, stored: Option<&ArtifactDescriptor>) -> bool {
        match stored {
            None => true,
            Some(stored) => self.version > stored.version,
        }
    }
}

impl std::fmt::Display for ArtifactDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "v{} ({} samples)", self.version, self.sample_size)
    }
}
