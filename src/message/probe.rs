//! The version probe: a cheap exchange revealing which artifact version a peer holds.
use crate::artifact::ArtifactDescriptor;

use tai64::Tai64N;

/// Asks a peer for the descriptor of its current artifact. Carries nothing: the responder does
/// not care what the asker holds.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Message)]
#[rtype(result = "crate::Result<ProbeAck>")]
pub struct Probe;

/// Reply to a [Probe]
///
/// See [Response][crate::protocol::Response]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeAck {
    /// When the responder read its descriptor.
    pub timestamp: Tai64N,
    pub descriptor: ArtifactDescriptor,
}

impl ProbeAck {
    pub fn new(descriptor: ArtifactDescriptor) -> Self {
        ProbeAck { timestamp: Tai64N::now(), descriptor }
    }
}
