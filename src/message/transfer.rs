//! The weight transfer: pulls a peer's whole artifact.
use crate::artifact::ArtifactDescriptor;

use std::fmt;

use tai64::Tai64N;

/// Asks a peer for its full artifact.
///
/// There is no capability token: any node able to reach the listener may pull the weights.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Message)]
#[rtype(result = "crate::Result<TransferAck>")]
pub struct Transfer;

/// Reply to a [Transfer], carrying the weights as opaque bytes.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferAck {
    pub timestamp: Tai64N,
    pub descriptor: ArtifactDescriptor,
    pub payload: Vec<u8>,
    /// blake3 hash of `payload`
    pub digest: [u8; 32],
}

impl TransferAck {
    pub fn new(descriptor: ArtifactDescriptor, payload: Vec<u8>) -> Self {
        let digest = *blake3::hash(&payload).as_bytes();
        TransferAck { timestamp: Tai64N::now(), descriptor, payload, digest }
    }

    /// Whether the payload matches the digest computed by the sender.
    pub fn verify(&self) -> bool {
        blake3::hash(&self.payload) == blake3::Hash::from(self.digest)
    }
}

// Weights can run into hundreds of megabytes, keep them out of the logs.
impl fmt::Debug for TransferAck {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("TransferAck")
            .field("timestamp", &self.timestamp)
            .field("descriptor", &self.descriptor)
            .field("payload_len", &self.payload.len())
            .finish()
    }
}
