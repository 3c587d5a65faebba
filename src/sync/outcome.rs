use crate::artifact::ArtifactDescriptor;
use crate::id::PeerId;
use crate::storage;
use crate::Error;

/// What a single tick did for one peer.
///
/// Every variant other than `Synced` leaves the peer's version record untouched, so the peer is
/// looked at again on the next tick.
#[derive(Debug)]
pub enum PeerOutcome {
    /// The probe failed (unreachable peer, timeout, decode error or a failure reported by the
    /// peer).
    ProbeFailed(Error),
    /// The stored record for the peer could not be read.
    LookupFailed(storage::Error),
    /// The peer holds nothing newer than what was already persisted.
    UpToDate { observed: ArtifactDescriptor, stored: ArtifactDescriptor },
    /// The peer advertised a newer version but the transfer failed.
    TransferFailed(Error),
    /// The artifact arrived but writing it, or recording it, failed.
    PersistFailed(Error),
    /// A newer artifact was written to disk and recorded.
    Synced(ArtifactDescriptor),
}

impl PeerOutcome {
    pub fn is_synced(&self) -> bool {
        matches!(self, PeerOutcome::Synced(_))
    }

    pub fn is_failure(&self) -> bool {
        !matches!(self, PeerOutcome::Synced(_) | PeerOutcome::UpToDate { .. })
    }
}

/// The per-peer outcomes of one tick, in the order of the tick's peer snapshot.
#[derive(Debug, Default)]
pub struct TickReport {
    pub outcomes: Vec<(PeerId, PeerOutcome)>,
    /// Peers a transfer was requested from.
    pub transfer_targets: Vec<PeerId>,
}

impl TickReport {
    pub fn outcome(&self, peer: &PeerId) -> Option<&PeerOutcome> {
        self.outcomes.iter().find(|(id, _)| id == peer).map(|(_, outcome)| outcome)
    }

    pub fn synced(&self) -> Vec<PeerId> {
        self.outcomes.iter().filter(|(_, o)| o.is_synced()).map(|(id, _)| *id).collect()
    }

    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_failure()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}
