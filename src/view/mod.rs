//! The [View] actor contains the most up to date set of peers.
//!
//! The sync engine never talks to the actor directly: it takes one [PeerSet] snapshot per tick.
mod peer_meta;
mod view;

pub use peer_meta::PeerMetadata;
pub use view::*;

use crate::Result;

use std::future::Future;
use std::pin::Pin;

/// Source of the peers a node synchronises with.
pub trait PeerSet {
    /// The local node, never a sync target.
    fn self_peer(&self) -> PeerMetadata;

    /// A snapshot of the currently known peers.
    fn current_peers(&self) -> Pin<Box<dyn Future<Output = Result<Vec<PeerMetadata>>> + '_>>;
}

/// Removes the local node, whether listed by id or by address, keeping the order of the rest.
pub fn filter_self(peers: Vec<PeerMetadata>, self_peer: &PeerMetadata) -> Vec<PeerMetadata> {
    peers.into_iter().filter(|peer| !self_peer.is_same_node(peer)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::PeerId;

    #[test]
    fn test_filter_self() {
        let a = PeerMetadata::new(PeerId::one(), "127.0.0.1:1001".parse().unwrap());
        let b = PeerMetadata::new(PeerId::two(), "127.0.0.1:1002".parse().unwrap());
        let me = PeerMetadata::new(PeerId::three(), "127.0.0.1:1003".parse().unwrap());
        let filtered = filter_self(vec![a.clone(), me, b.clone()], &me);
        assert_eq!(filtered, vec![a, b]);
        assert!(filter_self(vec![], &me).is_empty());

        let by_address = PeerMetadata::from_id_and_ip("127.0.0.1:1003").unwrap();
        assert_eq!(filter_self(vec![by_address, a.clone()], &me), vec![a]);
    }
}
