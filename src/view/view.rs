use super::{PeerMetadata, PeerSet};
use crate::id::PeerId;
use crate::Result;

use actix::{Actor, Addr, Context, Handler};
use tracing::debug;

use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;

/// The view contains the most up to date set of peers. The local node is never part of it.
#[derive(Debug)]
pub struct View {
    self_peer: PeerMetadata,
    peers: HashMap<PeerId, SocketAddr>,
}

impl View {
    pub fn new(self_peer: PeerMetadata) -> Self {
        View { self_peer, peers: HashMap::new() }
    }

    pub fn init(&mut self, peers: Vec<PeerMetadata>) {
        for peer in peers.iter() {
            let _ = self.insert_update(*peer);
        }
    }

    /// Returns whether the peer was added or its address changed.
    pub fn insert_update(&mut self, peer: PeerMetadata) -> bool {
        if self.self_peer.is_same_node(&peer) {
            debug!("ignoring {}, it is this node", peer);
            return false;
        }
        match self.peers.insert(peer.id, peer.ip) {
            Some(ip) if ip == peer.ip => false,
            _ => {
                debug!("inserted {}", peer);
                true
            }
        }
    }

    pub fn remove(&mut self, id: &PeerId) -> bool {
        self.peers.remove(id).is_some()
    }

    /// The current peers ordered by id.
    pub fn peers(&self) -> Vec<PeerMetadata> {
        let mut peers: Vec<PeerMetadata> =
            self.peers.iter().map(|(id, ip)| PeerMetadata::new(*id, *ip)).collect();
        peers.sort_by(|a, b| a.id.cmp(&b.id));
        peers
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }
}

impl Actor for View {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Context<Self>) {
        debug!("view> started with {} peers", self.peers.len())
    }
}

#[derive(Debug, Clone, Message)]
#[rtype(result = "PeersResult")]
pub struct GetPeers;

#[derive(Debug, Clone, MessageResponse)]
pub struct PeersResult {
    pub peers: Vec<PeerMetadata>,
}

impl Handler<GetPeers> for View {
    type Result = PeersResult;

    fn handle(&mut self, _msg: GetPeers, _ctx: &mut Context<Self>) -> Self::Result {
        PeersResult { peers: self.peers() }
    }
}

#[derive(Debug, Clone, Message)]
#[rtype(result = "bool")]
pub struct InsertPeer {
    pub peer: PeerMetadata,
}

impl Handler<InsertPeer> for View {
    type Result = bool;

    fn handle(&mut self, msg: InsertPeer, _ctx: &mut Context<Self>) -> Self::Result {
        self.insert_update(msg.peer)
    }
}

#[derive(Debug, Clone, Message)]
#[rtype(result = "bool")]
pub struct RemovePeer {
    pub id: PeerId,
}

impl Handler<RemovePeer> for View {
    type Result = bool;

    fn handle(&mut self, msg: RemovePeer, _ctx: &mut Context<Self>) -> Self::Result {
        let removed = self.remove(&msg.id);
        if removed {
            debug!("removed {}", msg.id);
        }
        removed
    }
}

/// A [PeerSet] backed by a running [View] actor.
#[derive(Clone)]
pub struct ViewPeerSet {
    self_peer: PeerMetadata,
    view: Addr<View>,
}

impl ViewPeerSet {
    pub fn new(self_peer: PeerMetadata, view: Addr<View>) -> Self {
        ViewPeerSet { self_peer, view }
    }
}

impl PeerSet for ViewPeerSet {
    fn self_peer(&self) -> PeerMetadata {
        self.self_peer
    }

    fn current_peers(&self) -> Pin<Box<dyn Future<Output = Result<Vec<PeerMetadata>>> + '_>> {
        let view = self.view.clone();
        Box::pin(async move {
            let PeersResult { peers } = view.send(GetPeers).await?;
            Ok(peers)
        })
    }
}
