use crate::id::PeerId;
use crate::{Error, Result};

use std::fmt;
use std::net::{IpAddr, SocketAddr};

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct PeerMetadata {
    /// The explicit id of the peer, or the hash of its address when none was given.
    pub id: PeerId,
    /// The address the peer's sync listener is bound to.
    pub ip: SocketAddr,
}

impl PeerMetadata {
    pub fn new(id: PeerId, ip: SocketAddr) -> Self {
        PeerMetadata { id, ip }
    }

    /// Builds the metadata of a peer known only by its address.
    pub fn from_ip(ip: SocketAddr) -> Self {
        PeerMetadata { id: PeerId::from_ip(&ip), ip }
    }

    /// Parse a peer description from the format `IP` or `ID@IP` to its ID and address
    pub fn from_id_and_ip(s: &str) -> Result<PeerMetadata> {
        let parts: Vec<&str> = s.split('@').collect();
        if parts.len() == 1 {
            let ip: SocketAddr = parts[0].parse().map_err(|_| Error::PeerParseError)?;
            Ok(PeerMetadata::from_ip(ip))
        } else if parts.len() == 2 {
            let id: PeerId = parts[0].parse().map_err(|_| Error::PeerParseError)?;
            let ip: SocketAddr = parts[1].parse().map_err(|_| Error::PeerParseError)?;
            Ok(PeerMetadata { id, ip })
        } else {
            Err(Error::PeerParseError)
        }
    }

    /// Whether `other` describes this same node, by id or by the address it listens on.
    ///
    /// A peer listed by address alone carries the hash of that address as its id, which never
    /// matches a node with an explicit id or one bound to the unspecified address.
    pub fn is_same_node(&self, other: &PeerMetadata) -> bool {
        self.id == other.id
            || self.id == PeerId::from_ip(&other.ip)
            || other.id == PeerId::from_ip(&self.ip)
            || same_endpoint(&self.ip, &other.ip)
    }
}

fn same_endpoint(a: &SocketAddr, b: &SocketAddr) -> bool {
    if a.port() != b.port() {
        return false;
    }
    let local = |ip: IpAddr| ip.is_loopback() || ip.is_unspecified();
    a.ip() == b.ip()
        || (a.ip().is_unspecified() && local(b.ip()))
        || (b.ip().is_unspecified() && local(a.ip()))
}

impl fmt::Display for PeerMetadata {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.ip)
    }
}
