//! Peer identifiers
//!
//! See the documentation of [PeerId] for details.

use std::convert::TryInto;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use base58check::{FromBase58Check, ToBase58Check};
use blake2::digest::{Update, VariableOutput};
use blake2::Blake2bVar;
use rand::{self, Rng};

/// Identifies a node in the sync network.
///
/// The `PeerId` wraps a 32-byte hash. Nodes without an explicit identity use the hash of their
/// listening address (see [PeerId::from_ip]).
///
/// They are displayed using the Base58check format, which is also the name of the directory a
/// peer's synced artifact is written to.
#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Serialize, Deserialize, Default)]
pub struct PeerId([u8; 32]);

impl fmt::Debug for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.to_base58check(0))
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.to_base58check(0))
    }
}

impl FromStr for PeerId {
    type Err = crate::Error;

    /// Converts a base58check encoded string back to a `PeerId`
    fn from_str(id_str: &str) -> Result<Self, crate::Error> {
        let (vsn, bytes) =
            id_str.from_base58check().map_err(|_| crate::Error::TryFromStringError)?;
        if vsn != 0 {
            return Err(crate::Error::TryFromStringError);
        }
        let bytes: [u8; 32] =
            bytes.as_slice().try_into().map_err(|_| crate::Error::TryFromStringError)?;
        Ok(PeerId(bytes))
    }
}

impl PeerId {
    /// Hashes an arbitrary byte slice into an id.
    pub fn new(bytes: &[u8]) -> PeerId {
        PeerId(hash(bytes))
    }

    /// Reconstructs an id from its raw bytes, e.g. a storage key.
    pub fn from_bytes(bytes: [u8; 32]) -> PeerId {
        PeerId(bytes)
    }

    /// Converts a `SocketAddr` into an *untrusted* identity.
    pub fn from_ip(ip: &SocketAddr) -> PeerId {
        PeerId::new(format!("{:?}", ip).as_bytes())
    }

    pub fn generate() -> PeerId {
        let mut rng = rand::thread_rng();
        let v: [u8; 32] = rng.gen();
        PeerId(v)
    }

    /// All-ones `PeerId` (for testing)
    pub fn one() -> PeerId {
        PeerId([1u8; 32])
    }

    /// All-twos `PeerId` (for testing)
    pub fn two() -> PeerId {
        PeerId([2u8; 32])
    }

    /// All-threes `PeerId` (for testing)
    pub fn three() -> PeerId {
        PeerId([3u8; 32])
    }

    pub fn bytes(&self) -> [u8; 32] {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

fn hash(input: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2bVar::new(32).unwrap();
    hasher.update(input);
    let mut buf = [0u8; 32];
    hasher.finalize_variable(&mut buf).unwrap();
    buf
}
