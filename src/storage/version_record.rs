use super::{Error, Result};

use crate::artifact::ArtifactDescriptor;
use crate::id::PeerId;

use std::path::Path;

use zerocopy::{AsBytes, FromBytes, Unaligned};

#[derive(Clone, FromBytes, AsBytes, Unaligned)]
#[repr(C)]
pub struct Key {
    peer: [u8; 32],
}

impl Key {
    pub fn new(peer: &PeerId) -> Key {
        Key { peer: peer.bytes() }
    }
}

/// The record operations the sync engine relies on.
pub trait VersionRecords: Send + Sync {
    fn get(&self, peer: &PeerId) -> Result<Option<ArtifactDescriptor>>;

    fn set(&self, peer: &PeerId, descriptor: &ArtifactDescriptor) -> Result<()>;
}

/// Durable map from a peer to the descriptor of the newest artifact persisted for it.
///
/// The store does not compare versions: `set` overwrites unconditionally and the sync engine is
/// responsible for only ever moving a record forward. Each `set` is flushed before returning.
///
/// `sled` synchronises per key, so concurrent updates for different peers do not contend on a
/// global lock. Cloning the store is cheap and shares the underlying database.
#[derive(Clone)]
pub struct VersionRecordStore {
    db: sled::Db,
}

impl VersionRecordStore {
    /// Opens (or creates) the store at `path`. A node always opens the same path for its identity
    /// so that records survive restarts.
    pub fn open(path: &Path) -> Result<Self> {
        let db = sled::open(path)?;
        Ok(VersionRecordStore { db })
    }

    pub fn from_db(db: sled::Db) -> Self {
        VersionRecordStore { db }
    }

    /// A throwaway store for tests.
    pub fn temporary() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(VersionRecordStore { db })
    }

    /// Fetches the last persisted descriptor for `peer`, `None` if the peer was never synced.
    pub fn get(&self, peer: &PeerId) -> Result<Option<ArtifactDescriptor>> {
        let key = Key::new(peer);
        match self.db.get(key.as_bytes()) {
            Ok(Some(v)) => Ok(Some(bincode::deserialize(v.as_ref())?)),
            Ok(None) => Ok(None),
            Err(err) => Err(Error::Sled(err)),
        }
    }

    /// Records `descriptor` as the newest persisted artifact of `peer`.
    pub fn set(&self, peer: &PeerId, descriptor: &ArtifactDescriptor) -> Result<()> {
        let key = Key::new(peer);
        let encoded = bincode::serialize(descriptor)?;
        let _ = self.db.insert(key.as_bytes(), encoded)?;
        let _ = self.db.flush()?;
        Ok(())
    }

    /// All records, ordered by peer id.
    pub fn iter(&self) -> Result<Vec<(PeerId, ArtifactDescriptor)>> {
        let mut records = vec![];
        for kv in self.db.iter() {
            let (k, v) = kv?;
            let key = Key::read_from(k.as_ref()).ok_or(Error::InvalidKey)?;
            let descriptor: ArtifactDescriptor = bincode::deserialize(v.as_ref())?;
            records.push((PeerId::from_bytes(key.peer), descriptor));
        }
        Ok(records)
    }

    pub fn len(&self) -> usize {
        self.db.len()
    }
}

impl VersionRecords for VersionRecordStore {
    fn get(&self, peer: &PeerId) -> Result<Option<ArtifactDescriptor>> {
        VersionRecordStore::get(self, peer)
    }

    fn set(&self, peer: &PeerId, descriptor: &ArtifactDescriptor) -> Result<()> {
        VersionRecordStore::set(self, peer, descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_is_distinct_from_zero() {
        let store = VersionRecordStore::temporary().unwrap();
        assert_eq!(store.get(&PeerId::one()).unwrap(), None);

        store.set(&PeerId::one(), &ArtifactDescriptor::new(0, 0)).unwrap();
        assert_eq!(store.get(&PeerId::one()).unwrap(), Some(ArtifactDescriptor::new(0, 0)));
        assert_eq!(store.get(&PeerId::two()).unwrap(), None);
    }

    #[test]
    fn test_set_overwrites_unconditionally() {
        let store = VersionRecordStore::temporary().unwrap();
        store.set(&PeerId::one(), &ArtifactDescriptor::new(5, 1)).unwrap();
        store.set(&PeerId::one(), &ArtifactDescriptor::new(2, 1)).unwrap();
        assert_eq!(store.get(&PeerId::one()).unwrap(), Some(ArtifactDescriptor::new(2, 1)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node.sled");
        {
            let store = VersionRecordStore::open(&path).unwrap();
            store.set(&PeerId::one(), &ArtifactDescriptor::new(3, 30)).unwrap();
            store.set(&PeerId::two(), &ArtifactDescriptor::new(1, 10)).unwrap();
        }
        let store = VersionRecordStore::open(&path).unwrap();
        assert_eq!(store.get(&PeerId::one()).unwrap(), Some(ArtifactDescriptor::new(3, 30)));
        assert_eq!(
            store.iter().unwrap(),
            vec![
                (PeerId::one(), ArtifactDescriptor::new(3, 30)),
                (PeerId::two(), ArtifactDescriptor::new(1, 10)),
            ]
        );
    }

    #[test]
    fn test_corrupt_value_is_an_error() {
        let db = sled::Config::new().temporary(true).open().unwrap();
        let _ = db.insert(Key::new(&PeerId::one()).as_bytes(), vec![1u8]).unwrap();
        let store = VersionRecordStore::from_db(db);
        assert!(matches!(store.get(&PeerId::one()), Err(Error::Bincode(_))));
    }
}
