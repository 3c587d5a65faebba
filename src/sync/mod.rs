//! Pull-based anti-entropy of model artifacts.
//!
//! On every tick the [Synchroniser] asks the [SyncEngine] to probe all known peers, compare the
//! advertised versions with the local [VersionRecordStore][crate::storage::VersionRecordStore]
//! and pull the artifacts of the peers which advanced. The [Ticker] drives the ticks.
mod engine;
mod outcome;
mod synchroniser;
mod ticker;


pub use engine::SyncEngine;
pub use outcome::{PeerOutcome, TickReport};
pub use synchroniser::Synchroniser;
pub use ticker::{Execute, Start, Stop, Ticker};
