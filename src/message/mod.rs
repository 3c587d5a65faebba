//! Protocol message definitions.
mod probe;
mod transfer;

pub use probe::{Probe, ProbeAck};
pub use transfer::{Transfer, TransferAck};
