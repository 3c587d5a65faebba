//! Model artifacts: the descriptor exchanged by probes, the local provider answering inbound
//! requests and the sink persisting artifacts pulled from peers.
mod descriptor;
mod provider;
mod sink;

pub use descriptor::ArtifactDescriptor;
pub use provider::{ArtifactProvider, FsArtifactProvider};
pub use sink::{ArtifactSink, FsArtifactSink, PeerArtifact};

/// File name of a weights payload, both for the host model and for every synced peer.
/// Must match the model manager's weights file name.
pub const WEIGHTS_FILENAME: &str = "weights.h5";
/// File name of the JSON encoded [ArtifactDescriptor] stored next to the weights.
pub const METADATA_FILENAME: &str = "metadata.json";
