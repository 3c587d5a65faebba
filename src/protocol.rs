//! The node network message protocol.
use crate::message::{Probe, ProbeAck, Transfer, TransferAck};

#[derive(Debug, Clone, Serialize, Deserialize, Message)]
#[rtype(result = "Response")]
pub enum Request {
    Probe(Probe),
    Transfer(Transfer),
}

impl Request {
    /// Name of the remote procedure, for logs.
    pub fn method(&self) -> &'static str {
        match self {
            Request::Probe(_) => "ModelSync.RequestVersion",
            Request::Transfer(_) => "ModelSync.RequestModelWeight",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, MessageResponse)]
pub enum Response {
    ProbeAck(ProbeAck),
    TransferAck(TransferAck),
    /// The responder could not serve the request, e.g. its own model is not available yet.
    Failure(String),
}
