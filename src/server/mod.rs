//! The inbound side of a node: the listener, the request router and the responder serving the
//! host model, plus the settings and the wiring of a whole node.
pub mod node;
mod responder;
mod router;
mod server;
pub mod settings;

pub use responder::*;
pub use router::*;
pub use server::*;
pub use settings::*;
