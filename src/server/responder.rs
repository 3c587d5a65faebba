use crate::artifact::ArtifactProvider;
use crate::message::{Probe, ProbeAck, Transfer, TransferAck};
use crate::{Error, Result};

use actix::{Actor, Context, Handler, ResponseFuture};
use tracing::debug;

use std::sync::Arc;

/// Answers probes and transfers from the host model.
///
/// Every request reads the provider afresh, a peer always sees the latest trained model.
pub struct Responder {
    provider: Arc<dyn ArtifactProvider>,
}

impl Responder {
    pub fn new(provider: Arc<dyn ArtifactProvider>) -> Self {
        Responder { provider }
    }
}

impl Actor for Responder {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Context<Self>) {
        debug!("responder> started");
    }
}

impl Handler<Probe> for Responder {
    type Result = Result<ProbeAck>;

    fn handle(&mut self, _msg: Probe, _ctx: &mut Context<Self>) -> Self::Result {
        let descriptor = self.provider.current_descriptor()?;
        Ok(ProbeAck::new(descriptor))
    }
}

impl Handler<Transfer> for Responder {
    type Result = ResponseFuture<Result<TransferAck>>;

    // Reading and hashing the weights runs on the blocking pool so that probes are still answered
    // while a large model is being served.
    fn handle(&mut self, _msg: Transfer, _ctx: &mut Context<Self>) -> Self::Result {
        let provider = self.provider.clone();
        Box::pin(async move {
            tokio::task::spawn_blocking(move || -> Result<TransferAck> {
                // Metadata first. Training replaces the weights before the metadata, so a model
                // retrained in between is announced with the older version and pulled again.
                let descriptor = provider.current_descriptor()?;
                let payload = provider.current_payload()?;
                debug!("serving {} ({} bytes)", descriptor, payload.len());
                Ok(TransferAck::new(descriptor, payload))
            })
            .await
            .unwrap_or_else(|_| Err(Error::JoinError))
        })
    }
}
