//! The anti-entropy tick: probe every peer, pull from those that advanced.
use super::outcome::{PeerOutcome, TickReport};

use crate::artifact::{ArtifactDescriptor, ArtifactSink};
use crate::client::Requester;
use crate::id::PeerId;
use crate::message::{Probe, Transfer, TransferAck};
use crate::protocol::{Request, Response};
use crate::storage::VersionRecords;
use crate::view::{self, PeerMetadata, PeerSet};
use crate::{Error, Result};

use crate::colored::Colorize;

use std::sync::Arc;

use tracing::{debug, info, warn};

pub struct SyncEngine {
    peer_set: Box<dyn PeerSet>,
    requester: Box<dyn Requester>,
    store: Arc<dyn VersionRecords>,
    sink: Arc<dyn ArtifactSink>,
}

impl SyncEngine {
    pub fn new(
        peer_set: Box<dyn PeerSet>,
        requester: Box<dyn Requester>,
        store: Arc<dyn VersionRecords>,
        sink: Arc<dyn ArtifactSink>,
    ) -> Self {
        SyncEngine { peer_set, requester, store, sink }
    }

    /// Runs one synchronisation round against a snapshot of the peer set.
    ///
    /// Per-peer failures are reported in the returned [TickReport] and never abort the round.
    pub async fn tick(&self) -> TickReport {
        let self_peer = self.peer_set.self_peer();
        let peers = match self.peer_set.current_peers().await {
            Ok(peers) => view::filter_self(peers, &self_peer),
            Err(err) => {
                warn!("unable to read the peer set: {}", err);
                return TickReport::default();
            }
        };
        if peers.is_empty() {
            debug!("no peers to synchronise with");
            return TickReport::default();
        }

        // Probe every peer and keep those holding something newer than the stored record
        let probes = self.requester.multicall(peers.clone(), Request::Probe(Probe)).await;
        let mut outcomes: Vec<Option<PeerOutcome>> = Vec::with_capacity(peers.len());
        let mut newer: Vec<(usize, PeerMetadata)> = vec![];
        for (i, (peer, result)) in peers.iter().zip(probes.into_iter()).enumerate() {
            outcomes.push(self.classify(peer, result));
            if outcomes[i].is_none() {
                newer.push((i, *peer));
            }
        }

        // Pull from exactly the peers which advanced
        let transfer_targets: Vec<PeerId> = newer.iter().map(|(_, peer)| peer.id).collect();
        if !newer.is_empty() {
            let targets: Vec<PeerMetadata> = newer.iter().map(|(_, peer)| *peer).collect();
            let transfers = self.requester.multicall(targets, Request::Transfer(Transfer)).await;
            for ((i, peer), result) in newer.iter().zip(transfers.into_iter()) {
                let outcome = match transfer_ack(result) {
                    Ok(ack) => self.persist(peer, ack).await,
                    Err(err) => {
                        warn!("transfer from {} failed: {}", peer, err);
                        PeerOutcome::TransferFailed(err)
                    }
                };
                outcomes[*i] = Some(outcome);
            }
        }

        let outcomes = peers
            .iter()
            .zip(outcomes.into_iter())
            .filter_map(|(peer, outcome)| outcome.map(|outcome| (peer.id, outcome)))
            .collect();
        TickReport { outcomes, transfer_targets }
    }

    /// Decides what to do with a probe result. `None` means the peer advanced and must be pulled.
    fn classify(&self, peer: &PeerMetadata, result: Result<Response>) -> Option<PeerOutcome> {
        let observed = match probe_descriptor(result) {
            Ok(descriptor) => descriptor,
            Err(err) => {
                warn!("probe of {} failed: {}", peer, err);
                return Some(PeerOutcome::ProbeFailed(err));
            }
        };
        match self.store.get(&peer.id) {
            Ok(Some(stored)) if !observed.supersedes(Some(&stored)) => {
                debug!("{} is up to date at {}", peer.id, stored);
                Some(PeerOutcome::UpToDate { observed, stored })
            }
            Ok(stored) => {
                let message = format!("found new version {} for {}", observed, peer.id);
                info!("{}", message.as_str().cyan());
                if let Some(stored) = stored {
                    debug!("replacing {}", stored);
                }
                None
            }
            Err(err) => {
                warn!("unable to read the record of {}: {}", peer.id, err);
                Some(PeerOutcome::LookupFailed(err))
            }
        }
    }

    /// Writes the payload, then the metadata, then the version record. The first failing step
    /// abandons the peer for this tick, leaving its record as it was.
    ///
    /// The files are written on the blocking pool, weights may be hundreds of megabytes.
    async fn persist(&self, peer: &PeerMetadata, ack: TransferAck) -> PeerOutcome {
        // The peer may have rolled back between probe and transfer.
        match self.store.get(&peer.id) {
            Ok(Some(stored)) if !ack.descriptor.supersedes(Some(&stored)) => {
                debug!("{} sent {}, keeping {}", peer.id, ack.descriptor, stored);
                return PeerOutcome::UpToDate { observed: ack.descriptor, stored };
            }
            Ok(_) => (),
            Err(err) => return PeerOutcome::LookupFailed(err),
        }
        let sink = self.sink.clone();
        let (id, descriptor, payload) = (peer.id, ack.descriptor, ack.payload);
        let written = tokio::task::spawn_blocking(move || -> Result<()> {
            sink.write_payload(&id, &payload)?;
            sink.write_metadata(&id, &descriptor)
        })
        .await
        .unwrap_or_else(|_| Err(Error::JoinError));
        if let Err(err) = written {
            warn!("unable to write the artifact of {}: {}", peer.id, err);
            return PeerOutcome::PersistFailed(err);
        }
        if let Err(err) = self.store.set(&peer.id, &descriptor) {
            warn!("unable to record {} for {}: {}", descriptor, peer.id, err);
            return PeerOutcome::PersistFailed(Error::Storage(err));
        }
        let message = format!("synced {} from {}", descriptor, peer.id);
        info!("{}", message.as_str().green());
        PeerOutcome::Synced(descriptor)
    }
}

fn probe_descriptor(result: Result<Response>) -> Result<ArtifactDescriptor> {
    match result? {
        Response::ProbeAck(ack) => Ok(ack.descriptor),
        _ => Err(Error::UnexpectedResponse),
    }
}

fn transfer_ack(result: Result<Response>) -> Result<TransferAck> {
    match result? {
        Response::TransferAck(ack) => {
            if ack.verify() {
                Ok(ack)
            } else {
                Err(Error::Decode("payload does not match its digest".to_owned()))
            }
        }
        _ => Err(Error::UnexpectedResponse),
    }
}
