use std::net::SocketAddr;
use std::sync::Arc;

use crate::artifact::{ArtifactSink, FsArtifactProvider, FsArtifactSink};
use crate::client::TcpRequester;
use crate::id::PeerId;
use crate::server::{Responder, Router, Server, Settings};
use crate::storage::VersionRecordStore;
use crate::sync::{self, SyncEngine, Synchroniser, Ticker};
use crate::view::{PeerMetadata, View, ViewPeerSet};
use crate::Result;
use actix::{Actor, Addr};
use tracing::{error, info};

/// Handles to a running node.
pub struct Node {
    pub id: PeerId,
    /// The address the listener is actually bound to.
    pub local_addr: SocketAddr,
    pub view: Addr<View>,
    pub ticker: Addr<Ticker>,
    pub store: VersionRecordStore,
}

impl Node {
    /// Stops synchronising. The listener keeps serving until the system stops.
    pub async fn stop(&self) -> Result<()> {
        Ok(self.ticker.send(sync::Stop).await?)
    }
}

/// Starts a node: validates the host model, prepares the directories, binds the listener and
/// starts the actors. Must run within an actix system.
///
/// Any error is fatal and should end the process.
pub async fn run(settings: Settings) -> Result<Node> {
    let listener_ip = settings.listener_ip()?;
    let bootstrap_peers = settings.bootstrap_peers()?;

    let provider =
        FsArtifactProvider::new(&settings.host_model_weights_path, &settings.host_model_metadata_path);
    let host_descriptor = provider.validate()?;
    std::fs::create_dir_all(&settings.peers_models_dir)?;
    std::fs::create_dir_all(&settings.db_dir)?;

    // Setup the router and bind before anything else, the id may depend on the bound address
    let responder_addr = Responder::new(Arc::new(provider)).start();
    let router_addr = Router::new(responder_addr).start();
    let server = Server::bind(listener_ip, router_addr).await?;
    let local_addr = server.local_addr()?;
    let id = match settings.id()? {
        Some(id) => id,
        None => PeerId::from_ip(&local_addr),
    };
    info!("Node {} is starting with {}", id, host_descriptor);

    let db_path = settings.db_dir.join(format!("{}.sled", id));
    let store = VersionRecordStore::open(&db_path)?;

    // Listen for incoming connections
    let _ = tokio::spawn(async move {
        if let Err(err) = server.listen().await {
            error!("listener failed: {}", err);
        }
    });

    // Initialise a view with the bootstrap peers and start its actor
    let self_peer = PeerMetadata::new(id, local_addr);
    let mut view = View::new(self_peer);
    view.init(bootstrap_peers);
    let view_addr = view.start();

    let sink: Arc<dyn ArtifactSink> = Arc::new(FsArtifactSink::new(&settings.peers_models_dir));
    let engine = SyncEngine::new(
        Box::new(ViewPeerSet::new(self_peer, view_addr.clone())),
        Box::new(TcpRequester::new(settings.request_timeout())),
        Arc::new(store.clone()),
        sink,
    );
    let synchroniser_addr = Synchroniser::new(engine).start();
    let ticker_addr = Ticker::new(synchroniser_addr.recipient(), settings.sync_interval()).start();
    ticker_addr.do_send(sync::Start);

    Ok(Node { id, local_addr, view: view_addr, ticker: ticker_addr, store })
}
