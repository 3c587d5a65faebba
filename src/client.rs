//! Outbound requests: single exchanges and the concurrent multicall used by the sync engine.
use crate::channel::Channel;
use crate::protocol::{Request, Response};
use crate::view::PeerMetadata;
use crate::{Error, Result};

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::pin::Pin;

use tokio::time::Duration;
use tracing::{debug, error};

/// The outbound capability of a node, the only transport dependency of the sync engine.
pub trait Requester {
    /// Sends `request` to every peer concurrently and waits for all of them to settle.
    ///
    /// The result vector is in the order of `peers`, one entry per peer, so results zip back to
    /// peers by index. A failing peer never affects the results of the others.
    fn multicall(
        &self,
        peers: Vec<PeerMetadata>,
        request: Request,
    ) -> Pin<Box<dyn Future<Output = Vec<Result<Response>>> + '_>>;
}

/// Sends requests over plain TCP channels, one connection per exchange.
#[derive(Debug, Clone, Default)]
pub struct TcpRequester {
    /// Upper bound on a single exchange. `None` lets a request run until the transport gives up.
    timeout: Option<Duration>,
}

impl TcpRequester {
    pub fn new(timeout: Option<Duration>) -> Self {
        TcpRequester { timeout }
    }
}

impl Requester for TcpRequester {
    fn multicall(
        &self,
        peers: Vec<PeerMetadata>,
        request: Request,
    ) -> Pin<Box<dyn Future<Output = Vec<Result<Response>>> + '_>> {
        Box::pin(multicall(peers, request, self.timeout))
    }
}

/// Sends a single request and waits for its response.
///
/// A `Response::Failure` from the peer is turned into `Error::PeerFailure`.
pub async fn oneshot(ip: SocketAddr, request: Request) -> Result<Response> {
    let mut channel: Channel<Request, Response> = Channel::connect(&ip).await?;
    let (mut sender, mut receiver) = channel.split();
    // send a message to a peer
    let () = sender.send(request).await?;
    // await a response
    match receiver.recv().await {
        Ok(Some(Response::Failure(reason))) => Err(Error::PeerFailure(reason)),
        Ok(Some(response)) => Ok(response),
        Ok(None) => Err(Error::EmptyResponse),
        Err(err) => match err.kind() {
            io::ErrorKind::InvalidData | io::ErrorKind::Other => {
                Err(Error::Decode(format!("{}", err)))
            }
            _ => Err(Error::IO(err)),
        },
    }
    // ... the connection is closed by dropping the channel
}

/// Like [oneshot], giving up with `Error::Timeout` after `delta` if one is set.
pub async fn oneshot_with_timeout(
    ip: SocketAddr,
    request: Request,
    delta: Option<Duration>,
) -> Result<Response> {
    match delta {
        Some(delta) => match tokio::time::timeout(delta, oneshot(ip, request)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout),
        },
        None => oneshot(ip, request).await,
    }
}

/// Fans `request` out to `peers`, each exchange on its own task, and collects one result per
/// peer in input order.
pub async fn multicall(
    peers: Vec<PeerMetadata>,
    request: Request,
    delta: Option<Duration>,
) -> Vec<Result<Response>> {
    let method = request.method();
    let mut client_futs = vec![];
    for peer in peers.iter() {
        let ip = peer.ip;
        let request = request.clone();
        let client_fut = tokio::spawn(async move { oneshot_with_timeout(ip, request, delta).await });
        client_futs.push(client_fut)
    }
    debug!("{} -> {} peers", method, client_futs.len());
    // join the futures and collect the responses
    futures::future::join_all(client_futs)
        .await
        .into_iter()
        .map(|joined| match joined {
            Ok(result) => result,
            Err(err) => {
                error!("error: joining client futures: {}", err);
                Err(Error::JoinError)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactDescriptor;
    use crate::message::{Probe, ProbeAck};
    use tokio::net::TcpListener;

    /// Serves `response` to every connection accepted on a fresh port.
    async fn serve(response: Option<Response>) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let (mut channel, _): (Channel<Response, Request>, _) =
                    Channel::accept(&listener).await.unwrap();
                let response = response.clone();
                tokio::spawn(async move {
                    let (mut sender, mut receiver) = channel.split();
                    let _request = receiver.recv().await.unwrap();
                    match response {
                        Some(response) => sender.send(response).await.unwrap(),
                        // never answer
                        None => tokio::time::sleep(Duration::from_secs(60)).await,
                    }
                });
            }
        });
        address
    }

    /// An address nothing listens on.
    async fn dead_address() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    }

    fn probe_ack(version: u64) -> Response {
        Response::ProbeAck(ProbeAck::new(ArtifactDescriptor::new(version, 1)))
    }

    #[actix_rt::test]
    async fn test_multicall_keeps_input_order() {
        let a = serve(Some(probe_ack(1))).await;
        let dead = dead_address().await;
        let b = serve(Some(Response::Failure("no model".to_owned()))).await;
        let c = serve(Some(probe_ack(3))).await;

        let peers: Vec<PeerMetadata> =
            vec![a, dead, b, c].into_iter().map(PeerMetadata::from_ip).collect();
        let results = multicall(peers, Request::Probe(Probe), None).await;

        assert_eq!(results.len(), 4);
        match &results[0] {
            Ok(Response::ProbeAck(ack)) => assert_eq!(ack.descriptor.version, 1),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(matches!(results[1], Err(Error::IO(_))));
        match &results[2] {
            Err(Error::PeerFailure(reason)) => assert_eq!(reason, "no model"),
            other => panic!("unexpected result: {:?}", other),
        }
        match &results[3] {
            Ok(Response::ProbeAck(ack)) => assert_eq!(ack.descriptor.version, 3),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[actix_rt::test]
    async fn test_hung_peer_times_out_without_blocking_others() {
        let hung = serve(None).await;
        let fast = serve(Some(probe_ack(2))).await;
        let requester = TcpRequester::new(Some(Duration::from_millis(200)));

        let peers = vec![PeerMetadata::from_ip(hung), PeerMetadata::from_ip(fast)];
        let results = requester.multicall(peers, Request::Probe(Probe)).await;

        assert!(matches!(results[0], Err(Error::Timeout)));
        assert!(matches!(results[1], Ok(Response::ProbeAck(_))));
    }

    #[actix_rt::test]
    async fn test_multicall_to_nobody() {
        let results = multicall(vec![], Request::Probe(Probe), None).await;
        assert!(results.is_empty());
    }
}
