use super::router::Router;
use crate::channel::Channel;
use crate::protocol::{Request, Response};
use crate::Result;
use tracing::{debug, error, info, warn};

use actix::Addr;

use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;

const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Implements a server for handling incoming connections.
///
/// Each connection carries a single request and its response.
pub struct Server {
    listener: TcpListener,
    /// The address of the router.
    router: Addr<Router>,
}

impl Server {
    /// Binds to `ip`. Port 0 picks a free port, see [Server::local_addr].
    pub async fn bind(ip: SocketAddr, router: Addr<Router>) -> Result<Server> {
        let listener = TcpListener::bind(ip).await?;
        Ok(Server { listener, router })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub async fn listen(self) -> Result<()> {
        info!("listening on {:?}", self.local_addr()?);
        loop {
            let (mut channel, peer_ip): (Channel<Response, Request>, _) =
                match Channel::accept(&self.listener).await {
                    Ok(accepted) => accepted,
                    Err(err) => {
                        // e.g. out of file descriptors, give in-flight transfers time to finish
                        warn!("unable to accept a connection: {}", err);
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                        continue;
                    }
                };
            let router = self.router.clone();
            tokio::spawn(async move {
                let (mut sender, mut receiver) = channel.split();
                // receive a request
                let request = match receiver.recv().await {
                    Ok(Some(request)) => request,
                    Ok(None) => {
                        debug!("{} closed the connection without a request", peer_ip);
                        return;
                    }
                    Err(err) => {
                        warn!("invalid request from {}: {}", peer_ip, err);
                        return;
                    }
                };
                // process the request
                let response = match router.send(request).await {
                    Ok(response) => response,
                    Err(err) => {
                        error!("router unavailable: {}", err);
                        Response::Failure(format!("{}", err))
                    }
                };
                if let Err(err) = sender.send(response).await {
                    warn!("unable to answer {}: {}", peer_ip, err);
                }
            });
        }
    }
}
