use super::responder::Responder;
use crate::protocol::{Request, Response};

use tracing::{debug, info, warn};

use actix::{Actor, Addr, Context, Handler, ResponseFuture};

/// Routes inbound requests to the actor serving them.
///
/// Every peer able to reach the listener is served. An allow-list of peer ids would be checked
/// here, before routing.
pub struct Router {
    responder: Addr<Responder>,
}

impl Router {
    pub fn new(responder: Addr<Responder>) -> Self {
        Router { responder }
    }
}

impl Actor for Router {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Context<Self>) {
        debug!("router> started");
    }
}

impl Handler<Request> for Router {
    type Result = ResponseFuture<Response>;

    fn handle(&mut self, msg: Request, _ctx: &mut Context<Self>) -> Self::Result {
        let responder = self.responder.clone();
        Box::pin(async move {
            let method = msg.method();
            info!("routing {} -> Responder", method);
            let response = match msg {
                Request::Probe(probe) => {
                    responder.send(probe).await.map(|r| r.map(Response::ProbeAck))
                }
                Request::Transfer(transfer) => {
                    responder.send(transfer).await.map(|r| r.map(Response::TransferAck))
                }
            };
            match response {
                Ok(Ok(response)) => response,
                Ok(Err(err)) => {
                    warn!("unable to serve {}: {}", method, err);
                    Response::Failure(format!("{}", err))
                }
                Err(err) => {
                    warn!("responder unavailable for {}: {}", method, err);
                    Response::Failure(format!("{}", err))
                }
            }
        })
    }
}
