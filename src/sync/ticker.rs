use actix::{Actor, ActorFutureExt, AsyncContext, Context, Handler, Recipient, ResponseActFuture};
use tracing::{debug, error};

use std::time::Duration;

/// The `Ticker` sends `Execute` messages to its executor every `delta`.
///
/// The next `Execute` is only scheduled once the previous one has been handled, so executions
/// never overlap: a slow execution delays the next one instead.
pub struct Ticker {
    executor: Recipient<Execute>,
    delta: Duration,
    count: u64,
    stopped: bool,
}

impl Ticker {
    pub fn new(executor: Recipient<Execute>, delta: Duration) -> Self {
        Ticker { executor, delta, count: 0, stopped: false }
    }
}

/// Begins periodically sending `Execute` messages to the executor.
#[derive(Debug, Clone, Message)]
#[rtype(result = "()")]
pub struct Start;

impl Handler<Start> for Ticker {
    type Result = ResponseActFuture<Self, ()>;

    fn handle(&mut self, msg: Start, _ctx: &mut Context<Self>) -> Self::Result {
        if self.stopped {
            return Box::pin(actix::fut::ready(()));
        }
        let send_to_executor = self.executor.send(Execute);
        let send_to_executor = actix::fut::wrap_future::<_, Self>(send_to_executor);
        Box::pin(send_to_executor.map(move |done, actor, ctx| match done {
            Ok(done) => {
                actor.count += 1;
                if !done && !actor.stopped {
                    ctx.notify_later(msg, actor.delta);
                } else {
                    debug!("ticker> done after {} executions", actor.count);
                }
            }
            Err(err) => error!("ticker> executor unavailable: {:?}", err),
        }))
    }
}

/// Stops the ticker. An execution in progress completes, no further one is started.
#[derive(Debug, Clone, Message)]
#[rtype(result = "()")]
pub struct Stop;

impl Handler<Stop> for Ticker {
    type Result = ();

    fn handle(&mut self, _msg: Stop, _ctx: &mut Context<Self>) -> Self::Result {
        self.stopped = true;
    }
}

/// Sent to the executor on every tick. The executor returns `true` when the ticker should stop
/// and `false` when it should keep going.
#[derive(Debug, Clone, Message)]
#[rtype(result = "bool")]
pub struct Execute;

impl Actor for Ticker {
    type Context = Context<Self>;

    fn stopped(&mut self, _ctx: &mut Context<Self>) {
        debug!("ticker> stopped");
    }
}
