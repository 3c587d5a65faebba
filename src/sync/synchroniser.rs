use super::engine::SyncEngine;
use super::ticker::Execute;

use crate::colored::Colorize;

use actix::{Actor, Context, Handler, ResponseFuture};
use tracing::{debug, info, info_span};
use tracing_futures::Instrument;

use std::rc::Rc;

/// Runs a [SyncEngine] tick on every `Execute` from the [Ticker][super::Ticker].
///
/// The ticker waits for each tick to finish, so at most one tick runs at a time.
pub struct Synchroniser {
    engine: Rc<SyncEngine>,
    ticks: u64,
}

impl Synchroniser {
    pub fn new(engine: SyncEngine) -> Self {
        Synchroniser { engine: Rc::new(engine), ticks: 0 }
    }
}

impl Actor for Synchroniser {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Context<Self>) {
        debug!("synchroniser> started");
    }
}

impl Handler<Execute> for Synchroniser {
    type Result = ResponseFuture<bool>;

    fn handle(&mut self, _msg: Execute, _ctx: &mut Context<Self>) -> Self::Result {
        self.ticks += 1;
        let engine = self.engine.clone();
        let n = self.ticks;
        Box::pin(
            async move {
                let report = engine.tick().await;
                if report.is_empty() {
                    return false;
                }
                let synced = report.synced();
                let summary = format!(
                    "{} peers, {} synced, {} failed",
                    report.outcomes.len(),
                    synced.len(),
                    report.failures()
                );
                if synced.is_empty() {
                    debug!("{}", summary);
                } else {
                    info!("{}", summary.as_str().green());
                }
                // Synchronisation never completes, only `Stop` ends the ticker.
                false
            }
            .instrument(info_span!("tick", n)),
        )
    }
}
