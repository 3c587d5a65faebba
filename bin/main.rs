use tracing::{error, info};
use tracing_subscriber;

use clap::{value_t, values_t, App, Arg};

use model_sync::server::{node, Settings};
use model_sync::Result;

use std::path::PathBuf;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_level(false)
        .with_target(false)
        .without_time()
        .compact()
        .with_max_level(tracing::Level::INFO)
        .init();

    let matches = App::new("model-sync")
        .version("0.1")
        .about("Runs a model synchronisation node")
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("CONFIG_FILE")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("listener-ip")
                .short("a")
                .long("listener-ip")
                .value_name("LISTENER_IP")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("peer")
                .short("p")
                .long("peer")
                .value_name("[ID@]IP")
                .multiple(true)
                .takes_value(true),
        )
        .get_matches();

    let config_file = matches.value_of("config").map(PathBuf::from);
    let mut settings = Settings::new(config_file.as_deref())?;
    if matches.is_present("listener-ip") {
        settings.listener_ip =
            value_t!(matches.value_of("listener-ip"), String).unwrap_or_else(|e| e.exit());
    }
    if matches.is_present("peer") {
        settings.bootstrap_peers =
            values_t!(matches.values_of("peer"), String).unwrap_or_else(|e| e.exit());
    }

    let sys = actix::System::new();
    let started = sys.block_on(async move {
        let node = match node::run(settings).await {
            Ok(node) => node,
            Err(err) => {
                error!("unable to start: {}", err);
                return Err(err);
            }
        };
        info!("Node {} listening on {}", node.id, node.local_addr);

        let sig = if cfg!(unix) {
            use futures::future::FutureExt;
            use tokio::signal::unix::{signal, SignalKind};

            let mut sigint = signal(SignalKind::interrupt())?;
            let mut sigterm = signal(SignalKind::terminate())?;

            futures::select! {
                _ = sigint.recv().fuse() => "SIGINT",
                _ = sigterm.recv().fuse() => "SIGTERM"
            }
        } else {
            tokio::signal::ctrl_c().await?;
            "Ctrl+C"
        };
        info!(target: "model-sync", "Got {}, stopping...", sig);

        node.stop().await?;
        actix::System::current().stop();
        Ok::<(), model_sync::Error>(())
    });
    started?;
    sys.run()?;

    Ok(())
}
