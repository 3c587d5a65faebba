use clap::{value_t, App, Arg};
use colored::Colorize;
use tracing_subscriber;

use model_sync::artifact::FsArtifactSink;
use model_sync::storage::VersionRecordStore;
use model_sync::Result;

use std::path::PathBuf;

/// Lists the peer models synced into a peers directory, as the training process would see them.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_level(false)
        .with_target(false)
        .without_time()
        .compact()
        .with_max_level(tracing::Level::WARN)
        .init();

    let matches = App::new("catalog")
        .version("0.1")
        .about("Lists the peer models synced by a node")
        .arg(
            Arg::with_name("peers-dir")
                .short("d")
                .long("peers-dir")
                .value_name("PEERS_MODELS_DIR")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::with_name("db")
                .long("db")
                .value_name("VERSION_RECORD_DB")
                .takes_value(true),
        )
        .get_matches();

    let peers_dir = value_t!(matches.value_of("peers-dir"), PathBuf).unwrap_or_else(|e| e.exit());
    let store = match matches.value_of("db") {
        Some(path) => Some(VersionRecordStore::open(&PathBuf::from(path))?),
        None => None,
    };

    let sink = FsArtifactSink::new(peers_dir);
    for artifact in sink.catalog()? {
        let line = format!(
            "{} {} {}",
            artifact.peer,
            artifact.descriptor,
            artifact.weights_path.display()
        );
        match &store {
            Some(store) => match store.get(&artifact.peer)? {
                Some(record) if record == artifact.descriptor => {
                    println!("{} {}", line, "recorded".green())
                }
                Some(record) => println!("{} {}", line, format!("recorded {}", record).yellow()),
                None => println!("{} {}", line, "unrecorded".red()),
            },
            None => println!("{}", line),
        }
    }
    Ok(())
}
