use crate::id::PeerId;
use crate::view::PeerMetadata;
use crate::{Error, Result};

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

// For explanation, see issue: https://github.com/serde-rs/serde/issues/368
fn default_sync_interval_ms() -> u64 {
    1000
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Address the sync listener binds to. Port 0 picks a free port.
    pub listener_ip: String,
    /// Initial peers, as `IP` or `ID@IP`.
    pub bootstrap_peers: Vec<String>,
    /// Base58check node id. Defaults to the hash of the bound address.
    pub id: Option<String>,
    pub host_model_weights_path: PathBuf,
    pub host_model_metadata_path: PathBuf,
    /// Root of the per-peer artifact directories.
    pub peers_models_dir: PathBuf,
    /// Directory holding the version record store.
    pub db_dir: PathBuf,
    #[serde(default = "default_sync_interval_ms")]
    pub sync_interval_ms: u64,
    /// Bounds every outbound exchange. Unset means no timeout beyond the transport's own.
    pub request_timeout_ms: Option<u64>,
}

const DEFAULT_CONFIG: &str = include_str!("settings/Default.json");
const CONFIG_FILE_PREFIX: &str = "settings/";
const ENV_PREFIX: &str = "MODEL_SYNC";

#[derive(Clone, Debug, Deserialize)]
pub enum ENV {
    Testing,
    Development,
    Production,
}

impl fmt::Display for ENV {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ENV::Testing => write!(f, "Testing"),
            ENV::Production => write!(f, "Production"),
            ENV::Development => write!(f, "Development"),
        }
    }
}

impl From<&str> for ENV {
    fn from(env: &str) -> Self {
        match env {
            "Testing" => ENV::Testing,
            "Production" => ENV::Production,
            _ => ENV::Development,
        }
    }
}

impl Settings {
    /// Loads the settings: the embedded defaults, then `settings/<RUN_ENV>` if present, then
    /// `config_file`, then `MODEL_SYNC_*` environment variables.
    pub fn new(config_file: Option<&Path>) -> Result<Self> {
        let env = std::env::var("RUN_ENV").unwrap_or_else(|_| "Development".into());
        let env = ENV::from(env.as_str());
        let mut builder = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Json))
            .add_source(File::with_name(&format!("{}{}", CONFIG_FILE_PREFIX, env)).required(false));
        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path));
        }
        let settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    pub fn listener_ip(&self) -> Result<SocketAddr> {
        self.listener_ip.parse().map_err(|_| Error::PeerParseError)
    }

    pub fn bootstrap_peers(&self) -> Result<Vec<PeerMetadata>> {
        self.bootstrap_peers.iter().map(|p| PeerMetadata::from_id_and_ip(p)).collect()
    }

    pub fn id(&self) -> Result<Option<PeerId>> {
        match &self.id {
            Some(id) => Ok(Some(id.parse()?)),
            None => Ok(None),
        }
    }

    pub fn sync_interval(&self) -> Duration {
        Duration::from_millis(self.sync_interval_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}
