#[macro_use]
extern crate serde_derive;
#[macro_use(Message, MessageResponse)]
extern crate actix_derive;
extern crate colored;

pub mod artifact;
pub mod channel;
pub mod client;
pub mod id;
pub mod message;
pub mod protocol;
pub mod server;
pub mod storage;
pub mod sync;
pub mod view;

use std::path::PathBuf;

#[derive(Debug)]
pub enum Error {
    IO(std::io::Error),
    Storage(storage::Error),
    Actix(actix::MailboxError),
    Config(config::ConfigError),

    // client errors
    /// The peer did not answer within the configured request timeout.
    Timeout,
    /// The response frame could not be decoded, or its payload failed the digest check.
    Decode(String),
    /// The peer closed the connection without answering.
    EmptyResponse,
    /// The peer answered with a response of the wrong kind.
    UnexpectedResponse,
    /// The peer answered, but reported that it could not serve the request.
    PeerFailure(String),
    JoinError,

    // artifact errors
    ArtifactUnavailable(String),
    InvalidMetadata(String),
    MissingHostArtifact(PathBuf),

    /// Error caused by converting from a `String` to an `PeerId`
    TryFromStringError,
    /// Error when parsing a peer description `ID@IP`
    PeerParseError,
}

impl std::error::Error for Error {}

impl std::convert::From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::IO(error)
    }
}

impl std::convert::From<storage::Error> for Error {
    fn from(error: storage::Error) -> Self {
        Error::Storage(error)
    }
}

impl std::convert::From<actix::MailboxError> for Error {
    fn from(error: actix::MailboxError) -> Self {
        Error::Actix(error)
    }
}

impl std::convert::From<config::ConfigError> for Error {
    fn from(error: config::ConfigError) -> Self {
        Error::Config(error)
    }
}

impl std::convert::From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::InvalidMetadata(format!("{}", error))
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
