//! Database storage layer using [`sled`](http://docs.rs/sled/) as backend

/// Last-known artifact descriptor per peer
pub mod version_record;

pub use version_record::{VersionRecordStore, VersionRecords};

#[derive(Debug)]
pub enum Error {
    Bincode(String),
    Sled(sled::Error),
    /// A stored key is not a 32-byte peer id.
    InvalidKey,
}

impl std::convert::From<Box<bincode::ErrorKind>> for Error {
    fn from(error: Box<bincode::ErrorKind>) -> Self {
        Error::Bincode(format!("{:?}", error))
    }
}

impl std::convert::From<sled::Error> for Error {
    fn from(error: sled::Error) -> Self {
        Error::Sled(error)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
