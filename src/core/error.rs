//! Library error type
//!
//! Scan and document failures are never surfaced here: they are recorded as
//! data (`SkippedRoot`, `DocumentRead`). Only configuration, pin persistence
//! and worker plumbing can fail.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read pin store {path}: {source}")]
    PinStoreRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse pin store {path}: {source}")]
    PinStoreParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode pin store {path}: {source}")]
    PinStoreEncode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write pin store {path}: {source}")]
    PinStoreWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} worker is no longer running")]
    WorkerDisconnected(&'static str),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_path() {
        let err = Error::ConfigRead {
            path: PathBuf::from("/etc/mdscope.toml"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/etc/mdscope.toml"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_pin_store_encode_message() {
        let source = serde_json::from_str::<u8>("-1").unwrap_err();
        let err = Error::PinStoreEncode {
            path: PathBuf::from("/state/pins.json"),
            source,
        };
        assert!(err
            .to_string()
            .starts_with("failed to encode pin store /state/pins.json"));
    }

    #[test]
    fn test_worker_disconnected_message() {
        assert_eq!(
            Error::WorkerDisconnected("scan").to_string(),
            "scan worker is no longer running"
        );
    }
}
