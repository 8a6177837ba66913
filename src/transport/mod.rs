//! Transport abstraction (§4.2, §9 "Polymorphic transports")
//!
//! Four blocking operations — FTP/SFTP/HTTP upload/download — behind one
//! trait. The executor dispatches by protocol tag; adding a protocol adds
//! a variant without touching executor logic.

pub mod ftp;
pub mod http;
pub mod mock;
pub mod sftp;

use crate::config::{CampaignConfig, Protocol};
use std::path::Path;
use thiserror::Error;

/// Verbatim diagnostic strings, per §7's error-kind taxonomy. `Display`
/// yields exactly the strings the report's error histogram expects.
#[derive(Debug, Error, Clone)]
pub enum TransportError {
    #[error("unsupported protocol: {0}")]
    UnsupportedProtocol(String),
    #[error("{0}")]
    Diagnostic(String),
}

impl TransportError {
    pub fn diagnostic(msg: impl Into<String>) -> Self {
        TransportError::Diagnostic(msg.into())
    }
}

/// Capability set all concrete transports implement. Each call is blocking
/// and scoped: the connection it opens is released on every exit path,
/// including failure (§4.2).
pub trait Transport: Send + Sync {
    fn upload(&self, local_path: &Path, remote_name: &str, config: &CampaignConfig)
        -> Result<(), TransportError>;

    fn download(&self, remote_name: &str, local_dest: &Path, config: &CampaignConfig)
        -> Result<(), TransportError>;
}

/// Resolve the transport implementation for a campaign's protocol. Returns
/// `None` for `Protocol::Other`, which the executor turns into an
/// `unsupported protocol: <name>` result rather than a fatal error.
pub fn resolve(protocol: &Protocol) -> Option<Box<dyn Transport>> {
    match protocol {
        Protocol::Ftp => Some(Box::new(ftp::FtpTransport)),
        Protocol::Sftp => Some(Box::new(sftp::SftpTransport)),
        Protocol::Http => Some(Box::new(http::HttpTransport)),
        Protocol::Other(_) => None,
    }
}
