//! SFTP transport over SSH (password auth), backed by `ssh2`.
//!
//! Host-key verification is intentionally skipped (insecure accept): this
//! tool targets disposable test environments, and `ssh2` does not verify
//! host keys unless the caller explicitly checks `known_hosts` (§4.2, §6).

use super::{Transport, TransportError};
use crate::config::CampaignConfig;
use ssh2::Session;
use std::io::{Read, Write};
use std::net::TcpStream;
use std::path::{Path, PathBuf};

pub struct SftpTransport;

fn connect(config: &CampaignConfig) -> Result<Session, TransportError> {
    let addr = format!("{}:{}", config.host, config.port);
    let tcp = TcpStream::connect(&addr).map_err(|e| TransportError::diagnostic(format!("{e}")))?;
    tcp.set_read_timeout(Some(config.timeout()))
        .map_err(|e| TransportError::diagnostic(format!("{e}")))?;
    tcp.set_write_timeout(Some(config.timeout()))
        .map_err(|e| TransportError::diagnostic(format!("{e}")))?;

    let mut session = Session::new().map_err(|e| TransportError::diagnostic(format!("{e}")))?;
    session.set_tcp_stream(tcp);
    session
        .handshake()
        .map_err(|e| TransportError::diagnostic(format!("{e}")))?;
    session
        .userauth_password(&config.username, &config.password)
        .map_err(|e| TransportError::diagnostic(format!("{e}")))?;
    Ok(session)
}

/// `mkdir -p` semantics for the remote parent directory (§4.2).
fn ensure_parent_dirs(sftp: &ssh2::Sftp, remote_path: &Path) {
    if let Some(parent) = remote_path.parent() {
        let mut current = PathBuf::new();
        for component in parent.components() {
            current.push(component);
            let _ = sftp.mkdir(&current, 0o755);
        }
    }
}

impl Transport for SftpTransport {
    fn upload(
        &self,
        local_path: &Path,
        remote_name: &str,
        config: &CampaignConfig,
    ) -> Result<(), TransportError> {
        let session = connect(config)?;
        let sftp = session
            .sftp()
            .map_err(|e| TransportError::diagnostic(format!("{e}")))?;

        let remote_path = PathBuf::from(format!("{}{}", config.remote_path, remote_name));
        ensure_parent_dirs(&sftp, &remote_path);

        let mut local = std::fs::File::open(local_path)
            .map_err(|e| TransportError::diagnostic(format!("file_not_found: {e}")))?;
        let mut remote_file = sftp
            .create(&remote_path)
            .map_err(|e| TransportError::diagnostic(format!("{e}")))?;

        let mut buf = Vec::new();
        local
            .read_to_end(&mut buf)
            .map_err(|e| TransportError::diagnostic(format!("{e}")))?;
        remote_file
            .write_all(&buf)
            .map_err(|e| TransportError::diagnostic(format!("{e}")))?;
        Ok(())
    }

    fn download(
        &self,
        remote_name: &str,
        local_dest: &Path,
        config: &CampaignConfig,
    ) -> Result<(), TransportError> {
        let session = connect(config)?;
        let sftp = session
            .sftp()
            .map_err(|e| TransportError::diagnostic(format!("{e}")))?;

        let remote_path = PathBuf::from(format!("{}{}", config.remote_path, remote_name));
        let mut remote_file = sftp
            .open(&remote_path)
            .map_err(|e| TransportError::diagnostic(format!("{e}")))?;

        let mut buf = Vec::new();
        remote_file
            .read_to_end(&mut buf)
            .map_err(|e| TransportError::diagnostic(format!("{e}")))?;

        let mut local = std::fs::File::create(local_dest)
            .map_err(|e| TransportError::diagnostic(format!("{e}")))?;
        local
            .write_all(&buf)
            .map_err(|e| TransportError::diagnostic(format!("{e}")))?;
        Ok(())
    }
}
