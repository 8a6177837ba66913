//! HTTP transport, backed by `reqwest::blocking`.
//!
//! Current path: plain POST/GET of `application/octet-stream` bodies with
//! `Content-Disposition: attachment; filename="<remote>"` (§6). TLS
//! verification is disabled — the tool targets test environments with
//! self-signed certificates.

use super::{Transport, TransportError};
use crate::config::CampaignConfig;
use reqwest::blocking::Client;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

pub struct HttpTransport;

fn client(timeout: Duration) -> Result<Client, TransportError> {
    Client::builder()
        .timeout(timeout)
        .danger_accept_invalid_certs(true)
        .build()
        .map_err(|e| TransportError::diagnostic(format!("{e}")))
}

fn url(config: &CampaignConfig, remote_name: &str) -> String {
    format!(
        "http://{}:{}{}{}",
        config.host, config.port, config.remote_path, remote_name
    )
}

impl Transport for HttpTransport {
    fn upload(
        &self,
        local_path: &Path,
        remote_name: &str,
        config: &CampaignConfig,
    ) -> Result<(), TransportError> {
        let client = client(config.timeout())?;
        let mut file = std::fs::File::open(local_path)
            .map_err(|e| TransportError::diagnostic(format!("file_not_found: {e}")))?;
        let mut body = Vec::new();
        file.read_to_end(&mut body)
            .map_err(|e| TransportError::diagnostic(format!("{e}")))?;

        let mut request = client
            .post(url(config, remote_name))
            .header("Content-Type", "application/octet-stream")
            .header(
                "Content-Disposition",
                format!("attachment; filename=\"{remote_name}\""),
            )
            .body(body);
        if !config.username.is_empty() {
            request = request.basic_auth(&config.username, Some(&config.password));
        }

        let response = request
            .send()
            .map_err(|e| TransportError::diagnostic(format!("{e}")))?;
        if !response.status().is_success() {
            return Err(TransportError::diagnostic(format!(
                "bad status: {}",
                response.status()
            )));
        }
        Ok(())
    }

    fn download(
        &self,
        remote_name: &str,
        local_dest: &Path,
        config: &CampaignConfig,
    ) -> Result<(), TransportError> {
        let client = client(config.timeout())?;
        let mut request = client.get(url(config, remote_name));
        if !config.username.is_empty() {
            request = request.basic_auth(&config.username, Some(&config.password));
        }

        let response = request
            .send()
            .map_err(|e| TransportError::diagnostic(format!("{e}")))?;
        if !response.status().is_success() {
            return Err(TransportError::diagnostic(format!(
                "bad status: {}",
                response.status()
            )));
        }
        let bytes = response
            .bytes()
            .map_err(|e| TransportError::diagnostic(format!("{e}")))?;
        let mut out = std::fs::File::create(local_dest)
            .map_err(|e| TransportError::diagnostic(format!("{e}")))?;
        out.write_all(&bytes)
            .map_err(|e| TransportError::diagnostic(format!("{e}")))?;
        Ok(())
    }
}
