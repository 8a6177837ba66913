//! FTP transport (RFC 959, plaintext auth) backed by `suppaftp`.

use super::{Transport, TransportError};
use crate::config::CampaignConfig;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use suppaftp::FtpStream;

pub struct FtpTransport;

fn connect(config: &CampaignConfig) -> Result<FtpStream, TransportError> {
    let addr = format!("{}:{}", config.host, config.port);
    let mut stream = FtpStream::connect(&addr)
        .map_err(|e| TransportError::diagnostic(format!("{e}")))?;
    stream
        .get_ref()
        .set_read_timeout(Some(config.timeout()))
        .map_err(|e| TransportError::diagnostic(format!("{e}")))?;
    stream
        .login(&config.username, &config.password)
        .map_err(|e| TransportError::diagnostic(format!("{e}")))?;
    Ok(stream)
}

impl Transport for FtpTransport {
    fn upload(
        &self,
        local_path: &Path,
        remote_name: &str,
        config: &CampaignConfig,
    ) -> Result<(), TransportError> {
        let mut stream = connect(config)?;
        let remote = format!("{}{}", config.remote_path, remote_name);
        let mut file = File::open(local_path)
            .map_err(|e| TransportError::diagnostic(format!("file_not_found: {e}")))?;
        let result = stream
            .put_file(&remote, &mut file)
            .map_err(|e| TransportError::diagnostic(format!("{e}")));
        let _ = stream.quit();
        result.map(|_| ())
    }

    fn download(
        &self,
        remote_name: &str,
        local_dest: &Path,
        config: &CampaignConfig,
    ) -> Result<(), TransportError> {
        let mut stream = connect(config)?;
        let remote = format!("{}{}", config.remote_path, remote_name);
        let result = stream
            .retr_as_buffer(&remote)
            .map_err(|e| TransportError::diagnostic(format!("{e}")));
        let _ = stream.quit();
        let cursor = result?;
        let mut out = File::create(local_dest)
            .map_err(|e| TransportError::diagnostic(format!("{e}")))?;
        out.write_all(cursor.get_ref())
            .map_err(|e| TransportError::diagnostic(format!("{e}")))?;
        Ok(())
    }
}
