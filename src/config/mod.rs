//! Configuration module
//!
//! Handles CLI argument parsing, campaign JSON loading, and validation.
//! The campaign file describes the external, user-facing shape (§6); it is
//! converted once into `CampaignConfig`, the immutable-after-load form the
//! rest of the crate operates on.

pub mod campaign;
pub mod cli;
pub mod validator;

use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Transfer protocol. Accepts any string from the campaign file; only
/// `FTP`/`SFTP`/`HTTP` (case-insensitive) are recognized, everything else
/// becomes `Other` so the executor can surface `unsupported protocol: <name>`
/// as a per-transfer error rather than a fatal config error (§7, §8 scenario 6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Protocol {
    Ftp,
    Sftp,
    Http,
    Other(String),
}

impl Protocol {
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "FTP" => Protocol::Ftp,
            "SFTP" => Protocol::Sftp,
            "HTTP" => Protocol::Http,
            _ => Protocol::Other(raw.to_string()),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Ftp => write!(f, "FTP"),
            Protocol::Sftp => write!(f, "SFTP"),
            Protocol::Http => write!(f, "HTTP"),
            Protocol::Other(s) => write!(f, "{s}"),
        }
    }
}

/// Campaign type: which direction data moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestType {
    Upload,
    Download,
}

impl TestType {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.to_ascii_uppercase().as_str() {
            "UPLOAD" => Ok(TestType::Upload),
            "DOWNLOAD" => Ok(TestType::Download),
            other => anyhow::bail!("unknown campaign type: {other} (expected UPLOAD or DOWNLOAD)"),
        }
    }
}

/// One size-policy unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizeUnit {
    B,
    K,
    M,
    G,
}

impl SizeUnit {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.to_ascii_uppercase().as_str() {
            "B" => Ok(SizeUnit::B),
            "K" | "KB" => Ok(SizeUnit::K),
            "M" | "MB" => Ok(SizeUnit::M),
            "G" | "GB" => Ok(SizeUnit::G),
            other => anyhow::bail!("unknown size unit: {other} (expected B, K/KB, M/MB, G/GB)"),
        }
    }

    /// Short filename-safe tag, e.g. `1K_1.dat`.
    pub fn tag(&self) -> &'static str {
        match self {
            SizeUnit::B => "B",
            SizeUnit::K => "K",
            SizeUnit::M => "M",
            SizeUnit::G => "G",
        }
    }

    /// Bytes per unit (the source's `×1024` KB→bytes scaling, extended to M/G).
    pub fn multiplier_bytes(&self) -> u64 {
        match self {
            SizeUnit::B => 1,
            SizeUnit::K => 1024,
            SizeUnit::M => 1024 * 1024,
            SizeUnit::G => 1024 * 1024 * 1024,
        }
    }
}

/// One clause of a size distribution: {size, unit, percent}. Immutable
/// after load; the derived file `count` is computed by the corpus builder
/// at build time (§3), not stored here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSizePolicy {
    pub size: u64,
    pub unit: SizeUnit,
    pub percent: u8,
}

impl FileSizePolicy {
    pub fn size_bytes(&self) -> u64 {
        self.size * self.unit.multiplier_bytes()
    }

    pub fn size_kb(&self) -> f64 {
        self.size_bytes() as f64 / 1024.0
    }

    /// Filename prefix for files generated under this policy, e.g. `1K`.
    pub fn tag(&self) -> String {
        format!("{}{}", self.size, self.unit.tag())
    }
}

/// Immutable campaign configuration, derived from the campaign JSON plus
/// the CLI-supplied worker/request counts (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignConfig {
    pub name: String,
    pub protocol: Protocol,
    pub test_type: TestType,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub remote_path: String,
    pub local_path: PathBuf,
    pub timeout_secs: u64,
    pub num_workers: usize,
    pub num_requests: usize,
    pub policies: Vec<FileSizePolicy>,
    pub upload_test_id: Option<String>,
}

impl CampaignConfig {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }

    /// The hard outer timeout the executor enforces (§4.2): `2 × timeout`.
    pub fn outer_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs.saturating_mul(2))
    }
}
