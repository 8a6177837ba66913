//! CLI argument parsing using clap (§6)
//!
//! `mft-runner <campaign-file> <clients> <requests>` plus `-lc`, `-vc`,
//! `-h`, `-v`, and a reproducibility seed.

use crate::Result;
use clap::Parser;
use std::path::PathBuf;

/// Usage text appended to `-h`/`--help`, including the campaign JSON
/// schema (§6), matching `cmd/runner/main.go`'s `printHelp()`.
const CAMPAIGN_SCHEMA_HELP: &str = r#"CAMPAIGN FILE SCHEMA (JSON, under Campaigns/<name>.json):
{
  "Name": "example",
  "Protocol": "FTP|SFTP|HTTP",
  "Type": "Upload|Download",
  "Host": "ftp.example.com",
  "Port": 21,
  "Username": "user",
  "Password": "pass",
  "RemotePath": "/uploads/",
  "LocalPath": "./local",
  "Timeout": 30,
  "RampUp": "0s",
  "HoldFor": "0s",
  "NumClients": 4,
  "NumRequests": 100,
  "FilesizePolicies": [
    { "Size": 1, "Unit": "K", "Percent": 30 },
    { "Size": 1, "Unit": "M", "Percent": 70 }
  ],
  "UploadTestID": "test_1700000000000000000"
}

"Size" accepts either a JSON number or a numeric string. "UploadTestID" is
required, and must name a prior UPLOAD run's test ID, only for a DOWNLOAD
campaign. Unknown fields are ignored."#;

/// MFT Runner - load-test driver for FTP/SFTP/HTTP endpoints
#[derive(Parser, Debug)]
#[command(
    name = "mft-runner",
    version,
    about,
    after_help = CAMPAIGN_SCHEMA_HELP,
    disable_version_flag = true
)]
pub struct Cli {
    /// Campaign JSON file (resolved directly, then under `Campaigns/`)
    #[arg(value_name = "CAMPAIGN")]
    pub campaign: Option<PathBuf>,

    /// Number of concurrent worker clients
    #[arg(value_name = "CLIENTS")]
    pub clients: Option<usize>,

    /// Total number of requests across all clients
    #[arg(value_name = "REQUESTS")]
    pub requests: Option<usize>,

    /// List available campaigns under ./Campaigns/
    #[arg(short = 'l', long = "lc")]
    pub list_campaigns: bool,

    /// Print campaign details
    #[arg(long = "vc", value_name = "NAME")]
    pub view_campaign: Option<String>,

    /// Print version and exit
    #[arg(short = 'v', long = "version")]
    pub version: bool,

    /// RNG seed for reproducible file selection (default: derived from time)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Directory holding campaign JSON files
    #[arg(long, default_value = "Campaigns")]
    pub campaigns_dir: PathBuf,

    /// Directory holding generated corpora and manifests
    #[arg(long, default_value = "Work/testfiles")]
    pub work_dir: PathBuf,

    /// Directory reports are written to
    #[arg(long, default_value = "TestReports")]
    pub reports_dir: PathBuf,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Validate that a runnable combination of arguments was supplied.
    /// `-lc` and `--vc` are handled before this check in `main`. `<requests>`
    /// may be omitted: a DOWNLOAD campaign infers its total from the linked
    /// UPLOAD run's file list (§4.7); an UPLOAD campaign without it is
    /// rejected later, once the campaign file is loaded and its type known.
    pub fn validate_run_args(&self) -> Result<(PathBuf, usize, Option<usize>)> {
        let campaign = self
            .campaign
            .clone()
            .ok_or_else(|| anyhow::anyhow!("missing <campaign-file> argument"))?;
        let clients = self
            .clients
            .ok_or_else(|| anyhow::anyhow!("missing <clients> argument"))?;
        if clients == 0 {
            anyhow::bail!("<clients> must be at least 1");
        }
        Ok((campaign, clients, self.requests))
    }
}
