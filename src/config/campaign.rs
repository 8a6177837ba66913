//! Campaign JSON loading (§6)
//!
//! The campaign file is the external, user-authored format. Unknown fields
//! are tolerated; `Size` accepts both a JSON number and a numeric string.

use super::{CampaignConfig, FileSizePolicy, Protocol, SizeUnit, TestType};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Raw `{Size, Unit, Percent}` clause as it appears in the campaign file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawFilesizePolicy {
    #[serde(rename = "Size", deserialize_with = "deserialize_numeric_string")]
    pub size: u64,
    #[serde(rename = "Unit")]
    pub unit: String,
    #[serde(rename = "Percent")]
    pub percent: i64,
}

/// `Size` must accept both a JSON number and a JSON string representation
/// of an integer (§6: "numeric string coercion is mandatory").
fn deserialize_numeric_string<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrString {
        Num(u64),
        Str(String),
    }

    match NumOrString::deserialize(deserializer)? {
        NumOrString::Num(n) => Ok(n),
        NumOrString::Str(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|e| serde::de::Error::custom(format!("invalid numeric string {s:?}: {e}"))),
    }
}

/// Campaign file schema (§6). Unknown fields are tolerated by default
/// (no `deny_unknown_fields`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Protocol")]
    pub protocol: String,
    #[serde(rename = "Type")]
    pub test_type: String,
    #[serde(rename = "Host")]
    pub host: String,
    #[serde(rename = "Port", default)]
    pub port: u16,
    #[serde(rename = "Username", default)]
    pub username: String,
    #[serde(rename = "Password", default)]
    pub password: String,
    #[serde(rename = "RemotePath", default)]
    pub remote_path: String,
    #[serde(rename = "LocalPath", default)]
    pub local_path: String,
    #[serde(rename = "Timeout")]
    pub timeout: u64,
    #[serde(rename = "RampUp", default)]
    pub ramp_up: Option<String>,
    #[serde(rename = "HoldFor", default)]
    pub hold_for: Option<String>,
    #[serde(rename = "NumClients", default)]
    pub num_clients: usize,
    #[serde(rename = "NumRequests", default)]
    pub num_requests: usize,
    #[serde(rename = "FilesizePolicies")]
    pub filesize_policies: Vec<RawFilesizePolicy>,
    #[serde(rename = "UploadTestID", default)]
    pub upload_test_id: Option<String>,
}

/// Load and parse a campaign JSON file. Falls back to `Campaigns/<path>`
/// when `path` does not exist directly, matching the original CLI's lookup
/// order.
pub fn load_campaign_file(path: &Path, campaigns_dir: &Path) -> Result<Campaign> {
    let resolved = if path.exists() {
        path.to_path_buf()
    } else {
        campaigns_dir.join(path)
    };
    let data = std::fs::read_to_string(&resolved)
        .map_err(|e| anyhow::anyhow!("reading campaign file {}: {e}", resolved.display()))?;
    let campaign: Campaign = serde_json::from_str(&data)
        .map_err(|e| anyhow::anyhow!("parsing campaign {}: {e}", resolved.display()))?;
    Ok(campaign)
}

/// Campaign's file stem, used to name the work directory and report file.
pub fn campaign_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "campaign".to_string())
}

/// Convert a loaded campaign plus CLI-supplied worker/request counts into
/// the immutable `CampaignConfig` the rest of the crate consumes.
pub fn to_campaign_config(
    campaign: &Campaign,
    name: String,
    num_workers: usize,
    num_requests: usize,
) -> Result<CampaignConfig> {
    let mut policies = Vec::with_capacity(campaign.filesize_policies.len());
    for raw in &campaign.filesize_policies {
        let unit = SizeUnit::parse(&raw.unit)?;
        if !(0..=100).contains(&raw.percent) {
            anyhow::bail!(
                "filesize policy percent must be between 0 and 100, got {}",
                raw.percent
            );
        }
        let percent = raw.percent as u8;
        policies.push(FileSizePolicy {
            size: raw.size,
            unit,
            percent,
        });
    }

    Ok(CampaignConfig {
        name,
        protocol: Protocol::parse(&campaign.protocol),
        test_type: TestType::parse(&campaign.test_type)?,
        host: campaign.host.clone(),
        port: campaign.port,
        username: campaign.username.clone(),
        password: campaign.password.clone(),
        remote_path: campaign.remote_path.clone(),
        local_path: PathBuf::from(if campaign.local_path.is_empty() {
            "."
        } else {
            &campaign.local_path
        }),
        timeout_secs: campaign.timeout,
        num_workers,
        num_requests,
        policies,
        upload_test_id: campaign.upload_test_id.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_accepts_both_number_and_string() {
        let json = r#"{"Size": 1, "Unit": "K", "Percent": 50}"#;
        let p: RawFilesizePolicy = serde_json::from_str(json).unwrap();
        assert_eq!(p.size, 1);

        let json_str = r#"{"Size": "1", "Unit": "K", "Percent": 50}"#;
        let p2: RawFilesizePolicy = serde_json::from_str(json_str).unwrap();
        assert_eq!(p2.size, 1);
    }

    #[test]
    fn unknown_fields_are_tolerated() {
        let json = r#"{
            "Name": "t", "Protocol": "FTP", "Type": "Upload", "Host": "h",
            "Timeout": 30, "FilesizePolicies": [], "SomeFutureField": 42
        }"#;
        let c: Campaign = serde_json::from_str(json).unwrap();
        assert_eq!(c.protocol, "FTP");
    }

    #[test]
    fn unsupported_protocol_parses_but_is_flagged_as_other() {
        let campaign = Campaign {
            name: "t".into(),
            protocol: "SMB".into(),
            test_type: "Upload".into(),
            host: "h".into(),
            port: 0,
            username: String::new(),
            password: String::new(),
            remote_path: "/".into(),
            local_path: String::new(),
            timeout: 30,
            ramp_up: None,
            hold_for: None,
            num_clients: 1,
            num_requests: 1,
            filesize_policies: vec![],
            upload_test_id: None,
        };
        let cfg = to_campaign_config(&campaign, "t".into(), 1, 1).unwrap();
        assert_eq!(cfg.protocol, Protocol::Other("SMB".into()));
    }

    #[test]
    fn rejects_out_of_range_percent_instead_of_clamping() {
        let campaign = Campaign {
            name: "t".into(),
            protocol: "FTP".into(),
            test_type: "Upload".into(),
            host: "h".into(),
            port: 0,
            username: String::new(),
            password: String::new(),
            remote_path: "/up/".into(),
            local_path: String::new(),
            timeout: 30,
            ramp_up: None,
            hold_for: None,
            num_clients: 1,
            num_requests: 1,
            filesize_policies: vec![RawFilesizePolicy {
                size: 1,
                unit: "K".into(),
                percent: 150,
            }],
            upload_test_id: None,
        };
        assert!(to_campaign_config(&campaign, "t".into(), 1, 1).is_err());
    }
}
