//! Configuration validation (§3, §9 open question)

use super::{CampaignConfig, TestType};
use anyhow::bail;
use crate::Result;

/// Validate a fully-built campaign configuration. Fatal: the orchestrator
/// aborts the run on any error here (§7).
///
/// Deliberately does *not* reject `num_requests < num_workers`: a DOWNLOAD
/// campaign's `num_requests` is overridden to the linked upload's file
/// count before this runs, and §8's "Boundary behaviors" require `T < N`
/// to succeed with `R = 1` and only `T` workers doing real work, not fail
/// validation (`worker::requests_per_worker` already handles the split).
pub fn validate_config(config: &CampaignConfig) -> Result<()> {
    if config.timeout_secs == 0 {
        bail!("timeout must be a positive number of seconds");
    }
    if config.num_workers == 0 {
        bail!("num_workers (clients) must be at least 1");
    }

    match config.test_type {
        TestType::Upload => {
            if !config.remote_path.ends_with('/') {
                bail!("remote_path must end in '/' for an UPLOAD campaign, got {:?}", config.remote_path);
            }
            validate_policies(config)?;
        }
        TestType::Download => {
            if config
                .upload_test_id
                .as_ref()
                .map(|s| s.is_empty())
                .unwrap_or(true)
            {
                bail!("upload_test_id is required and must be non-empty for a DOWNLOAD campaign");
            }
        }
    }

    Ok(())
}

/// Percentages that do not sum to 100 are undefined behavior per the
/// source and are rejected here rather than silently renormalized (§9).
fn validate_policies(config: &CampaignConfig) -> Result<()> {
    if config.policies.is_empty() {
        bail!("at least one filesize policy is required for an UPLOAD campaign");
    }
    let sum: i64 = config.policies.iter().map(|p| p.percent as i64).sum();
    if sum != 100 {
        bail!("filesize policy percentages must sum to 100, got {sum}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FileSizePolicy, Protocol, SizeUnit};
    use std::path::PathBuf;

    fn base_config() -> CampaignConfig {
        CampaignConfig {
            name: "t".into(),
            protocol: Protocol::Ftp,
            test_type: TestType::Upload,
            host: "h".into(),
            port: 21,
            username: "u".into(),
            password: "p".into(),
            remote_path: "/uploads/".into(),
            local_path: PathBuf::from("."),
            timeout_secs: 30,
            num_workers: 2,
            num_requests: 4,
            policies: vec![FileSizePolicy {
                size: 1,
                unit: SizeUnit::K,
                percent: 100,
            }],
            upload_test_id: None,
        }
    }

    #[test]
    fn rejects_percent_not_summing_to_100() {
        let mut cfg = base_config();
        cfg.policies = vec![
            FileSizePolicy { size: 1, unit: SizeUnit::K, percent: 30 },
            FileSizePolicy { size: 1, unit: SizeUnit::M, percent: 60 },
        ];
        assert!(validate_config(&cfg).is_err());
    }

    #[test]
    fn rejects_upload_remote_path_without_trailing_slash() {
        let mut cfg = base_config();
        cfg.remote_path = "/uploads".into();
        assert!(validate_config(&cfg).is_err());
    }

    #[test]
    fn rejects_download_without_upload_test_id() {
        let mut cfg = base_config();
        cfg.test_type = TestType::Download;
        cfg.upload_test_id = None;
        assert!(validate_config(&cfg).is_err());
    }

    #[test]
    fn accepts_fewer_requests_than_workers_per_boundary_behavior() {
        let mut cfg = base_config();
        cfg.num_requests = 1;
        cfg.num_workers = 4;
        assert!(validate_config(&cfg).is_ok());
    }

    #[test]
    fn accepts_well_formed_upload() {
        assert!(validate_config(&base_config()).is_ok());
    }
}
