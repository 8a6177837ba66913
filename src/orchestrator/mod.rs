//! Campaign orchestration (§4.7)
//!
//! Wires the config, corpus, transport, worker pool, linker, and stats
//! modules into one run: validate, prepare the corpus or linked file
//! list, dispatch the pool, finalize the report, and clean up generated
//! files.

use crate::config::campaign::{campaign_stem, load_campaign_file, to_campaign_config};
use crate::config::validator::validate_config;
use crate::config::{CampaignConfig, TestType};
use crate::corpus::{build_corpus, cleanup_generated_files};
use crate::linker::{load_uploaded_list, UploadedListWriter};
use crate::stats::aggregator::MetricsAggregator;
use crate::stats::Report;
use crate::transport::{self, Transport};
use crate::util::progress::CorpusProgress;
use crate::util::size::bytes_to_kb;
use crate::util::testid::generate_test_id;
use crate::worker::{run_pool, DownloadContext, PoolContext, UploadContext};
use crate::Result;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

pub struct RunPaths {
    pub campaigns_dir: PathBuf,
    pub work_root: PathBuf,
    pub reports_dir: PathBuf,
}

/// Run one campaign end to end (§4.7). Returns the finalized report and
/// the path it was written to. `num_requests` is optional: a DOWNLOAD
/// campaign infers its total from the linked UPLOAD run's `uploaded.list`
/// line count regardless of what (if anything) was passed on the CLI.
pub fn run_campaign(
    campaign_path: &Path,
    num_workers: usize,
    num_requests: Option<usize>,
    seed: Option<u64>,
    paths: &RunPaths,
) -> Result<(Report, PathBuf)> {
    let campaign = load_campaign_file(campaign_path, &paths.campaigns_dir)?;
    let name = campaign_stem(campaign_path);
    let mut config = to_campaign_config(&campaign, name.clone(), num_workers, num_requests.unwrap_or(0))?;

    // DOWNLOAD campaigns size their workload from the prior UPLOAD run's
    // linked file list, not from the CLI; load it up front so T/R reflect
    // it before validation and dispatch (§4.7, §8 scenario 4).
    let preloaded_remote_names = if config.test_type == TestType::Download {
        let upload_test_id = config.upload_test_id.clone().unwrap_or_default();
        let remote_names = load_uploaded_list(&paths.work_root, &upload_test_id)?;
        config.num_requests = remote_names.len();
        Some(remote_names)
    } else {
        if num_requests.is_none() {
            anyhow::bail!("<requests> is required for an UPLOAD campaign");
        }
        None
    };

    validate_config(&config)?;

    let test_id = generate_test_id();
    let work_dir = paths.work_root.join(&test_id);
    let transport = transport::resolve(&config.protocol);

    let base_seed = seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before unix epoch")
            .as_nanos() as u64
    });

    let start_wall = Utc::now();
    let start_instant = Instant::now();

    let (context, total_kb) = match config.test_type {
        TestType::Upload => {
            let progress = CorpusProgress::new(config.num_requests as u64);
            let plan = build_corpus(&config, &work_dir, Some(&progress))?;
            progress.finish();
            let total_kb = plan
                .manifest
                .iter()
                .map(|e| bytes_to_kb(e.size_bytes))
                .sum();
            let uploaded_list = Arc::new(UploadedListWriter::create(&work_dir)?);
            (
                PoolContext::Upload(UploadContext {
                    plan: Arc::new(plan),
                    work_dir: work_dir.clone(),
                    uploaded_list,
                }),
                total_kb,
            )
        }
        TestType::Download => {
            let remote_names = preloaded_remote_names.expect("loaded above for DOWNLOAD");
            let total_kb: f64 = remote_names
                .iter()
                .filter_map(|n| crate::util::size::parse_prefixed_size_bytes(n))
                .map(bytes_to_kb)
                .sum();
            std::fs::create_dir_all(&config.local_path)?;
            (
                PoolContext::Download(DownloadContext {
                    remote_names: Arc::new(remote_names),
                    local_dir: config.local_path.clone(),
                }),
                total_kb,
            )
        }
    };

    let config = Arc::new(config);
    let context = Arc::new(context);

    let results = match transport {
        Some(transport) => {
            let transport: Arc<dyn Transport> = Arc::from(transport);
            run_pool(Arc::clone(&config), transport, context, base_seed)
        }
        None => {
            // Unsupported protocol: every transfer fails the same way,
            // no transport call is attempted (§7, §8 scenario 6).
            let kind = format!("unsupported protocol: {}", config.protocol);
            (0..config.num_requests)
                .map(|_| crate::executor::TransferResult {
                    success: false,
                    duration: std::time::Duration::from_secs(0),
                    error_kind: Some(kind.clone()),
                    data_kb: 0.0,
                    policy_tag: String::new(),
                    size_bytes: 0,
                })
                .collect()
        }
    };

    let aggregator = MetricsAggregator::new(start_wall);
    for result in &results {
        if result.success {
            aggregator.record_success(
                result.duration,
                result.data_kb,
                result.policy_tag.clone(),
                result.size_bytes,
                Utc::now(),
            );
        } else {
            aggregator.record_failure(
                result.duration,
                result.error_kind.clone().unwrap_or_default(),
                result.policy_tag.clone(),
                result.size_bytes,
                Utc::now(),
            );
        }
    }

    let config = Arc::try_unwrap(config).unwrap_or_else(|arc| (*arc).clone());
    let report = aggregator.finalize(config, total_kb, start_instant.elapsed());

    let report_path = paths
        .reports_dir
        .join(format!("{name}_{test_id}.json"));
    report.write_to_file(&report_path)?;

    if report.config.test_type == TestType::Upload {
        if let PoolContext::Upload(ctx) = &*context {
            cleanup_generated_files(&work_dir, &ctx.plan.manifest);
        }
    }

    tracing::info!(test_id = %test_id, report = %report_path.display(), "campaign finished");
    println!("{test_id}");

    Ok((report, report_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_campaign(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn unsupported_protocol_fails_every_transfer_but_still_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let campaigns_dir = dir.path().join("Campaigns");
        std::fs::create_dir_all(&campaigns_dir).unwrap();
        let json = r#"{
            "Name": "smb_test", "Protocol": "SMB", "Type": "Upload",
            "Host": "h", "Port": 1, "RemotePath": "/up/", "Timeout": 5,
            "FilesizePolicies": [{"Size": 1, "Unit": "K", "Percent": 100}]
        }"#;
        let campaign_path = write_campaign(&campaigns_dir, "smb.json", json);

        let paths = RunPaths {
            campaigns_dir: campaigns_dir.clone(),
            work_root: dir.path().join("Work"),
            reports_dir: dir.path().join("Reports"),
        };

        let (report, report_path) = run_campaign(&campaign_path, 1, Some(2), Some(1), &paths).unwrap();
        assert!(report_path.exists());
        assert_eq!(report.summary.failed, 2);
        assert_eq!(report.summary.successful, 0);
        for err in &report.errors {
            assert_eq!(err, "unsupported protocol: SMB");
        }
    }

    #[test]
    fn download_infers_total_requests_from_linked_uploaded_list() {
        let dir = tempfile::tempdir().unwrap();
        let campaigns_dir = dir.path().join("Campaigns");
        std::fs::create_dir_all(&campaigns_dir).unwrap();

        let work_root = dir.path().join("Work");
        let upload_work_dir = work_root.join("test_upload_1");
        std::fs::create_dir_all(&upload_work_dir).unwrap();
        std::fs::write(
            upload_work_dir.join("uploaded.list"),
            "1K_1_1_1_1.dat\n1K_2_1_1_2.dat\n1K_3_1_1_3.dat\n",
        )
        .unwrap();

        let local_path = dir.path().join("out");
        let json = format!(
            r#"{{
            "Name": "dl_test", "Protocol": "SMB", "Type": "Download",
            "Host": "h", "Port": 1, "LocalPath": "{}", "Timeout": 5,
            "FilesizePolicies": [], "UploadTestID": "test_upload_1"
        }}"#,
            local_path.display()
        );
        let campaign_path = write_campaign(&campaigns_dir, "dl.json", &json);

        let paths = RunPaths {
            campaigns_dir: campaigns_dir.clone(),
            work_root,
            reports_dir: dir.path().join("Reports"),
        };

        // No <requests> supplied: the orchestrator must derive T=3 from
        // the linked uploaded.list rather than requiring it on the CLI.
        let (report, _path) = run_campaign(&campaign_path, 2, None, Some(1), &paths).unwrap();
        assert_eq!(report.summary.total_requested, 3);
        assert_eq!(report.summary.failed, 3);
    }
}
