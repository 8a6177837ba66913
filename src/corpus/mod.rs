//! File corpus builder (§4.1)
//!
//! Creates a directory of sparse files whose sizes and counts realize the
//! campaign's size distribution, and writes `files.manifest` listing the
//! generated filenames in generation order.

use crate::config::CampaignConfig;
use crate::util::progress::CorpusProgress;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("failed to create work directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),
    #[error("failed to create file {0}: {1}")]
    CreateFile(PathBuf, std::io::Error),
    #[error("failed to size file {0}: {1}")]
    Truncate(PathBuf, std::io::Error),
    #[error("failed to write manifest {0}: {1}")]
    WriteManifest(PathBuf, std::io::Error),
}

/// One entry of the generated corpus.
#[derive(Debug, Clone)]
pub struct ManifestEntry {
    pub filename: String,
    pub policy_index: usize,
    pub size_bytes: u64,
}

/// Per-policy derived count, computed at build time (§3):
/// `count = max(1, floor(T · percent / 100))`.
#[derive(Debug, Clone, Copy)]
pub struct PolicyCount {
    pub count: usize,
    pub size_bytes: u64,
}

#[derive(Debug, Clone)]
pub struct CorpusPlan {
    pub manifest: Vec<ManifestEntry>,
    pub policy_counts: Vec<PolicyCount>,
}

impl CorpusPlan {
    /// Files belonging to one policy, for weighted-by-percent-then-uniform
    /// selection (§9 recommendation, see `executor`).
    pub fn files_for_policy(&self, policy_index: usize) -> Vec<&ManifestEntry> {
        self.manifest
            .iter()
            .filter(|e| e.policy_index == policy_index)
            .collect()
    }
}

/// Derive each policy's file count for a total request budget `total`.
pub fn derive_policy_counts(config: &CampaignConfig, total: usize) -> Vec<PolicyCount> {
    config
        .policies
        .iter()
        .map(|p| {
            let raw = (total as u64 * p.percent as u64) / 100;
            PolicyCount {
                count: raw.max(1) as usize,
                size_bytes: p.size_bytes(),
            }
        })
        .collect()
}

/// Build the corpus under `work_dir` (`Work/testfiles/<test_id>/`).
/// Failure to create any file or the manifest is fatal; a partial corpus
/// is left on disk (§4.1: "partial corpora are not auto-cleaned").
pub fn build_corpus(
    config: &CampaignConfig,
    work_dir: &Path,
    progress: Option<&CorpusProgress>,
) -> Result<CorpusPlan, CorpusError> {
    std::fs::create_dir_all(work_dir)
        .map_err(|e| CorpusError::CreateDir(work_dir.to_path_buf(), e))?;

    let policy_counts = derive_policy_counts(config, config.num_requests);
    let mut manifest = Vec::new();

    for (policy_index, (policy, pc)) in config.policies.iter().zip(policy_counts.iter()).enumerate() {
        for j in 1..=pc.count {
            let filename = format!("{}_{}.dat", policy.tag(), j);
            let path = work_dir.join(&filename);
            let file =
                File::create(&path).map_err(|e| CorpusError::CreateFile(path.clone(), e))?;
            file.set_len(pc.size_bytes)
                .map_err(|e| CorpusError::Truncate(path.clone(), e))?;
            manifest.push(ManifestEntry {
                filename,
                policy_index,
                size_bytes: pc.size_bytes,
            });
            if let Some(p) = progress {
                p.inc();
            }
        }
    }

    write_manifest(work_dir, &manifest)?;

    Ok(CorpusPlan {
        manifest,
        policy_counts,
    })
}

fn manifest_path(work_dir: &Path) -> PathBuf {
    work_dir.join("files.manifest")
}

fn write_manifest(work_dir: &Path, manifest: &[ManifestEntry]) -> Result<(), CorpusError> {
    let path = manifest_path(work_dir);
    let contents = manifest
        .iter()
        .map(|e| e.filename.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    std::fs::write(&path, contents + if manifest.is_empty() { "" } else { "\n" })
        .map_err(|e| CorpusError::WriteManifest(path, e))
}

/// Delete the generated `.dat` files after a successful UPLOAD run,
/// keeping `files.manifest` and `uploaded.list` (§4.7).
pub fn cleanup_generated_files(work_dir: &Path, manifest: &[ManifestEntry]) {
    for entry in manifest {
        let _ = std::fs::remove_file(work_dir.join(&entry.filename));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FileSizePolicy, Protocol, SizeUnit, TestType};
    use std::path::PathBuf;

    fn config_with(policies: Vec<FileSizePolicy>, num_requests: usize) -> CampaignConfig {
        CampaignConfig {
            name: "t".into(),
            protocol: Protocol::Ftp,
            test_type: TestType::Upload,
            host: "h".into(),
            port: 21,
            username: String::new(),
            password: String::new(),
            remote_path: "/up/".into(),
            local_path: PathBuf::from("."),
            timeout_secs: 5,
            num_workers: 2,
            num_requests,
            policies,
            upload_test_id: None,
        }
    }

    #[test]
    fn counts_floor_clamp_to_at_least_one() {
        let config = config_with(
            vec![FileSizePolicy { size: 1, unit: SizeUnit::K, percent: 0 }],
            10,
        );
        let counts = derive_policy_counts(&config, config.num_requests);
        assert_eq!(counts[0].count, 1);
    }

    #[test]
    fn builds_sparse_files_of_requested_size_and_writes_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with(
            vec![FileSizePolicy { size: 1, unit: SizeUnit::K, percent: 100 }],
            4,
        );
        let plan = build_corpus(&config, dir.path(), None).unwrap();
        assert_eq!(plan.manifest.len(), 4);
        for entry in &plan.manifest {
            let meta = std::fs::metadata(dir.path().join(&entry.filename)).unwrap();
            assert_eq!(meta.len(), 1024);
        }
        let manifest_text = std::fs::read_to_string(dir.path().join("files.manifest")).unwrap();
        assert_eq!(manifest_text.lines().count(), 4);
    }

    #[test]
    fn splits_counts_proportionally_across_policies() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with(
            vec![
                FileSizePolicy { size: 1, unit: SizeUnit::K, percent: 30 },
                FileSizePolicy { size: 1, unit: SizeUnit::M, percent: 70 },
            ],
            10,
        );
        let plan = build_corpus(&config, dir.path(), None).unwrap();
        assert!(plan.policy_counts[0].count >= 3);
        assert!(plan.policy_counts[1].count >= 7);
        assert_eq!(plan.manifest.len(), 10);
    }
}
