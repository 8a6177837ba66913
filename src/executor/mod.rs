//! Single-transfer execution (§4.2, §4.3)
//!
//! Selects the file/target for one transfer, dispatches it through a
//! `Transport` under the dual-timeout regime, and reports the outcome as
//! a `TransferResult` the worker pool feeds to the aggregator.

use crate::config::CampaignConfig;
use crate::corpus::CorpusPlan;
use crate::linker::UploadedListWriter;
use crate::transport::Transport;
use crate::util::size::{bytes_to_kb, parse_prefixed_size_bytes};
use rand::Rng;
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

/// Outcome of one transfer (§3 data model).
#[derive(Debug, Clone)]
pub struct TransferResult {
    pub success: bool,
    pub duration: Duration,
    pub error_kind: Option<String>,
    pub data_kb: f64,
    pub policy_tag: String,
    pub size_bytes: u64,
}

impl TransferResult {
    fn failure(duration: Duration, error_kind: impl Into<String>, policy_tag: String, size_bytes: u64) -> Self {
        Self {
            success: false,
            duration,
            error_kind: Some(error_kind.into()),
            data_kb: 0.0,
            policy_tag,
            size_bytes,
        }
    }

    fn success(duration: Duration, data_kb: f64, policy_tag: String, size_bytes: u64) -> Self {
        Self {
            success: true,
            duration,
            error_kind: None,
            data_kb,
            policy_tag,
            size_bytes,
        }
    }
}

/// Weighted-by-percent-then-uniform-within-policy file selection (§9
/// "dual size selection", resolved in favor of the spec's own
/// recommendation): pick a policy with probability proportional to its
/// configured `percent`, then a uniform-random file generated under it.
pub fn select_upload_file<'a, R: Rng>(config: &CampaignConfig, plan: &'a CorpusPlan, rng: &mut R) -> &'a crate::corpus::ManifestEntry {
    let roll: u32 = rng.gen_range(0..100);
    let mut cumulative = 0u32;
    let mut chosen_policy = 0usize;
    for (i, policy) in config.policies.iter().enumerate() {
        cumulative += policy.percent as u32;
        if roll < cumulative {
            chosen_policy = i;
            break;
        }
        chosen_policy = i;
    }
    let files = plan.files_for_policy(chosen_policy);
    let idx = rng.gen_range(0..files.len());
    files[idx]
}

/// Compose the remote name an UPLOAD transfer writes under, embedding the
/// originating worker/transfer identity for DOWNLOAD-side traceability
/// (§4.3): `<basename-without-ext>_<nanos>_<worker_id>_<transfer_id>.dat`.
pub fn compose_remote_name(entry_filename: &str, worker_id: usize, transfer_id: usize) -> String {
    let stem = entry_filename.strip_suffix(".dat").unwrap_or(entry_filename);
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_nanos();
    format!("{stem}_{nanos}_{worker_id}_{transfer_id}.dat")
}

/// Run one UPLOAD transfer under the dual-timeout regime (§4.2):
/// the transport's own call respects `config.timeout()`; a hard outer
/// bound of `config.outer_timeout()` (`2×timeout`) is enforced by running
/// the call on a detached thread and joining it through a channel. Takes
/// `transport`/`config` as `Arc` since the dual-timeout call runs on its
/// own thread, which requires `'static` captures.
pub fn run_upload(
    transport: Arc<dyn Transport>,
    config: Arc<CampaignConfig>,
    local_path: &Path,
    remote_name: &str,
    policy_tag: String,
    size_bytes: u64,
    uploaded_list: &UploadedListWriter,
) -> TransferResult {
    if !local_path.exists() {
        return TransferResult::failure(
            Duration::from_secs(0),
            format!("file_not_found: {}", local_path.display()),
            policy_tag,
            size_bytes,
        );
    }

    let start = Instant::now();
    let local_path_owned = local_path.to_path_buf();
    let remote_name_owned = remote_name.to_string();
    let outer_timeout = config.outer_timeout();
    let timeout = config.timeout();
    let outcome = run_with_outer_timeout(outer_timeout, move || {
        transport.upload(&local_path_owned, &remote_name_owned, &config)
    });
    match outcome {
        Outcome::Ok(()) => {
            let elapsed = start.elapsed();
            if let Err(e) = uploaded_list.append(remote_name) {
                return TransferResult::failure(elapsed, format!("{e}"), policy_tag, size_bytes);
            }
            TransferResult::success(elapsed, bytes_to_kb(size_bytes), policy_tag, size_bytes)
        }
        Outcome::Err(e) => TransferResult::failure(start.elapsed(), format!("{e}"), policy_tag, size_bytes),
        Outcome::TimedOut => TransferResult::failure(timeout, "operation_timeout", policy_tag, size_bytes),
    }
}

/// Run one DOWNLOAD transfer against a remote name drawn deterministically
/// from a prior UPLOAD run's linked file list (§4.3 step 4).
pub fn run_download(
    transport: Arc<dyn Transport>,
    config: Arc<CampaignConfig>,
    remote_name: &str,
    local_dest: &Path,
) -> TransferResult {
    let size_bytes = parse_prefixed_size_bytes(remote_name).unwrap_or(0);
    let policy_tag = remote_name
        .split('_')
        .next()
        .unwrap_or("")
        .to_string();

    let start = Instant::now();
    let remote_name_owned = remote_name.to_string();
    let local_dest_owned = local_dest.to_path_buf();
    let outer_timeout = config.outer_timeout();
    let timeout = config.timeout();
    let outcome = run_with_outer_timeout(outer_timeout, move || {
        transport.download(&remote_name_owned, &local_dest_owned, &config)
    });
    match outcome {
        Outcome::Ok(()) => TransferResult::success(start.elapsed(), bytes_to_kb(size_bytes), policy_tag, size_bytes),
        Outcome::Err(e) => TransferResult::failure(start.elapsed(), format!("{e}"), policy_tag, size_bytes),
        Outcome::TimedOut => TransferResult::failure(timeout, "operation_timeout", policy_tag, size_bytes),
    }
}

enum Outcome<E> {
    Ok(()),
    Err(E),
    TimedOut,
}

/// Runs `f` to completion on its own thread; the caller only ever waits up
/// to `outer_timeout` (§4.2). On timeout the spawned thread is abandoned
/// rather than killed — Rust has no safe way to cancel a running thread, so
/// a stuck protocol call leaks a thread rather than blocking the worker
/// pool indefinitely (§9 "Orphan inner flow on timeout").
fn run_with_outer_timeout<F>(outer_timeout: Duration, f: F) -> Outcome<crate::transport::TransportError>
where
    F: FnOnce() -> Result<(), crate::transport::TransportError> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let result = f();
        let _ = tx.send(result);
    });
    match rx.recv_timeout(outer_timeout) {
        Ok(Ok(())) => Outcome::Ok(()),
        Ok(Err(e)) => Outcome::Err(e),
        Err(_) => Outcome::TimedOut,
    }
}
