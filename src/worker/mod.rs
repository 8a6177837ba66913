//! Worker pool (§4.4)
//!
//! Spawns `num_workers` OS threads, each running its share of
//! `num_requests` transfers sequentially. Each worker seeds its own RNG
//! from `base_seed ^ worker_id` so runs are reproducible per-worker
//! without workers needing to coordinate (§9 "Per-worker RNG streams").

use crate::config::CampaignConfig;
use crate::corpus::CorpusPlan;
use crate::executor::{self, TransferResult};
use crate::linker::UploadedListWriter;
use crate::transport::Transport;
use crossbeam::channel::{bounded, Sender};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::path::PathBuf;
use std::sync::Arc;

/// Split `total` requests across `num_workers` workers as evenly as
/// possible: `ceil(total / num_workers)` per worker, with the remainder
/// distributed to the first workers (worker ids are 1-based).
pub fn requests_per_worker(total: usize, num_workers: usize) -> Vec<usize> {
    if num_workers == 0 {
        return Vec::new();
    }
    let base = total / num_workers;
    let remainder = total % num_workers;
    (0..num_workers)
        .map(|i| base + if i < remainder { 1 } else { 0 })
        .collect()
}

/// What an UPLOAD worker needs: the shared corpus plan, the work
/// directory its files live in, and the shared `uploaded.list` writer.
pub struct UploadContext {
    pub plan: Arc<CorpusPlan>,
    pub work_dir: PathBuf,
    pub uploaded_list: Arc<UploadedListWriter>,
}

/// What a DOWNLOAD worker needs: the remote names linked from a prior
/// UPLOAD run, and the local destination directory.
pub struct DownloadContext {
    pub remote_names: Arc<Vec<String>>,
    pub local_dir: PathBuf,
}

pub enum PoolContext {
    Upload(UploadContext),
    Download(DownloadContext),
}

/// Run the full pool to completion, streaming each transfer's
/// `TransferResult` to `results` as it finishes. Blocks until every
/// worker thread has joined.
pub fn run_pool(
    config: Arc<CampaignConfig>,
    transport: Arc<dyn Transport>,
    context: Arc<PoolContext>,
    base_seed: u64,
) -> Vec<TransferResult> {
    let counts = requests_per_worker(config.num_requests, config.num_workers);
    // R = ceil(T/N) (§4.3 step 4, §4.7): the global per-worker request
    // count the DOWNLOAD index formula is defined against, distinct from
    // each worker's own (possibly remainder-adjusted) loop count.
    let global_r = counts.first().copied().unwrap_or(0);
    let (tx, rx): (Sender<TransferResult>, _) = bounded(config.num_requests.max(1));

    let mut handles = Vec::with_capacity(config.num_workers);
    for (i, &count) in counts.iter().enumerate() {
        let worker_id = i + 1;
        let config = Arc::clone(&config);
        let transport = Arc::clone(&transport);
        let context = Arc::clone(&context);
        let tx = tx.clone();
        let handle = std::thread::spawn(move || {
            run_worker(worker_id, count, global_r, config, transport, &context, base_seed, &tx);
        });
        handles.push(handle);
    }
    drop(tx);

    let results: Vec<TransferResult> = rx.iter().collect();
    for handle in handles {
        let _ = handle.join();
    }
    results
}

fn run_worker(
    worker_id: usize,
    count: usize,
    global_r: usize,
    config: Arc<CampaignConfig>,
    transport: Arc<dyn Transport>,
    context: &PoolContext,
    base_seed: u64,
    tx: &Sender<TransferResult>,
) {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(base_seed ^ worker_id as u64);

    for transfer_id in 1..=count {
        let result = match context {
            PoolContext::Upload(ctx) => {
                let entry = executor::select_upload_file(&config, &ctx.plan, &mut rng);
                let local_path = ctx.work_dir.join(&entry.filename);
                let remote_name = executor::compose_remote_name(&entry.filename, worker_id, transfer_id);
                executor::run_upload(
                    Arc::clone(&transport),
                    Arc::clone(&config),
                    &local_path,
                    &remote_name,
                    entry_policy_tag(&config, entry.policy_index),
                    entry.size_bytes,
                    &ctx.uploaded_list,
                )
            }
            PoolContext::Download(ctx) => {
                let idx = crate::linker::download_target_index(worker_id, transfer_id, global_r, ctx.remote_names.len());
                let remote_name = &ctx.remote_names[idx];
                let local_dest = ctx.local_dir.join(remote_name);
                executor::run_download(Arc::clone(&transport), Arc::clone(&config), remote_name, &local_dest)
            }
        };
        if tx.send(result).is_err() {
            break;
        }
    }
}

fn entry_policy_tag(config: &CampaignConfig, policy_index: usize) -> String {
    config
        .policies
        .get(policy_index)
        .map(|p| p.tag())
        .unwrap_or_default()
}
