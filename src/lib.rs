//! mft-runner - load-test driver for Managed File Transfer endpoints
//!
//! Given a campaign description, spawns a configurable number of concurrent
//! worker threads that repeatedly upload or download files of controlled
//! sizes against a remote FTP, SFTP, or HTTP server, measures per-transfer
//! latency and throughput, and emits a structured JSON test report.
//!
//! # Architecture
//!
//! - **Corpus builder**: generates a local file corpus matching a size
//!   distribution ahead of an UPLOAD campaign.
//! - **Transport abstraction**: one trait, three backends (FTP, SFTP, HTTP).
//! - **Executor**: runs a single transfer under a hard outer timeout.
//! - **Worker pool**: dispatches a fixed work budget across N threads.
//! - **Metrics aggregator**: thread-safe latency/error/time-series tracking,
//!   finalized into percentiles and windowed throughput.
//! - **Campaign linker**: threads UPLOAD output into a later DOWNLOAD's input.

pub mod config;
pub mod corpus;
pub mod executor;
pub mod linker;
pub mod orchestrator;
pub mod stats;
pub mod transport;
pub mod util;
pub mod worker;

pub use config::CampaignConfig;

/// Result type used throughout mft-runner
pub type Result<T> = anyhow::Result<T>;
