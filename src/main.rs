//! mft-runner CLI entry point (§4.7, §6)

use anyhow::Context;
use mft_runner::config::campaign::load_campaign_file;
use mft_runner::config::cli::Cli;
use mft_runner::orchestrator::{run_campaign, RunPaths};
use mft_runner::Result;
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();

    if let Err(e) = run() {
        tracing::error!(error = %e, "fatal");
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse_args();

    if cli.version {
        println!("mft-runner v{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if cli.list_campaigns {
        return list_campaigns(&cli.campaigns_dir);
    }

    if let Some(name) = &cli.view_campaign {
        return view_campaign(name, &cli.campaigns_dir);
    }

    let (campaign, clients, requests) = cli.validate_run_args()?;
    let paths = RunPaths {
        campaigns_dir: cli.campaigns_dir.clone(),
        work_root: cli.work_dir.clone(),
        reports_dir: cli.reports_dir.clone(),
    };

    run_campaign(&campaign, clients, requests, cli.seed, &paths)
        .context("campaign run failed")?;
    Ok(())
}

fn list_campaigns(campaigns_dir: &std::path::Path) -> Result<()> {
    if !campaigns_dir.exists() {
        println!("no campaigns found ({} does not exist)", campaigns_dir.display());
        return Ok(());
    }
    let mut names: Vec<String> = std::fs::read_dir(campaigns_dir)
        .with_context(|| format!("reading {}", campaigns_dir.display()))?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().extension().map(|e| e == "json").unwrap_or(false))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();
    names.sort();
    for name in names {
        println!("{name}");
    }
    Ok(())
}

fn view_campaign(name: &str, campaigns_dir: &std::path::Path) -> Result<()> {
    let path = std::path::PathBuf::from(name);
    let campaign = load_campaign_file(&path, campaigns_dir)?;
    println!("{}", serde_json::to_string_pretty(&campaign)?);
    Ok(())
}
