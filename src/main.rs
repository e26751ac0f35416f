// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Luotsi - Scan Orchestration CLI
 * Drives an external web security scanner through one gated scan run
 *
 * Exit codes:
 * - 0: scan completed and the risk gate passed
 * - 1: orchestration failure (setup, transport, retrieval, cancellation)
 * - 2: scan completed but the risk gate failed
 *
 * (c) 2026 Bountyy Oy
 */

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, Level};

use luotsi_orchestrator::config::{ControlPlaneConfig, ScanConfig};
use luotsi_orchestrator::control_plane::HttpScannerClient;
use luotsi_orchestrator::orchestrator::ScanOrchestrator;
use luotsi_orchestrator::phases::CancelToken;
use luotsi_orchestrator::types::{Risk, ScanOutcome, ScanTarget};

/// Luotsi - Scan Orchestration Engine
#[derive(Parser)]
#[command(name = "luotsi")]
#[command(author = "Bountyy Oy <info@bountyy.fi>")]
#[command(version = "1.2.0")]
#[command(about = "Drives an external web security scanner through a gated scan run", long_about = None)]
struct Cli {
    /// Target URL to scan
    target: String,

    /// Host pattern included in the scan scope (repeatable)
    #[arg(short = 'i', long = "include")]
    include: Vec<String>,

    /// Scanner control plane URL
    #[arg(long, env = "LUOTSI_SCANNER_URL")]
    scanner_url: Option<String>,

    /// Scanner control plane API key
    #[arg(long, env = "LUOTSI_SCANNER_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Write the scan outcome as JSON to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Do not fail the gate on high-risk findings
    #[arg(long)]
    no_fail_on_high: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Quiet mode - only show the verdict
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    let mut scan_config = ScanConfig::from_env().context("invalid scan configuration")?;
    if cli.no_fail_on_high {
        scan_config.fail_on_high_risk = false;
    }

    let mut control_plane = ControlPlaneConfig::from_env().context("invalid scanner configuration")?;
    if let Some(url) = cli.scanner_url {
        control_plane.base_url = url;
    }
    if cli.api_key.is_some() {
        control_plane.api_key = cli.api_key;
    }

    let target = ScanTarget::new(cli.target, cli.include);

    info!("Initializing Luotsi v1.2.0");
    info!("Target: {}", target.url);
    info!("Scanner control plane: {}", control_plane.base_url);

    let client = Arc::new(HttpScannerClient::new(&control_plane)?);
    let orchestrator = ScanOrchestrator::new(client, scan_config);

    let cancel = CancelToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            error!("Interrupt received, stopping after the current poll");
            signal_token.cancel();
        }
    });

    let outcome = match orchestrator.run_with_cancel(&target, cancel).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Scan failed: {}", e);
            std::process::exit(1);
        }
    };

    if !cli.quiet {
        print_outcome_summary(&outcome);
    }

    if let Some(path) = &cli.output {
        let json = serde_json::to_string_pretty(&outcome)?;
        std::fs::write(path, json)
            .with_context(|| format!("could not write outcome to {}", path.display()))?;
        info!("Outcome written to {}", path.display());
    }

    if outcome.passed {
        println!("PASSED");
        Ok(())
    } else {
        println!(
            "FAILED: {}",
            outcome.failure_reason.as_deref().unwrap_or("unknown reason")
        );
        std::process::exit(2);
    }
}

fn print_outcome_summary(outcome: &ScanOutcome) {
    println!();
    println!("{}", "-".repeat(60));
    println!("SCAN SUMMARY: {}", outcome.target.url);
    println!("{}", "-".repeat(60));

    for phase in &outcome.phase_results {
        let progress_note = if phase.final_progress < 100 {
            format!(" (incomplete, {}%)", phase.final_progress)
        } else {
            String::new()
        };
        match phase.urls_discovered {
            Some(urls) => println!(
                "  {:<8} {:>7.1}s{}  {} URLs",
                phase.phase, phase.duration_seconds, progress_note, urls
            ),
            None => println!(
                "  {:<8} {:>7.1}s{}",
                phase.phase, phase.duration_seconds, progress_note
            ),
        }
    }

    println!();
    println!("VULNERABILITIES FOUND: {}", outcome.vulnerabilities.len());

    let counts = &outcome.counts_by_risk;
    if counts.high > 0 {
        println!("  [HIGH]          {}", counts.high);
    }
    if counts.medium > 0 {
        println!("  [MEDIUM]        {}", counts.medium);
    }
    if counts.low > 0 {
        println!("  [LOW]           {}", counts.low);
    }
    if counts.informational > 0 {
        println!("  [INFORMATIONAL] {}", counts.informational);
    }

    for vuln in &outcome.vulnerabilities {
        let severity_str = match vuln.risk {
            Risk::High => "[HIGH]         ",
            Risk::Medium => "[MEDIUM]       ",
            Risk::Low => "[LOW]          ",
            Risk::Informational => "[INFORMATIONAL]",
        };

        println!();
        println!("{} {}", severity_str, vuln.name);
        println!("  URL:      {}", vuln.url);
        if !vuln.solution.is_empty() {
            println!("  Solution: {}", vuln.solution);
        }
    }

    println!("{}", "-".repeat(60));
    println!(
        "Duration: {:.1}s  ({} -> {})",
        outcome.duration_seconds, outcome.started_at, outcome.completed_at
    );
}
