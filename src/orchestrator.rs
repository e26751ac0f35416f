// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Scan Orchestrator
 * Sequences crawl, passive and active phases against an external scanner
 *
 * Owns the scan lifecycle: readiness wait, session setup, the three-phase
 * pipeline, findings retrieval, aggregation and the risk gate. Each run is
 * independent; concurrent runs against the same scanner session are not
 * supported because session scope is shared control-plane state.
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use rand::Rng;
use tracing::{debug, error, info, warn};

use crate::aggregator::aggregate;
use crate::client::ScannerClient;
use crate::config::ScanConfig;
use crate::errors::{OrchestratorError, OrchestratorResult, TransportError};
use crate::gate;
use crate::phases::{CancelToken, PhaseController};
use crate::types::{PhaseResult, RiskCounts, ScanOutcome, ScanPhase, ScanTarget};

/// Ceiling on the readiness backoff delay.
const READINESS_MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Jitter factor applied to readiness backoff delays.
const READINESS_JITTER_FACTOR: f64 = 0.3;

pub struct ScanOrchestrator {
    client: Arc<dyn ScannerClient>,
    config: ScanConfig,
}

impl ScanOrchestrator {
    pub fn new(client: Arc<dyn ScannerClient>, config: ScanConfig) -> Self {
        Self { client, config }
    }

    /// Run one full scan. See `run_with_cancel` for the cancellable form.
    pub async fn run(&self, target: &ScanTarget) -> OrchestratorResult<ScanOutcome> {
        self.run_with_cancel(target, CancelToken::new()).await
    }

    /// Run one full scan: validate, wait for the scanner, reset the
    /// session, include scope, crawl -> passive -> active, retrieve
    /// findings, aggregate and gate.
    ///
    /// Crawl and passive failures abort the pipeline and yield a failed
    /// outcome carrying only the completed phases; later phases are never
    /// attempted on top of incomplete coverage. An active-scan timeout is
    /// tolerated: the phase is recorded with partial progress and the run
    /// continues to retrieval, since discarding findings already made
    /// would lose real signal. Setup and retrieval failures produce no
    /// outcome at all.
    pub async fn run_with_cancel(
        &self,
        target: &ScanTarget,
        cancel: CancelToken,
    ) -> OrchestratorResult<ScanOutcome> {
        target.validate()?;
        self.config.validate()?;

        let started = Instant::now();
        let started_at = Utc::now();

        self.wait_for_scanner(&cancel).await?;
        self.prepare_session(target).await?;

        let controller = PhaseController::new(self.client.as_ref(), &self.config, &cancel);
        let mut phase_results: Vec<PhaseResult> = Vec::with_capacity(3);

        // Crawl. Passive and active analysis are meaningless without crawl
        // coverage, so any failure here ends the run.
        match controller.run_crawl(&target.url).await {
            Ok(result) => phase_results.push(result),
            Err(OrchestratorError::Cancelled) => return Err(OrchestratorError::Cancelled),
            Err(e) => {
                error!(error = %e, "crawl phase failed, aborting scan");
                return Ok(self.failure_outcome(
                    target,
                    phase_results,
                    format!("crawl phase failed: {}", e),
                    started,
                    started_at,
                ));
            }
        }

        // Passive analysis interprets the traffic the crawl generated; if
        // it cannot be queried the results would be misleading.
        match controller.run_passive().await {
            Ok(result) => phase_results.push(result),
            Err(OrchestratorError::Cancelled) => return Err(OrchestratorError::Cancelled),
            Err(e) => {
                error!(error = %e, "passive phase failed, aborting scan");
                return Ok(self.failure_outcome(
                    target,
                    phase_results,
                    format!("passive phase failed: {}", e),
                    started,
                    started_at,
                ));
            }
        }

        // Active scan. A timeout leaves partial attack coverage, which is
        // still a valid risk signal; other failures end the run.
        match controller.run_active(&target.url).await {
            Ok(result) => phase_results.push(result),
            Err(OrchestratorError::Cancelled) => return Err(OrchestratorError::Cancelled),
            Err(OrchestratorError::PhaseTimeout {
                phase,
                elapsed,
                last_progress,
            }) => {
                warn!(phase = %phase, elapsed_secs = elapsed.as_secs(), progress = last_progress,
                    "active scan hit its ceiling, continuing with partial coverage");
                phase_results.push(PhaseResult {
                    phase: ScanPhase::Active,
                    scan_id: None,
                    duration_seconds: elapsed.as_secs_f64(),
                    final_progress: last_progress,
                    urls_discovered: None,
                });
            }
            Err(e) => {
                error!(error = %e, "active phase failed, aborting scan");
                return Ok(self.failure_outcome(
                    target,
                    phase_results,
                    format!("active phase failed: {}", e),
                    started,
                    started_at,
                ));
            }
        }

        // Without findings there is no gate decision to make.
        let raw_findings = self
            .client
            .list_findings()
            .await
            .map_err(|source| OrchestratorError::Retrieval { source })?;
        info!(findings = raw_findings.len(), "findings retrieved");

        let (vulnerabilities, counts_by_risk) = aggregate(&raw_findings);
        let decision = gate::decide(&counts_by_risk, &self.config);

        if decision.passed {
            info!(total = vulnerabilities.len(), "risk gate passed");
        } else {
            warn!(
                high = counts_by_risk.high,
                reason = decision.reason.as_deref().unwrap_or(""),
                "risk gate failed"
            );
        }

        let completed_at = Utc::now();
        Ok(ScanOutcome {
            target: target.clone(),
            phase_results,
            vulnerabilities,
            counts_by_risk,
            passed: decision.passed,
            failure_reason: decision.reason,
            started_at: started_at.to_rfc3339(),
            completed_at: completed_at.to_rfc3339(),
            duration_seconds: started.elapsed().as_secs_f64(),
        })
    }

    /// Wait until the control plane answers a version probe, backing off
    /// exponentially with jitter between attempts.
    async fn wait_for_scanner(&self, cancel: &CancelToken) -> OrchestratorResult<()> {
        let mut last_error: Option<TransportError> = None;

        for attempt in 1..=self.config.readiness_max_attempts {
            if cancel.is_cancelled() {
                return Err(OrchestratorError::Cancelled);
            }

            match self.client.version().await {
                Ok(version) => {
                    info!(version = %version, attempt, "scanner control plane ready");
                    return Ok(());
                }
                Err(e) => {
                    debug!(attempt, max_attempts = self.config.readiness_max_attempts,
                        error = %e, "scanner not ready");
                    last_error = Some(e);
                }
            }

            if attempt < self.config.readiness_max_attempts {
                tokio::time::sleep(self.readiness_backoff(attempt)).await;
            }
        }

        warn!(
            attempts = self.config.readiness_max_attempts,
            "scanner never became ready"
        );
        Err(OrchestratorError::Setup {
            stage: "readiness",
            source: last_error.unwrap_or(TransportError::Malformed {
                operation: "version",
                reason: "no readiness attempt was made".to_string(),
            }),
        })
    }

    fn readiness_backoff(&self, attempt: u32) -> Duration {
        let base = self.config.readiness_poll_interval.as_millis() as f64
            * 2f64.powi(attempt.saturating_sub(1) as i32);
        let capped = base.min(READINESS_MAX_BACKOFF.as_millis() as f64);

        let mut rng = rand::rng();
        let jitter_range = capped * READINESS_JITTER_FACTOR;
        let jitter = rng.random_range(-jitter_range..=jitter_range);

        Duration::from_millis((capped + jitter).max(0.0) as u64)
    }

    /// Session reset and scope inclusion, all-or-nothing.
    async fn prepare_session(&self, target: &ScanTarget) -> OrchestratorResult<()> {
        self.client
            .reset_session()
            .await
            .map_err(|source| OrchestratorError::Setup {
                stage: "session reset",
                source,
            })?;
        info!("scanner session reset");

        for pattern in &target.included_host_patterns {
            self.client
                .include_host(pattern)
                .await
                .map_err(|source| OrchestratorError::Setup {
                    stage: "scope inclusion",
                    source,
                })?;
        }
        if !target.included_host_patterns.is_empty() {
            info!(
                patterns = target.included_host_patterns.len(),
                "scan scope registered"
            );
        }

        Ok(())
    }

    /// Outcome for a run that aborted mid-pipeline: the completed phases,
    /// no vulnerabilities, and the failure spelled out. The gate never
    /// runs on incomplete coverage.
    fn failure_outcome(
        &self,
        target: &ScanTarget,
        phase_results: Vec<PhaseResult>,
        reason: String,
        started: Instant,
        started_at: chrono::DateTime<Utc>,
    ) -> ScanOutcome {
        ScanOutcome {
            target: target.clone(),
            phase_results,
            vulnerabilities: Vec::new(),
            counts_by_risk: RiskCounts::default(),
            passed: false,
            failure_reason: Some(reason),
            started_at: started_at.to_rfc3339(),
            completed_at: Utc::now().to_rfc3339(),
            duration_seconds: started.elapsed().as_secs_f64(),
        }
    }
}
