// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Scan Phase Controller
 * Shared poll loop driving crawl, passive and active phases to completion
 *
 * One polling primitive serves every phase: sleep-based (never spinning),
 * cancellable at each iteration, bounded by an optional ceiling. The three
 * per-phase procedures differ only in their completion signal.
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::client::ScannerClient;
use crate::config::ScanConfig;
use crate::errors::{OrchestratorError, OrchestratorResult, TransportError};
use crate::types::{PhaseResult, ScanPhase};

/// Cooperative cancellation signal, checked at the top of every poll
/// iteration. Cancelling stops the run within one poll interval; in-flight
/// control-plane calls are not aborted.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// What one poll observed. Progress-style phases finish at 100; drain-style
/// phases finish when the backlog reaches zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollTick {
    Progress(u8),
    Pending(u64),
}

/// Successful completion of one phase's poll loop.
#[derive(Debug, Clone, Copy)]
pub struct PhaseCompletion {
    pub elapsed: Duration,
    pub polls: u32,
}

/// Poll `poll` every `interval` until it signals completion, the optional
/// `timeout` elapses, or `cancel` fires.
///
/// Progress regression is logged and otherwise ignored; a scanner that
/// backtracks and later reaches 100 still completes. Any transport failure
/// aborts the loop wrapped with phase context. When `poll` never completes
/// and a timeout is set, the loop terminates within `timeout + interval`.
pub async fn await_completion<F, Fut>(
    phase: ScanPhase,
    interval: Duration,
    timeout: Option<Duration>,
    cancel: &CancelToken,
    mut poll: F,
) -> OrchestratorResult<PhaseCompletion>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<PollTick, TransportError>>,
{
    let started = Instant::now();
    let mut polls: u32 = 0;
    let mut last_progress: u8 = 0;

    loop {
        if cancel.is_cancelled() {
            info!(phase = %phase, "poll loop cancelled");
            return Err(OrchestratorError::Cancelled);
        }

        let tick = poll()
            .await
            .map_err(|source| OrchestratorError::Transport { phase, source })?;
        polls += 1;

        let (done, progress) = match tick {
            PollTick::Progress(p) => (p >= 100, p.min(100)),
            PollTick::Pending(n) => (n == 0, if n == 0 { 100 } else { 0 }),
        };

        match tick {
            PollTick::Progress(p) if p < last_progress => {
                warn!(phase = %phase, progress = p, previous = last_progress,
                    "scanner reported progress regression");
            }
            PollTick::Progress(p) => {
                debug!(phase = %phase, progress = p, polls, "phase progress");
            }
            PollTick::Pending(n) => {
                debug!(phase = %phase, pending = n, polls, "records awaiting analysis");
            }
        }
        last_progress = progress;

        if done {
            let elapsed = started.elapsed();
            info!(phase = %phase, elapsed_ms = elapsed.as_millis() as u64, polls,
                "phase complete");
            return Ok(PhaseCompletion { elapsed, polls });
        }

        if let Some(ceiling) = timeout {
            let elapsed = started.elapsed();
            if elapsed >= ceiling {
                return Err(OrchestratorError::PhaseTimeout {
                    phase,
                    elapsed,
                    last_progress,
                });
            }
        }

        tokio::time::sleep(interval).await;
    }
}

/// Runs one phase to completion and reports a `PhaseResult`.
pub struct PhaseController<'a> {
    client: &'a dyn ScannerClient,
    config: &'a ScanConfig,
    cancel: &'a CancelToken,
}

impl<'a> PhaseController<'a> {
    pub fn new(client: &'a dyn ScannerClient, config: &'a ScanConfig, cancel: &'a CancelToken) -> Self {
        Self {
            client,
            config,
            cancel,
        }
    }

    /// Reconnaissance crawl. Bounded by the target site's size rather than
    /// a local ceiling; records the discovered URL count for diagnostics.
    pub async fn run_crawl(&self, target_url: &str) -> OrchestratorResult<PhaseResult> {
        let scan_id = self
            .client
            .start_crawl(target_url)
            .await
            .map_err(|source| OrchestratorError::Transport {
                phase: ScanPhase::Crawl,
                source,
            })?;
        info!(scan_id = %scan_id, url = %target_url, "crawl started");

        let completion = await_completion(
            ScanPhase::Crawl,
            self.config.spider_poll_interval,
            None,
            self.cancel,
            || {
                let client = self.client;
                let scan_id = scan_id.clone();
                async move { client.crawl_status(&scan_id).await.map(PollTick::Progress) }
            },
        )
        .await?;

        let urls_discovered = match self.client.crawl_url_count(&scan_id).await {
            Ok(count) => {
                info!(scan_id = %scan_id, urls = count, "crawl coverage");
                Some(count)
            }
            Err(e) => {
                warn!(scan_id = %scan_id, error = %e, "could not read crawl URL count");
                None
            }
        };

        Ok(PhaseResult {
            phase: ScanPhase::Crawl,
            scan_id: Some(scan_id),
            duration_seconds: completion.elapsed.as_secs_f64(),
            final_progress: 100,
            urls_discovered,
        })
    }

    /// Passive analysis of traffic the crawl generated. No scan id is
    /// involved; the phase is done when the record backlog drains to zero.
    pub async fn run_passive(&self) -> OrchestratorResult<PhaseResult> {
        info!("waiting for passive analysis backlog to drain");

        let completion = await_completion(
            ScanPhase::Passive,
            self.config.passive_scan_poll_interval,
            None,
            self.cancel,
            || {
                let client = self.client;
                async move { client.pending_passive_records().await.map(PollTick::Pending) }
            },
        )
        .await?;

        Ok(PhaseResult {
            phase: ScanPhase::Passive,
            scan_id: None,
            duration_seconds: completion.elapsed.as_secs_f64(),
            final_progress: 100,
            urls_discovered: None,
        })
    }

    /// Active attack phase. Open-ended in principle, so it runs under the
    /// configured ceiling; exceeding it surfaces as `PhaseTimeout` and the
    /// orchestrator decides whether to continue with partial coverage.
    pub async fn run_active(&self, target_url: &str) -> OrchestratorResult<PhaseResult> {
        let scan_id = self
            .client
            .start_active_scan(target_url)
            .await
            .map_err(|source| OrchestratorError::Transport {
                phase: ScanPhase::Active,
                source,
            })?;
        info!(scan_id = %scan_id, url = %target_url,
            timeout_secs = self.config.active_scan_timeout.as_secs(), "active scan started");

        let completion = await_completion(
            ScanPhase::Active,
            self.config.active_scan_poll_interval,
            Some(self.config.active_scan_timeout),
            self.cancel,
            || {
                let client = self.client;
                let scan_id = scan_id.clone();
                async move {
                    client
                        .active_scan_status(&scan_id)
                        .await
                        .map(PollTick::Progress)
                }
            },
        )
        .await?;

        Ok(PhaseResult {
            phase: ScanPhase::Active,
            scan_id: Some(scan_id),
            duration_seconds: completion.elapsed.as_secs_f64(),
            final_progress: 100,
            urls_discovered: None,
        })
    }
}
