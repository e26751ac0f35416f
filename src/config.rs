// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Luotsi Configuration
 * Poll cadences, ceilings and control-plane connection settings
 *
 * Supports environment variable overrides for every value so CI jobs can
 * tune a scan without a config file.
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use std::time::Duration;

use crate::errors::{OrchestratorError, OrchestratorResult};

/// Orchestration settings for one scan run.
///
/// All intervals are polling cadences, not deadlines; `active_scan_timeout`
/// is the only hard ceiling. Active scanning is open-ended in principle, so
/// it is the one phase that must have an enforced ceiling.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Attempts to reach the scanner control plane before giving up.
    pub readiness_max_attempts: u32,

    /// Base delay between readiness attempts (grows with backoff).
    pub readiness_poll_interval: Duration,

    /// Delay between crawl status polls.
    pub spider_poll_interval: Duration,

    /// Delay between passive-queue polls.
    pub passive_scan_poll_interval: Duration,

    /// Delay between active scan status polls.
    pub active_scan_poll_interval: Duration,

    /// Hard ceiling on the active scan phase.
    pub active_scan_timeout: Duration,

    /// Whether high-risk findings fail the gate.
    pub fail_on_high_risk: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            readiness_max_attempts: 30,
            readiness_poll_interval: Duration::from_secs(2),
            spider_poll_interval: Duration::from_secs(2),
            passive_scan_poll_interval: Duration::from_secs(1),
            active_scan_poll_interval: Duration::from_secs(5),
            active_scan_timeout: Duration::from_secs(30 * 60),
            fail_on_high_risk: true,
        }
    }
}

impl ScanConfig {
    /// Load configuration from environment variables with sensible defaults
    ///
    /// Supports the following environment variables:
    /// - LUOTSI_READINESS_MAX_ATTEMPTS: readiness attempt budget
    /// - LUOTSI_READINESS_POLL_MS: base readiness delay in milliseconds
    /// - LUOTSI_SPIDER_POLL_MS: crawl poll cadence in milliseconds
    /// - LUOTSI_PASSIVE_POLL_MS: passive poll cadence in milliseconds
    /// - LUOTSI_ACTIVE_POLL_MS: active poll cadence in milliseconds
    /// - LUOTSI_ACTIVE_SCAN_TIMEOUT_SECS: active scan ceiling in seconds
    /// - LUOTSI_FAIL_ON_HIGH_RISK: true/false gate policy
    pub fn from_env() -> OrchestratorResult<Self> {
        let mut config = Self::default();

        if let Some(attempts) = parse_env_u64("LUOTSI_READINESS_MAX_ATTEMPTS")? {
            config.readiness_max_attempts = attempts as u32;
        }
        if let Some(ms) = parse_env_u64("LUOTSI_READINESS_POLL_MS")? {
            config.readiness_poll_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_env_u64("LUOTSI_SPIDER_POLL_MS")? {
            config.spider_poll_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_env_u64("LUOTSI_PASSIVE_POLL_MS")? {
            config.passive_scan_poll_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_env_u64("LUOTSI_ACTIVE_POLL_MS")? {
            config.active_scan_poll_interval = Duration::from_millis(ms);
        }
        if let Some(secs) = parse_env_u64("LUOTSI_ACTIVE_SCAN_TIMEOUT_SECS")? {
            config.active_scan_timeout = Duration::from_secs(secs);
        }
        if let Ok(flag) = std::env::var("LUOTSI_FAIL_ON_HIGH_RISK") {
            config.fail_on_high_risk = match flag.to_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                other => {
                    return Err(OrchestratorError::InvalidConfiguration(format!(
                        "LUOTSI_FAIL_ON_HIGH_RISK must be true or false, got '{}'",
                        other
                    )))
                }
            };
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject zero attempt budgets and zero or negative-length intervals
    /// before any control-plane call is made.
    pub fn validate(&self) -> OrchestratorResult<()> {
        if self.readiness_max_attempts == 0 {
            return Err(OrchestratorError::InvalidConfiguration(
                "readiness_max_attempts must be greater than zero".to_string(),
            ));
        }

        let intervals = [
            ("readiness_poll_interval", self.readiness_poll_interval),
            ("spider_poll_interval", self.spider_poll_interval),
            (
                "passive_scan_poll_interval",
                self.passive_scan_poll_interval,
            ),
            ("active_scan_poll_interval", self.active_scan_poll_interval),
            ("active_scan_timeout", self.active_scan_timeout),
        ];

        for (name, value) in intervals {
            if value.is_zero() {
                return Err(OrchestratorError::InvalidConfiguration(format!(
                    "{} must be greater than zero",
                    name
                )));
            }
        }

        Ok(())
    }
}

/// Connection settings for the scanner's local control plane.
#[derive(Debug, Clone)]
pub struct ControlPlaneConfig {
    /// Base URL of the scanner control plane.
    pub base_url: String,

    /// Optional API key sent with every request.
    pub api_key: Option<String>,

    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Default for ControlPlaneConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8090".to_string(),
            api_key: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ControlPlaneConfig {
    /// Environment overrides: LUOTSI_SCANNER_URL, LUOTSI_SCANNER_API_KEY,
    /// LUOTSI_SCANNER_TIMEOUT_SECS.
    pub fn from_env() -> OrchestratorResult<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("LUOTSI_SCANNER_URL") {
            config.base_url = url;
        }
        if let Ok(key) = std::env::var("LUOTSI_SCANNER_API_KEY") {
            if !key.is_empty() {
                config.api_key = Some(key);
            }
        }
        if let Some(secs) = parse_env_u64("LUOTSI_SCANNER_TIMEOUT_SECS")? {
            if secs == 0 {
                return Err(OrchestratorError::InvalidConfiguration(
                    "LUOTSI_SCANNER_TIMEOUT_SECS must be greater than zero".to_string(),
                ));
            }
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

fn parse_env_u64(name: &'static str) -> OrchestratorResult<Option<u64>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<u64>()
            .map(Some)
            .map_err(|_| {
                OrchestratorError::InvalidConfiguration(format!(
                    "{} must be a non-negative integer, got '{}'",
                    name, raw
                ))
            }),
        Err(_) => Ok(None),
    }
}
