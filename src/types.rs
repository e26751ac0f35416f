// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Luotsi Core Types
 * Scan targets, phase results and the aggregated scan outcome
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::{OrchestratorError, OrchestratorResult};

/// What to scan: the entry URL and the host patterns the scan is scoped to.
///
/// Immutable once constructed; the orchestrator validates it before any
/// control-plane call is made.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanTarget {
    pub url: String,
    /// Glob-style host patterns included in the scan scope, in the order
    /// they are registered with the scanner.
    pub included_host_patterns: Vec<String>,
}

impl ScanTarget {
    pub fn new(url: impl Into<String>, included_host_patterns: Vec<String>) -> Self {
        Self {
            url: url.into(),
            included_host_patterns,
        }
    }

    /// Reject targets that cannot be handed to the scanner: the URL must be
    /// an absolute HTTP(S) URL and every scope pattern must be non-empty.
    pub fn validate(&self) -> OrchestratorResult<()> {
        if self.url.trim().is_empty() {
            return Err(OrchestratorError::InvalidConfiguration(
                "target URL must not be empty".to_string(),
            ));
        }

        let parsed = Url::parse(&self.url).map_err(|e| {
            OrchestratorError::InvalidConfiguration(format!(
                "target URL '{}' is not a valid absolute URL: {}",
                self.url, e
            ))
        })?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(OrchestratorError::InvalidConfiguration(format!(
                "target URL '{}' must use http or https",
                self.url
            )));
        }

        if parsed.host_str().is_none() {
            return Err(OrchestratorError::InvalidConfiguration(format!(
                "target URL '{}' has no host",
                self.url
            )));
        }

        for pattern in &self.included_host_patterns {
            if pattern.trim().is_empty() {
                return Err(OrchestratorError::InvalidConfiguration(
                    "included host patterns must not be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// A discrete stage of the scan with its own completion signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScanPhase {
    Crawl,
    Passive,
    Active,
}

impl ScanPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanPhase::Crawl => "crawl",
            ScanPhase::Passive => "passive",
            ScanPhase::Active => "active",
        }
    }
}

impl std::fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Record of one executed phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseResult {
    pub phase: ScanPhase,
    /// Identity assigned by the external scanner, meaningful only to it.
    /// The passive phase has no scan id.
    pub scan_id: Option<String>,
    pub duration_seconds: f64,
    /// Last progress value observed, in [0, 100]. Below 100 for a phase
    /// that hit its ceiling before completing.
    pub final_progress: u8,
    /// URLs the crawl discovered, surfaced for diagnostics only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urls_discovered: Option<u64>,
}

/// Severity of a reported finding, ordered with `High` highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Risk {
    Informational,
    Low,
    Medium,
    High,
}

impl Risk {
    pub fn as_str(&self) -> &'static str {
        match self {
            Risk::High => "HIGH",
            Risk::Medium => "MEDIUM",
            Risk::Low => "LOW",
            Risk::Informational => "INFORMATIONAL",
        }
    }

    /// Classify a severity string reported by the scanner. Unrecognized
    /// values fall back to `Informational` so an unparseable severity is
    /// never dropped from the counts and never promoted above its warrant.
    pub fn classify(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "high" => Risk::High,
            "medium" => Risk::Medium,
            "low" => Risk::Low,
            _ => Risk::Informational,
        }
    }
}

impl std::fmt::Display for Risk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single classified finding. Constructed only by the aggregator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vulnerability {
    pub name: String,
    pub risk: Risk,
    pub description: String,
    pub url: String,
    pub solution: String,
}

/// Per-severity finding counts. Derived from the vulnerability list by the
/// aggregator and never set independently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub informational: usize,
}

impl RiskCounts {
    pub fn count(&self, risk: Risk) -> usize {
        match risk {
            Risk::High => self.high,
            Risk::Medium => self.medium,
            Risk::Low => self.low,
            Risk::Informational => self.informational,
        }
    }

    pub fn record(&mut self, risk: Risk) {
        match risk {
            Risk::High => self.high += 1,
            Risk::Medium => self.medium += 1,
            Risk::Low => self.low += 1,
            Risk::Informational => self.informational += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.high + self.medium + self.low + self.informational
    }
}

/// The result of one orchestrated scan, produced exactly once per run and
/// immutable afterwards. Consumed by report tooling and automated gates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanOutcome {
    pub target: ScanTarget,
    /// One entry per phase recorded, in execution order.
    pub phase_results: Vec<PhaseResult>,
    pub vulnerabilities: Vec<Vulnerability>,
    pub counts_by_risk: RiskCounts,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    pub started_at: String,
    pub completed_at: String,
    pub duration_seconds: f64,
}
