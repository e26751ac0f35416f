// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Risk Gate
 * Pass/fail policy over aggregated severity counts
 *
 * Kept apart from detection and orchestration so the failure threshold can
 * change without touching either.
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use crate::config::ScanConfig;
use crate::types::RiskCounts;

/// The gate's verdict. A failed gate is a business outcome on a completed
/// scan, never an orchestration error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateDecision {
    pub passed: bool,
    pub reason: Option<String>,
}

/// Decide pass/fail from severity counts. Pure and deterministic: the same
/// counts and config always yield the same decision.
pub fn decide(counts: &RiskCounts, config: &ScanConfig) -> GateDecision {
    if config.fail_on_high_risk && counts.high > 0 {
        return GateDecision {
            passed: false,
            reason: Some(format!(
                "{} high-risk vulnerabilities found",
                counts.high
            )),
        };
    }

    GateDecision {
        passed: true,
        reason: None,
    }
}
