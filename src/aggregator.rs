// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Finding Aggregator
 * Converts raw scanner findings into classified vulnerabilities and counts
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use crate::client::RawFinding;
use crate::types::{Risk, RiskCounts, Vulnerability};

/// Classify raw findings and derive per-severity counts. Pure function, no
/// I/O. Every finding lands in exactly one severity bucket; unrecognized
/// severity strings classify as informational rather than vanishing.
pub fn aggregate(raw_findings: &[RawFinding]) -> (Vec<Vulnerability>, RiskCounts) {
    let mut vulnerabilities = Vec::with_capacity(raw_findings.len());
    let mut counts = RiskCounts::default();

    for raw in raw_findings {
        let risk = Risk::classify(&raw.risk);
        counts.record(risk);
        vulnerabilities.push(Vulnerability {
            name: raw.name.clone(),
            risk,
            description: raw.description.clone(),
            url: raw.url.clone(),
            solution: raw.solution.clone(),
        });
    }

    (vulnerabilities, counts)
}
