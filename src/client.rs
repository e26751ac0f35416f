// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Scanner Control-Plane Client Interface
 * Thin transport abstraction over an external scanner's control plane
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use serde::{Deserialize, Serialize};

use crate::errors::TransportError;

/// A finding exactly as the scanner reports it. Classification into typed
/// vulnerabilities happens in the aggregator, never here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFinding {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub risk: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub solution: String,
}

/// One control-plane call per operation; no internal retries. Retry and
/// backoff policy belongs to the phase controller so this stays a pure
/// transport shim. Progress values are clamped to [0, 100] at this
/// boundary.
#[async_trait::async_trait]
pub trait ScannerClient: Send + Sync {
    /// Readiness probe; answers once the control plane accepts requests.
    async fn version(&self) -> Result<String, TransportError>;

    /// Reset the scanner session, discarding prior scan state.
    async fn reset_session(&self) -> Result<(), TransportError>;

    /// Register a host pattern in the scan scope.
    async fn include_host(&self, pattern: &str) -> Result<(), TransportError>;

    /// Start the crawl; returns the scanner-assigned scan id.
    async fn start_crawl(&self, url: &str) -> Result<String, TransportError>;

    /// Crawl progress in [0, 100].
    async fn crawl_status(&self, scan_id: &str) -> Result<u8, TransportError>;

    /// Number of URLs the crawl has discovered.
    async fn crawl_url_count(&self, scan_id: &str) -> Result<u64, TransportError>;

    /// Records still waiting for passive analysis; zero means done.
    async fn pending_passive_records(&self) -> Result<u64, TransportError>;

    /// Start the active scan; returns the scanner-assigned scan id.
    async fn start_active_scan(&self, url: &str) -> Result<String, TransportError>;

    /// Active scan progress in [0, 100].
    async fn active_scan_status(&self, scan_id: &str) -> Result<u8, TransportError>;

    /// Fetch every finding the scanner has reported so far.
    async fn list_findings(&self) -> Result<Vec<RawFinding>, TransportError>;
}
