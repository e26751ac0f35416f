// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - HTTP Control-Plane Client
 * reqwest-based ScannerClient against the scanner's local JSON API
 *
 * All format translation happens at this boundary: responses are parsed
 * into typed structs once, so the orchestration layer never inspects
 * untyped JSON.
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::client::{RawFinding, ScannerClient};
use crate::config::ControlPlaneConfig;
use crate::errors::{OrchestratorError, OrchestratorResult, TransportError};

const API_KEY_HEADER: &str = "X-Api-Key";

#[derive(Debug, Deserialize)]
struct VersionResponse {
    version: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartResponse {
    scan_id: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    progress: i64,
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PendingResponse {
    records_to_scan: u64,
}

#[derive(Debug, Deserialize)]
struct FindingsResponse {
    findings: Vec<RawFinding>,
}

/// ScannerClient over the scanner's local HTTP control plane.
#[derive(Clone)]
pub struct HttpScannerClient {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl HttpScannerClient {
    pub fn new(config: &ControlPlaneConfig) -> OrchestratorResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            OrchestratorError::InvalidConfiguration(format!(
                "control plane URL '{}' is invalid: {}",
                config.base_url, e
            ))
        })?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| {
                OrchestratorError::InvalidConfiguration(format!(
                    "failed to build HTTP client: {}",
                    e
                ))
            })?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self, operation: &'static str, path: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(path)
            .map_err(|e| TransportError::Malformed {
                operation,
                reason: format!("could not build endpoint URL: {}", e),
            })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, TransportError> {
        let url = self.endpoint(operation, path)?;

        let mut request = self.client.get(url).query(query);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request
            .send()
            .await
            .map_err(|source| TransportError::Request { operation, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::UnexpectedStatus {
                operation,
                status: status.as_u16(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| TransportError::Malformed {
                operation,
                reason: e.to_string(),
            })
    }

    /// For operations whose response body carries nothing of interest.
    async fn get_ok(
        &self,
        operation: &'static str,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<(), TransportError> {
        let url = self.endpoint(operation, path)?;

        let mut request = self.client.get(url).query(query);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request
            .send()
            .await
            .map_err(|source| TransportError::Request { operation, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::UnexpectedStatus {
                operation,
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}

fn clamp_progress(progress: i64) -> u8 {
    progress.clamp(0, 100) as u8
}

#[async_trait::async_trait]
impl ScannerClient for HttpScannerClient {
    async fn version(&self) -> Result<String, TransportError> {
        let response: VersionResponse = self.get_json("version", "api/version", &[]).await?;
        Ok(response.version)
    }

    async fn reset_session(&self) -> Result<(), TransportError> {
        self.get_ok("session reset", "api/session/reset", &[]).await?;
        debug!("scanner session reset");
        Ok(())
    }

    async fn include_host(&self, pattern: &str) -> Result<(), TransportError> {
        self.get_ok("scope inclusion", "api/scope/include", &[("pattern", pattern)])
            .await?;
        debug!(pattern = %pattern, "host pattern included in scope");
        Ok(())
    }

    async fn start_crawl(&self, url: &str) -> Result<String, TransportError> {
        let response: StartResponse = self
            .get_json("crawl start", "api/crawl/start", &[("url", url)])
            .await?;
        Ok(response.scan_id)
    }

    async fn crawl_status(&self, scan_id: &str) -> Result<u8, TransportError> {
        let response: StatusResponse = self
            .get_json("crawl status", "api/crawl/status", &[("scanId", scan_id)])
            .await?;
        Ok(clamp_progress(response.progress))
    }

    async fn crawl_url_count(&self, scan_id: &str) -> Result<u64, TransportError> {
        let response: CountResponse = self
            .get_json(
                "crawl url count",
                "api/crawl/urls/count",
                &[("scanId", scan_id)],
            )
            .await?;
        Ok(response.count)
    }

    async fn pending_passive_records(&self) -> Result<u64, TransportError> {
        let response: PendingResponse = self
            .get_json("passive pending", "api/passive/pending", &[])
            .await?;
        Ok(response.records_to_scan)
    }

    async fn start_active_scan(&self, url: &str) -> Result<String, TransportError> {
        let response: StartResponse = self
            .get_json("active scan start", "api/active/start", &[("url", url)])
            .await?;
        Ok(response.scan_id)
    }

    async fn active_scan_status(&self, scan_id: &str) -> Result<u8, TransportError> {
        let response: StatusResponse = self
            .get_json(
                "active scan status",
                "api/active/status",
                &[("scanId", scan_id)],
            )
            .await?;
        Ok(clamp_progress(response.progress))
    }

    async fn list_findings(&self) -> Result<Vec<RawFinding>, TransportError> {
        let response: FindingsResponse = self
            .get_json("findings retrieval", "api/findings", &[])
            .await?;
        Ok(response.findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_clamps_into_valid_range() {
        assert_eq!(clamp_progress(-5), 0);
        assert_eq!(clamp_progress(0), 0);
        assert_eq!(clamp_progress(42), 42);
        assert_eq!(clamp_progress(100), 100);
        assert_eq!(clamp_progress(250), 100);
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let config = ControlPlaneConfig {
            base_url: "not a url".to_string(),
            ..ControlPlaneConfig::default()
        };
        assert!(matches!(
            HttpScannerClient::new(&config),
            Err(OrchestratorError::InvalidConfiguration(_))
        ));
    }
}
