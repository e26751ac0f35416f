// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Luotsi Error Types
 * Orchestration and control-plane error taxonomy with thiserror
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use std::time::Duration;
use thiserror::Error;

use crate::types::ScanPhase;

/// Errors from the scanner control-plane boundary. The client performs no
/// retries of its own; callers decide how to react.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("control-plane request failed during {operation}: {source}")]
    Request {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("control plane returned HTTP {status} for {operation}")]
    UnexpectedStatus { operation: &'static str, status: u16 },

    #[error("malformed control-plane response for {operation}: {reason}")]
    Malformed {
        operation: &'static str,
        reason: String,
    },
}

impl TransportError {
    /// Name of the control-plane operation that failed.
    pub fn operation(&self) -> &'static str {
        match self {
            TransportError::Request { operation, .. } => operation,
            TransportError::UnexpectedStatus { operation, .. } => operation,
            TransportError::Malformed { operation, .. } => operation,
        }
    }
}

/// Main orchestration error type.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// Bad input, rejected before any control-plane call.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Session reset, scope inclusion or readiness wait failed. Fatal to
    /// the run; no outcome is produced.
    #[error("Setup failed during {stage}: {source}")]
    Setup {
        stage: &'static str,
        #[source]
        source: TransportError,
    },

    /// A control-plane call failed while a phase was running.
    #[error("Transport failure in {phase} phase: {source}")]
    Transport {
        phase: ScanPhase,
        #[source]
        source: TransportError,
    },

    /// A phase exceeded its completion ceiling.
    #[error("{phase} phase timed out after {elapsed:?} at {last_progress}% progress")]
    PhaseTimeout {
        phase: ScanPhase,
        elapsed: Duration,
        last_progress: u8,
    },

    /// Findings could not be fetched after the phases ran. Fatal: without
    /// findings no gate decision is possible.
    #[error("Findings retrieval failed: {source}")]
    Retrieval {
        #[source]
        source: TransportError,
    },

    /// The caller cancelled the run.
    #[error("Scan cancelled by caller")]
    Cancelled,
}

/// Result type for orchestrator operations
pub type OrchestratorResult<T> = Result<T, OrchestratorError>;
