// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Hostlink.

use serde_json::Value;
use thiserror::Error;

use crate::types::CorrelationId;

/// Top-level error type for all Hostlink operations.
#[derive(Debug, Error)]
pub enum HostlinkError {
    // -- Correlation --
    /// The correlation id space is used up. Sticky: every later call fails.
    #[error("correlation id space exhausted; no further calls can be issued")]
    CorrelationExhausted,

    #[error("call {id} timed out after {after_ms} ms")]
    TimedOut { id: CorrelationId, after_ms: u64 },

    // -- Host --
    /// The host answered with `succeeded = false`; the payload is passed through verbatim.
    #[error("host reported failure: {}", render_payload(.0))]
    HostFailure(Vec<Value>),

    #[error("cannot decode {module}.{method} payload: {reason}")]
    Decode {
        module: String,
        method: String,
        reason: String,
    },

    // -- Transport --
    #[error("transport error: {0}")]
    Transport(String),

    /// The bridge went away while a call was still waiting for its reply.
    #[error("bridge detached before call {id} was answered")]
    Detached { id: CorrelationId },

    // -- Configuration / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl HostlinkError {
    /// Build a `Decode` error for the given call site.
    pub fn decode(module: &str, method: &str, reason: impl Into<String>) -> Self {
        Self::Decode {
            module: module.to_string(),
            method: method.to_string(),
            reason: reason.into(),
        }
    }
}

fn render_payload(values: &[Value]) -> String {
    match values {
        [] => "<no details>".to_string(),
        [Value::String(s)] => s.clone(),
        _ => Value::Array(values.to_vec()).to_string(),
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, HostlinkError>;
