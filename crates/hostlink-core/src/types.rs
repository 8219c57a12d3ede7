// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Hostlink call bridge.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier linking an outbound call to its eventual inbound reply.
///
/// Issued by the correlator in strictly increasing order, starting at zero.
/// Never reused for the lifetime of a bridge and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(pub u64);

impl CorrelationId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for CorrelationId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A (module, event) pair identifying a class of pushed events.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventKey {
    pub module: String,
    pub event: String,
}

impl EventKey {
    pub fn new(module: impl Into<String>, event: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            event: event.into(),
        }
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.event)
    }
}

/// Handle for a registered listener, returned by `subscribe`.
///
/// Closures have no identity of their own, so unsubscribing goes through
/// this id instead of the callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListenerId(pub Uuid);

impl ListenerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Link layer reported by the host for the active connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    Wifi,
    Cellular,
    Ethernet,
    None,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Connectivity snapshot pushed by the host on `NetInfo.change` and
/// returned from `NetInfo.getConnectInfo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectInfo {
    pub connected: bool,
    /// Older hosts only send `connected`.
    #[serde(rename = "type", default)]
    pub connection_type: ConnectionType,
}

impl ConnectInfo {
    pub fn offline() -> Self {
        Self {
            connected: false,
            connection_type: ConnectionType::None,
        }
    }
}
