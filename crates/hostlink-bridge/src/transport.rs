// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Host transport abstraction.
//
// The host environment supplies the byte-moving half of the bridge. How
// values cross the boundary (JNI, objc2, a socket, an in-process queue) is
// the transport's business; the bridge only correlates and dispatches.

use std::sync::Weak;

use serde_json::Value;
use tracing::debug;

use hostlink_core::error::Result;
use hostlink_core::types::{CorrelationId, EventKey};

use crate::bridge::Bridge;

/// Outbound half of the boundary, implemented by the host environment.
pub trait Transport: Send + Sync {
    /// Receive the inbound handle. Called exactly once, when the bridge is
    /// constructed and before any other method.
    fn attach(&self, inbound: Inbound);

    /// Forward a call to the host. If a reply is expected the host must
    /// eventually answer through [`Inbound::deliver`] with the same `id`,
    /// at most once.
    fn send(&self, module: &str, method: &str, id: CorrelationId, args: &[Value]) -> Result<()>;

    /// Tell the host that `key` has at least one interested listener.
    ///
    /// Runs under the bridge's registration gate: implementations must not
    /// subscribe or unsubscribe synchronously from here.
    fn register_listener(&self, key: &EventKey) -> Result<()>;

    /// Tell the host that `key` no longer has listeners.
    fn deregister_listener(&self, key: &EventKey) -> Result<()>;
}

/// Inbound half of the boundary, handed to the transport by the bridge.
///
/// Holds a weak reference so a transport never keeps the bridge alive.
/// Callbacks arriving after the bridge is gone are dropped.
#[derive(Clone)]
pub struct Inbound {
    bridge: Weak<Bridge>,
}

impl Inbound {
    pub(crate) fn new(bridge: Weak<Bridge>) -> Self {
        Self { bridge }
    }

    /// Reply to a correlated call.
    pub fn deliver(&self, id: CorrelationId, succeeded: bool, args: Vec<Value>) {
        match self.bridge.upgrade() {
            Some(bridge) => bridge.deliver(id, succeeded, args),
            None => debug!(id = %id, "bridge dropped, ignoring delivery"),
        }
    }

    /// Push an event to every listener registered under (`module`, `event`).
    /// Returns how many listeners ran.
    pub fn emit(&self, module: &str, event: &str, args: Vec<Value>) -> usize {
        match self.bridge.upgrade() {
            Some(bridge) => bridge.emit(module, event, args),
            None => {
                debug!(module, event, "bridge dropped, ignoring push");
                0
            }
        }
    }

    pub fn is_attached(&self) -> bool {
        self.bridge.strong_count() > 0
    }
}
