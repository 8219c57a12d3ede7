// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Network connectivity information and change notifications from the host.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use hostlink_bridge::Bridge;
use hostlink_core::error::Result;
use hostlink_core::types::{ConnectInfo, CorrelationId, ListenerId};

use crate::payload;

pub const MODULE: &str = "NetInfo";

const GET_CONNECT_INFO: &str = "getConnectInfo";
const IS_CONNECTED: &str = "isConnected";

/// Events the host pushes for this module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetInfoEvent {
    /// Connectivity changed; carries a `ConnectInfo`.
    Change,
}

impl NetInfoEvent {
    pub fn name(self) -> &'static str {
        match self {
            Self::Change => "change",
        }
    }
}

/// `isConnected` answers with a bare flag on most hosts, a full record on some.
#[derive(Deserialize)]
#[serde(untagged)]
enum Connectedness {
    Flag(bool),
    Info(ConnectInfo),
}

impl Connectedness {
    fn connected(self) -> bool {
        match self {
            Self::Flag(flag) => flag,
            Self::Info(info) => info.connected,
        }
    }
}

#[derive(Clone)]
pub struct NetInfo {
    bridge: Arc<Bridge>,
}

impl NetInfo {
    pub fn new(bridge: Arc<Bridge>) -> Self {
        Self { bridge }
    }

    pub async fn get_connect_info(&self) -> Result<ConnectInfo> {
        let values = self
            .bridge
            .call(MODULE, GET_CONNECT_INFO, Vec::new())
            .await?;
        payload::first(MODULE, GET_CONNECT_INFO, &values)
    }

    /// Continuation-style connectivity check. `callback` runs once, when the
    /// host answers, with the decoded flag or the host's failure.
    pub fn is_connected(
        &self,
        callback: impl FnOnce(Result<bool>) + Send + 'static,
    ) -> Result<CorrelationId> {
        self.bridge
            .invoke_then(MODULE, IS_CONNECTED, Vec::new(), move |outcome: Result<Vec<Value>>| {
                callback(outcome.and_then(|values| {
                    payload::first::<Connectedness>(MODULE, IS_CONNECTED, &values)
                        .map(Connectedness::connected)
                }))
            })
    }

    /// Listen for `event` pushes. Payloads that fail to decode reach the
    /// callback as `Decode` errors rather than being dropped.
    pub fn add_event_listener(
        &self,
        event: NetInfoEvent,
        callback: impl Fn(Result<ConnectInfo>) + Send + Sync + 'static,
    ) -> Result<ListenerId> {
        self.bridge
            .subscribe(MODULE, event.name(), move |args: &[Value]| {
                callback(payload::first(MODULE, event.name(), args))
            })
    }

    pub fn remove_event_listener(&self, event: NetInfoEvent, listener: ListenerId) -> Result<bool> {
        self.bridge.unsubscribe(MODULE, event.name(), listener)
    }
}
