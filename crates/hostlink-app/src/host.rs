// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Simulated native host for the desktop demo.
//
// Outbound traffic is queued on a Tokio channel and answered from a
// background task, so replies reach the bridge asynchronously the way a
// real platform runtime would deliver them.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::{Value, json};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use hostlink_bridge::{Inbound, Transport};
use hostlink_core::error::{HostlinkError, Result};
use hostlink_core::types::{ConnectInfo, ConnectionType, CorrelationId, EventKey};

/// Native-side state the simulated host answers from.
#[derive(Debug, Clone)]
pub struct HostState {
    pub clipboard: Option<String>,
    pub connectivity: ConnectInfo,
}

impl Default for HostState {
    fn default() -> Self {
        Self {
            clipboard: None,
            connectivity: ConnectInfo {
                connected: true,
                connection_type: ConnectionType::Wifi,
            },
        }
    }
}

enum HostMessage {
    Call {
        module: String,
        method: String,
        id: CorrelationId,
        args: Vec<Value>,
    },
    Register(EventKey),
    Deregister(EventKey),
    ToggleConnectivity,
}

type SharedInbound = Arc<Mutex<Option<Inbound>>>;

pub struct SimulatedHost {
    inbound: SharedInbound,
    tx: mpsc::UnboundedSender<HostMessage>,
}

impl SimulatedHost {
    /// Start the host task. Must be called inside a Tokio runtime.
    pub fn spawn(state: HostState) -> Arc<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let inbound = SharedInbound::default();
        tokio::spawn(run(Arc::clone(&inbound), rx, state));
        Arc::new(Self { inbound, tx })
    }

    /// Flip connectivity and push a `NetInfo.change` event if anyone listens.
    pub fn toggle_connectivity(&self) -> Result<()> {
        self.enqueue(HostMessage::ToggleConnectivity)
    }

    fn enqueue(&self, message: HostMessage) -> Result<()> {
        self.tx
            .send(message)
            .map_err(|_| HostlinkError::Transport("simulated host has stopped".into()))
    }
}

impl Transport for SimulatedHost {
    fn attach(&self, inbound: Inbound) {
        *self.inbound.lock().unwrap_or_else(PoisonError::into_inner) = Some(inbound);
    }

    fn send(&self, module: &str, method: &str, id: CorrelationId, args: &[Value]) -> Result<()> {
        self.enqueue(HostMessage::Call {
            module: module.to_string(),
            method: method.to_string(),
            id,
            args: args.to_vec(),
        })
    }

    fn register_listener(&self, key: &EventKey) -> Result<()> {
        self.enqueue(HostMessage::Register(key.clone()))
    }

    fn deregister_listener(&self, key: &EventKey) -> Result<()> {
        self.enqueue(HostMessage::Deregister(key.clone()))
    }
}

async fn run(slot: SharedInbound, mut rx: mpsc::UnboundedReceiver<HostMessage>, mut state: HostState) {
    let mut listening: HashSet<EventKey> = HashSet::new();
    let change = EventKey::new("NetInfo", "change");

    while let Some(message) = rx.recv().await {
        let Some(inbound) = slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        else {
            warn!("host received traffic before the bridge attached");
            continue;
        };

        match message {
            HostMessage::Call {
                module,
                method,
                id,
                args,
            } => {
                debug!(id = %id, %module, %method, "host handling call");
                let outcome = answer(&mut state, &module, &method, &args);
                if !expects_reply(&module, &method) {
                    if let Err(reason) = outcome {
                        warn!(id = %id, %reason, "fire-and-forget call failed on host");
                    }
                    continue;
                }
                match outcome {
                    Ok(reply) => inbound.deliver(id, true, reply),
                    Err(reason) => inbound.deliver(id, false, vec![Value::String(reason)]),
                }
            }
            HostMessage::Register(key) => {
                listening.insert(key);
            }
            HostMessage::Deregister(key) => {
                listening.remove(&key);
            }
            HostMessage::ToggleConnectivity => {
                let now = !state.connectivity.connected;
                state.connectivity = if now {
                    ConnectInfo {
                        connected: true,
                        connection_type: ConnectionType::Wifi,
                    }
                } else {
                    ConnectInfo::offline()
                };
                info!(connected = now, "host connectivity changed");
                if listening.contains(&change) {
                    inbound.emit(&change.module, &change.event, vec![json!(state.connectivity)]);
                }
            }
        }
    }
    debug!("simulated host stopped");
}

/// Fire-and-forget methods get no `deliver`, not even on failure.
fn expects_reply(module: &str, method: &str) -> bool {
    !matches!((module, method), ("Clipboard", "setString"))
}

/// Produce the host's reply payload for one call, or a failure reason.
fn answer(
    state: &mut HostState,
    module: &str,
    method: &str,
    args: &[Value],
) -> std::result::Result<Vec<Value>, String> {
    match (module, method) {
        ("Clipboard", "getString") => Ok(vec![json!(state.clipboard)]),
        ("Clipboard", "setString") => match args.first() {
            Some(Value::String(text)) => {
                state.clipboard = Some(text.clone());
                Ok(Vec::new())
            }
            _ => Err("setString expects a string".into()),
        },
        ("NetInfo", "getConnectInfo") => Ok(vec![json!(state.connectivity)]),
        ("NetInfo", "isConnected") => Ok(vec![json!(state.connectivity.connected)]),
        _ => Err(format!("unknown method {module}.{method}")),
    }
}
