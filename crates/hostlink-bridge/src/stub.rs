// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub transport for desktop/CI builds and tests where no native host exists.
//
// Records every outbound send and listener registration, and lets the caller
// play the host: answer calls with `reply` and push events with `push`.

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;

use hostlink_core::error::{HostlinkError, Result};
use hostlink_core::types::{CorrelationId, EventKey};

use crate::lock;
use crate::transport::{Inbound, Transport};

/// One outbound call as seen by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct SentCall {
    pub module: String,
    pub method: String,
    pub id: CorrelationId,
    pub args: Vec<Value>,
}

/// Listener registration traffic as seen by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationEvent {
    Register(EventKey),
    Deregister(EventKey),
}

/// In-memory host double.
#[derive(Default)]
pub struct StubTransport {
    inbound: Mutex<Option<Inbound>>,
    sent: Mutex<Vec<SentCall>>,
    registrations: Mutex<Vec<RegistrationEvent>>,
    fail_sends: AtomicBool,
    fail_registrations: AtomicBool,
    fail_deregistrations: AtomicBool,
}

impl StubTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make subsequent `send` calls fail with a transport error.
    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `register_listener` calls fail.
    pub fn fail_registrations(&self, fail: bool) {
        self.fail_registrations.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `deregister_listener` calls fail.
    pub fn fail_deregistrations(&self, fail: bool) {
        self.fail_deregistrations.store(fail, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<SentCall> {
        lock(&self.sent).clone()
    }

    pub fn last_sent(&self) -> Option<SentCall> {
        lock(&self.sent).last().cloned()
    }

    pub fn registrations(&self) -> Vec<RegistrationEvent> {
        lock(&self.registrations).clone()
    }

    pub fn is_attached(&self) -> bool {
        lock(&self.inbound)
            .as_ref()
            .is_some_and(Inbound::is_attached)
    }

    /// Answer a call as the host would.
    pub fn reply(&self, id: CorrelationId, succeeded: bool, args: Vec<Value>) {
        match self.inbound() {
            Some(inbound) => inbound.deliver(id, succeeded, args),
            None => tracing::warn!(id = %id, "StubTransport::reply called before attach"),
        }
    }

    /// Push an event as the host would. Returns how many listeners ran.
    pub fn push(&self, module: &str, event: &str, args: Vec<Value>) -> usize {
        match self.inbound() {
            Some(inbound) => inbound.emit(module, event, args),
            None => {
                tracing::warn!(module, event, "StubTransport::push called before attach");
                0
            }
        }
    }

    // Cloned out so the bridge can re-enter `send` from a continuation.
    fn inbound(&self) -> Option<Inbound> {
        lock(&self.inbound).clone()
    }
}

impl Transport for StubTransport {
    fn attach(&self, inbound: Inbound) {
        *lock(&self.inbound) = Some(inbound);
    }

    fn send(&self, module: &str, method: &str, id: CorrelationId, args: &[Value]) -> Result<()> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(HostlinkError::Transport(format!(
                "stub transport refused {module}.{method}"
            )));
        }
        lock(&self.sent).push(SentCall {
            module: module.to_string(),
            method: method.to_string(),
            id,
            args: args.to_vec(),
        });
        Ok(())
    }

    fn register_listener(&self, key: &EventKey) -> Result<()> {
        if self.fail_registrations.load(Ordering::SeqCst) {
            return Err(HostlinkError::Transport(format!(
                "stub transport refused registration for {key}"
            )));
        }
        lock(&self.registrations).push(RegistrationEvent::Register(key.clone()));
        Ok(())
    }

    fn deregister_listener(&self, key: &EventKey) -> Result<()> {
        if self.fail_deregistrations.load(Ordering::SeqCst) {
            return Err(HostlinkError::Transport(format!(
                "stub transport refused deregistration for {key}"
            )));
        }
        lock(&self.registrations).push(RegistrationEvent::Deregister(key.clone()));
        Ok(())
    }
}
