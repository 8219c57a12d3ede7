// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge facade: the single entry point used by feature modules.
//
// Outbound verbs (`invoke`, `invoke_with`, `notify`, `subscribe`,
// `unsubscribe`) become correlated or uncorrelated transport calls. Inbound,
// the host answers calls through `deliver` (keyed by correlation id) and
// pushes events through `emit` (keyed by event key). The two keyspaces never
// mix.
//
// Locks guard bookkeeping only. Continuations, listeners and transport calls
// always run with both tables unlocked, so any of them may re-enter the
// bridge. The registration gate is the exception: it is held across a
// listener-count change and the register/deregister call it triggers, so the
// host sees transitions in the same order the registry made them.

use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::sync::oneshot;
use tracing::{debug, instrument, trace, warn};

use hostlink_core::config::{BridgeConfig, RegistrationPolicy};
use hostlink_core::error::Result;
use hostlink_core::types::{CorrelationId, EventKey, ListenerId};

use crate::correlator::{Continuation, Correlator, OutstandingCall};
use crate::listeners::{ListenerRegistry, Removal};
use crate::lock;
use crate::reply::PendingReply;
use crate::transport::{Inbound, Transport};

/// Process-wide call bridge. Construct once at startup and share the
/// `Arc` with every feature module.
pub struct Bridge {
    transport: Arc<dyn Transport>,
    calls: Arc<Mutex<Correlator>>,
    listeners: Mutex<ListenerRegistry>,
    registration: Mutex<()>,
    config: BridgeConfig,
}

impl Bridge {
    /// Create the bridge and attach it to the host transport.
    pub fn new(transport: Arc<dyn Transport>, config: BridgeConfig) -> Arc<Self> {
        let bridge = Arc::new(Self {
            transport,
            calls: Arc::new(Mutex::new(Correlator::new())),
            listeners: Mutex::new(ListenerRegistry::new()),
            registration: Mutex::new(()),
            config,
        });
        bridge
            .transport
            .attach(Inbound::new(Arc::downgrade(&bridge)));
        debug!(registration = ?bridge.config.registration, "bridge attached to host");
        bridge
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    // -- Outbound calls --

    /// Future-style call. The returned reply settles once with the host's
    /// payload, or with `HostFailure` if the host reports failure.
    pub fn invoke(&self, module: &str, method: &str, args: Vec<Value>) -> Result<PendingReply> {
        let (tx, rx) = oneshot::channel();
        let id = self.invoke_then(module, method, args, move |outcome: Result<Vec<Value>>| {
            // The receiver is gone only if the reply was dropped mid-delivery.
            let _ = tx.send(outcome);
        })?;
        Ok(PendingReply::new(id, rx, Arc::downgrade(&self.calls)))
    }

    /// Callback adapter over the future-style call: `settle` runs once,
    /// inside the matching `deliver`, with the same outcome the future
    /// would resolve to.
    pub fn invoke_then(
        &self,
        module: &str,
        method: &str,
        args: Vec<Value>,
        settle: impl FnOnce(Result<Vec<Value>>) + Send + 'static,
    ) -> Result<CorrelationId> {
        self.dispatch(module, method, args, |calls| {
            calls.allocate_settle(module, method, Box::new(settle))
        })
    }

    /// `invoke` with the configured default timeout, if any.
    pub async fn call(&self, module: &str, method: &str, args: Vec<Value>) -> Result<Vec<Value>> {
        let reply = self.invoke(module, method, args)?;
        match self.config.call_timeout() {
            Some(limit) => reply.with_timeout(limit).await,
            None => reply.await,
        }
    }

    /// Continuation-style call. The selected continuation runs inside the
    /// matching `deliver`; an absent slot silently drops that outcome.
    pub fn invoke_with(
        &self,
        module: &str,
        method: &str,
        args: Vec<Value>,
        on_success: Option<Continuation>,
        on_fail: Option<Continuation>,
    ) -> Result<CorrelationId> {
        self.dispatch(module, method, args, |calls| {
            calls.allocate(module, method, on_success, on_fail)
        })
    }

    /// Fire-and-forget call: an id is still issued and sent, but no reply
    /// is expected and nothing is stored.
    pub fn notify(&self, module: &str, method: &str, args: Vec<Value>) -> Result<()> {
        self.dispatch(module, method, args, |calls| {
            calls.allocate(module, method, None, None)
        })
        .map(|_| ())
    }

    #[instrument(level = "debug", skip(self, args, allocate))]
    fn dispatch(
        &self,
        module: &str,
        method: &str,
        args: Vec<Value>,
        allocate: impl FnOnce(&mut Correlator) -> Result<CorrelationId>,
    ) -> Result<CorrelationId> {
        let id = {
            let mut calls = lock(&self.calls);
            allocate(&mut *calls)?
        };
        if self.config.log_payloads {
            trace!(id = %id, ?args, "outbound payload");
        }

        if let Err(e) = self.transport.send(module, method, id, &args) {
            if lock(&self.calls).cancel(id) {
                warn!(id = %id, error = %e, "send failed, pending call rolled back");
            }
            return Err(e);
        }

        debug!(id = %id, "call sent");
        Ok(id)
    }

    // -- Event subscriptions --

    /// Register `listener` for pushes on (`module`, `event`).
    pub fn subscribe(
        &self,
        module: &str,
        event: &str,
        listener: impl Fn(&[Value]) + Send + Sync + 'static,
    ) -> Result<ListenerId> {
        let key = EventKey::new(module, event);
        let _gate = lock(&self.registration);
        let (id, count) = lock(&self.listeners).add(key.clone(), Arc::new(listener));

        let forward = match self.config.registration {
            RegistrationPolicy::Always => true,
            RegistrationPolicy::Transitions => count == 1,
        };
        if forward {
            if let Err(e) = self.transport.register_listener(&key) {
                lock(&self.listeners).remove(&key, id);
                warn!(key = %key, error = %e, "host rejected listener registration");
                return Err(e);
            }
        }

        debug!(key = %key, listener = %id, count, "listener subscribed");
        Ok(id)
    }

    /// Remove a listener. Unknown listeners are a no-op returning `false`.
    ///
    /// The host is told before the listener is dropped. If it refuses, the
    /// listener stays in place and the call can be retried.
    pub fn unsubscribe(&self, module: &str, event: &str, listener: ListenerId) -> Result<bool> {
        let key = EventKey::new(module, event);
        let _gate = lock(&self.registration);
        let count = {
            let listeners = lock(&self.listeners);
            if !listeners.contains(&key, listener) {
                debug!(key = %key, listener = %listener, "listener not registered");
                return Ok(false);
            }
            listeners.count(&key)
        };

        let forward = match self.config.registration {
            RegistrationPolicy::Always => true,
            RegistrationPolicy::Transitions => count == 1,
        };
        if forward {
            if let Err(e) = self.transport.deregister_listener(&key) {
                warn!(
                    key = %key,
                    listener = %listener,
                    error = %e,
                    "host rejected listener deregistration"
                );
                return Err(e);
            }
        }

        let remaining = match lock(&self.listeners).remove(&key, listener) {
            Removal::Removed { remaining } => remaining,
            Removal::NotRegistered => 0,
        };
        debug!(key = %key, listener = %listener, remaining, "listener unsubscribed");
        Ok(true)
    }

    // -- Inbound --

    /// Host reply for a correlated call. Unknown or already-settled ids are
    /// ignored.
    pub fn deliver(&self, id: CorrelationId, succeeded: bool, args: Vec<Value>) {
        if self.config.log_payloads {
            trace!(id = %id, succeeded, ?args, "inbound payload");
        }

        let Some(call) = lock(&self.calls).take(id) else {
            debug!(id = %id, succeeded, "no pending call for delivery, ignoring");
            return;
        };

        debug!(id = %id, module = call.module(), method = call.method(), succeeded, "call settled");
        call.complete(succeeded, args);
    }

    /// Host push for (`module`, `event`). Every listener runs once, in
    /// registration order. Returns how many ran.
    pub fn emit(&self, module: &str, event: &str, args: Vec<Value>) -> usize {
        let key = EventKey::new(module, event);
        let listeners = lock(&self.listeners).snapshot(&key);
        if listeners.is_empty() {
            debug!(key = %key, "push with no listeners, dropping");
            return 0;
        }

        for listener in &listeners {
            listener(&args);
        }
        debug!(key = %key, fired = listeners.len(), "push dispatched");
        listeners.len()
    }

    // -- Diagnostics --

    pub fn pending_calls(&self) -> usize {
        lock(&self.calls).len()
    }

    pub fn outstanding(&self) -> Vec<OutstandingCall> {
        lock(&self.calls).outstanding()
    }

    pub fn listener_count(&self, module: &str, event: &str) -> usize {
        lock(&self.listeners).count(&EventKey::new(module, event))
    }

    /// Event keys that currently have listeners.
    pub fn subscribed_keys(&self) -> Vec<EventKey> {
        lock(&self.listeners).keys().cloned().collect()
    }
}
