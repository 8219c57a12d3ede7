// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Call correlator: pending call table and correlation id counter.
//
// Pure bookkeeping. The correlator never touches the transport and never
// holds a lock; the bridge wraps it in a mutex and runs continuations only
// after the entry has been taken out of the table.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{error, trace};

use hostlink_core::error::{HostlinkError, Result};
use hostlink_core::types::CorrelationId;

/// One-shot callback receiving the host's result values.
pub type Continuation = Box<dyn FnOnce(Vec<Value>) + Send + 'static>;

/// Single callback receiving the settled outcome; failure arrives as
/// `HostFailure` carrying the host's values.
pub type Settle = Box<dyn FnOnce(Result<Vec<Value>>) + Send + 'static>;

/// How a pending call is settled once the host answers.
enum Completion {
    /// Continuation-style: either slot may be absent.
    Callbacks {
        on_success: Option<Continuation>,
        on_fail: Option<Continuation>,
    },
    /// Outcome-style, backing futures and `invoke_then`.
    Settle(Settle),
}

/// An outstanding call awaiting its reply.
pub struct PendingCall {
    module: String,
    method: String,
    issued_at: DateTime<Utc>,
    completion: Completion,
}

impl PendingCall {
    /// Hand the host's result to the matching continuation.
    ///
    /// Returns `false` when the selected callback slot was empty and the
    /// values were dropped.
    pub fn complete(self, succeeded: bool, args: Vec<Value>) -> bool {
        match self.completion {
            Completion::Callbacks {
                on_success,
                on_fail,
            } => {
                let slot = if succeeded { on_success } else { on_fail };
                match slot {
                    Some(continuation) => {
                        continuation(args);
                        true
                    }
                    None => {
                        trace!(
                            module = %self.module,
                            method = %self.method,
                            succeeded,
                            "no continuation for outcome, dropping values"
                        );
                        false
                    }
                }
            }
            Completion::Settle(settle) => {
                settle(if succeeded {
                    Ok(args)
                } else {
                    Err(HostlinkError::HostFailure(args))
                });
                true
            }
        }
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn method(&self) -> &str {
        &self.method
    }
}

/// Diagnostic view of a pending call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutstandingCall {
    pub id: CorrelationId,
    pub module: String,
    pub method: String,
    pub issued_at: DateTime<Utc>,
}

/// Owner of the pending call table and the id counter.
pub struct Correlator {
    /// Next id to hand out; `None` once the id space is used up.
    next: Option<u64>,
    pending: HashMap<CorrelationId, PendingCall>,
}

impl Default for Correlator {
    fn default() -> Self {
        Self::new()
    }
}

impl Correlator {
    pub fn new() -> Self {
        Self {
            next: Some(0),
            pending: HashMap::new(),
        }
    }

    #[cfg(test)]
    fn starting_at(next: u64) -> Self {
        Self {
            next: Some(next),
            pending: HashMap::new(),
        }
    }

    /// Issue the next id and, if either continuation is present, store a
    /// pending entry under it. With no continuation the call is
    /// fire-and-forget and the table is left untouched.
    pub fn allocate(
        &mut self,
        module: &str,
        method: &str,
        on_success: Option<Continuation>,
        on_fail: Option<Continuation>,
    ) -> Result<CorrelationId> {
        let completion = if on_success.is_none() && on_fail.is_none() {
            None
        } else {
            Some(Completion::Callbacks {
                on_success,
                on_fail,
            })
        };
        self.register(module, method, completion)
    }

    /// Issue the next id with a single outcome callback.
    pub fn allocate_settle(
        &mut self,
        module: &str,
        method: &str,
        settle: Settle,
    ) -> Result<CorrelationId> {
        self.register(module, method, Some(Completion::Settle(settle)))
    }

    fn register(
        &mut self,
        module: &str,
        method: &str,
        completion: Option<Completion>,
    ) -> Result<CorrelationId> {
        let Some(raw) = self.next else {
            error!(module, method, "correlation id space exhausted");
            return Err(HostlinkError::CorrelationExhausted);
        };
        self.next = raw.checked_add(1);

        let id = CorrelationId(raw);
        if let Some(completion) = completion {
            self.pending.insert(
                id,
                PendingCall {
                    module: module.to_string(),
                    method: method.to_string(),
                    issued_at: Utc::now(),
                    completion,
                },
            );
        }
        Ok(id)
    }

    /// Remove and return the entry for `id`, if any.
    pub fn take(&mut self, id: CorrelationId) -> Option<PendingCall> {
        self.pending.remove(&id)
    }

    /// Look up `id`, remove it, and fire the continuation for the outcome.
    ///
    /// Returns whether an entry existed. Unknown ids (fire-and-forget,
    /// duplicate or late deliveries) are a no-op.
    pub fn resolve(&mut self, id: CorrelationId, succeeded: bool, args: Vec<Value>) -> bool {
        match self.take(id) {
            Some(call) => {
                call.complete(succeeded, args);
                true
            }
            None => false,
        }
    }

    /// Drop the entry for `id` without firing it.
    pub fn cancel(&mut self, id: CorrelationId) -> bool {
        self.pending.remove(&id).is_some()
    }

    pub fn contains(&self, id: CorrelationId) -> bool {
        self.pending.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Snapshot of every pending call, oldest id first.
    pub fn outstanding(&self) -> Vec<OutstandingCall> {
        let mut calls: Vec<OutstandingCall> = self
            .pending
            .iter()
            .map(|(id, call)| OutstandingCall {
                id: *id,
                module: call.module.clone(),
                method: call.method.clone(),
                issued_at: call.issued_at,
            })
            .collect();
        calls.sort_by_key(|c| c.id);
        calls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<(&'static str, Vec<Value>)>>>;

    fn recorder(log: &Log, tag: &'static str) -> Continuation {
        let log = Arc::clone(log);
        Box::new(move |args: Vec<Value>| log.lock().unwrap().push((tag, args)))
    }

    #[test]
    fn ids_strictly_increase_from_zero() {
        let mut c = Correlator::new();
        let ids: Vec<u64> = (0..50)
            .map(|i| {
                let log = Log::default();
                // Mix fire-and-forget and correlated calls.
                let cb = (i % 2 == 0).then(|| recorder(&log, "ok"));
                c.allocate("M", "m", cb, None).unwrap().get()
            })
            .collect();
        assert_eq!(ids.first(), Some(&0));
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn fire_and_forget_stores_nothing() {
        let mut c = Correlator::new();
        c.allocate("Clipboard", "setString", None, None).unwrap();
        assert!(c.is_empty());
    }

    #[test]
    fn success_fires_once_with_exact_values() {
        let log = Log::default();
        let mut c = Correlator::new();
        let id = c
            .allocate("M", "m", Some(recorder(&log, "ok")), Some(recorder(&log, "fail")))
            .unwrap();

        assert!(c.resolve(id, true, vec![json!(1), json!("two")]));
        assert!(!c.contains(id));
        assert_eq!(*log.lock().unwrap(), vec![("ok", vec![json!(1), json!("two")])]);
    }

    #[test]
    fn failure_routes_to_fail_slot() {
        let log = Log::default();
        let mut c = Correlator::new();
        let id = c
            .allocate("M", "m", Some(recorder(&log, "ok")), Some(recorder(&log, "fail")))
            .unwrap();

        c.resolve(id, false, vec![json!("denied")]);
        assert_eq!(*log.lock().unwrap(), vec![("fail", vec![json!("denied")])]);
    }

    #[test]
    fn second_resolve_is_a_no_op() {
        let log = Log::default();
        let mut c = Correlator::new();
        let id = c.allocate("M", "m", Some(recorder(&log, "ok")), None).unwrap();

        assert!(c.resolve(id, true, vec![]));
        assert!(!c.resolve(id, true, vec![]));
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn unknown_id_is_ignored() {
        let mut c = Correlator::new();
        assert!(!c.resolve(CorrelationId(99), true, vec![json!(1)]));
        assert!(c.is_empty());
    }

    #[test]
    fn missing_slot_drops_values_but_removes_entry() {
        let log = Log::default();
        let mut c = Correlator::new();
        let id = c.allocate("M", "m", Some(recorder(&log, "ok")), None).unwrap();

        assert!(c.resolve(id, false, vec![json!("boom")]));
        assert!(log.lock().unwrap().is_empty());
        assert!(c.is_empty());
    }

    #[test]
    fn cancel_removes_without_firing() {
        let log = Log::default();
        let mut c = Correlator::new();
        let id = c.allocate("M", "m", Some(recorder(&log, "ok")), None).unwrap();

        assert!(c.cancel(id));
        assert!(!c.cancel(id));
        assert!(!c.resolve(id, true, vec![]));
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn settle_completion_rejects_on_failure() {
        let mut c = Correlator::new();
        let outcome = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&outcome);
        let id = c
            .allocate_settle(
                "NetInfo",
                "getConnectInfo",
                Box::new(move |result: Result<Vec<Value>>| *sink.lock().unwrap() = Some(result)),
            )
            .unwrap();

        c.resolve(id, false, vec![json!("offline")]);
        let settled = outcome.lock().unwrap().take();
        match settled.unwrap() {
            Err(HostlinkError::HostFailure(payload)) => assert_eq!(payload, vec![json!("offline")]),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn exhaustion_is_sticky_and_never_wraps() {
        let mut c = Correlator::starting_at(u64::MAX);
        assert_eq!(c.allocate("M", "m", None, None).unwrap(), CorrelationId(u64::MAX));
        assert!(matches!(
            c.allocate("M", "m", None, None),
            Err(HostlinkError::CorrelationExhausted)
        ));
        assert!(matches!(
            c.allocate("M", "m", None, None),
            Err(HostlinkError::CorrelationExhausted)
        ));
    }

    #[test]
    fn outstanding_lists_pending_in_id_order() {
        let log = Log::default();
        let mut c = Correlator::new();
        let a = c.allocate("Clipboard", "getString", Some(recorder(&log, "a")), None).unwrap();
        c.allocate("Clipboard", "setString", None, None).unwrap();
        let b = c.allocate("NetInfo", "isConnected", Some(recorder(&log, "b")), None).unwrap();

        let outstanding = c.outstanding();
        assert_eq!(outstanding.len(), 2);
        assert_eq!(outstanding[0].id, a);
        assert_eq!(outstanding[1].id, b);
        assert_eq!(outstanding[1].method, "isConnected");
    }
}
