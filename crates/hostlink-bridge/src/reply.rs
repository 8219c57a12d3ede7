// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Future-style result of a correlated call.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, Weak};
use std::task::{Context, Poll};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use hostlink_core::error::{HostlinkError, Result};
use hostlink_core::types::CorrelationId;

use crate::correlator::Correlator;
use crate::lock;

/// Settles once with the host's reply: `Ok(values)` on success,
/// `Err(HostFailure(values))` on failure.
///
/// Dropping an unsettled reply cancels it: the pending entry is removed and a
/// later delivery for the same id is ignored.
#[must_use = "dropping a PendingReply cancels the call's reply"]
pub struct PendingReply {
    id: CorrelationId,
    rx: oneshot::Receiver<Result<Vec<Value>>>,
    calls: Weak<Mutex<Correlator>>,
    settled: bool,
}

impl PendingReply {
    pub(crate) fn new(
        id: CorrelationId,
        rx: oneshot::Receiver<Result<Vec<Value>>>,
        calls: Weak<Mutex<Correlator>>,
    ) -> Self {
        Self {
            id,
            rx,
            calls,
            settled: false,
        }
    }

    pub fn id(&self) -> CorrelationId {
        self.id
    }

    /// Abandon the call. Returns whether the entry was still pending.
    pub fn cancel(mut self) -> bool {
        self.settled = true;
        self.forget()
    }

    /// Wait at most `limit` for the reply. On expiry the pending entry is
    /// removed and the call resolves to `TimedOut`.
    pub async fn with_timeout(mut self, limit: Duration) -> Result<Vec<Value>> {
        match tokio::time::timeout(limit, &mut self).await {
            Ok(outcome) => outcome,
            Err(_) => {
                self.settled = true;
                self.forget();
                let after_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
                warn!(id = %self.id, after_ms, "call timed out");
                Err(HostlinkError::TimedOut {
                    id: self.id,
                    after_ms,
                })
            }
        }
    }

    fn forget(&self) -> bool {
        let Some(calls) = self.calls.upgrade() else {
            return false;
        };
        let removed = lock(&calls).cancel(self.id);
        if removed {
            debug!(id = %self.id, "pending call dropped before reply");
        }
        removed
    }
}

impl Future for PendingReply {
    type Output = Result<Vec<Value>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let id = self.id;
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(outcome) => {
                self.settled = true;
                Poll::Ready(outcome.unwrap_or(Err(HostlinkError::Detached { id })))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for PendingReply {
    fn drop(&mut self) {
        if !self.settled {
            self.forget();
        }
    }
}
