// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Hostlink Bridge — correlates one-shot calls to the native host and routes
// host-pushed events to listeners, over a single opaque transport.

pub mod bridge;
pub mod correlator;
pub mod listeners;
pub mod reply;
pub mod stub;
pub mod transport;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use bridge::Bridge;
pub use correlator::{Continuation, Correlator, OutstandingCall, Settle};
pub use listeners::{Listener, ListenerRegistry};
pub use reply::PendingReply;
pub use stub::StubTransport;
pub use transport::{Inbound, Transport};

/// Bookkeeping stays consistent even if a panic poisoned the lock, since no
/// continuation ever runs while it is held.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
