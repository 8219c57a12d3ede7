// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Listener registry for host-pushed events, keyed by (module, event).

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use hostlink_core::types::{EventKey, ListenerId};

/// Persistent callback for pushed events. Called once per push.
pub type Listener = Arc<dyn Fn(&[Value]) + Send + Sync + 'static>;

/// Outcome of removing a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    NotRegistered,
    Removed { remaining: usize },
}

#[derive(Default)]
pub struct ListenerRegistry {
    entries: HashMap<EventKey, Vec<(ListenerId, Listener)>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` under `key`. Returns its id and the listener
    /// count for the key after insertion.
    pub fn add(&mut self, key: EventKey, listener: Listener) -> (ListenerId, usize) {
        let id = ListenerId::new();
        let slot = self.entries.entry(key).or_default();
        slot.push((id, listener));
        (id, slot.len())
    }

    pub fn remove(&mut self, key: &EventKey, id: ListenerId) -> Removal {
        let Some(slot) = self.entries.get_mut(key) else {
            return Removal::NotRegistered;
        };
        let Some(pos) = slot.iter().position(|(existing, _)| *existing == id) else {
            return Removal::NotRegistered;
        };
        slot.remove(pos);
        let remaining = slot.len();
        if remaining == 0 {
            self.entries.remove(key);
        }
        Removal::Removed { remaining }
    }

    /// Listeners for `key` in registration order, cloned out so callers can
    /// invoke them without holding the registry.
    pub fn snapshot(&self, key: &EventKey) -> Vec<Listener> {
        self.entries
            .get(key)
            .map(|slot| slot.iter().map(|(_, l)| Arc::clone(l)).collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, key: &EventKey, id: ListenerId) -> bool {
        self.entries
            .get(key)
            .is_some_and(|slot| slot.iter().any(|(existing, _)| *existing == id))
    }

    pub fn count(&self, key: &EventKey) -> usize {
        self.entries.get(key).map_or(0, Vec::len)
    }

    /// Keys with at least one listener.
    pub fn keys(&self) -> impl Iterator<Item = &EventKey> {
        self.entries.keys()
    }
}
