// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the call correlator and the full bridge
// dispatch/delivery path in the hostlink-bridge crate.

use std::sync::{Arc, Mutex};

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use serde_json::{Value, json};

use hostlink_bridge::{Bridge, Correlator, Inbound, Transport};
use hostlink_core::error::Result;
use hostlink_core::{BridgeConfig, CorrelationId, EventKey};

/// Host that accepts everything and records nothing, so the round trip
/// measures only the bridge.
#[derive(Default)]
struct NullHost {
    inbound: Mutex<Option<Inbound>>,
}

impl Transport for NullHost {
    fn attach(&self, inbound: Inbound) {
        *self.inbound.lock().unwrap() = Some(inbound);
    }

    fn send(&self, _: &str, _: &str, _: CorrelationId, _: &[Value]) -> Result<()> {
        Ok(())
    }

    fn register_listener(&self, _: &EventKey) -> Result<()> {
        Ok(())
    }

    fn deregister_listener(&self, _: &EventKey) -> Result<()> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Allocate a correlated call and resolve it immediately.
fn bench_allocate_resolve(c: &mut Criterion) {
    let mut correlator = Correlator::new();

    c.bench_function("correlator allocate+resolve", |b| {
        b.iter(|| {
            let id = correlator
                .allocate("Clipboard", "getString", Some(Box::new(|v: Vec<Value>| {
                    black_box(v);
                })), None)
                .expect("allocate failed");
            black_box(correlator.resolve(id, true, vec![json!("hello")]));
        });
    });
}

/// Fire-and-forget allocation, which never touches the pending table.
fn bench_fire_and_forget(c: &mut Criterion) {
    let mut correlator = Correlator::new();

    c.bench_function("correlator fire-and-forget", |b| {
        b.iter(|| {
            black_box(
                correlator
                    .allocate("Clipboard", "setString", None, None)
                    .expect("allocate failed"),
            );
        });
    });
}

/// Full round trip through the bridge with the host answering inline.
fn bench_bridge_round_trip(c: &mut Criterion) {
    let host = Arc::new(NullHost::default());
    let bridge = Bridge::new(host.clone(), BridgeConfig::default());
    let inbound = host
        .inbound
        .lock()
        .unwrap()
        .clone()
        .expect("bridge did not attach");

    c.bench_function("bridge invoke_with+deliver", |b| {
        b.iter(|| {
            let id = bridge
                .invoke_with(
                    "NetInfo",
                    "isConnected",
                    vec![],
                    Some(Box::new(|v: Vec<Value>| {
                        black_box(v);
                    })),
                    None,
                )
                .expect("invoke failed");
            inbound.deliver(id, true, vec![json!(true)]);
        });
    });
}

criterion_group!(
    benches,
    bench_allocate_resolve,
    bench_fire_and_forget,
    bench_bridge_round_trip,
);
criterion_main!(benches);
