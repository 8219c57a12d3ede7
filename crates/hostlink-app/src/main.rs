// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Hostlink — demo host.
//
// Entry point. Initialises logging, loads the bridge config, attaches the
// bridge to a simulated native host, and drives the Clipboard and NetInfo
// modules end to end.

mod host;

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, warn};

use hostlink_bridge::Bridge;
use hostlink_core::error::{HostlinkError, Result};
use hostlink_core::BridgeConfig;
use hostlink_modules::{Clipboard, NetInfo, NetInfoEvent};

use host::{HostState, SimulatedHost};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Hostlink demo starting");

    if let Err(e) = run().await {
        error!(error = %e, "demo failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = match std::env::var_os("HOSTLINK_CONFIG") {
        Some(path) => BridgeConfig::load(path)?,
        None => BridgeConfig::default(),
    };

    let host = SimulatedHost::spawn(HostState::default());
    let bridge = Bridge::new(host.clone(), config);
    let clipboard = Clipboard::new(Arc::clone(&bridge));
    let netinfo = NetInfo::new(Arc::clone(&bridge));

    // -- Clipboard --
    clipboard.set_string("hello from hostlink")?;
    let text = clipboard.get_string().await?;
    info!(%text, "clipboard read back");

    // -- NetInfo: one-shot queries --
    let connect_info = netinfo.get_connect_info().await?;
    info!(
        connected = connect_info.connected,
        kind = ?connect_info.connection_type,
        "connectivity"
    );

    let (done_tx, done_rx) = oneshot::channel();
    let id = netinfo.is_connected(move |result| {
        let _ = done_tx.send(result);
    })?;
    let connected = done_rx.await.map_err(|_| HostlinkError::Detached { id })??;
    info!(connected, "isConnected answered");

    // -- NetInfo: change events --
    let (change_tx, mut change_rx) = mpsc::unbounded_channel();
    let listener = netinfo.add_event_listener(NetInfoEvent::Change, move |change| {
        let _ = change_tx.send(change);
    })?;
    host.toggle_connectivity()?;
    match change_rx.recv().await {
        Some(Ok(change)) => info!(connected = change.connected, "connectivity change pushed"),
        Some(Err(e)) => warn!(error = %e, "undecodable change event"),
        None => warn!("change listener dropped before any push"),
    }
    netinfo.remove_event_listener(NetInfoEvent::Change, listener)?;

    info!(pending = bridge.pending_calls(), "Hostlink demo finished");
    Ok(())
}
