// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Clipboard access through the host.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use hostlink_bridge::Bridge;
use hostlink_core::error::Result;

use crate::payload;

pub const MODULE: &str = "Clipboard";

const GET_STRING: &str = "getString";
const SET_STRING: &str = "setString";

/// System clipboard text.
#[derive(Clone)]
pub struct Clipboard {
    bridge: Arc<Bridge>,
}

impl Clipboard {
    pub fn new(bridge: Arc<Bridge>) -> Self {
        Self { bridge }
    }

    /// Read the clipboard text. An empty clipboard (`null`) reads as "".
    pub async fn get_string(&self) -> Result<String> {
        let values = self.bridge.call(MODULE, GET_STRING, Vec::new()).await?;
        let content: Option<String> = payload::first(MODULE, GET_STRING, &values)?;
        Ok(content.unwrap_or_default())
    }

    /// Replace the clipboard text. Fire-and-forget: the host sends no reply.
    pub fn set_string(&self, content: &str) -> Result<()> {
        debug!(len = content.len(), "setting clipboard text");
        self.bridge
            .notify(MODULE, SET_STRING, vec![Value::String(content.to_string())])
    }
}
