// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Decoding of host payloads into typed records.

use serde::de::DeserializeOwned;
use serde_json::Value;

use hostlink_core::error::{HostlinkError, Result};

/// Decode the first value of a host payload. Hosts send single-record
/// payloads for every call and event the wrappers know about.
pub(crate) fn first<T: DeserializeOwned>(module: &str, method: &str, args: &[Value]) -> Result<T> {
    let value = args
        .first()
        .ok_or_else(|| HostlinkError::decode(module, method, "empty payload"))?;
    T::deserialize(value).map_err(|e| HostlinkError::decode(module, method, e.to_string()))
}
