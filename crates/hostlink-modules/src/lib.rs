// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Hostlink Modules — typed feature wrappers over the bridge. Each wrapper
// formats arguments, delegates to `Bridge`, and decodes the host payload
// into a named record.

pub mod clipboard;
pub mod netinfo;
mod payload;

pub use clipboard::Clipboard;
pub use netinfo::{NetInfo, NetInfoEvent};
