// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! IP Ban Ledger
//!
//! An in-process visit throttling and ban ledger for IPv4 clients:
//!
//! - Per-address visit counting within a decay cycle
//! - Automatic ban once the visit limit is exceeded
//! - Manual temporary bans (up to 127 minutes) and permanent bans
//! - Background decay that ages every entry and releases unused memory
//!
//! Each address costs one byte in a sparse trie keyed by its octets,
//! trading minute-granularity timing for speed and footprint.

pub mod address;
pub mod config;
pub mod decay;
pub mod error;
pub mod handlers;
pub mod ledger;
pub mod metrics;
pub mod state;
mod trie;

pub use address::Address;
pub use config::{Config, LedgerConfig};
pub use decay::DecayHandle;
pub use error::{ConfigError, LedgerError, StartError};
pub use ledger::{IpLedger, SweepReport, VisitOutcome};
pub use state::{BanTime, LeafState};
