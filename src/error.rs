// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types for the IP ban ledger.

use thiserror::Error;

/// Errors returned by per-address ledger operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Malformed IPv4 address: {0:?}")]
    MalformedAddress(String),

    #[error("Ban minutes must be in [-128, -1], got {0}")]
    InvalidBanMinutes(i64),
}

/// Errors returned when starting a self-ageing ledger.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StartError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("No tokio runtime to run the decay scheduler on")]
    NoRuntime,
}

/// Configuration range violations, reported once at construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("visit_limit must be in [0, 127], got {0}")]
    VisitLimit(u32),

    #[error("cycle_secs must be in [1, 3600], got {0}")]
    CycleSecs(u64),

    #[error("over_limit_ban_minutes must be in [1, 127], got {0}")]
    OverLimitBanMinutes(u32),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, LedgerError>;
