// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the IP ban ledger service.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the ledger service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Ledger thresholds
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Ledger thresholds. Fixed for the lifetime of a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Visits allowed per decay cycle before an automatic ban, 0..=127
    /// (default: 60)
    #[serde(default = "default_visit_limit")]
    pub visit_limit: u32,

    /// Decay cycle length in seconds, 1..=3600 (default: 60)
    #[serde(default = "default_cycle_secs")]
    pub cycle_secs: u64,

    /// Ban applied when the visit limit is exceeded, in minutes, 1..=127
    /// (default: 10)
    #[serde(default = "default_over_limit_ban_minutes")]
    pub over_limit_ban_minutes: u32,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_visit_limit() -> u32 {
    60
}

fn default_cycle_secs() -> u64 {
    60
}

fn default_over_limit_ban_minutes() -> u32 {
    10
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            ledger: LedgerConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            visit_limit: default_visit_limit(),
            cycle_secs: default_cycle_secs(),
            over_limit_ban_minutes: default_over_limit_ban_minutes(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl LedgerConfig {
    pub fn new(visit_limit: u32, cycle_secs: u64, over_limit_ban_minutes: u32) -> Self {
        Self {
            visit_limit,
            cycle_secs,
            over_limit_ban_minutes,
        }
    }

    /// Check every field against its allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.visit_limit > 127 {
            return Err(ConfigError::VisitLimit(self.visit_limit));
        }
        if !(1..=3600).contains(&self.cycle_secs) {
            return Err(ConfigError::CycleSecs(self.cycle_secs));
        }
        if !(1..=127).contains(&self.over_limit_ban_minutes) {
            return Err(ConfigError::OverLimitBanMinutes(self.over_limit_ban_minutes));
        }
        Ok(())
    }

    /// Get the decay cycle duration
    pub fn cycle_duration(&self) -> Duration {
        Duration::from_secs(self.cycle_secs)
    }
}
