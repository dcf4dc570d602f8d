// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Attack simulation patterns for security testing.

/// Attack pattern configuration.
///
/// Time is simulated: instead of sleeping, the runner calls
/// `IpLedger::sweep` after every `sweep_every` requests.
#[derive(Debug, Clone)]
pub struct AttackConfig {
    /// Total number of requests to send
    pub total_requests: usize,
    /// Number of unique IPs to simulate
    pub unique_ips: usize,
    /// Fraction of requests carrying a malformed address (0.0-1.0)
    pub malformed_ratio: f64,
    /// Requests between simulated decay cycles
    pub sweep_every: Option<usize>,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            total_requests: 100,
            unique_ips: 1,
            malformed_ratio: 0.0,
            sweep_every: None,
        }
    }
}

/// Predefined attack patterns.
impl AttackConfig {
    /// Single IP flood - simulates basic DoS from one source.
    pub fn single_ip_flood() -> Self {
        Self {
            total_requests: 500,
            unique_ips: 1,
            ..Default::default()
        }
    }

    /// Distributed attack - many IPs, a handful of requests each.
    pub fn distributed_attack() -> Self {
        Self {
            total_requests: 5_000,
            unique_ips: 1_000,
            ..Default::default()
        }
    }

    /// Garbage addresses mixed into otherwise normal traffic.
    pub fn malformed_input() -> Self {
        Self {
            total_requests: 280,
            unique_ips: 20,
            malformed_ratio: 0.5,
            ..Default::default()
        }
    }

    /// Slow drip - one IP pacing itself to stay under the limit.
    pub fn slow_drip(limit: usize) -> Self {
        Self {
            total_requests: 20 * limit,
            unique_ips: 1,
            sweep_every: Some(1),
            ..Default::default()
        }
    }
}

/// Simple deterministic "random" based on index and ratio.
pub fn rand_bool(ratio: f64, index: usize) -> bool {
    if ratio >= 1.0 {
        true
    } else if ratio <= 0.0 {
        false
    } else {
        (index as f64 * 0.618033988749895) % 1.0 < ratio
    }
}
