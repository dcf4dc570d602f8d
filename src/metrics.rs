// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus metrics for ledger activity.

use crate::ledger::{IpLedger, SweepReport, VisitOutcome};
use crate::state::LeafState;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Counters and gauges exported on the metrics endpoint. Clones share the
/// same registry.
#[derive(Clone)]
pub struct LedgerMetrics {
    registry: Registry,
    visits: IntCounterVec,
    bans: IntCounterVec,
    rejected: IntCounterVec,
    decay_cycles: IntCounter,
    last_pruned: IntGauge,
    tracked: IntGauge,
    memory_bytes: IntGauge,
}

impl LedgerMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new_custom(Some("ip_ban_ledger".to_string()), None)?;

        let visits = IntCounterVec::new(
            Opts::new("visits_total", "Visits recorded, by resulting state"),
            &["state"],
        )?;
        let bans = IntCounterVec::new(
            Opts::new("bans_total", "Bans applied, by cause"),
            &["cause"],
        )?;
        let rejected = IntCounterVec::new(
            Opts::new("rejected_total", "Requests rejected for malformed input"),
            &["reason"],
        )?;
        let decay_cycles = IntCounter::new(
            "decay_cycles_total",
            "Decay cycles completed by the scheduler",
        )?;
        let last_pruned = IntGauge::new(
            "last_sweep_pruned_branches",
            "Trie arrays released by the most recent decay cycle",
        )?;
        let tracked = IntGauge::new("tracked_addresses", "Addresses with nonzero state")?;
        let memory_bytes = IntGauge::new("memory_bytes", "Approximate trie memory in bytes")?;

        registry.register(Box::new(visits.clone()))?;
        registry.register(Box::new(bans.clone()))?;
        registry.register(Box::new(rejected.clone()))?;
        registry.register(Box::new(decay_cycles.clone()))?;
        registry.register(Box::new(last_pruned.clone()))?;
        registry.register(Box::new(tracked.clone()))?;
        registry.register(Box::new(memory_bytes.clone()))?;

        Ok(Self {
            registry,
            visits,
            bans,
            rejected,
            decay_cycles,
            last_pruned,
            tracked,
            memory_bytes,
        })
    }

    /// Record the outcome of a visit. Only the visit that trips the limit
    /// counts as a ban.
    pub fn observe_visit(&self, outcome: &VisitOutcome) {
        self.visits.with_label_values(&[outcome.state.kind()]).inc();
        if outcome.tripped_limit() {
            self.bans.with_label_values(&["over_limit"]).inc();
        }
    }

    pub fn observe_manual_ban(&self, state: LeafState) {
        let cause = match state {
            LeafState::BannedPermanently => "permanent",
            _ => "manual",
        };
        self.bans.with_label_values(&[cause]).inc();
    }

    pub fn observe_rejection(&self, reason: &str) {
        self.rejected.with_label_values(&[reason]).inc();
    }

    /// Count one completed decay cycle.
    pub fn observe_sweep(&self, report: &SweepReport) {
        self.decay_cycles.inc();
        self.last_pruned.set(report.pruned_branches as i64);
    }

    /// Refresh gauges from the ledger and render the text exposition format.
    pub fn render(&self, ledger: &IpLedger) -> prometheus::Result<String> {
        self.tracked.set(ledger.count() as i64);
        self.memory_bytes.set(ledger.estimate_memory() as i64);

        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
