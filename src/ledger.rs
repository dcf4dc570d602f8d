// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! The ledger facade.
//!
//! [`IpLedger`] answers "is this address banned, and how often has it been
//! seen recently?" from memory. Addresses are sharded by first octet; each
//! call locks exactly one shard, and the decay sweep locks one shard at a
//! time, so writers never lose updates and never observe a half-built or
//! half-pruned branch.

use crate::address::Address;
use crate::config::LedgerConfig;
use crate::decay::{self, DecayHandle};
use crate::error::{ConfigError, Result, StartError};
use crate::state::{BanTime, LeafState};
use crate::trie::{Shard, SweepTally};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::mem;
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, info};

const SHARDS: usize = 256;

/// Outcome of one decay cycle.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    /// Sequence number of this sweep, starting at 1
    pub cycle: u64,
    /// Leaves moved one step toward zero
    pub aged: usize,
    /// Leaves that reached zero and are no longer tracked
    pub expired: usize,
    /// Addresses still tracked after the sweep
    pub remaining: usize,
    /// Trie arrays released
    pub pruned_branches: usize,
    /// Wall-clock time spent sweeping, in microseconds
    pub elapsed_micros: u64,
    pub completed_at: DateTime<Utc>,
}

/// State of an address around a single recorded visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitOutcome {
    pub previous: LeafState,
    pub state: LeafState,
}

impl VisitOutcome {
    /// Whether this visit converted a visit count into an over-limit ban.
    pub fn tripped_limit(&self) -> bool {
        self.state.is_banned() && !self.previous.is_banned()
    }
}

/// In-memory visit and ban ledger keyed by IPv4 address.
pub struct IpLedger {
    config: LedgerConfig,
    visit_limit: u8,
    over_limit_ban: u8,
    shards: Box<[Mutex<Shard>]>,
    last_sweep: Mutex<Option<SweepReport>>,
}

impl IpLedger {
    /// Build an idle ledger. Nothing decays until [`IpLedger::sweep`] is
    /// called; use [`IpLedger::start`] for a self-ageing ledger.
    pub fn new(config: LedgerConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;

        // Ranges checked above
        let visit_limit = config.visit_limit as u8;
        let over_limit_ban = config.over_limit_ban_minutes as u8;

        let shards = (0..SHARDS).map(|_| Mutex::new(Shard::default())).collect();

        Ok(Self {
            config,
            visit_limit,
            over_limit_ban,
            shards,
            last_sweep: Mutex::new(None),
        })
    }

    /// Build a ledger and spawn its decay scheduler on the current tokio
    /// runtime. The scheduler sweeps once per cycle until `stop` turns
    /// `true` or its sender is dropped.
    ///
    /// Fails with [`StartError::NoRuntime`] when called outside a runtime.
    pub fn start(
        config: LedgerConfig,
        stop: watch::Receiver<bool>,
    ) -> std::result::Result<(Arc<Self>, DecayHandle), StartError> {
        Self::start_observed(config, stop, |_| {})
    }

    /// Like [`IpLedger::start`], calling `on_sweep` with the report of every
    /// scheduled decay cycle.
    pub fn start_observed<F>(
        config: LedgerConfig,
        stop: watch::Receiver<bool>,
        on_sweep: F,
    ) -> std::result::Result<(Arc<Self>, DecayHandle), StartError>
    where
        F: Fn(&SweepReport) + Send + 'static,
    {
        let ledger = Arc::new(Self::new(config)?);
        let runtime = Handle::try_current().map_err(|_| StartError::NoRuntime)?;
        let handle = decay::spawn(&runtime, ledger.clone(), stop, on_sweep);
        Ok((ledger, handle))
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    fn shard(&self, addr: Address) -> &Mutex<Shard> {
        &self.shards[addr.octets()[0] as usize]
    }

    /// Count one visit from `address`.
    ///
    /// Returns the resulting state: the visit count, or the over-limit ban
    /// if this visit exceeded the limit. Banned addresses are left as they
    /// are.
    pub fn record_visit(&self, address: &str) -> Result<LeafState> {
        self.visit(address).map(|outcome| outcome.state)
    }

    /// Like [`IpLedger::record_visit`], also reporting the state before the
    /// visit.
    pub fn visit(&self, address: &str) -> Result<VisitOutcome> {
        let addr = Address::parse(address)?;
        let (limit, ban) = (self.visit_limit, self.over_limit_ban);

        let mut previous = LeafState::Unseen;
        let state = self.shard(addr).lock().update(addr, |current| {
            previous = current;
            current.record_visit(limit, ban)
        });

        let outcome = VisitOutcome { previous, state };
        if outcome.tripped_limit() {
            info!(%addr, minutes = ban, "Visit limit exceeded, address banned");
        } else {
            debug!(%addr, %state, "Visit recorded");
        }
        Ok(outcome)
    }

    /// Ban `address` manually.
    ///
    /// `minutes` uses the signed encoding: `-1..=-127` adds that many
    /// minutes, `-128` bans permanently.
    pub fn extend_ban(&self, address: &str, minutes: i8) -> Result<LeafState> {
        let addr = Address::parse(address)?;
        let ban = BanTime::try_from(minutes)?;

        let state = self
            .shard(addr)
            .lock()
            .update(addr, |current| current.extend_ban(ban));

        info!(%addr, ?ban, %state, "Ban extended");
        Ok(state)
    }

    /// Current state of `address`. Never allocates.
    pub fn is_banned(&self, address: &str) -> Result<LeafState> {
        let addr = Address::parse(address)?;
        Ok(self.shard(addr).lock().get(addr))
    }

    /// Number of tracked addresses (nonzero state).
    pub fn count(&self) -> usize {
        self.shards.iter().map(|shard| shard.lock().tracked_count()).sum()
    }

    /// Every tracked address with its state, in ascending numeric order.
    pub fn entries(&self) -> Vec<(Address, LeafState)> {
        let mut entries = Vec::new();
        for (a, shard) in self.shards.iter().enumerate() {
            shard
                .lock()
                .for_each_tracked(a as u8, |addr, state| entries.push((addr, state)));
        }
        entries
    }

    /// Every tracked address as a dotted quad, in ascending numeric order.
    pub fn list_all(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .map(|(addr, _)| addr.to_string())
            .collect()
    }

    /// Bytes held by the trie: the fixed shard array plus every allocated
    /// level. Allocator overhead is not included.
    pub fn estimate_memory(&self) -> usize {
        let root = mem::size_of_val(&*self.shards);
        let levels: usize = self
            .shards
            .iter()
            .map(|shard| shard.lock().counts().bytes())
            .sum();
        root + levels
    }

    /// Number of trie arrays currently allocated below the root.
    pub fn allocated_branches(&self) -> usize {
        self.shards
            .iter()
            .map(|shard| shard.lock().counts().branches())
            .sum()
    }

    /// Run one decay cycle over every shard.
    pub fn sweep(&self) -> SweepReport {
        let started = Instant::now();
        let mut tally = SweepTally::default();
        for shard in self.shards.iter() {
            shard.lock().decay(&mut tally);
        }

        let mut last = self.last_sweep.lock();
        let report = SweepReport {
            cycle: last.as_ref().map_or(1, |prev| prev.cycle + 1),
            aged: tally.aged,
            expired: tally.expired,
            remaining: tally.remaining,
            pruned_branches: tally.pruned,
            elapsed_micros: started.elapsed().as_micros() as u64,
            completed_at: Utc::now(),
        };
        *last = Some(report.clone());
        report
    }

    /// Report of the most recent sweep, if any has run.
    pub fn last_sweep(&self) -> Option<SweepReport> {
        self.last_sweep.lock().clone()
    }
}
