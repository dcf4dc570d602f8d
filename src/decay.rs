// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Background decay scheduler.
//!
//! Once per cycle every tracked address ages one step: a visit is forgotten
//! or a ban minute is served, and emptied trie branches are released. The
//! task runs until its stop signal turns `true`.

use crate::ledger::{IpLedger, SweepReport};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Handle to a running decay scheduler.
#[derive(Debug)]
pub struct DecayHandle {
    task: JoinHandle<()>,
}

impl DecayHandle {
    /// Whether the scheduler task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the scheduler to exit after its stop signal.
    pub async fn join(self) -> Result<(), JoinError> {
        self.task.await
    }
}

pub(crate) fn spawn<F>(
    runtime: &Handle,
    ledger: Arc<IpLedger>,
    stop: watch::Receiver<bool>,
    on_sweep: F,
) -> DecayHandle
where
    F: Fn(&SweepReport) + Send + 'static,
{
    DecayHandle {
        task: runtime.spawn(run(ledger, stop, on_sweep)),
    }
}

async fn run<F>(ledger: Arc<IpLedger>, mut stop: watch::Receiver<bool>, on_sweep: F)
where
    F: Fn(&SweepReport),
{
    let period = ledger.config().cycle_duration();
    // First sweep one full cycle after start
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(cycle_secs = period.as_secs(), "Decay scheduler started");

    if *stop.borrow() {
        info!("Decay scheduler stopped before first cycle");
        return;
    }

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let report = ledger.sweep();
                debug!(
                    aged = report.aged,
                    expired = report.expired,
                    remaining = report.remaining,
                    pruned_branches = report.pruned_branches,
                    elapsed_micros = report.elapsed_micros,
                    "Decay cycle complete"
                );
                on_sweep(&report);
            }
            changed = stop.changed() => {
                // A dropped sender can never signal again
                if changed.is_err() || *stop.borrow() {
                    break;
                }
            }
        }
    }

    info!("Decay scheduler stopped");
}
