// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Per-address state and its one-byte packing.
//!
//! Every tracked address costs a single `i8` in the trie:
//!
//! | raw            | state                              |
//! |----------------|------------------------------------|
//! | `0`            | unseen                             |
//! | `1..=127`      | visits counted in the current cycle |
//! | `-127..=-1`    | minutes of temporary ban remaining  |
//! | `-128`         | permanent ban                      |
//!
//! [`LeafState`] is the unpacked view; all transitions are defined on it.

use crate::error::LedgerError;
use std::fmt;

const PERMANENT: i8 = i8::MIN;

/// Longest temporary ban, in minutes.
pub const MAX_BAN_MINUTES: u8 = 127;

/// Decoded state of a single address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafState {
    /// Never recorded, or fully decayed.
    Unseen,
    /// Visits seen in the current decay cycle.
    Visits(u8),
    /// Temporary ban with this many minutes remaining.
    BannedFor(u8),
    /// Permanent ban. Never decays.
    BannedPermanently,
}

/// Ban length requested through `extend_ban`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BanTime {
    /// Add this many minutes (1..=127).
    Minutes(u8),
    Permanent,
}

impl TryFrom<i8> for BanTime {
    type Error = LedgerError;

    /// Accepts the signed encoding: `-1..=-127` minutes, `-128` permanent.
    fn try_from(raw: i8) -> Result<Self, Self::Error> {
        match raw {
            PERMANENT => Ok(BanTime::Permanent),
            m if m < 0 => Ok(BanTime::Minutes(m.unsigned_abs())),
            m => Err(LedgerError::InvalidBanMinutes(m.into())),
        }
    }
}

impl LeafState {
    /// Unpack a stored byte.
    pub fn from_raw(raw: i8) -> Self {
        match raw {
            0 => LeafState::Unseen,
            PERMANENT => LeafState::BannedPermanently,
            v if v > 0 => LeafState::Visits(v as u8),
            v => LeafState::BannedFor(v.unsigned_abs()),
        }
    }

    /// Pack into the stored byte.
    pub fn raw(self) -> i8 {
        match self {
            LeafState::Unseen => 0,
            LeafState::Visits(n) => n.min(i8::MAX as u8) as i8,
            LeafState::BannedFor(m) => -(m.min(MAX_BAN_MINUTES) as i8),
            LeafState::BannedPermanently => PERMANENT,
        }
    }

    pub fn is_banned(self) -> bool {
        matches!(self, LeafState::BannedFor(_) | LeafState::BannedPermanently)
    }

    pub fn is_tracked(self) -> bool {
        self != LeafState::Unseen
    }

    /// Short label used in logs and API responses.
    pub fn kind(self) -> &'static str {
        match self {
            LeafState::Unseen => "unseen",
            LeafState::Visits(_) => "visits",
            LeafState::BannedFor(_) => "banned",
            LeafState::BannedPermanently => "banned_permanently",
        }
    }

    /// Count one visit.
    ///
    /// Banned addresses are not counted. Reaching `limit` visits and then
    /// visiting again converts the counter into a ban of `over_limit_ban`
    /// minutes.
    pub fn record_visit(self, limit: u8, over_limit_ban: u8) -> Self {
        match self {
            LeafState::BannedFor(_) | LeafState::BannedPermanently => self,
            LeafState::Unseen if limit > 0 => LeafState::Visits(1),
            LeafState::Visits(n) if n < limit => LeafState::Visits(n + 1),
            LeafState::Unseen | LeafState::Visits(_) => LeafState::BannedFor(over_limit_ban),
        }
    }

    /// Apply a manual ban.
    ///
    /// A permanent ban overrides any state and is never shortened. A finite
    /// ban replaces a visit count, or accumulates onto an existing temporary
    /// ban, saturating at [`MAX_BAN_MINUTES`]: accumulation never turns into a
    /// permanent ban.
    pub fn extend_ban(self, ban: BanTime) -> Self {
        match (self, ban) {
            (_, BanTime::Permanent) => LeafState::BannedPermanently,
            (LeafState::BannedPermanently, BanTime::Minutes(_)) => self,
            (LeafState::BannedFor(current), BanTime::Minutes(m)) => {
                LeafState::BannedFor(current.saturating_add(m).min(MAX_BAN_MINUTES))
            }
            (LeafState::Unseen | LeafState::Visits(_), BanTime::Minutes(m)) => {
                LeafState::BannedFor(m.min(MAX_BAN_MINUTES))
            }
        }
    }

    /// Age by one decay cycle: one visit forgotten, or one ban minute served.
    pub fn decay(self) -> Self {
        match self {
            LeafState::Unseen | LeafState::BannedPermanently => self,
            LeafState::Visits(1) | LeafState::BannedFor(1) => LeafState::Unseen,
            LeafState::Visits(n) => LeafState::Visits(n - 1),
            LeafState::BannedFor(m) => LeafState::BannedFor(m - 1),
        }
    }
}

impl fmt::Display for LeafState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeafState::Unseen => write!(f, "unseen"),
            LeafState::Visits(n) => write!(f, "{n} visits"),
            LeafState::BannedFor(m) => write!(f, "banned for {m} min"),
            LeafState::BannedPermanently => write!(f, "banned permanently"),
        }
    }
}
