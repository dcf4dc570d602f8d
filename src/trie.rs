// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Sparse octet trie.
//!
//! The ledger root is a fixed array of 256 [`Shard`]s, one per first octet.
//! Below a shard, three lazily allocated 256-wide levels are keyed by the
//! second, third and fourth octets; the last level holds packed
//! [`LeafState`] bytes directly. Each array exclusively owns its children.
//!
//! A branch is created on the first write beneath it and dropped by
//! [`Shard::decay`] once nothing nonzero remains under it, so memory tracks
//! the set of addresses currently being watched.

use crate::address::Address;
use crate::state::LeafState;
use std::mem;

const FANOUT: usize = 256;

/// Deepest level: one packed state byte per fourth octet.
pub(crate) struct Leaves {
    slots: [i8; FANOUT],
}

/// Intermediate level: optional owned children keyed by one octet.
pub(crate) struct Branch<C> {
    children: [Option<Box<C>>; FANOUT],
}

/// Third-octet level, owning leaf arrays.
type Level3 = Branch<Leaves>;
/// Second-octet level, directly under a shard.
type Level2 = Branch<Level3>;

impl Leaves {
    fn boxed() -> Box<Self> {
        Box::new(Self { slots: [0; FANOUT] })
    }

    /// Age every nonzero slot. Returns whether any slot is still nonzero.
    fn decay(&mut self, tally: &mut SweepTally) -> bool {
        let mut live = false;
        for raw in self.slots.iter_mut().filter(|raw| **raw != 0) {
            let before = LeafState::from_raw(*raw);
            let after = before.decay();
            if after != before {
                tally.aged += 1;
            }
            if after.is_tracked() {
                tally.remaining += 1;
                live = true;
            } else {
                tally.expired += 1;
            }
            *raw = after.raw();
        }
        live
    }
}

impl<C> Branch<C> {
    fn boxed() -> Box<Self> {
        Box::new(Self {
            children: std::array::from_fn(|_| None),
        })
    }

    fn child(&self, octet: u8) -> Option<&C> {
        self.children[octet as usize].as_deref()
    }

    /// Children in ascending octet order, skipping absent slots.
    fn present(&self) -> impl Iterator<Item = (u8, &C)> {
        self.children
            .iter()
            .enumerate()
            .filter_map(|(i, child)| child.as_deref().map(|c| (i as u8, c)))
    }
}

/// Number of arrays currently allocated at each level of one shard.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AllocationCounts {
    pub level2: usize,
    pub level3: usize,
    pub level4: usize,
}

impl AllocationCounts {
    pub fn bytes(&self) -> usize {
        self.level2 * mem::size_of::<Level2>()
            + self.level3 * mem::size_of::<Level3>()
            + self.level4 * mem::size_of::<Leaves>()
    }

    pub fn branches(&self) -> usize {
        self.level2 + self.level3 + self.level4
    }
}

/// Totals accumulated over one decay pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SweepTally {
    /// Leaves whose value moved one step toward zero.
    pub aged: usize,
    /// Leaves that reached zero on this pass.
    pub expired: usize,
    /// Leaves still nonzero after the pass.
    pub remaining: usize,
    /// Arrays released because nothing nonzero was left beneath them.
    pub pruned: usize,
}

/// Subtree for one first octet.
#[derive(Default)]
pub(crate) struct Shard {
    root: Option<Box<Level2>>,
    counts: AllocationCounts,
}

impl Shard {
    /// Walk to the leaf array for `b.c`, allocating any missing level.
    /// Existing values are never reset.
    fn leaves_mut(&mut self, b: u8, c: u8) -> &mut Leaves {
        let counts = &mut self.counts;
        let level2 = self.root.get_or_insert_with(|| {
            counts.level2 += 1;
            Branch::boxed()
        });
        let level3 = level2.children[b as usize].get_or_insert_with(|| {
            counts.level3 += 1;
            Branch::boxed()
        });
        level3.children[c as usize].get_or_insert_with(|| {
            counts.level4 += 1;
            Leaves::boxed()
        })
    }

    /// Apply `transition` to the state of `addr`, creating its path first.
    pub fn update(
        &mut self,
        addr: Address,
        transition: impl FnOnce(LeafState) -> LeafState,
    ) -> LeafState {
        let [_, b, c, d] = addr.octets();
        let slot = &mut self.leaves_mut(b, c).slots[d as usize];
        let next = transition(LeafState::from_raw(*slot));
        *slot = next.raw();
        next
    }

    /// Read-only lookup. A missing branch reads as [`LeafState::Unseen`].
    pub fn get(&self, addr: Address) -> LeafState {
        let [_, b, c, d] = addr.octets();
        self.root
            .as_deref()
            .and_then(|level2| level2.child(b))
            .and_then(|level3| level3.child(c))
            .map_or(LeafState::Unseen, |leaves| {
                LeafState::from_raw(leaves.slots[d as usize])
            })
    }

    /// Visit every tracked address in ascending order.
    pub fn for_each_tracked(&self, a: u8, mut visit: impl FnMut(Address, LeafState)) {
        let Some(level2) = self.root.as_deref() else {
            return;
        };
        for (b, level3) in level2.present() {
            for (c, leaves) in level3.present() {
                for (d, raw) in leaves.slots.iter().enumerate() {
                    if *raw == 0 {
                        continue;
                    }
                    if let Some(addr) = Address::new([a, b, c, d as u8]) {
                        visit(addr, LeafState::from_raw(*raw));
                    }
                }
            }
        }
    }

    pub fn tracked_count(&self) -> usize {
        let mut count = 0;
        let Some(level2) = self.root.as_deref() else {
            return 0;
        };
        for (_, level3) in level2.present() {
            for (_, leaves) in level3.present() {
                count += leaves.slots.iter().filter(|raw| **raw != 0).count();
            }
        }
        count
    }

    /// Age every leaf one step, then release each array with nothing
    /// nonzero left beneath it.
    pub fn decay(&mut self, tally: &mut SweepTally) {
        let Some(level2) = self.root.as_mut() else {
            return;
        };

        let mut level2_live = false;
        for slot3 in level2.children.iter_mut() {
            let Some(level3) = slot3.as_mut() else {
                continue;
            };

            let mut level3_live = false;
            for slot4 in level3.children.iter_mut() {
                let Some(leaves) = slot4.as_mut() else {
                    continue;
                };
                if leaves.decay(tally) {
                    level3_live = true;
                } else {
                    *slot4 = None;
                    self.counts.level4 -= 1;
                    tally.pruned += 1;
                }
            }

            if level3_live {
                level2_live = true;
            } else {
                *slot3 = None;
                self.counts.level3 -= 1;
                tally.pruned += 1;
            }
        }

        if !level2_live {
            self.root = None;
            self.counts.level2 -= 1;
            tally.pruned += 1;
        }
    }

    pub fn counts(&self) -> AllocationCounts {
        self.counts
    }
}
