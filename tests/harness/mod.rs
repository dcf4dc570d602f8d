// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test harness for ledger attack simulation.
//!
//! This module provides utilities for replaying abusive traffic patterns
//! against the ledger to validate that offenders end up banned and that
//! legitimate clients do not.

pub mod attacks;
pub mod generators;
pub mod metrics;
