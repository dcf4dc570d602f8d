// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Dotted-quad address parsing.
//!
//! Only host addresses are accepted: the fourth octet must be nonzero,
//! since `a.b.c.0` names a network rather than a client.

use crate::error::LedgerError;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// A validated IPv4 host address, split into the four trie keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address([u8; 4]);

impl Address {
    /// Build an address from raw octets, rejecting a zero host part.
    pub fn new(octets: [u8; 4]) -> Option<Self> {
        if octets[3] == 0 {
            None
        } else {
            Some(Self(octets))
        }
    }

    pub fn octets(&self) -> [u8; 4] {
        self.0
    }

    /// Parse a dotted-quad string.
    ///
    /// Each of the four parts must be a decimal integer in `[0, 255]`. A
    /// leading `+` and leading zeros are tolerated (`"010.0.0.+1"` is
    /// `10.0.0.1`), matching plain integer parsing.
    pub fn parse(input: &str) -> Result<Self, LedgerError> {
        let malformed = || LedgerError::MalformedAddress(input.to_string());

        let mut octets = [0u8; 4];
        let mut parts = input.split('.');
        for slot in octets.iter_mut() {
            let part = parts.next().ok_or_else(malformed)?;
            let value: i32 = part.parse().map_err(|_| malformed())?;
            *slot = u8::try_from(value).map_err(|_| malformed())?;
        }
        if parts.next().is_some() {
            return Err(malformed());
        }

        Self::new(octets).ok_or_else(malformed)
    }
}

impl FromStr for Address {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<Ipv4Addr> for Address {
    type Error = LedgerError;

    fn try_from(ip: Ipv4Addr) -> Result<Self, Self::Error> {
        Self::new(ip.octets()).ok_or_else(|| LedgerError::MalformedAddress(ip.to_string()))
    }
}

impl From<Address> for Ipv4Addr {
    fn from(addr: Address) -> Self {
        Ipv4Addr::from(addr.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.0;
        write!(f, "{a}.{b}.{c}.{d}")
    }
}
