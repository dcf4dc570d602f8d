// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test data generators for attack simulation.

/// Generate a pool of distinct host addresses in 10.0.0.0/8.
///
/// Host parts run 1..=254 so every address is accepted by the ledger.
pub fn generate_ips(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            let host = i % 254 + 1;
            let subnet = i / 254;
            format!("10.{}.{}.{}", (subnet >> 8) & 0xFF, subnet & 0xFF, host)
        })
        .collect()
}

/// Every host address of one /24, in ascending order.
pub fn generate_subnet_scan(prefix: [u8; 3]) -> Vec<String> {
    let [a, b, c] = prefix;
    (1..=255u16)
        .map(|host| format!("{a}.{b}.{c}.{host}"))
        .collect()
}

/// Inputs the ledger must refuse.
pub fn generate_malformed_addresses() -> Vec<&'static str> {
    vec![
        "",
        "   ",
        "localhost",
        "1.2.3",
        "1.2.3.4.5",
        "999.1.1.1",
        "1.2.3.256",
        "-1.2.3.4",
        "1.2.3.0",
        "1..3.4",
        "::1",
        "2001:db8::1",
        "1.2.3.4:8080",
        "0x7f.0.0.1",
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_ips() {
        let ips = generate_ips(1000);
        assert_eq!(ips.len(), 1000);
        // All should be unique
        let unique: std::collections::HashSet<_> = ips.iter().collect();
        assert_eq!(unique.len(), 1000);
        assert!(ips.iter().all(|ip| !ip.ends_with(".0")));
    }

    #[test]
    fn test_generate_subnet_scan() {
        let scan = generate_subnet_scan([192, 168, 7]);
        assert_eq!(scan.len(), 255);
        assert_eq!(scan[0], "192.168.7.1");
        assert_eq!(scan[254], "192.168.7.255");
    }
}
