//! IPv4 address and mask parsing.
//!
//! Shared by the value normalizer (deriving `cmpMin`/`cmpMax`/`mask` for
//! `ip` cells) and the filter validator (pre-converting IP literals for the
//! `<`, `>` and `@=` operators).

use std::net::Ipv4Addr;

/// Parse a dotted-quad IPv4 address into its 32-bit integer form.
pub fn ip2long(s: &str) -> Option<u32> {
    s.trim().parse::<Ipv4Addr>().ok().map(u32::from)
}

/// Build a network mask from a CIDR prefix length (0..=32).
pub fn mask_from_bits(bits: u32) -> Option<u32> {
    match bits {
        0 => Some(0),
        1..=32 => Some(u32::MAX << (32 - bits)),
        _ => None,
    }
}

/// Parse a mask spec: CIDR bit count (`"24"`) or dotted mask
/// (`"255.255.255.0"`).
pub fn parse_mask(s: &str) -> Option<u32> {
    let s = s.trim();
    if let Ok(bits) = s.parse::<u32>() {
        return mask_from_bits(bits);
    }
    ip2long(s)
}

/// Parse `a.b.c.d[/mask]` into `(network, broadcast, mask)`.
///
/// The mask defaults to `/32` when absent.
///
/// # Example
///
/// ```
/// use tabsift_table::net::{ip2long, parse_cidr};
///
/// let (net, bcast, _) = parse_cidr("10.1.2.3/24").unwrap();
/// assert_eq!(net, ip2long("10.1.2.0").unwrap());
/// assert_eq!(bcast, ip2long("10.1.2.255").unwrap());
/// ```
pub fn parse_cidr(s: &str) -> Option<(u32, u32, u32)> {
    let s = s.trim();
    let (addr_part, mask_part) = match s.split_once('/') {
        Some((a, m)) => (a, Some(m)),
        None => (s, None),
    };
    let addr = ip2long(addr_part)?;
    let mask = match mask_part {
        Some(m) => parse_mask(m)?,
        None => u32::MAX,
    };
    let network = addr & mask;
    let broadcast = network | !mask;
    Some((network, broadcast, mask))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ip2long() {
        assert_eq!(ip2long("0.0.0.0"), Some(0));
        assert_eq!(ip2long("10.1.2.3"), Some(0x0A010203));
        assert_eq!(ip2long("255.255.255.255"), Some(u32::MAX));
        assert_eq!(ip2long("10.1.2"), None);
        assert_eq!(ip2long("10.1.2.300"), None);
    }

    #[test]
    fn test_mask_from_bits() {
        assert_eq!(mask_from_bits(0), Some(0));
        assert_eq!(mask_from_bits(24), Some(0xFFFFFF00));
        assert_eq!(mask_from_bits(32), Some(u32::MAX));
        assert_eq!(mask_from_bits(33), None);
    }

    #[test]
    fn test_parse_mask_dotted() {
        assert_eq!(parse_mask("255.255.255.0"), Some(0xFFFFFF00));
        assert_eq!(parse_mask("24"), Some(0xFFFFFF00));
        assert_eq!(parse_mask("junk"), None);
    }

    #[test]
    fn test_parse_cidr_default_32() {
        let (net, bcast, mask) = parse_cidr("10.1.2.3").unwrap();
        assert_eq!(net, ip2long("10.1.2.3").unwrap());
        assert_eq!(bcast, net);
        assert_eq!(mask, u32::MAX);
    }

    #[test]
    fn test_parse_cidr_network_broadcast() {
        let (net, bcast, mask) = parse_cidr("10.1.2.3/24").unwrap();
        assert_eq!(net, ip2long("10.1.2.0").unwrap());
        assert_eq!(bcast, ip2long("10.1.2.255").unwrap());
        assert_eq!(mask, 0xFFFFFF00);
    }

    #[test]
    fn test_parse_cidr_dotted_mask() {
        let (net, bcast, _) = parse_cidr("192.168.5.77/255.255.255.0").unwrap();
        assert_eq!(net, ip2long("192.168.5.0").unwrap());
        assert_eq!(bcast, ip2long("192.168.5.255").unwrap());
    }
}
