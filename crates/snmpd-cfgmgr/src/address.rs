//! Agent listen address mapping
//!
//! The daemon listens on the transports named in the `agentaddress` option
//! of the `agent` section, e.g. `UDP:161,UDP6:161`. The form shows this as
//! an IP protocol choice plus a port.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::IpProtocols;

static UDP4_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"UDP:\d+").expect("Invalid regex pattern"));

static UDP6_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"UDP6:\d+").expect("Invalid regex pattern"));

static PORT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"UDP6?:(\d+)").expect("Invalid regex pattern"));

/// Returns the IP protocols an address string listens on.
///
/// Matching is case-insensitive.
pub fn parse_protocols(address: &str) -> IpProtocols {
    let address = address.to_uppercase();
    IpProtocols {
        ipv4: UDP4_RE.is_match(&address),
        ipv6: UDP6_RE.is_match(&address),
    }
}

/// Returns the port of the first UDP transport of an address string.
pub fn parse_port(address: &str) -> Option<String> {
    let address = address.to_uppercase();
    PORT_RE
        .captures(&address)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Builds the address string for a protocol set and port.
///
/// Returns `None` when no protocol is selected.
pub fn encode(protocols: IpProtocols, port: u16) -> Option<String> {
    let mut transports = Vec::new();

    if protocols.ipv4 {
        transports.push(format!("UDP:{}", port));
    }

    if protocols.ipv6 {
        transports.push(format!("UDP6:{}", port));
    }

    (!transports.is_empty()).then(|| transports.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        assert_eq!(encode(IpProtocols::DUAL, 161).as_deref(), Some("UDP:161,UDP6:161"));
        assert_eq!(encode(IpProtocols::IPV4, 1161).as_deref(), Some("UDP:1161"));
        assert_eq!(encode(IpProtocols::IPV6, 161).as_deref(), Some("UDP6:161"));
        assert_eq!(encode(IpProtocols::default(), 161), None);
    }

    #[test]
    fn test_decode_dual_stack() {
        let address = "UDP:161,UDP6:161";
        assert_eq!(parse_protocols(address), IpProtocols::DUAL);
        assert_eq!(parse_port(address).as_deref(), Some("161"));
    }

    #[test]
    fn test_decode_is_case_insensitive() {
        assert_eq!(parse_protocols("udp6:1161"), IpProtocols::IPV6);
        assert_eq!(parse_port("udp6:1161").as_deref(), Some("1161"));
    }

    #[test]
    fn test_port_comes_from_first_transport() {
        assert_eq!(parse_port("UDP6:200,UDP:100").as_deref(), Some("200"));
    }

    #[test]
    fn test_decode_without_udp() {
        assert!(parse_protocols("TCP:161").is_empty());
        assert_eq!(parse_port("TCP:161"), None);
        assert_eq!(parse_port(""), None);
    }
}
