//! Datatype checks for submitted form values
//!
//! Each check returns a human readable message on failure; the form layer
//! attaches the field name.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use once_cell::sync::Lazy;
use regex::Regex;

/// Single label of word characters (`localhost`, `default`, `router1`)
static HOSTNAME_SHORT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("Invalid regex pattern"));

/// Dotted hostname (`snmp.example.org`)
static HOSTNAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9_][a-zA-Z0-9_\-.]*[a-zA-Z0-9]$").expect("Invalid regex pattern")
});

const HOSTNAME_MAX_LEN: usize = 253;

/// Value type a form field accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Datatype {
    /// UDP/TCP port
    Port,
    /// Hostname or IP address
    Host,
    /// Hostname, or IP address with optional mask
    HostOrIpmask,
}

impl Datatype {
    /// Checks a non-empty value against this datatype
    pub fn check(&self, value: &str) -> Result<(), String> {
        match self {
            Datatype::Port => port(value).map(|_| ()),
            Datatype::Host => host(value),
            Datatype::HostOrIpmask => host(value).map_err(|_| {
                format!(
                    "'{}' is neither a hostname nor an address with optional mask",
                    value
                )
            }),
        }
    }
}

/// Parses a port number (0-65535)
pub fn port(value: &str) -> Result<u16, String> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("'{}' is not a valid port", value));
    }

    value
        .parse::<u16>()
        .map_err(|_| format!("port {} is out of range (0-65535)", value))
}

/// Accepts a hostname or an IPv4/IPv6 address, optionally with a mask
pub fn host(value: &str) -> Result<(), String> {
    if value.parse::<IpAddr>().is_ok() || is_hostname(value) || ipmask(value).is_ok() {
        Ok(())
    } else {
        Err(format!("'{}' is not a valid hostname or IP address", value))
    }
}

fn is_hostname(value: &str) -> bool {
    if value.len() > HOSTNAME_MAX_LEN {
        return false;
    }

    // All digits and dots would be a malformed IPv4 address
    HOSTNAME_SHORT_RE.is_match(value)
        || (HOSTNAME_RE.is_match(value) && value.contains(|c: char| !c.is_ascii_digit() && c != '.'))
}

/// Accepts `addr`, `addr/prefix` or `ipv4/netmask`
pub fn ipmask(value: &str) -> Result<(), String> {
    let invalid = || format!("'{}' is not a valid address/mask", value);

    let (addr, mask) = match value.split_once('/') {
        Some((addr, mask)) => (addr, Some(mask)),
        None => (value, None),
    };

    if addr.parse::<Ipv4Addr>().is_ok() {
        return match mask {
            None => Ok(()),
            Some(mask) if prefix_len(mask, 32) || is_netmask(mask) => Ok(()),
            Some(_) => Err(invalid()),
        };
    }

    if addr.parse::<Ipv6Addr>().is_ok() {
        return match mask {
            None => Ok(()),
            Some(mask) if prefix_len(mask, 128) => Ok(()),
            Some(_) => Err(invalid()),
        };
    }

    Err(invalid())
}

fn prefix_len(mask: &str, max: u8) -> bool {
    !mask.is_empty()
        && mask.bytes().all(|b| b.is_ascii_digit())
        && mask.parse::<u8>().map(|len| len <= max).unwrap_or(false)
}

/// Contiguous dotted netmask such as `255.255.255.0`
fn is_netmask(mask: &str) -> bool {
    match mask.parse::<Ipv4Addr>() {
        Ok(mask) => {
            let bits = u32::from(mask);
            bits.leading_ones() + bits.trailing_zeros() == 32
        }
        Err(_) => false,
    }
}

/// Checks list membership
pub fn choice(value: &str, choices: &[&str]) -> Result<(), String> {
    if choices.contains(&value) {
        Ok(())
    } else {
        Err(format!(
            "'{}' is not one of: {}",
            value,
            choices.join(", ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port() {
        assert_eq!(port("161"), Ok(161));
        assert_eq!(port("0"), Ok(0));
        assert_eq!(port("65535"), Ok(65535));
        assert!(port("65536").is_err());
        assert!(port("-1").is_err());
        assert!(port("+161").is_err());
        assert!(port("16a").is_err());
        assert!(port("").is_err());
    }

    #[test]
    fn test_host() {
        for ok in [
            "localhost",
            "default",
            "snmp.example.org",
            "10.0.0.1",
            "fe80::1",
            "a",
            "10.0.0.1/24",
            "2001:db8::1/64",
        ] {
            assert!(host(ok).is_ok(), "{} rejected", ok);
        }
        for bad in ["10.0.0.256", "-router", "router-", "host name", "", "1.2.3", "10.0.0.1/33"] {
            assert!(host(bad).is_err(), "{} accepted", bad);
        }
    }

    #[test]
    fn test_ipmask() {
        for ok in [
            "10.0.0.0/8",
            "192.168.1.0/255.255.255.0",
            "192.168.1.1",
            "2001:db8::/32",
            "::1",
        ] {
            assert!(ipmask(ok).is_ok(), "{} rejected", ok);
        }
        for bad in [
            "10.0.0.0/33",
            "10.0.0.0/255.0.255.0",
            "2001:db8::/129",
            "2001:db8::/ffff::",
            "10.0.0.0/",
            "localhost",
        ] {
            assert!(ipmask(bad).is_err(), "{} accepted", bad);
        }
    }

    #[test]
    fn test_host_or_ipmask() {
        let datatype = Datatype::HostOrIpmask;
        assert!(datatype.check("default").is_ok());
        assert!(datatype.check("10.0.0.0/8").is_ok());
        assert!(datatype.check("10.0.0.0/40").is_err());
    }

    #[test]
    fn test_choice() {
        assert!(choice("v2c", &["v1", "v2c"]).is_ok());
        let err = choice("v3", &["v1", "v2c"]).unwrap_err();
        assert_eq!(err, "'v3' is not one of: v1, v2c");
    }
}
