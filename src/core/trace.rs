//! Formatting helpers for trace lines.

use std::net::IpAddr;

use crate::config;
use crate::platform::{NetworkCapabilities, Transport};

/// The string itself, or the placeholder when missing or blank.
pub fn or_placeholder(value: Option<&str>) -> &str {
    match value {
        Some(s) if !s.trim().is_empty() => s,
        _ => config::PLACEHOLDER,
    }
}

/// `[a, b, c]`
pub fn bracketed<T: ToString>(items: &[T]) -> String {
    let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
    format!("[{}]", parts.join(", "))
}

pub fn dns_servers(servers: &[IpAddr]) -> String {
    bracketed(servers)
}

/// Transports present on a network, in a fixed order. Bluetooth is only
/// listed when the platform reports it.
pub fn transports(caps: &NetworkCapabilities, bluetooth_supported: bool) -> String {
    let mut order = vec![
        Transport::Wifi,
        Transport::Cellular,
        Transport::Ethernet,
        Transport::Vpn,
    ];
    if bluetooth_supported {
        order.push(Transport::Bluetooth);
    }
    let present: Vec<&str> = order
        .into_iter()
        .filter(|t| caps.has_transport(*t))
        .map(Transport::short_name)
        .collect();
    bracketed(&present)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_or_placeholder() {
        assert_eq!(or_placeholder(None), "-");
        assert_eq!(or_placeholder(Some("")), "-");
        assert_eq!(or_placeholder(Some("  \t")), "-");
        assert_eq!(or_placeholder(Some("wlan0")), "wlan0");
    }

    #[test]
    fn test_dns_servers_format() {
        let servers: Vec<IpAddr> = vec!["8.8.8.8".parse().unwrap(), "2606:4700::1111".parse().unwrap()];
        assert_eq!(dns_servers(&servers), "[8.8.8.8, 2606:4700::1111]");
        assert_eq!(dns_servers(&[]), "[]");
    }

    #[test]
    fn test_transports_fixed_order() {
        let caps = NetworkCapabilities {
            transports: vec![Transport::Vpn, Transport::Bluetooth, Transport::Wifi],
            capabilities: vec![],
        };
        assert_eq!(transports(&caps, true), "[WIFI, VPN, BT]");
        assert_eq!(transports(&caps, false), "[WIFI, VPN]");
    }
}
