//! Centralized constants for the VPN inspector.
//!
//! Technique labels, trace placeholders, setting keys and host paths are
//! collected here so they can be found and adjusted in a single place rather
//! than scattered across modules.

/// Label recorded when a network advertising the VPN transport is found.
pub const LABEL_TRANSPORT_VPN: &str = "Transport: TRANSPORT_VPN";

/// Label recorded when a `tun*` interface is up.
pub const LABEL_TUN_INTERFACE: &str = "Heuristic: tun* interface UP";

/// Label recorded when the legacy VPN-typed network is connected or connecting.
pub const LABEL_LEGACY_VPN: &str = "Legacy: TYPE_VPN connected";

/// Sentinel technique appended when no technique fired.
pub const NO_VPN_INDICATORS: &str = "No VPN indicators found";

/// Substituted for missing or blank strings in trace lines.
pub const PLACEHOLDER: &str = "-";

/// Conventional tunnel-device name prefix used by the interface heuristic.
pub const TUN_INTERFACE_PREFIX: &str = "tun";

/// Global setting holding the private DNS mode.
pub const SETTING_PRIVATE_DNS_MODE: &str = "private_dns_mode";

/// Global setting holding the private DNS resolver hostname.
pub const SETTING_PRIVATE_DNS_SPECIFIER: &str = "private_dns_specifier";

/// Default interval between inspections in watch mode (milliseconds).
pub const WATCH_INTERVAL_MS: u64 = 2000;

/// Lower bound accepted for the watch interval (milliseconds).
pub const MIN_WATCH_INTERVAL_MS: u64 = 100;

/// Log filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "vpn_inspector=info,vpn_inspector_lib=info";

/// Log filter used with `--verbose`.
pub const VERBOSE_LOG_FILTER: &str = "vpn_inspector=debug,vpn_inspector_lib=debug";

// ---- Host paths (relative to the host root, `/` by default) ----

pub const PROC_NET_ROUTE_PATH: &str = "proc/net/route";
pub const PROC_NET_IPV6_ROUTE_PATH: &str = "proc/net/ipv6_route";
pub const PROC_NET_DEV_PATH: &str = "proc/net/dev";
pub const SYS_CLASS_NET_PATH: &str = "sys/class/net";
pub const RESOLV_CONF_PATH: &str = "etc/resolv.conf";
pub const RESOLVED_CONF_PATH: &str = "etc/systemd/resolved.conf";

/// `IFF_UP` bit of `sys/class/net/<if>/flags`.
pub const IFF_UP: u32 = 0x1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_technique_labels_are_distinct() {
        let labels = [
            LABEL_TRANSPORT_VPN,
            LABEL_TUN_INTERFACE,
            LABEL_LEGACY_VPN,
            NO_VPN_INDICATORS,
        ];
        for (i, a) in labels.iter().enumerate() {
            for b in &labels[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    /// Compile-time sanity on the watch interval bounds.
    #[test]
    fn test_watch_interval_bounds() {
        const _: () = assert!(MIN_WATCH_INTERVAL_MS > 0);
        const _: () = assert!(WATCH_INTERVAL_MS >= MIN_WATCH_INTERVAL_MS);
    }

    #[test]
    fn test_host_paths_are_relative() {
        for path in [
            PROC_NET_ROUTE_PATH,
            PROC_NET_IPV6_ROUTE_PATH,
            PROC_NET_DEV_PATH,
            SYS_CLASS_NET_PATH,
            RESOLV_CONF_PATH,
            RESOLVED_CONF_PATH,
        ] {
            assert!(!path.starts_with('/'), "{path} must join onto the host root");
        }
    }
}
