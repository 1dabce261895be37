//! Execution context for the machine the inspector runs on.
//!
//! - connectivity: procfs/sysfs on Linux ([`super::linux`]); absent elsewhere
//! - interfaces: `getifaddrs` via `nix` on Unix, `sysinfo` elsewhere; read from
//!   `sys/class/net` under the root when the root is not `/`
//! - settings: `systemd-resolved` configuration mapped onto the private DNS keys

use std::fs;
use std::path::{Path, PathBuf};

use super::{
    ConnectivityService, ExecutionContext, InterfaceEnumerator, InterfaceInfo,
    PlatformCapabilities, SettingsReader,
};
use crate::config;
use crate::error::AppError;

/// Locations of the host files the backend reads, joined onto a root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPaths {
    root: PathBuf,
}

impl Default for HostPaths {
    fn default() -> Self {
        Self::new("/")
    }
}

impl HostPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn proc_net_route(&self) -> PathBuf {
        self.root.join(config::PROC_NET_ROUTE_PATH)
    }

    pub fn proc_net_ipv6_route(&self) -> PathBuf {
        self.root.join(config::PROC_NET_IPV6_ROUTE_PATH)
    }

    pub fn proc_net_dev(&self) -> PathBuf {
        self.root.join(config::PROC_NET_DEV_PATH)
    }

    pub fn sys_class_net(&self) -> PathBuf {
        self.root.join(config::SYS_CLASS_NET_PATH)
    }

    pub fn resolv_conf(&self) -> PathBuf {
        self.root.join(config::RESOLV_CONF_PATH)
    }

    pub fn resolved_conf(&self) -> PathBuf {
        self.root.join(config::RESOLVED_CONF_PATH)
    }
}

/// The running host as an [`ExecutionContext`].
pub struct HostContext {
    connectivity: Option<Box<dyn ConnectivityService + Send + Sync>>,
    interfaces: Box<dyn InterfaceEnumerator + Send + Sync>,
    settings: ResolvedSettings,
    capabilities: PlatformCapabilities,
}

impl HostContext {
    /// Build the context for `/`.
    pub fn detect() -> Self {
        Self::with_paths(HostPaths::default())
    }

    /// Build the context for a host tree mounted at `paths`.
    pub fn with_paths(paths: HostPaths) -> Self {
        tracing::info!(
            os = ?sysinfo::System::long_os_version(),
            kernel = ?sysinfo::System::kernel_version(),
            root = %paths.root().display(),
            "Detecting host platform"
        );

        #[cfg(target_os = "linux")]
        let (connectivity, transport_flags) = {
            let cm = super::linux::LinuxConnectivity::probe(&paths)
                .map(|c| Box::new(c) as Box<dyn ConnectivityService + Send + Sync>);
            (cm, super::linux::LinuxConnectivity::has_sysfs(&paths))
        };
        #[cfg(not(target_os = "linux"))]
        let (connectivity, transport_flags): (
            Option<Box<dyn ConnectivityService + Send + Sync>>,
            bool,
        ) = (None, false);

        let capabilities = PlatformCapabilities {
            transport_flags,
            bluetooth_transport: true,
        };
        tracing::debug!(?capabilities, has_connectivity = connectivity.is_some(), "Host capabilities");

        // A mounted tree must not mix in the live host's interfaces.
        let interfaces: Box<dyn InterfaceEnumerator + Send + Sync> =
            if paths.root() == Path::new("/") {
                Box::new(SystemInterfaces)
            } else {
                Box::new(SysfsInterfaces::new(paths.sys_class_net()))
            };

        Self {
            connectivity,
            interfaces,
            settings: ResolvedSettings::new(paths.resolved_conf()),
            capabilities,
        }
    }
}

impl ExecutionContext for HostContext {
    fn connectivity(&self) -> Option<&dyn ConnectivityService> {
        self.connectivity
            .as_deref()
            .map(|c| c as &dyn ConnectivityService)
    }

    fn interfaces(&self) -> &dyn InterfaceEnumerator {
        self.interfaces.as_ref()
    }

    fn settings(&self) -> &dyn SettingsReader {
        &self.settings
    }

    fn platform_capabilities(&self) -> PlatformCapabilities {
        self.capabilities
    }
}

// ---- Interfaces ----

/// OS interface list, one entry per interface in enumeration order.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemInterfaces;

impl InterfaceEnumerator for SystemInterfaces {
    #[cfg(unix)]
    fn interfaces(&self) -> Result<Vec<InterfaceInfo>, AppError> {
        use nix::net::if_::InterfaceFlags;

        let addrs = nix::ifaddrs::getifaddrs()
            .map_err(|e| AppError::Interfaces(format!("getifaddrs: {e}")))?;
        Ok(dedupe_by_name(addrs.map(|a| InterfaceInfo {
            up: a.flags.contains(InterfaceFlags::IFF_UP),
            name: a.interface_name,
        })))
    }

    /// Without `getifaddrs`, an interface that has carried traffic counts as up.
    #[cfg(not(unix))]
    fn interfaces(&self) -> Result<Vec<InterfaceInfo>, AppError> {
        let networks = sysinfo::Networks::new_with_refreshed_list();
        let mut list: Vec<InterfaceInfo> = networks
            .list()
            .iter()
            .map(|(name, data)| InterfaceInfo {
                name: name.clone(),
                up: data.total_received() + data.total_transmitted() > 0,
            })
            .collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(list)
    }
}

/// `getifaddrs` yields one entry per address; keep the first per interface.
fn dedupe_by_name(entries: impl Iterator<Item = InterfaceInfo>) -> Vec<InterfaceInfo> {
    let mut seen = std::collections::HashSet::new();
    entries.filter(|i| seen.insert(i.name.clone())).collect()
}

/// Interface list read from a `sys/class/net` directory, ordered by `ifindex`.
#[derive(Debug, Clone)]
pub struct SysfsInterfaces {
    dir: PathBuf,
}

impl SysfsInterfaces {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl InterfaceEnumerator for SysfsInterfaces {
    fn interfaces(&self) -> Result<Vec<InterfaceInfo>, AppError> {
        let entries = fs::read_dir(&self.dir)
            .map_err(|e| AppError::Interfaces(format!("{}: {e}", self.dir.display())))?;
        let mut list: Vec<(u32, InterfaceInfo)> = entries
            .flatten()
            .map(|entry| {
                let path = entry.path();
                let ifindex = fs::read_to_string(path.join("ifindex"))
                    .ok()
                    .and_then(|s| s.trim().parse().ok())
                    .unwrap_or(u32::MAX);
                let up = fs::read_to_string(path.join("flags"))
                    .ok()
                    .and_then(|s| parse_interface_flags(&s))
                    .is_some_and(|flags| flags & config::IFF_UP != 0);
                let name = entry.file_name().to_string_lossy().to_string();
                (ifindex, InterfaceInfo { name, up })
            })
            .collect();
        list.sort_by(|a, b| (a.0, &a.1.name).cmp(&(b.0, &b.1.name)));
        Ok(list.into_iter().map(|(_, info)| info).collect())
    }
}

/// `sys/class/net/<if>/flags` holds the flag word as `0x`-prefixed hex.
fn parse_interface_flags(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    let hex = raw.strip_prefix("0x").unwrap_or(raw);
    u32::from_str_radix(hex, 16).ok()
}

// ---- Settings ----

/// Private DNS settings derived from `systemd-resolved` configuration.
///
/// - `private_dns_mode` ← `DNSOverTLS=` (`yes` → `hostname`, `no` → `off`)
/// - `private_dns_specifier` ← the server name (`#server-name` suffix) of the
///   first `DNS=` entry that carries one
#[derive(Debug, Clone)]
pub struct ResolvedSettings {
    path: PathBuf,
}

impl ResolvedSettings {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn load(&self) -> Result<Option<ResolvedConf>, AppError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(parse_resolved_conf(&content))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Settings(format!("{}: {e}", self.path.display()))),
        }
    }
}

impl SettingsReader for ResolvedSettings {
    fn global_string(&self, key: &str) -> Result<Option<String>, AppError> {
        let Some(conf) = self.load()? else {
            return Ok(None);
        };
        Ok(match key {
            config::SETTING_PRIVATE_DNS_MODE => conf.dns_over_tls.map(|v| private_dns_mode(&v)),
            config::SETTING_PRIVATE_DNS_SPECIFIER => conf
                .dns
                .iter()
                .find_map(|entry| entry.split_once('#').map(|(_, host)| host.to_string())),
            _ => None,
        })
    }
}

/// Keys of the `[Resolve]` section the settings reader uses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedConf {
    pub dns_over_tls: Option<String>,
    pub dns: Vec<String>,
}

pub fn parse_resolved_conf(content: &str) -> ResolvedConf {
    let mut conf = ResolvedConf::default();
    let mut in_resolve = false;
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if line.starts_with('[') {
            in_resolve = line == "[Resolve]";
            continue;
        }
        if !in_resolve {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        match key.trim() {
            "DNSOverTLS" => conf.dns_over_tls = Some(value.trim().to_string()),
            // An empty assignment resets the list.
            "DNS" if value.trim().is_empty() => conf.dns.clear(),
            "DNS" => conf
                .dns
                .extend(value.split_whitespace().map(str::to_string)),
            _ => {}
        }
    }
    conf
}

fn private_dns_mode(dns_over_tls: &str) -> String {
    match dns_over_tls.to_ascii_lowercase().as_str() {
        "yes" | "true" | "1" | "on" => "hostname".to_string(),
        "no" | "false" | "0" | "off" => "off".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_paths_join_root() {
        let paths = HostPaths::new("/tmp/host");
        assert_eq!(paths.proc_net_route(), PathBuf::from("/tmp/host/proc/net/route"));
        assert_eq!(
            paths.resolved_conf(),
            PathBuf::from("/tmp/host/etc/systemd/resolved.conf")
        );
        assert_eq!(HostPaths::default().root(), Path::new("/"));
    }

    #[test]
    fn test_dedupe_keeps_first_entry_per_name() {
        let entries = vec![
            InterfaceInfo { name: "eth0".into(), up: true },
            InterfaceInfo { name: "tun0".into(), up: false },
            InterfaceInfo { name: "eth0".into(), up: true },
        ];
        let names: Vec<String> = dedupe_by_name(entries.into_iter())
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["eth0", "tun0"]);
    }

    #[test]
    fn test_parse_interface_flags() {
        assert_eq!(parse_interface_flags("0x1091\n"), Some(0x1091));
        assert_eq!(parse_interface_flags("0x1002"), Some(0x1002));
        assert_eq!(parse_interface_flags("garbage"), None);
    }

    #[test]
    fn test_sysfs_interfaces_ordered_by_ifindex() {
        let dir = tempfile::tempdir().unwrap();
        for (name, ifindex, flags) in [
            ("tun0", "42", "0x1091"),
            ("lo", "1", "0x9"),
            ("eth0", "2", "0x1002"),
        ] {
            let base = dir.path().join(name);
            fs::create_dir_all(&base).unwrap();
            fs::write(base.join("ifindex"), format!("{ifindex}\n")).unwrap();
            fs::write(base.join("flags"), format!("{flags}\n")).unwrap();
        }
        let list = SysfsInterfaces::new(dir.path().to_path_buf())
            .interfaces()
            .unwrap();
        assert_eq!(
            list,
            vec![
                InterfaceInfo { name: "lo".into(), up: true },
                InterfaceInfo { name: "eth0".into(), up: false },
                InterfaceInfo { name: "tun0".into(), up: true },
            ]
        );
    }

    #[test]
    fn test_sysfs_interfaces_missing_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SysfsInterfaces::new(dir.path().join("sys/class/net"))
            .interfaces()
            .unwrap_err();
        assert_eq!(err.kind(), "Interfaces");
    }

    #[test]
    fn test_parse_resolved_conf() {
        let conf = parse_resolved_conf(
            "[Resolve]\n#DNS=9.9.9.9\nDNS=1.1.1.1#cloudflare-dns.com 8.8.8.8\nDNSOverTLS=yes\n[Other]\nDNS=4.4.4.4\n",
        );
        assert_eq!(conf.dns_over_tls.as_deref(), Some("yes"));
        assert_eq!(conf.dns, vec!["1.1.1.1#cloudflare-dns.com", "8.8.8.8"]);
    }

    #[test]
    fn test_parse_resolved_conf_empty_dns_resets() {
        let conf = parse_resolved_conf("[Resolve]\nDNS=1.1.1.1\nDNS=\nDNS=9.9.9.9\n");
        assert_eq!(conf.dns, vec!["9.9.9.9"]);
    }

    #[test]
    fn test_private_dns_mode_mapping() {
        assert_eq!(private_dns_mode("yes"), "hostname");
        assert_eq!(private_dns_mode("no"), "off");
        assert_eq!(private_dns_mode("opportunistic"), "opportunistic");
    }

    #[test]
    fn test_settings_from_resolved_conf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resolved.conf");
        fs::write(
            &path,
            "[Resolve]\nDNS=9.9.9.9 1.1.1.1#one.one.one.one\nDNSOverTLS=opportunistic\n",
        )
        .unwrap();
        let settings = ResolvedSettings::new(path);
        assert_eq!(
            settings.global_string(config::SETTING_PRIVATE_DNS_MODE),
            Ok(Some("opportunistic".into()))
        );
        assert_eq!(
            settings.global_string(config::SETTING_PRIVATE_DNS_SPECIFIER),
            Ok(Some("one.one.one.one".into()))
        );
        assert_eq!(settings.global_string("unknown_key"), Ok(None));
    }

    #[test]
    fn test_specifier_skips_entries_without_server_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resolved.conf");
        fs::write(
            &path,
            "[Resolve]\nDNS=9.9.9.9 149.112.112.112\nDNS=1.1.1.1#cloudflare-dns.com 8.8.8.8#dns.google\n",
        )
        .unwrap();
        assert_eq!(
            ResolvedSettings::new(path.clone()).global_string(config::SETTING_PRIVATE_DNS_SPECIFIER),
            Ok(Some("cloudflare-dns.com".into()))
        );

        fs::write(&path, "[Resolve]\nDNS=9.9.9.9\n").unwrap();
        assert_eq!(
            ResolvedSettings::new(path).global_string(config::SETTING_PRIVATE_DNS_SPECIFIER),
            Ok(None)
        );
    }

    #[test]
    fn test_settings_missing_file_is_unset() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ResolvedSettings::new(dir.path().join("absent.conf"));
        assert_eq!(settings.global_string(config::SETTING_PRIVATE_DNS_MODE), Ok(None));
    }

    #[test]
    fn test_settings_unreadable_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be read as a file.
        let settings = ResolvedSettings::new(dir.path().to_path_buf());
        let err = settings
            .global_string(config::SETTING_PRIVATE_DNS_MODE)
            .unwrap_err();
        assert_eq!(err.kind(), "Settings");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_host_context_on_fake_tree() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("proc/net")).unwrap();
        fs::write(
            root.join("proc/net/route"),
            "Iface\tDestination\tGateway\tFlags\tRefCnt\tUse\tMetric\tMask\n",
        )
        .unwrap();

        let ctx = HostContext::with_paths(HostPaths::new(root));
        assert!(ctx.connectivity().is_some());
        assert!(!ctx.platform_capabilities().transport_flags);

        let report = crate::inspect(&ctx);
        assert!(report
            .details
            .contains(&"Active network: none (no connectivity?)".to_string()));
        assert!(report.details.contains(&"Private DNS mode: -".to_string()));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_host_context_reads_interfaces_from_mounted_tree() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("proc/net")).unwrap();
        fs::write(
            root.join("proc/net/route"),
            "Iface\tDestination\tGateway\tFlags\tRefCnt\tUse\tMetric\tMask\n",
        )
        .unwrap();
        let tun = root.join("sys/class/net/tun0");
        fs::create_dir_all(&tun).unwrap();
        fs::write(tun.join("ifindex"), "42\n").unwrap();
        fs::write(tun.join("flags"), "0x1091\n").unwrap();
        fs::write(tun.join("tun_flags"), "0x1001\n").unwrap();

        let ctx = HostContext::with_paths(HostPaths::new(root));
        assert_eq!(
            ctx.interfaces().interfaces(),
            Ok(vec![InterfaceInfo { name: "tun0".into(), up: true }])
        );
        let report = crate::inspect(&ctx);
        assert!(report
            .details
            .contains(&"Interface check: tun0 up=true".to_string()));
        assert!(report.vpn_active);
    }

    #[test]
    fn test_host_context_without_route_table_has_no_connectivity() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = HostContext::with_paths(HostPaths::new(dir.path()));
        assert!(ctx.connectivity().is_none());
        let report = crate::inspect(&ctx);
        assert_eq!(report.details, vec!["Connectivity service: unavailable"]);
    }
}
