//! Linux connectivity source backed by procfs and sysfs.
//!
//! - networks: `/sys/class/net/*` (id = `ifindex`), or `/proc/net/dev` order
//!   when sysfs is not mounted
//! - active network: lowest-metric default route in `/proc/net/route`
//! - link properties: routes from `/proc/net/route` and `/proc/net/ipv6_route`,
//!   DNS and search domains from `resolv.conf` for the active network only

use std::fs;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::Path;

use super::host::HostPaths;
use super::{
    ConnectivityService, LegacyNetworkInfo, LinkProperties, NetCapability, NetworkCapabilities,
    NetworkHandle, Transport,
};
use crate::error::AppError;

const ARPHRD_ETHER: u32 = 1;
const ARPHRD_PPP: u32 = 512;
const ARPHRD_RAWIP: u32 = 519;
const ARPHRD_NONE: u32 = 65534;
const RTF_UP: u32 = 0x1;

/// Interface name prefixes the legacy query treats as VPN-typed.
const VPN_NAME_PREFIXES: [&str; 6] = ["tun", "tap", "ppp", "wg", "ipsec", "tailscale"];

/// Connectivity state read from the host's procfs/sysfs on every query.
#[derive(Debug, Clone)]
pub struct LinuxConnectivity {
    paths: HostPaths,
}

impl LinuxConnectivity {
    /// `None` when the route table is unreadable, i.e. no connectivity service.
    pub fn probe(paths: &HostPaths) -> Option<Self> {
        if paths.proc_net_route().is_file() {
            Some(Self {
                paths: paths.clone(),
            })
        } else {
            tracing::warn!(
                "{} not readable; connectivity source disabled",
                paths.proc_net_route().display()
            );
            None
        }
    }

    /// Whether per-network transport flags can be derived (sysfs mounted).
    pub fn has_sysfs(paths: &HostPaths) -> bool {
        paths.sys_class_net().is_dir()
    }

    fn networks(&self) -> Vec<(NetworkHandle, String)> {
        let sys = self.paths.sys_class_net();
        let mut networks = match fs::read_dir(&sys) {
            Ok(entries) => entries
                .flatten()
                .filter_map(|entry| {
                    let name = entry.file_name().to_string_lossy().to_string();
                    if name == "lo" {
                        return None;
                    }
                    let id = read_trimmed(&entry.path().join("ifindex"))?.parse().ok()?;
                    Some((NetworkHandle(id), name))
                })
                .collect(),
            Err(_) => match fs::read_to_string(self.paths.proc_net_dev()) {
                Ok(content) => parse_proc_net_dev_names(&content)
                    .into_iter()
                    .filter(|name| name != "lo")
                    .enumerate()
                    .map(|(i, name)| (NetworkHandle(i as u32 + 1), name))
                    .collect(),
                Err(e) => {
                    tracing::warn!("No interface source readable: {e}");
                    Vec::new()
                }
            },
        };
        networks.sort();
        networks
    }

    fn name_of(&self, network: NetworkHandle) -> Option<String> {
        self.networks()
            .into_iter()
            .find(|(id, _)| *id == network)
            .map(|(_, name)| name)
    }

    fn default_interface(&self) -> Option<String> {
        let table = fs::read_to_string(self.paths.proc_net_route()).ok()?;
        parse_default_route(&table)
    }
}

impl ConnectivityService for LinuxConnectivity {
    fn active_network(&self) -> Option<NetworkHandle> {
        let default = self.default_interface()?;
        self.networks()
            .into_iter()
            .find(|(_, name)| *name == default)
            .map(|(id, _)| id)
    }

    fn all_networks(&self) -> Vec<NetworkHandle> {
        self.networks().into_iter().map(|(id, _)| id).collect()
    }

    fn network_capabilities(&self, network: NetworkHandle) -> Option<NetworkCapabilities> {
        let name = self.name_of(network)?;
        let link = SysfsLink::read(&self.paths.sys_class_net().join(&name))?;
        let transports = classify_transports(&name, &link);

        let mut capabilities = Vec::new();
        if matches!(link.operstate.as_deref(), Some("up") | Some("unknown")) {
            capabilities.push(NetCapability::Validated);
        }
        if !transports.contains(&Transport::Cellular) {
            capabilities.push(NetCapability::NotMetered);
        }
        Some(NetworkCapabilities {
            transports,
            capabilities,
        })
    }

    fn link_properties(&self, network: NetworkHandle) -> Option<LinkProperties> {
        let name = self.name_of(network)?;

        let mut routes = fs::read_to_string(self.paths.proc_net_route())
            .map(|t| parse_ipv4_routes(&t, &name))
            .unwrap_or_default();
        if let Ok(table) = fs::read_to_string(self.paths.proc_net_ipv6_route()) {
            routes.extend(parse_ipv6_routes(&table, &name));
        }

        let mut props = LinkProperties {
            interface_name: Some(name.clone()),
            routes,
            ..LinkProperties::default()
        };
        if self.default_interface().as_deref() == Some(name.as_str()) {
            if let Some((servers, domains)) = resolver_config(&self.paths.resolv_conf()) {
                props.dns_servers = servers;
                props.domains = domains;
            }
        }
        Some(props)
    }

    fn legacy_vpn_info(&self) -> Result<Option<LegacyNetworkInfo>, AppError> {
        let table = fs::read_to_string(self.paths.proc_net_route())?;
        Ok(parse_default_route(&table).map(|name| LegacyNetworkInfo {
            connected_or_connecting: VPN_NAME_PREFIXES.iter().any(|p| name.starts_with(p)),
        }))
    }
}

/// The sysfs attributes transport classification looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SysfsLink {
    pub arp_type: Option<u32>,
    pub wireless: bool,
    pub tun_flags: bool,
    pub operstate: Option<String>,
}

impl SysfsLink {
    /// `None` when the interface directory does not exist.
    pub fn read(dir: &Path) -> Option<Self> {
        if !dir.is_dir() {
            return None;
        }
        Some(Self {
            arp_type: read_trimmed(&dir.join("type")).and_then(|t| t.parse().ok()),
            wireless: dir.join("wireless").exists() || dir.join("phy80211").exists(),
            tun_flags: dir.join("tun_flags").exists(),
            operstate: read_trimmed(&dir.join("operstate")),
        })
    }
}

pub fn classify_transports(name: &str, link: &SysfsLink) -> Vec<Transport> {
    let mut transports = Vec::new();
    if link.wireless {
        transports.push(Transport::Wifi);
    }
    if name.starts_with("wwan")
        || name.starts_with("rmnet")
        || name.starts_with("ccmni")
        || link.arp_type == Some(ARPHRD_RAWIP)
    {
        transports.push(Transport::Cellular);
    }
    if link.tun_flags || matches!(link.arp_type, Some(ARPHRD_PPP) | Some(ARPHRD_NONE)) {
        transports.push(Transport::Vpn);
    }
    if name.starts_with("bnep") {
        transports.push(Transport::Bluetooth);
    }
    if transports.is_empty() && link.arp_type == Some(ARPHRD_ETHER) {
        transports.push(Transport::Ethernet);
    }
    transports
}

fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok().map(|s| s.trim().to_string())
}

/// One row of `/proc/net/route`.
struct Ipv4Route<'a> {
    iface: &'a str,
    destination: Ipv4Addr,
    flags: u32,
    metric: u32,
    prefix: u32,
}

fn parse_ipv4_route_rows(table: &str) -> impl Iterator<Item = Ipv4Route<'_>> {
    table.lines().skip(1).filter_map(|line| {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 8 {
            return None;
        }
        let destination = u32::from_str_radix(fields[1], 16).ok()?;
        let flags = u32::from_str_radix(fields[3], 16).ok()?;
        let metric = fields[6].parse().ok()?;
        let mask = u32::from_str_radix(fields[7], 16).ok()?;
        Some(Ipv4Route {
            iface: fields[0],
            // procfs prints the network-order address as a host-order word
            destination: Ipv4Addr::from(destination.to_le_bytes()),
            flags,
            metric,
            prefix: mask.count_ones(),
        })
    })
}

/// Interface of the lowest-metric usable default route.
pub fn parse_default_route(table: &str) -> Option<String> {
    parse_ipv4_route_rows(table)
        .filter(|r| r.destination.is_unspecified() && r.prefix == 0 && r.flags & RTF_UP != 0)
        .min_by_key(|r| r.metric)
        .map(|r| r.iface.to_string())
}

/// IPv4 route destinations through `iface`, as `addr/prefix`.
pub fn parse_ipv4_routes(table: &str, iface: &str) -> Vec<String> {
    parse_ipv4_route_rows(table)
        .filter(|r| r.iface == iface)
        .map(|r| format!("{}/{}", r.destination, r.prefix))
        .collect()
}

/// IPv6 route destinations through `iface`, as `addr/prefix`.
pub fn parse_ipv6_routes(table: &str, iface: &str) -> Vec<String> {
    table
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 10 || fields[9] != iface {
                return None;
            }
            let addr = u128::from_str_radix(fields[0], 16).ok()?;
            let prefix = u8::from_str_radix(fields[1], 16).ok()?;
            Some(format!("{}/{}", Ipv6Addr::from(addr), prefix))
        })
        .collect()
}

/// Interface names from `/proc/net/dev`, in file order.
pub fn parse_proc_net_dev_names(content: &str) -> Vec<String> {
    content
        .lines()
        .skip(2)
        .filter_map(|line| line.split_once(':'))
        .map(|(name, _)| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

/// Nameservers and search domains from `resolv.conf`. `search` takes
/// precedence over `domain`.
pub fn resolver_config(path: &Path) -> Option<(Vec<IpAddr>, Option<String>)> {
    let content = fs::read_to_string(path).ok()?;
    let conf = match resolv_conf::Config::parse(&content) {
        Ok(conf) => conf,
        Err(e) => {
            tracing::warn!("Failed to parse {}: {e}", path.display());
            return None;
        }
    };
    let domains = conf
        .get_search()
        .filter(|search| !search.is_empty())
        .map(|search| search.join(" "))
        .or_else(|| conf.get_domain().cloned());
    let servers: Vec<IpAddr> = conf.nameservers.into_iter().map(Into::into).collect();
    Some((servers, domains))
}
