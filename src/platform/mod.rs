//! Platform abstraction layer for the state the inspector observes.
//!
//! The inspector never talks to the OS directly. It reads through the traits
//! below, bundled into an [`ExecutionContext`]:
//! - [`ConnectivityService`]: networks, capabilities, link properties
//! - [`InterfaceEnumerator`]: OS interfaces and their up/down state
//! - [`SettingsReader`]: named global string settings
//!
//! Implementations:
//! - [`host`]: the machine the crate runs on
//! - [`fake`]: in-memory state for tests and embedders

pub mod fake;
pub mod host;
#[cfg(target_os = "linux")]
pub mod linux;

use std::fmt;
use std::net::IpAddr;

use serde::Serialize;

use crate::error::AppError;

// === Value types ===

/// Opaque identity of a network known to the connectivity service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NetworkHandle(pub u32);

impl fmt::Display for NetworkHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Physical or virtual medium a network runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Transport {
    Wifi,
    Cellular,
    Ethernet,
    Vpn,
    Bluetooth,
}

impl Transport {
    /// Short name used in trace lines.
    pub fn short_name(self) -> &'static str {
        match self {
            Transport::Wifi => "WIFI",
            Transport::Cellular => "CELLULAR",
            Transport::Ethernet => "ETHERNET",
            Transport::Vpn => "VPN",
            Transport::Bluetooth => "BT",
        }
    }
}

/// Capability bits reported for a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NetCapability {
    Validated,
    CaptivePortal,
    NotMetered,
}

/// Capability set of one network.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkCapabilities {
    pub transports: Vec<Transport>,
    pub capabilities: Vec<NetCapability>,
}

impl NetworkCapabilities {
    pub fn has_transport(&self, transport: Transport) -> bool {
        self.transports.contains(&transport)
    }

    pub fn has_capability(&self, capability: NetCapability) -> bool {
        self.capabilities.contains(&capability)
    }
}

/// OS-reported configuration of a network.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkProperties {
    pub interface_name: Option<String>,
    pub dns_servers: Vec<IpAddr>,
    /// Route destinations in display form (e.g. `0.0.0.0/0`).
    pub routes: Vec<String>,
    /// Search domains, space separated.
    pub domains: Option<String>,
}

/// Answer of the legacy "network info by type" query for the VPN type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyNetworkInfo {
    pub connected_or_connecting: bool,
}

/// One OS network interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceInfo {
    pub name: String,
    pub up: bool,
}

/// What the platform can answer, detected once when a context is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformCapabilities {
    /// Per-network transport flags can be queried.
    pub transport_flags: bool,
    /// The Bluetooth transport is reported.
    pub bluetooth_transport: bool,
}

impl Default for PlatformCapabilities {
    fn default() -> Self {
        Self {
            transport_flags: true,
            bluetooth_transport: true,
        }
    }
}

// === Collaborator traits ===

/// Connectivity state of the host: which networks exist and what they look like.
///
/// Missing data is `None`, not an error.
pub trait ConnectivityService {
    /// The network general traffic is routed through.
    fn active_network(&self) -> Option<NetworkHandle>;

    /// Every network currently known.
    fn all_networks(&self) -> Vec<NetworkHandle>;

    fn network_capabilities(&self, network: NetworkHandle) -> Option<NetworkCapabilities>;

    fn link_properties(&self, network: NetworkHandle) -> Option<LinkProperties>;

    /// Legacy lookup of the VPN-typed network.
    fn legacy_vpn_info(&self) -> Result<Option<LegacyNetworkInfo>, AppError>;
}

/// Enumerates OS network interfaces.
pub trait InterfaceEnumerator {
    fn interfaces(&self) -> Result<Vec<InterfaceInfo>, AppError>;
}

/// Reads named global string settings.
pub trait SettingsReader {
    /// `Ok(None)` when the setting is not set.
    fn global_string(&self, key: &str) -> Result<Option<String>, AppError>;
}

/// Everything the inspector reads from, supplied by the caller.
pub trait ExecutionContext {
    /// `None` when the platform exposes no connectivity service at all.
    fn connectivity(&self) -> Option<&dyn ConnectivityService>;

    fn interfaces(&self) -> &dyn InterfaceEnumerator;

    fn settings(&self) -> &dyn SettingsReader;

    fn platform_capabilities(&self) -> PlatformCapabilities;
}
