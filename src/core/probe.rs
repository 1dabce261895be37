//! Network-level VPN probes, selected once from the platform capabilities.
//!
//! Platforms that expose per-network transport flags are scanned for the VPN
//! transport; older ones fall back to the legacy VPN-typed network query.
//! Exactly one of the two techniques is attempted; the other reports
//! `Unavailable`.

use crate::core::report::TechniqueOutcome;
use crate::core::trace;
use crate::platform::{ConnectivityService, PlatformCapabilities, Transport};

/// Strategy for the network-level techniques.
pub trait NetworkProbe: Send + Sync {
    /// Runs before the interface heuristic. May append trace lines.
    fn transport_flags(
        &self,
        cm: &dyn ConnectivityService,
        details: &mut Vec<String>,
    ) -> TechniqueOutcome;

    /// Runs after the interface heuristic.
    fn legacy_type(&self, cm: &dyn ConnectivityService) -> TechniqueOutcome;
}

/// Pick the probe matching what the platform can answer.
pub fn select(capabilities: PlatformCapabilities) -> Box<dyn NetworkProbe> {
    if capabilities.transport_flags {
        Box::new(TransportFlagProbe)
    } else {
        Box::new(LegacyTypeProbe)
    }
}

/// Scans every known network for the VPN transport flag.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransportFlagProbe;

impl NetworkProbe for TransportFlagProbe {
    fn transport_flags(
        &self,
        cm: &dyn ConnectivityService,
        details: &mut Vec<String>,
    ) -> TechniqueOutcome {
        let vpn = cm.all_networks().into_iter().find(|n| {
            cm.network_capabilities(*n)
                .is_some_and(|caps| caps.has_transport(Transport::Vpn))
        });

        let Some(network) = vpn else {
            return TechniqueOutcome::NotFired;
        };

        details.push(format!("VPN network found: {network}"));
        if let Some(lp) = cm.link_properties(network) {
            details.push(format!(
                "VPN interface: {}",
                trace::or_placeholder(lp.interface_name.as_deref())
            ));
            details.push(format!("VPN DNS servers: {}", trace::dns_servers(&lp.dns_servers)));
        }
        TechniqueOutcome::Fired
    }

    fn legacy_type(&self, _cm: &dyn ConnectivityService) -> TechniqueOutcome {
        TechniqueOutcome::Unavailable("superseded by transport flags".into())
    }
}

/// Asks the legacy single-network-type API for a VPN network.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyTypeProbe;

impl NetworkProbe for LegacyTypeProbe {
    fn transport_flags(
        &self,
        _cm: &dyn ConnectivityService,
        details: &mut Vec<String>,
    ) -> TechniqueOutcome {
        details.push("TRANSPORT_VPN check: skipped (transport flags unsupported)".into());
        TechniqueOutcome::Unavailable("transport flags unsupported".into())
    }

    fn legacy_type(&self, cm: &dyn ConnectivityService) -> TechniqueOutcome {
        match cm.legacy_vpn_info() {
            Ok(info) => TechniqueOutcome::from_bool(info.is_some_and(|i| i.connected_or_connecting)),
            Err(e) => {
                tracing::warn!("Legacy VPN lookup failed: {e}");
                TechniqueOutcome::Unavailable(format!("{}: {e}", e.kind()))
            }
        }
    }
}
