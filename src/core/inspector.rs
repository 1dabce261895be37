//! VPN inspection: combines weak platform signals into one verdict.
//!
//! Every platform failure is absorbed at the point of use and becomes a trace
//! line or an `Unavailable` outcome. [`Inspector::inspect`] never fails.
//! Any single fired technique is enough for a positive verdict; there is no
//! weighting between them.

use crate::config;
use crate::core::probe::{self, NetworkProbe};
use crate::core::report::{Report, Technique, TechniqueOutcome, TechniqueResult};
use crate::core::trace;
use crate::platform::{
    ConnectivityService, ExecutionContext, InterfaceEnumerator, NetCapability,
    PlatformCapabilities, SettingsReader,
};

/// Inspection bound to the capabilities of one platform.
pub struct Inspector {
    capabilities: PlatformCapabilities,
    probe: Box<dyn NetworkProbe>,
}

impl Inspector {
    pub fn new(capabilities: PlatformCapabilities) -> Self {
        Self {
            capabilities,
            probe: probe::select(capabilities),
        }
    }

    /// Query the context's capabilities once and bind to them.
    pub fn for_context(ctx: &dyn ExecutionContext) -> Self {
        Self::new(ctx.platform_capabilities())
    }

    pub fn capabilities(&self) -> PlatformCapabilities {
        self.capabilities
    }

    /// Run every technique against `ctx` and build a fresh report.
    pub fn inspect(&self, ctx: &dyn ExecutionContext) -> Report {
        let Some(cm) = ctx.connectivity() else {
            tracing::warn!("No connectivity service; returning empty report");
            return Report::connectivity_unavailable();
        };

        let mut report = Report::default();
        self.describe_active_network(cm, &mut report.details);

        let transport = self.probe.transport_flags(cm, &mut report.details);
        let tun = tun_interface_up(ctx.interfaces(), &mut report.details);
        let legacy = self.probe.legacy_type(cm);

        private_dns_trace(ctx.settings(), &mut report.details);

        let outcomes = vec![
            TechniqueResult {
                technique: Technique::TransportFlag,
                outcome: transport,
            },
            TechniqueResult {
                technique: Technique::TunInterface,
                outcome: tun,
            },
            TechniqueResult {
                technique: Technique::LegacyType,
                outcome: legacy,
            },
        ];
        for result in &outcomes {
            tracing::debug!(technique = ?result.technique, outcome = ?result.outcome, "technique evaluated");
        }
        report.conclude(outcomes);
        report
    }

    fn describe_active_network(&self, cm: &dyn ConnectivityService, details: &mut Vec<String>) {
        let Some(active) = cm.active_network() else {
            details.push("Active network: none (no connectivity?)".into());
            return;
        };
        details.push(format!("Active network: {active}"));

        match cm.network_capabilities(active) {
            Some(caps) => {
                details.push(format!(
                    "Active transports: {}",
                    trace::transports(&caps, self.capabilities.bluetooth_transport)
                ));
                details.push(format!(
                    "Validated: {}",
                    caps.has_capability(NetCapability::Validated)
                ));
                details.push(format!(
                    "Captive portal: {}",
                    caps.has_capability(NetCapability::CaptivePortal)
                ));
                details.push(format!(
                    "Not metered: {}",
                    caps.has_capability(NetCapability::NotMetered)
                ));
            }
            None => details.push("Active capabilities: none".into()),
        }

        match cm.link_properties(active) {
            Some(lp) => {
                details.push(format!(
                    "Interface: {}",
                    trace::or_placeholder(lp.interface_name.as_deref())
                ));
                details.push(format!("DNS servers: {}", trace::dns_servers(&lp.dns_servers)));
                details.push(format!("Routes count: {}", lp.routes.len()));
                details.push(format!(
                    "Domains: {}",
                    trace::or_placeholder(lp.domains.as_deref())
                ));
            }
            None => details.push("Active link properties: none".into()),
        }
    }
}

/// Inspect `ctx` once with freshly detected capabilities.
pub fn inspect(ctx: &dyn ExecutionContext) -> Report {
    Inspector::for_context(ctx).inspect(ctx)
}

/// Fires on the first `tun*` interface that is up. Every `tun*` interface seen
/// before it is logged.
fn tun_interface_up(
    enumerator: &dyn InterfaceEnumerator,
    details: &mut Vec<String>,
) -> TechniqueOutcome {
    let interfaces = match enumerator.interfaces() {
        Ok(list) => list,
        Err(e) => {
            tracing::warn!("Interface enumeration failed: {e}");
            details.push(format!("Tun check error: {}: {e}", e.kind()));
            return TechniqueOutcome::Unavailable(format!("{}: {e}", e.kind()));
        }
    };

    for intf in interfaces
        .iter()
        .filter(|i| i.name.starts_with(config::TUN_INTERFACE_PREFIX))
    {
        details.push(format!("Interface check: {} up={}", intf.name, intf.up));
        if intf.up {
            return TechniqueOutcome::Fired;
        }
    }
    TechniqueOutcome::NotFired
}

/// Trace-only private DNS settings. Both values are read before either line is
/// written, so a failure yields a single "unavailable" line.
fn private_dns_trace(settings: &dyn SettingsReader, details: &mut Vec<String>) {
    let read = settings
        .global_string(config::SETTING_PRIVATE_DNS_MODE)
        .and_then(|mode| {
            let host = settings.global_string(config::SETTING_PRIVATE_DNS_SPECIFIER)?;
            Ok((mode, host))
        });

    match read {
        Ok((mode, host)) => {
            details.push(format!(
                "Private DNS mode: {}",
                trace::or_placeholder(mode.as_deref())
            ));
            details.push(format!(
                "Private DNS host: {}",
                trace::or_placeholder(host.as_deref())
            ));
        }
        Err(e) => {
            tracing::warn!("Private DNS settings unreadable: {e}");
            details.push(format!("Private DNS info: unavailable ({})", e.kind()));
        }
    }
}
