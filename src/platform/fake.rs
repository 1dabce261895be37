//! In-memory execution context.
//!
//! Every answer the inspector can receive, including failures, can be staged
//! here, which makes each technique forceable on its own.

use std::collections::BTreeMap;

use super::{
    ConnectivityService, ExecutionContext, InterfaceEnumerator, InterfaceInfo, LegacyNetworkInfo,
    LinkProperties, NetworkCapabilities, NetworkHandle, PlatformCapabilities, SettingsReader,
};
use crate::error::AppError;

#[derive(Debug, Clone, Default)]
struct FakeNetwork {
    capabilities: Option<NetworkCapabilities>,
    link: Option<LinkProperties>,
}

/// Staged connectivity state.
#[derive(Debug, Clone, Default)]
pub struct FakeConnectivity {
    active: Option<NetworkHandle>,
    networks: BTreeMap<NetworkHandle, FakeNetwork>,
    legacy: Option<Result<Option<LegacyNetworkInfo>, AppError>>,
}

impl ConnectivityService for FakeConnectivity {
    fn active_network(&self) -> Option<NetworkHandle> {
        self.active
    }

    fn all_networks(&self) -> Vec<NetworkHandle> {
        self.networks.keys().copied().collect()
    }

    fn network_capabilities(&self, network: NetworkHandle) -> Option<NetworkCapabilities> {
        self.networks.get(&network)?.capabilities.clone()
    }

    fn link_properties(&self, network: NetworkHandle) -> Option<LinkProperties> {
        self.networks.get(&network)?.link.clone()
    }

    fn legacy_vpn_info(&self) -> Result<Option<LegacyNetworkInfo>, AppError> {
        self.legacy.clone().unwrap_or(Ok(None))
    }
}

/// Staged interface list, or the error enumeration should fail with.
#[derive(Debug, Clone)]
pub struct FakeInterfaces(Result<Vec<InterfaceInfo>, AppError>);

impl InterfaceEnumerator for FakeInterfaces {
    fn interfaces(&self) -> Result<Vec<InterfaceInfo>, AppError> {
        self.0.clone()
    }
}

/// Staged global settings, or the error every read should fail with.
#[derive(Debug, Clone)]
pub struct FakeSettings(Result<BTreeMap<String, String>, AppError>);

impl SettingsReader for FakeSettings {
    fn global_string(&self, key: &str) -> Result<Option<String>, AppError> {
        match &self.0 {
            Ok(values) => Ok(values.get(key).cloned()),
            Err(e) => Err(e.clone()),
        }
    }
}

/// Execution context assembled from staged answers.
///
/// ```
/// use vpn_inspector_lib::platform::fake::FakeContext;
/// use vpn_inspector_lib::platform::{InterfaceInfo, NetworkHandle};
///
/// let ctx = FakeContext::new()
///     .with_network(NetworkHandle(100), None, None)
///     .with_active_network(NetworkHandle(100))
///     .with_interfaces(vec![InterfaceInfo { name: "tun0".into(), up: true }]);
/// let report = vpn_inspector_lib::inspect(&ctx);
/// assert!(report.vpn_active);
/// ```
#[derive(Debug, Clone)]
pub struct FakeContext {
    connectivity: Option<FakeConnectivity>,
    interfaces: FakeInterfaces,
    settings: FakeSettings,
    capabilities: PlatformCapabilities,
}

impl Default for FakeContext {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeContext {
    /// A platform with a connectivity service, no networks, no interfaces and no settings.
    pub fn new() -> Self {
        Self {
            connectivity: Some(FakeConnectivity::default()),
            interfaces: FakeInterfaces(Ok(Vec::new())),
            settings: FakeSettings(Ok(BTreeMap::new())),
            capabilities: PlatformCapabilities::default(),
        }
    }

    /// Remove the connectivity service entirely.
    pub fn without_connectivity(mut self) -> Self {
        self.connectivity = None;
        self
    }

    /// Register a network. Recreates the connectivity service if it was removed.
    pub fn with_network(
        mut self,
        handle: NetworkHandle,
        capabilities: Option<NetworkCapabilities>,
        link: Option<LinkProperties>,
    ) -> Self {
        self.connectivity_mut()
            .networks
            .insert(handle, FakeNetwork { capabilities, link });
        self
    }

    pub fn with_active_network(mut self, handle: NetworkHandle) -> Self {
        self.connectivity_mut().active = Some(handle);
        self
    }

    pub fn with_legacy_vpn(mut self, info: Result<Option<LegacyNetworkInfo>, AppError>) -> Self {
        self.connectivity_mut().legacy = Some(info);
        self
    }

    pub fn with_interfaces(mut self, interfaces: Vec<InterfaceInfo>) -> Self {
        self.interfaces = FakeInterfaces(Ok(interfaces));
        self
    }

    pub fn with_interface_error(mut self, error: AppError) -> Self {
        self.interfaces = FakeInterfaces(Err(error));
        self
    }

    pub fn with_setting(mut self, key: &str, value: &str) -> Self {
        let mut values = self.settings.0.unwrap_or_default();
        values.insert(key.to_string(), value.to_string());
        self.settings = FakeSettings(Ok(values));
        self
    }

    pub fn with_settings_error(mut self, error: AppError) -> Self {
        self.settings = FakeSettings(Err(error));
        self
    }

    pub fn with_capabilities(mut self, capabilities: PlatformCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    fn connectivity_mut(&mut self) -> &mut FakeConnectivity {
        self.connectivity.get_or_insert_with(FakeConnectivity::default)
    }
}

impl ExecutionContext for FakeContext {
    fn connectivity(&self) -> Option<&dyn ConnectivityService> {
        self.connectivity
            .as_ref()
            .map(|c| c as &dyn ConnectivityService)
    }

    fn interfaces(&self) -> &dyn InterfaceEnumerator {
        &self.interfaces
    }

    fn settings(&self) -> &dyn SettingsReader {
        &self.settings
    }

    fn platform_capabilities(&self) -> PlatformCapabilities {
        self.capabilities
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Transport;

    #[test]
    fn test_networks_listed_in_handle_order() {
        let ctx = FakeContext::new()
            .with_network(NetworkHandle(7), None, None)
            .with_network(NetworkHandle(3), None, None);
        let cm = ctx.connectivity().unwrap();
        assert_eq!(cm.all_networks(), vec![NetworkHandle(3), NetworkHandle(7)]);
    }

    #[test]
    fn test_unknown_network_has_no_data() {
        let ctx = FakeContext::new();
        let cm = ctx.connectivity().unwrap();
        assert!(cm.network_capabilities(NetworkHandle(1)).is_none());
        assert!(cm.link_properties(NetworkHandle(1)).is_none());
        assert_eq!(cm.legacy_vpn_info(), Ok(None));
    }

    #[test]
    fn test_staged_capabilities_are_returned() {
        let caps = NetworkCapabilities {
            transports: vec![Transport::Vpn],
            capabilities: vec![],
        };
        let ctx = FakeContext::new().with_network(NetworkHandle(5), Some(caps.clone()), None);
        let cm = ctx.connectivity().unwrap();
        assert_eq!(cm.network_capabilities(NetworkHandle(5)), Some(caps));
    }

    #[test]
    fn test_without_connectivity() {
        assert!(FakeContext::new().without_connectivity().connectivity().is_none());
    }

    #[test]
    fn test_settings_error_applies_to_every_key() {
        let ctx = FakeContext::new().with_settings_error(AppError::Settings("denied".into()));
        assert!(ctx.settings().global_string("anything").is_err());
    }

    #[test]
    fn test_setting_after_error_replaces_error() {
        let ctx = FakeContext::new()
            .with_settings_error(AppError::Settings("denied".into()))
            .with_setting("k", "v");
        assert_eq!(ctx.settings().global_string("k"), Ok(Some("v".into())));
    }
}
