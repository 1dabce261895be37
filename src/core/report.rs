//! The inspection result and per-technique outcomes.

use serde::Serialize;

use crate::config;

/// Detection techniques in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Technique {
    /// A known network advertises the VPN transport.
    TransportFlag,
    /// A `tun*` interface is up.
    TunInterface,
    /// The legacy VPN-typed network is connected or connecting.
    LegacyType,
}

impl Technique {
    /// Label shown when this technique fires.
    pub fn label(self) -> &'static str {
        match self {
            Technique::TransportFlag => config::LABEL_TRANSPORT_VPN,
            Technique::TunInterface => config::LABEL_TUN_INTERFACE,
            Technique::LegacyType => config::LABEL_LEGACY_VPN,
        }
    }
}

/// What a single technique concluded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "camelCase")]
pub enum TechniqueOutcome {
    Fired,
    NotFired,
    /// The technique could not run on this platform, or its query failed.
    Unavailable(String),
}

impl TechniqueOutcome {
    pub fn fired(&self) -> bool {
        matches!(self, TechniqueOutcome::Fired)
    }

    pub(crate) fn from_bool(fired: bool) -> Self {
        if fired {
            TechniqueOutcome::Fired
        } else {
            TechniqueOutcome::NotFired
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TechniqueResult {
    pub technique: Technique,
    pub outcome: TechniqueOutcome,
}

/// Result of one inspection. Built fresh per call and owned by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// True iff any technique fired.
    pub vpn_active: bool,
    /// Labels of fired techniques, or the single "no indicators" sentinel.
    pub techniques: Vec<String>,
    /// Trace lines in inspection order.
    pub details: Vec<String>,
    pub outcomes: Vec<TechniqueResult>,
}

impl Report {
    /// Report for a platform without a connectivity service.
    ///
    /// Unlike every other negative path this one carries no sentinel technique:
    /// `techniques` stays empty. Callers that render labels must handle that.
    pub fn connectivity_unavailable() -> Self {
        Self {
            details: vec!["Connectivity service: unavailable".to_string()],
            ..Self::default()
        }
    }

    /// Record the technique outcomes and derive the verdict.
    pub(crate) fn conclude(&mut self, mut outcomes: Vec<TechniqueResult>) {
        outcomes.sort_by_key(|r| r.technique);
        self.techniques.extend(
            outcomes
                .iter()
                .filter(|r| r.outcome.fired())
                .map(|r| r.technique.label().to_string()),
        );
        self.vpn_active = outcomes.iter().any(|r| r.outcome.fired());
        if !self.vpn_active {
            self.techniques.push(config::NO_VPN_INDICATORS.to_string());
        }
        self.outcomes = outcomes;
    }

    pub fn fired(&self, technique: Technique) -> bool {
        self.outcomes
            .iter()
            .any(|r| r.technique == technique && r.outcome.fired())
    }
}
