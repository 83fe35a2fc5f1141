//! Ordered style contributors for single-line diagrams.
//!
//! The chain always holds four contributors, in this order:
//!
//! 1. base coloring (topological or nominal-voltage bands)
//! 2. operating-status highlight
//! 3. current-limit-violation highlight
//! 4. bus-legend caption classes
//!
//! Contributors after the first only add classes on top of the base coloring.
//! When the renderer asks for the styles of an element, the chain concatenates
//! the contributions in order and drops repeats.

use std::collections::HashMap;

use gat_core::{EquipmentId, Kilovolts, Network, OperatingStatus, VoltageLevelId};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::provider::{DiagramElement, StyleSource};
use crate::request::{BaseVoltageBand, CurrentLimitViolation, DiagramRequestConfig};

pub const OVERLOAD_STYLE_CLASS: &str = "sld-overload";
pub const PLANNED_OUTAGE_STYLE_CLASS: &str = "sld-planned-outage";
pub const FORCED_OUTAGE_STYLE_CLASS: &str = "sld-forced-outage";

pub const VOLTAGE_CAPTION_STYLE_CLASS: &str = "sld-bus-legend-voltage";
pub const ANGLE_CAPTION_STYLE_CLASS: &str = "sld-bus-legend-angle";
pub const PRODUCTION_CAPTION_STYLE_CLASS: &str = "sld-bus-legend-production";
pub const CONSUMPTION_CAPTION_STYLE_CLASS: &str = "sld-bus-legend-consumption";

/// Caption kind tags emitted by the bus legend.
pub const CAPTION_KIND_VOLTAGE: &str = "v";
pub const CAPTION_KIND_ANGLE: &str = "angle";
pub const CAPTION_KIND_PRODUCTION: &str = "p_prod";
pub const CAPTION_KIND_CONSUMPTION: &str = "p_cons";

/// Profile assigned to bands that do not name one.
pub const DEFAULT_VOLTAGE_PROFILE: &str = "Default";

static NON_ALPHANUMERIC_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new("[^a-z0-9]+").expect("static pattern is valid"));

/// Built-in bands used when a request supplies none for the default profile.
pub fn default_base_voltage_bands() -> Vec<BaseVoltageBand> {
    [
        ("vl0to30", 0.0, 30.0),
        ("vl30to50", 30.0, 50.0),
        ("vl50to70", 50.0, 70.0),
        ("vl70to120", 70.0, 120.0),
        ("vl120to180", 120.0, 180.0),
        ("vl180to300", 180.0, 300.0),
        ("vl300to500", 300.0, 500.0),
    ]
    .into_iter()
    .map(|(name, min, max)| BaseVoltageBand {
        profile: Some(DEFAULT_VOLTAGE_PROFILE.to_string()),
        ..BaseVoltageBand::new(name, min, max)
    })
    .collect()
}

/// CSS class for a current-limit violation.
///
/// A blank limit name gives the base class; otherwise the name is lowercased,
/// every run of characters outside `[a-z0-9]` becomes one hyphen, and the result
/// is appended to the base class.
pub fn violation_style_class(limit_name: Option<&str>) -> String {
    let Some(name) = limit_name.map(str::trim).filter(|n| !n.is_empty()) else {
        return OVERLOAD_STYLE_CLASS.to_string();
    };
    let lowered = name.to_lowercase();
    let sanitized = NON_ALPHANUMERIC_RUN.replace_all(&lowered, "-");
    let sanitized = sanitized.trim_matches('-');
    if sanitized.is_empty() {
        OVERLOAD_STYLE_CLASS.to_string()
    } else {
        format!("{OVERLOAD_STYLE_CLASS}-{sanitized}")
    }
}

/// Equipment id → violation class. Later violations of the same equipment win.
#[derive(Debug, Clone, Default)]
pub struct LimitViolationIndex {
    classes: HashMap<EquipmentId, String>,
}

impl LimitViolationIndex {
    pub fn from_violations(violations: &[CurrentLimitViolation]) -> Self {
        let classes = violations
            .iter()
            .map(|v| {
                (
                    v.equipment_id.clone(),
                    violation_style_class(v.limit_name.as_deref()),
                )
            })
            .collect();
        Self { classes }
    }

    pub fn class_for(&self, equipment_id: &str) -> Option<&str> {
        self.classes.get(equipment_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Colors each bus (and what is connected to it) by its index in the voltage level.
#[derive(Debug, Clone, Default)]
pub struct TopologicalColoring;

impl StyleSource for TopologicalColoring {
    fn styles(&self, element: &DiagramElement<'_>) -> Vec<String> {
        element
            .bus_index()
            .map(|idx| vec![format!("sld-bus-{idx}")])
            .unwrap_or_default()
    }
}

/// Colors elements by the nominal-voltage band of their voltage level.
#[derive(Debug, Clone)]
pub struct NominalVoltageColoring {
    bands: Vec<BaseVoltageBand>,
    nominal_voltages: HashMap<VoltageLevelId, Kilovolts>,
}

impl NominalVoltageColoring {
    pub fn new(bands: &[BaseVoltageBand], network: &Network) -> Self {
        let mut active: Vec<BaseVoltageBand> = bands
            .iter()
            .filter(|b| b.profile.as_deref().unwrap_or(DEFAULT_VOLTAGE_PROFILE) == DEFAULT_VOLTAGE_PROFILE)
            .cloned()
            .collect();
        if active.is_empty() {
            active = default_base_voltage_bands();
        }
        let nominal_voltages = network
            .voltage_levels()
            .map(|vl| (vl.id.clone(), vl.nominal_v))
            .collect();
        Self {
            bands: active,
            nominal_voltages,
        }
    }

    pub fn band_for(&self, voltage_level_id: &str) -> Option<&BaseVoltageBand> {
        let kv = self.nominal_voltages.get(voltage_level_id)?;
        self.bands.iter().find(|b| b.contains(kv.value()))
    }
}

impl StyleSource for NominalVoltageColoring {
    fn styles(&self, element: &DiagramElement<'_>) -> Vec<String> {
        element
            .voltage_level_id()
            .and_then(|id| self.band_for(id))
            .map(|band| vec![format!("sld-{}", band.name)])
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub enum BaseColoring {
    Topological(TopologicalColoring),
    NominalVoltage(NominalVoltageColoring),
}

impl StyleSource for BaseColoring {
    fn styles(&self, element: &DiagramElement<'_>) -> Vec<String> {
        match self {
            BaseColoring::Topological(s) => s.styles(element),
            BaseColoring::NominalVoltage(s) => s.styles(element),
        }
    }
}

/// Flags equipment under planned or forced outage.
#[derive(Debug, Clone, Default)]
pub struct OperatingStatusHighlight {
    statuses: HashMap<EquipmentId, OperatingStatus>,
}

impl OperatingStatusHighlight {
    pub fn new(network: &Network) -> Self {
        Self {
            statuses: network.abnormal_operating_statuses(),
        }
    }
}

impl StyleSource for OperatingStatusHighlight {
    fn styles(&self, element: &DiagramElement<'_>) -> Vec<String> {
        let class = element
            .equipment_id()
            .and_then(|id| self.statuses.get(id))
            .and_then(|status| match status {
                OperatingStatus::PlannedOutage => Some(PLANNED_OUTAGE_STYLE_CLASS),
                OperatingStatus::ForcedOutage => Some(FORCED_OUTAGE_STYLE_CLASS),
                OperatingStatus::InOperation => None,
            });
        class.map(|c| vec![c.to_string()]).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct LimitViolationHighlight {
    index: LimitViolationIndex,
}

impl LimitViolationHighlight {
    pub fn new(index: LimitViolationIndex) -> Self {
        Self { index }
    }
}

impl StyleSource for LimitViolationHighlight {
    fn styles(&self, element: &DiagramElement<'_>) -> Vec<String> {
        element
            .equipment_id()
            .and_then(|id| self.index.class_for(id))
            .map(|class| vec![class.to_string()])
            .unwrap_or_default()
    }
}

/// Fixed classes for bus-legend caption kinds. Disabled in feeder-position mode.
#[derive(Debug, Clone)]
pub struct BusLegendCaptions {
    enabled: bool,
}

impl BusLegendCaptions {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn caption_class(kind: &str) -> Option<&'static str> {
        match kind {
            CAPTION_KIND_VOLTAGE => Some(VOLTAGE_CAPTION_STYLE_CLASS),
            CAPTION_KIND_ANGLE => Some(ANGLE_CAPTION_STYLE_CLASS),
            CAPTION_KIND_PRODUCTION => Some(PRODUCTION_CAPTION_STYLE_CLASS),
            CAPTION_KIND_CONSUMPTION => Some(CONSUMPTION_CAPTION_STYLE_CLASS),
            _ => None,
        }
    }
}

impl StyleSource for BusLegendCaptions {
    fn styles(&self, element: &DiagramElement<'_>) -> Vec<String> {
        match element {
            DiagramElement::BusCaption { kind } if self.enabled => Self::caption_class(kind)
                .map(|c| vec![c.to_string()])
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleContributorKind {
    BaseColor,
    OperatingStatus,
    LimitViolation,
    BusLegend,
}

#[derive(Debug, Clone)]
pub enum StyleContributor {
    BaseColor(BaseColoring),
    OperatingStatus(OperatingStatusHighlight),
    LimitViolation(LimitViolationHighlight),
    BusLegend(BusLegendCaptions),
}

impl StyleContributor {
    pub fn kind(&self) -> StyleContributorKind {
        match self {
            StyleContributor::BaseColor(_) => StyleContributorKind::BaseColor,
            StyleContributor::OperatingStatus(_) => StyleContributorKind::OperatingStatus,
            StyleContributor::LimitViolation(_) => StyleContributorKind::LimitViolation,
            StyleContributor::BusLegend(_) => StyleContributorKind::BusLegend,
        }
    }
}

impl StyleSource for StyleContributor {
    fn styles(&self, element: &DiagramElement<'_>) -> Vec<String> {
        match self {
            StyleContributor::BaseColor(s) => s.styles(element),
            StyleContributor::OperatingStatus(s) => s.styles(element),
            StyleContributor::LimitViolation(s) => s.styles(element),
            StyleContributor::BusLegend(s) => s.styles(element),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StyleChain {
    contributors: Vec<StyleContributor>,
}

impl StyleChain {
    pub fn contributors(&self) -> &[StyleContributor] {
        &self.contributors
    }

    pub fn kinds(&self) -> Vec<StyleContributorKind> {
        self.contributors.iter().map(StyleContributor::kind).collect()
    }
}

impl StyleSource for StyleChain {
    fn styles(&self, element: &DiagramElement<'_>) -> Vec<String> {
        let mut styles: Vec<String> = Vec::new();
        for contributor in &self.contributors {
            for class in contributor.styles(element) {
                if !styles.contains(&class) {
                    styles.push(class);
                }
            }
        }
        styles
    }
}

/// Builds the four-contributor [`StyleChain`] for one request.
pub struct StyleChainBuilder<'a> {
    network: &'a Network,
    bus_legend: bool,
}

impl<'a> StyleChainBuilder<'a> {
    pub fn new(network: &'a Network) -> Self {
        Self {
            network,
            bus_legend: true,
        }
    }

    pub fn bus_legend(mut self, enabled: bool) -> Self {
        self.bus_legend = enabled;
        self
    }

    pub fn build(&self, config: &DiagramRequestConfig, violations: &LimitViolationIndex) -> StyleChain {
        let base = if config.topological_coloring {
            BaseColoring::Topological(TopologicalColoring)
        } else {
            BaseColoring::NominalVoltage(NominalVoltageColoring::new(
                &config.base_voltage_bands,
                self.network,
            ))
        };
        StyleChain {
            contributors: vec![
                StyleContributor::BaseColor(base),
                StyleContributor::OperatingStatus(OperatingStatusHighlight::new(self.network)),
                StyleContributor::LimitViolation(LimitViolationHighlight::new(violations.clone())),
                StyleContributor::BusLegend(BusLegendCaptions::new(self.bus_legend)),
            ],
        }
    }
}
