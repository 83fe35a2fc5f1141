//! Per-request diagram parameters.
//!
//! [`DiagramRequestConfig`] is what a client sends; the enum-valued fields stay raw
//! strings until [`PipelineAssembler`](crate::PipelineAssembler) validates them, so
//! a bad value surfaces as a typed error rather than a deserialization failure.

use std::collections::BTreeMap;
use std::str::FromStr;

use gat_core::{BusId, EquipmentId};
use serde::{Deserialize, Serialize};

use crate::error::VizError;
use crate::library::DEFAULT_COMPONENT_LIBRARY;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramRequestConfig {
    /// Prefer equipment names over ids in labels.
    pub use_name: bool,
    pub center_label: bool,
    pub diagonal_label: bool,
    pub topological_coloring: bool,
    pub component_library: String,
    /// `horizontal` or `vertical`.
    pub substation_layout: String,
    /// `feeder_position` or `state_variable`.
    pub display_mode: String,
    /// BCP-47 tag passed through to the renderer.
    pub language: String,
    pub current_limit_violations: Vec<CurrentLimitViolation>,
    pub base_voltage_bands: Vec<BaseVoltageBand>,
    /// Instantaneous current per bus, in amperes.
    pub bus_currents: BTreeMap<BusId, f64>,
}

impl Default for DiagramRequestConfig {
    fn default() -> Self {
        Self {
            use_name: false,
            center_label: false,
            diagonal_label: false,
            topological_coloring: false,
            component_library: DEFAULT_COMPONENT_LIBRARY.to_string(),
            substation_layout: "horizontal".to_string(),
            display_mode: "state_variable".to_string(),
            language: "en".to_string(),
            current_limit_violations: Vec::new(),
            base_voltage_bands: Vec::new(),
            bus_currents: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentLimitViolation {
    pub equipment_id: EquipmentId,
    #[serde(default)]
    pub limit_name: Option<String>,
}

impl CurrentLimitViolation {
    pub fn new(equipment_id: impl Into<EquipmentId>, limit_name: Option<&str>) -> Self {
        Self {
            equipment_id: equipment_id.into(),
            limit_name: limit_name.map(str::to_string),
        }
    }
}

/// Nominal-voltage interval `[min_value, max_value)` styled as `sld-<name>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseVoltageBand {
    pub name: String,
    pub min_value: f64,
    pub max_value: f64,
    #[serde(default)]
    pub profile: Option<String>,
}

impl BaseVoltageBand {
    pub fn new(name: impl Into<String>, min_value: f64, max_value: f64) -> Self {
        Self {
            name: name.into(),
            min_value,
            max_value,
            profile: None,
        }
    }

    pub fn contains(&self, kv: f64) -> bool {
        kv >= self.min_value && kv < self.max_value
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubstationLayout {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    FeederPosition,
    StateVariable,
}

fn normalize(value: &str) -> String {
    value.trim().to_ascii_lowercase().replace('-', "_")
}

impl FromStr for SubstationLayout {
    type Err = VizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "horizontal" => Ok(SubstationLayout::Horizontal),
            "vertical" => Ok(SubstationLayout::Vertical),
            _ => Err(VizError::InvalidSubstationLayout(s.to_string())),
        }
    }
}

impl FromStr for DisplayMode {
    type Err = VizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "feeder_position" => Ok(DisplayMode::FeederPosition),
            "state_variable" => Ok(DisplayMode::StateVariable),
            _ => Err(VizError::InvalidDisplayMode(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_enums_case_insensitively() {
        assert_eq!("VERTICAL".parse::<SubstationLayout>().unwrap(), SubstationLayout::Vertical);
        assert_eq!(
            "FEEDER_POSITION".parse::<DisplayMode>().unwrap(),
            DisplayMode::FeederPosition
        );
        assert_eq!(
            "state-variable".parse::<DisplayMode>().unwrap(),
            DisplayMode::StateVariable
        );
    }

    #[test]
    fn test_unknown_values_keep_raw_input() {
        let err = "diagonal".parse::<SubstationLayout>().unwrap_err();
        assert!(matches!(err, VizError::InvalidSubstationLayout(v) if v == "diagonal"));
        let err = "heatmap".parse::<DisplayMode>().unwrap_err();
        assert!(matches!(err, VizError::InvalidDisplayMode(v) if v == "heatmap"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: DiagramRequestConfig =
            serde_json::from_str(r#"{"use_name": true, "display_mode": "feeder_position"}"#).unwrap();
        assert!(config.use_name);
        assert_eq!(config.substation_layout, "horizontal");
        assert_eq!(config.component_library, DEFAULT_COMPONENT_LIBRARY);
    }

    #[test]
    fn test_band_is_half_open() {
        let band = BaseVoltageBand::new("vl300to500", 300.0, 500.0);
        assert!(band.contains(300.0));
        assert!(band.contains(400.0));
        assert!(!band.contains(500.0));
    }
}
