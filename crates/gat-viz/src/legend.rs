//! Bus legend values: voltage, angle, and production/consumption totals.
//!
//! Production and consumption are reported as two unsigned quantities, so the
//! signed terminal sums are shown by magnitude. A bus with no generator (or no
//! load) shows the undefined symbol rather than `0 MW`.

use std::sync::Arc;

use gat_core::{GatResult, Megawatts, Network};
use serde::Serialize;

/// Shown for values that do not exist or were never computed.
pub const DEFAULT_UNDEFINED_SYMBOL: &str = "\u{2014}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BusLegendEntry {
    pub bus_id: String,
    pub bus_label: String,
    pub formatted_voltage: String,
    pub formatted_angle: String,
    pub formatted_production: String,
    pub formatted_consumption: String,
}

#[derive(Debug, Clone)]
pub struct LegendAggregator {
    network: Arc<Network>,
    undefined_symbol: String,
}

impl LegendAggregator {
    pub fn new(network: Arc<Network>) -> Self {
        Self {
            network,
            undefined_symbol: DEFAULT_UNDEFINED_SYMBOL.to_string(),
        }
    }

    pub fn with_undefined_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.undefined_symbol = symbol.into();
        self
    }

    pub fn undefined_symbol(&self) -> &str {
        &self.undefined_symbol
    }

    /// Compute the legend of one bus. Nothing is cached between calls.
    pub fn bus_legend(&self, bus_id: &str) -> GatResult<BusLegendEntry> {
        let (_, bus) = self.network.bus(bus_id)?;
        let production = self
            .network
            .generators_at_bus(bus_id)
            .into_iter()
            .map(|g| g.active_power);
        let consumption = self
            .network
            .loads_at_bus(bus_id)
            .into_iter()
            .map(|l| l.active_power);

        Ok(BusLegendEntry {
            bus_id: bus.id.to_string(),
            bus_label: bus.display_name().to_string(),
            formatted_voltage: self.defined_or_undefined(bus.voltage.is_defined(), || {
                format!("{:.1}", bus.voltage)
            }),
            formatted_angle: self.defined_or_undefined(bus.angle.is_defined(), || {
                format!("{:.1}", bus.angle)
            }),
            formatted_production: self.format_power_sum(production),
            formatted_consumption: self.format_power_sum(consumption),
        })
    }

    fn format_power_sum(&self, terminals: impl Iterator<Item = Megawatts>) -> String {
        let values: Vec<Megawatts> = terminals.collect();
        if values.is_empty() {
            return self.undefined_symbol.clone();
        }
        let total: Megawatts = values.into_iter().sum();
        self.defined_or_undefined(total.is_defined(), || format!("{:.0}", total.abs().round()))
    }

    fn defined_or_undefined(&self, defined: bool, format: impl FnOnce() -> String) -> String {
        if defined {
            format()
        } else {
            self.undefined_symbol.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gat_core::{Bus, Gen, Load, VoltageLevel};

    fn network() -> Arc<Network> {
        let mut network = Network::new();
        network
            .add_voltage_level(
                VoltageLevel::new("VL1", 400.0)
                    .with_bus(Bus::new("B1").with_state(402.34, -1.26).with_name("Poste B1"))
                    .with_bus(Bus::new("B2"))
                    .with_bus(Bus::new("B3").with_state(399.0, 0.0)),
            )
            .unwrap();
        network
            .add_generator(Gen::new("G1", "VL1", "B1").with_active_power(-250.4))
            .unwrap();
        network
            .add_generator(Gen::new("G2", "VL1", "B1").with_active_power(-100.0))
            .unwrap();
        network
            .add_load(Load::new("L1", "VL1", "B1").with_active_power(120.6))
            .unwrap();
        network
            .add_load(Load::new("L3", "VL1", "B3").with_active_power(42.0))
            .unwrap();
        Arc::new(network)
    }

    #[test]
    fn test_legend_sums_and_formats() {
        let legend = LegendAggregator::new(network()).bus_legend("B1").unwrap();
        assert_eq!(legend.bus_label, "Poste B1");
        assert_eq!(legend.formatted_voltage, "402.3 kV");
        assert_eq!(legend.formatted_angle, "-1.3°");
        assert_eq!(legend.formatted_production, "350 MW");
        assert_eq!(legend.formatted_consumption, "121 MW");
    }

    #[test]
    fn test_no_generators_gives_undefined_production() {
        let legend = LegendAggregator::new(network()).bus_legend("B3").unwrap();
        assert_eq!(legend.formatted_production, DEFAULT_UNDEFINED_SYMBOL);
        assert_eq!(legend.formatted_consumption, "42 MW");
    }

    #[test]
    fn test_uncomputed_state_uses_configured_symbol() {
        let legend = LegendAggregator::new(network())
            .with_undefined_symbol("N/A")
            .bus_legend("B2")
            .unwrap();
        assert_eq!(legend.bus_label, "B2");
        assert_eq!(legend.formatted_voltage, "N/A");
        assert_eq!(legend.formatted_angle, "N/A");
        assert_eq!(legend.formatted_production, "N/A");
        assert_eq!(legend.formatted_consumption, "N/A");
    }

    #[test]
    fn test_half_megawatts_round_up() {
        let mut network = Network::new();
        network
            .add_voltage_level(VoltageLevel::new("VL1", 225.0).with_bus(Bus::new("B1")))
            .unwrap();
        network
            .add_generator(Gen::new("G1", "VL1", "B1").with_active_power(-250.5))
            .unwrap();
        network
            .add_load(Load::new("L1", "VL1", "B1").with_active_power(2.5))
            .unwrap();
        let legend = LegendAggregator::new(Arc::new(network)).bus_legend("B1").unwrap();
        assert_eq!(legend.formatted_production, "251 MW");
        assert_eq!(legend.formatted_consumption, "3 MW");
    }

    #[test]
    fn test_unknown_bus() {
        assert!(LegendAggregator::new(network()).bus_legend("B9").is_err());
    }
}
