//! Label providers, one per display mode.

use std::collections::BTreeMap;
use std::sync::Arc;

use gat_core::{Amperes, BusId, Network};
use tracing::debug;

use crate::legend::{BusLegendEntry, LegendAggregator};
use crate::provider::{FeederDecoration, FeederNode, LabelSource, LegendSource};
use crate::style::LimitViolationIndex;

/// Feeder-position mode: labels carry the feeder order, no legend.
#[derive(Debug, Clone)]
pub struct FeederPositionLabels {
    network: Arc<Network>,
    use_name: bool,
}

impl FeederPositionLabels {
    pub fn new(network: Arc<Network>, use_name: bool) -> Self {
        Self { network, use_name }
    }

    /// Feeder order of the equipment in its voltage level, if it has one.
    pub fn position(&self, node: &FeederNode<'_>) -> Option<i32> {
        self.network
            .voltage_level(node.voltage_level_id)
            .ok()
            .and_then(|vl| vl.feeder_positions.get(node.equipment_id).copied())
    }
}

impl LabelSource for FeederPositionLabels {
    fn feeder_label(&self, node: &FeederNode<'_>) -> String {
        let label = node.display_label(self.use_name);
        match self.position(node) {
            Some(order) => format!("{label} pos: {order}"),
            None => label.to_string(),
        }
    }
}

impl LegendSource for FeederPositionLabels {
    fn bus_legend(&self, _bus_id: &str) -> Option<BusLegendEntry> {
        None
    }
}

/// State-variable mode: bus legends, violation marks and current overlays.
#[derive(Debug, Clone)]
pub struct StateVariableLabels {
    use_name: bool,
    legend: LegendAggregator,
    violations: LimitViolationIndex,
    bus_currents: BTreeMap<BusId, Amperes>,
}

impl StateVariableLabels {
    pub fn new(
        legend: LegendAggregator,
        use_name: bool,
        violations: LimitViolationIndex,
        bus_currents: &BTreeMap<BusId, f64>,
    ) -> Self {
        Self {
            use_name,
            legend,
            violations,
            bus_currents: bus_currents
                .iter()
                .map(|(bus, amps)| (bus.clone(), Amperes(*amps)))
                .collect(),
        }
    }
}

impl LabelSource for StateVariableLabels {
    fn feeder_label(&self, node: &FeederNode<'_>) -> String {
        node.display_label(self.use_name).to_string()
    }

    fn feeder_decoration(&self, node: &FeederNode<'_>) -> Option<FeederDecoration> {
        self.violations
            .class_for(node.equipment_id)
            .map(|class| FeederDecoration::LimitViolation {
                style_class: class.to_string(),
            })
    }
}

impl LegendSource for StateVariableLabels {
    fn bus_legend(&self, bus_id: &str) -> Option<BusLegendEntry> {
        match self.legend.bus_legend(bus_id) {
            Ok(entry) => Some(entry),
            Err(err) => {
                debug!(bus = bus_id, error = %err, "no legend for bus");
                None
            }
        }
    }

    fn bus_current(&self, bus_id: &str) -> Option<String> {
        let amps = self.bus_currents.get(bus_id)?;
        Some(if amps.is_defined() {
            format!("{:.0}", amps.round())
        } else {
            self.legend.undefined_symbol().to_string()
        })
    }
}

#[derive(Debug, Clone)]
pub enum LabelProvider {
    FeederPosition(FeederPositionLabels),
    StateVariable(StateVariableLabels),
}

impl LabelSource for LabelProvider {
    fn feeder_label(&self, node: &FeederNode<'_>) -> String {
        match self {
            LabelProvider::FeederPosition(p) => p.feeder_label(node),
            LabelProvider::StateVariable(p) => p.feeder_label(node),
        }
    }

    fn feeder_decoration(&self, node: &FeederNode<'_>) -> Option<FeederDecoration> {
        match self {
            LabelProvider::FeederPosition(p) => p.feeder_decoration(node),
            LabelProvider::StateVariable(p) => p.feeder_decoration(node),
        }
    }
}

impl LegendSource for LabelProvider {
    fn bus_legend(&self, bus_id: &str) -> Option<BusLegendEntry> {
        match self {
            LabelProvider::FeederPosition(p) => p.bus_legend(bus_id),
            LabelProvider::StateVariable(p) => p.bus_legend(bus_id),
        }
    }

    fn bus_current(&self, bus_id: &str) -> Option<String> {
        match self {
            LabelProvider::FeederPosition(p) => p.bus_current(bus_id),
            LabelProvider::StateVariable(p) => p.bus_current(bus_id),
        }
    }
}
