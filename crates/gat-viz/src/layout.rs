//! Per-voltage-level choice of layout strategy.
//!
//! The renderer owns the geometry; this module only decides which of its
//! strategies to run. The decision is made per voltage level when the renderer
//! asks, not once for the whole diagram.

use std::sync::Arc;

use gat_core::{GatResult, Network, TopologyKind, VoltageLevel};
use serde::Serialize;

use crate::request::SubstationLayout;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutStrategy {
    /// Automatic placement by clustering feeders around busbar sections.
    Clustering,
    /// Placement driven by explicit feeder positions.
    Position,
}

#[derive(Debug, Clone)]
pub struct LayoutFactorySelector {
    network: Arc<Network>,
    substation_layout: SubstationLayout,
}

impl LayoutFactorySelector {
    pub fn new(network: Arc<Network>, substation_layout: SubstationLayout) -> Self {
        Self {
            network,
            substation_layout,
        }
    }

    /// Bus-breaker topology or any position extension forces the position strategy.
    pub fn strategy(voltage_level: &VoltageLevel) -> LayoutStrategy {
        if voltage_level.topology_kind == TopologyKind::BusBreaker
            || voltage_level.has_position_extensions()
        {
            LayoutStrategy::Position
        } else {
            LayoutStrategy::Clustering
        }
    }

    pub fn strategy_for(&self, voltage_level_id: &str) -> GatResult<LayoutStrategy> {
        Ok(Self::strategy(self.network.voltage_level(voltage_level_id)?))
    }

    /// How voltage levels of a substation are arranged relative to each other.
    pub fn substation_layout(&self) -> SubstationLayout {
        self.substation_layout
    }
}
