//! # gat-core: Network model for grid diagrams
//!
//! Provides the read-only network view that diagram generation traverses, plus
//! the topology algorithms that decide which part of it a diagram shows.
//!
//! ## Design Philosophy
//!
//! Networks are modeled as **undirected multigraphs** where:
//! - **Nodes**: voltage levels, plus the equipment that needs its own vertex to be
//!   traversed (three-winding transformer star points, HVDC converter stations,
//!   dangling lines) and the injections (generators, loads) hung off buses
//! - **Edges**: branches between voltage levels, transformer legs, terminals,
//!   HVDC lines and tie lines
//!
//! Keeping every edge kind in one tagged enum lets the reachability filter handle
//! each kind in a single `match` instead of a visitor per equipment type.
//!
//! ## Quick Start
//!
//! ```rust
//! use gat_core::*;
//!
//! let mut network = Network::new();
//! network
//!     .add_voltage_level(VoltageLevel::new("VL1", 400.0).with_bus(Bus::new("VL1_B1")))
//!     .unwrap();
//! network
//!     .add_voltage_level(VoltageLevel::new("VL2", 225.0).with_bus(Bus::new("VL2_B1")))
//!     .unwrap();
//! network.add_branch(Branch::line("LINE1", "VL1", "VL2")).unwrap();
//!
//! let reached = filter_voltage_levels(&network, ["VL1"], 1, &no_filter()).unwrap();
//! assert!(reached.contains("VL2"));
//! ```
//!
//! ## Modules
//!
//! - [`graph_utils`] - Depth-bounded reachability over the network graph
//! - [`diagnostics`] - Non-fatal issues found while inspecting a network
//! - [`units`] - Unit newtypes for captions
//! - [`error`] - [`GatError`] and [`GatResult`]

use std::collections::{BTreeMap, HashMap};

use petgraph::{prelude::*, Undirected};
use serde::{Deserialize, Serialize};

pub mod diagnostics;
pub mod error;
pub mod graph_utils;
pub mod units;

pub use diagnostics::{DiagnosticIssue, Diagnostics, Severity};
pub use error::{GatError, GatResult};
pub use graph_utils::*;
pub use petgraph::graph::{EdgeIndex, NodeIndex};
pub use units::{Amperes, Degrees, Kilovolts, Megawatts};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[inline]
            pub fn new(value: impl Into<String>) -> Self {
                $name(value.into())
            }
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                $name(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                $name(value)
            }
        }
    };
}

string_id!(
    /// Opaque voltage level identifier.
    VoltageLevelId
);
string_id!(SubstationId);
string_id!(BusId);
string_id!(
    /// Identifier of any connectable equipment (line, transformer, generator, ...).
    EquipmentId
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TopologyKind {
    #[default]
    NodeBreaker,
    BusBreaker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperatingStatus {
    #[default]
    InOperation,
    PlannedOutage,
    ForcedOutage,
}

/// Electrical bus of the bus view, with its last computed state.
#[derive(Debug, Clone)]
pub struct Bus {
    pub id: BusId,
    pub name: Option<String>,
    /// Voltage magnitude, `NaN` until a load flow has run.
    pub voltage: Kilovolts,
    /// Voltage angle, `NaN` until a load flow has run.
    pub angle: Degrees,
}

impl Bus {
    pub fn new(id: impl Into<BusId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            voltage: Kilovolts(f64::NAN),
            angle: Degrees(f64::NAN),
        }
    }

    pub fn with_state(mut self, voltage_kv: f64, angle_deg: f64) -> Self {
        self.voltage = Kilovolts(voltage_kv);
        self.angle = Degrees(angle_deg);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Name when set, id otherwise.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.id.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct VoltageLevel {
    pub id: VoltageLevelId,
    pub name: Option<String>,
    pub substation_id: Option<SubstationId>,
    pub nominal_v: Kilovolts,
    pub topology_kind: TopologyKind,
    pub buses: Vec<Bus>,
    /// Feeder order of each connectable carrying a position extension.
    pub feeder_positions: BTreeMap<EquipmentId, i32>,
}

impl VoltageLevel {
    pub fn new(id: impl Into<VoltageLevelId>, nominal_kv: f64) -> Self {
        Self {
            id: id.into(),
            name: None,
            substation_id: None,
            nominal_v: Kilovolts(nominal_kv),
            topology_kind: TopologyKind::NodeBreaker,
            buses: Vec::new(),
            feeder_positions: BTreeMap::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn in_substation(mut self, substation_id: impl Into<SubstationId>) -> Self {
        self.substation_id = Some(substation_id.into());
        self
    }

    pub fn with_topology(mut self, kind: TopologyKind) -> Self {
        self.topology_kind = kind;
        self
    }

    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.buses.push(bus);
        self
    }

    pub fn with_feeder_position(mut self, equipment_id: impl Into<EquipmentId>, order: i32) -> Self {
        self.feeder_positions.insert(equipment_id.into(), order);
        self
    }

    pub fn has_position_extensions(&self) -> bool {
        !self.feeder_positions.is_empty()
    }

    pub fn bus(&self, bus_id: &str) -> Option<&Bus> {
        self.buses.iter().find(|b| b.id.as_str() == bus_id)
    }
}

#[derive(Debug, Clone)]
pub struct Substation {
    pub id: SubstationId,
    pub name: Option<String>,
    pub voltage_levels: Vec<VoltageLevelId>,
}

impl Substation {
    pub fn new(id: impl Into<SubstationId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            voltage_levels: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BranchKind {
    Line,
    TwoWindingTransformer,
}

/// Two-terminal equipment between two voltage levels.
#[derive(Debug, Clone)]
pub struct Branch {
    pub id: EquipmentId,
    pub name: Option<String>,
    pub kind: BranchKind,
    pub voltage_level1: VoltageLevelId,
    pub voltage_level2: VoltageLevelId,
    pub operating_status: OperatingStatus,
}

impl Branch {
    pub fn line(
        id: impl Into<EquipmentId>,
        voltage_level1: impl Into<VoltageLevelId>,
        voltage_level2: impl Into<VoltageLevelId>,
    ) -> Self {
        Self {
            id: id.into(),
            name: None,
            kind: BranchKind::Line,
            voltage_level1: voltage_level1.into(),
            voltage_level2: voltage_level2.into(),
            operating_status: OperatingStatus::InOperation,
        }
    }

    pub fn two_winding_transformer(
        id: impl Into<EquipmentId>,
        voltage_level1: impl Into<VoltageLevelId>,
        voltage_level2: impl Into<VoltageLevelId>,
    ) -> Self {
        Self {
            kind: BranchKind::TwoWindingTransformer,
            ..Self::line(id, voltage_level1, voltage_level2)
        }
    }

    pub fn with_status(mut self, status: OperatingStatus) -> Self {
        self.operating_status = status;
        self
    }

    /// Voltage level at the terminal opposite to `from`.
    pub fn opposite(&self, from: &VoltageLevelId) -> &VoltageLevelId {
        if &self.voltage_level1 == from {
            &self.voltage_level2
        } else {
            &self.voltage_level1
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindingSide {
    One,
    Two,
    Three,
}

/// Star point of a three-winding transformer. Its legs are separate edges.
#[derive(Debug, Clone)]
pub struct ThreeWindingTransformer {
    pub id: EquipmentId,
    pub name: Option<String>,
    pub operating_status: OperatingStatus,
}

impl ThreeWindingTransformer {
    pub fn new(id: impl Into<EquipmentId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            operating_status: OperatingStatus::InOperation,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ThreeWindingLeg {
    pub transformer_id: EquipmentId,
    pub side: WindingSide,
    pub voltage_level: VoltageLevelId,
}

#[derive(Debug, Clone)]
pub struct ConverterStation {
    pub id: EquipmentId,
    pub name: Option<String>,
    pub voltage_level: VoltageLevelId,
}

impl ConverterStation {
    pub fn new(id: impl Into<EquipmentId>, voltage_level: impl Into<VoltageLevelId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            voltage_level: voltage_level.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HvdcLine {
    pub id: EquipmentId,
    pub name: Option<String>,
    pub converter_station1: EquipmentId,
    pub converter_station2: EquipmentId,
}

impl HvdcLine {
    pub fn new(
        id: impl Into<EquipmentId>,
        converter_station1: impl Into<EquipmentId>,
        converter_station2: impl Into<EquipmentId>,
    ) -> Self {
        Self {
            id: id.into(),
            name: None,
            converter_station1: converter_station1.into(),
            converter_station2: converter_station2.into(),
        }
    }
}

/// Line with a single network terminal; the other end is a boundary point.
#[derive(Debug, Clone)]
pub struct DanglingLine {
    pub id: EquipmentId,
    pub name: Option<String>,
    pub voltage_level: VoltageLevelId,
    pub pairing_key: Option<String>,
}

impl DanglingLine {
    pub fn new(id: impl Into<EquipmentId>, voltage_level: impl Into<VoltageLevelId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            voltage_level: voltage_level.into(),
            pairing_key: None,
        }
    }
}

/// Two dangling lines joined at their boundary point.
#[derive(Debug, Clone)]
pub struct TieLine {
    pub id: EquipmentId,
    pub name: Option<String>,
    pub dangling_line1: EquipmentId,
    pub dangling_line2: EquipmentId,
}

impl TieLine {
    pub fn new(
        id: impl Into<EquipmentId>,
        dangling_line1: impl Into<EquipmentId>,
        dangling_line2: impl Into<EquipmentId>,
    ) -> Self {
        Self {
            id: id.into(),
            name: None,
            dangling_line1: dangling_line1.into(),
            dangling_line2: dangling_line2.into(),
        }
    }
}

/// Attachment of a converter station or dangling line to its voltage level.
#[derive(Debug, Clone)]
pub struct Terminal {
    pub equipment_id: EquipmentId,
    pub voltage_level: VoltageLevelId,
}

#[derive(Debug, Clone)]
pub struct Gen {
    pub id: EquipmentId,
    pub name: Option<String>,
    pub voltage_level: VoltageLevelId,
    pub bus: BusId,
    /// Terminal active power (MW), load convention as reported by the provider.
    pub active_power: Megawatts,
}

impl Gen {
    pub fn new(
        id: impl Into<EquipmentId>,
        voltage_level: impl Into<VoltageLevelId>,
        bus: impl Into<BusId>,
    ) -> Self {
        Self {
            id: id.into(),
            name: None,
            voltage_level: voltage_level.into(),
            bus: bus.into(),
            active_power: Megawatts(f64::NAN),
        }
    }

    pub fn with_active_power(mut self, mw: f64) -> Self {
        self.active_power = Megawatts(mw);
        self
    }
}

#[derive(Debug, Clone)]
pub struct Load {
    pub id: EquipmentId,
    pub name: Option<String>,
    pub voltage_level: VoltageLevelId,
    pub bus: BusId,
    pub active_power: Megawatts,
}

impl Load {
    pub fn new(
        id: impl Into<EquipmentId>,
        voltage_level: impl Into<VoltageLevelId>,
        bus: impl Into<BusId>,
    ) -> Self {
        Self {
            id: id.into(),
            name: None,
            voltage_level: voltage_level.into(),
            bus: bus.into(),
            active_power: Megawatts(f64::NAN),
        }
    }

    pub fn with_active_power(mut self, mw: f64) -> Self {
        self.active_power = Megawatts(mw);
        self
    }
}

// Enum to represent different types of nodes in the graph
#[derive(Debug, Clone)]
pub enum Node {
    VoltageLevel(VoltageLevel),
    Gen(Gen),
    Load(Load),
    ThreeWindingStar(ThreeWindingTransformer),
    ConverterStation(ConverterStation),
    DanglingLine(DanglingLine),
}

// Enum to represent different types of edges in the graph
#[derive(Debug, Clone)]
pub enum Edge {
    Branch(Branch),
    ThreeWindingLeg(ThreeWindingLeg),
    Terminal(Terminal),
    HvdcLine(HvdcLine),
    TieLine(TieLine),
}

/// Equipment seen from one voltage level, as enumerated by [`Network::incident_equipment`].
#[derive(Debug, Clone, Copy)]
pub enum IncidentEquipment<'a> {
    Branch(&'a Branch),
    ThreeWindingLeg {
        leg: &'a ThreeWindingLeg,
        star: NodeIndex,
    },
    HvdcConverter {
        station: &'a ConverterStation,
        node: NodeIndex,
    },
    DanglingLine {
        line: &'a DanglingLine,
        node: NodeIndex,
    },
}

#[derive(Debug, Clone, Copy)]
enum EquipmentRef {
    Node(NodeIndex),
    Edge(EdgeIndex),
}

/// The network snapshot diagrams are generated from.
///
/// Built once by the network-model provider and then shared read-only.
#[derive(Debug, Default, Clone)]
pub struct Network {
    graph: Graph<Node, Edge, Undirected>,
    voltage_levels: HashMap<VoltageLevelId, NodeIndex>,
    substations: BTreeMap<SubstationId, Substation>,
    buses: HashMap<BusId, NodeIndex>,
    equipment: HashMap<EquipmentId, EquipmentRef>,
}

fn other_end(edge: petgraph::graph::EdgeReference<'_, Edge>, from: NodeIndex) -> NodeIndex {
    if edge.source() == from {
        edge.target()
    } else {
        edge.source()
    }
}

impl Network {
    pub fn new() -> Self {
        Self {
            graph: Graph::new_undirected(),
            ..Self::default()
        }
    }

    pub fn graph(&self) -> &Graph<Node, Edge, Undirected> {
        &self.graph
    }

    pub fn add_substation(&mut self, substation: Substation) -> GatResult<()> {
        if self.substations.contains_key(&substation.id) {
            return Err(GatError::Validation(format!(
                "duplicate substation '{}'",
                substation.id
            )));
        }
        self.substations.insert(substation.id.clone(), substation);
        Ok(())
    }

    /// Register a voltage level, attaching it to its substation when it names one.
    pub fn add_voltage_level(&mut self, voltage_level: VoltageLevel) -> GatResult<NodeIndex> {
        if self.voltage_levels.contains_key(&voltage_level.id) {
            return Err(GatError::DuplicateVoltageLevel(voltage_level.id.to_string()));
        }
        if let Some(bus) = voltage_level
            .buses
            .iter()
            .find(|b| self.buses.contains_key(&b.id))
        {
            return Err(GatError::Validation(format!(
                "bus '{}' already belongs to another voltage level",
                bus.id
            )));
        }
        if let Some(substation_id) = &voltage_level.substation_id {
            let substation = self
                .substations
                .get_mut(substation_id)
                .ok_or_else(|| GatError::UnknownSubstation(substation_id.to_string()))?;
            substation.voltage_levels.push(voltage_level.id.clone());
        }

        let id = voltage_level.id.clone();
        let bus_ids: Vec<BusId> = voltage_level.buses.iter().map(|b| b.id.clone()).collect();
        let idx = self.graph.add_node(Node::VoltageLevel(voltage_level));
        self.voltage_levels.insert(id, idx);
        for bus_id in bus_ids {
            self.buses.insert(bus_id, idx);
        }
        Ok(idx)
    }

    pub fn add_branch(&mut self, branch: Branch) -> GatResult<EdgeIndex> {
        self.ensure_new_equipment(&branch.id)?;
        let a = self.require_voltage_level(branch.voltage_level1.as_str())?;
        let b = self.require_voltage_level(branch.voltage_level2.as_str())?;
        let id = branch.id.clone();
        let edge = self.graph.add_edge(a, b, Edge::Branch(branch));
        self.equipment.insert(id, EquipmentRef::Edge(edge));
        Ok(edge)
    }

    /// Add a three-winding transformer whose legs 1/2/3 end at `legs[0..3]`.
    pub fn add_three_winding_transformer(
        &mut self,
        transformer: ThreeWindingTransformer,
        legs: [VoltageLevelId; 3],
    ) -> GatResult<NodeIndex> {
        self.ensure_new_equipment(&transformer.id)?;
        let leg_nodes = legs
            .iter()
            .map(|vl| self.require_voltage_level(vl.as_str()))
            .collect::<GatResult<Vec<_>>>()?;

        let transformer_id = transformer.id.clone();
        let star = self.graph.add_node(Node::ThreeWindingStar(transformer));
        let sides = [WindingSide::One, WindingSide::Two, WindingSide::Three];
        for ((side, vl), vl_node) in sides.into_iter().zip(legs).zip(leg_nodes) {
            self.graph.add_edge(
                vl_node,
                star,
                Edge::ThreeWindingLeg(ThreeWindingLeg {
                    transformer_id: transformer_id.clone(),
                    side,
                    voltage_level: vl,
                }),
            );
        }
        self.equipment.insert(transformer_id, EquipmentRef::Node(star));
        Ok(star)
    }

    pub fn add_converter_station(&mut self, station: ConverterStation) -> GatResult<NodeIndex> {
        self.ensure_new_equipment(&station.id)?;
        let vl = self.require_voltage_level(station.voltage_level.as_str())?;
        let terminal = Terminal {
            equipment_id: station.id.clone(),
            voltage_level: station.voltage_level.clone(),
        };
        let id = station.id.clone();
        let node = self.graph.add_node(Node::ConverterStation(station));
        self.graph.add_edge(vl, node, Edge::Terminal(terminal));
        self.equipment.insert(id, EquipmentRef::Node(node));
        Ok(node)
    }

    /// Link two registered converter stations.
    pub fn add_hvdc_line(&mut self, line: HvdcLine) -> GatResult<EdgeIndex> {
        self.ensure_new_equipment(&line.id)?;
        let a = self.require_equipment_node(&line.converter_station1, |n| {
            matches!(n, Node::ConverterStation(_))
        })?;
        let b = self.require_equipment_node(&line.converter_station2, |n| {
            matches!(n, Node::ConverterStation(_))
        })?;
        if self.hvdc_peer(a).is_some() || self.hvdc_peer(b).is_some() {
            return Err(GatError::Validation(format!(
                "converter station of HVDC line '{}' is already linked",
                line.id
            )));
        }
        let id = line.id.clone();
        let edge = self.graph.add_edge(a, b, Edge::HvdcLine(line));
        self.equipment.insert(id, EquipmentRef::Edge(edge));
        Ok(edge)
    }

    pub fn add_dangling_line(&mut self, line: DanglingLine) -> GatResult<NodeIndex> {
        self.ensure_new_equipment(&line.id)?;
        let vl = self.require_voltage_level(line.voltage_level.as_str())?;
        let terminal = Terminal {
            equipment_id: line.id.clone(),
            voltage_level: line.voltage_level.clone(),
        };
        let id = line.id.clone();
        let node = self.graph.add_node(Node::DanglingLine(line));
        self.graph.add_edge(vl, node, Edge::Terminal(terminal));
        self.equipment.insert(id, EquipmentRef::Node(node));
        Ok(node)
    }

    /// Pair two dangling lines into a tie line. A dangling line pairs at most once.
    pub fn pair_dangling_lines(&mut self, tie_line: TieLine) -> GatResult<EdgeIndex> {
        self.ensure_new_equipment(&tie_line.id)?;
        let a = self.require_equipment_node(&tie_line.dangling_line1, |n| {
            matches!(n, Node::DanglingLine(_))
        })?;
        let b = self.require_equipment_node(&tie_line.dangling_line2, |n| {
            matches!(n, Node::DanglingLine(_))
        })?;
        if a == b || self.tie_line_peer(a).is_some() || self.tie_line_peer(b).is_some() {
            return Err(GatError::Validation(format!(
                "dangling lines of tie line '{}' cannot be paired",
                tie_line.id
            )));
        }
        let id = tie_line.id.clone();
        let edge = self.graph.add_edge(a, b, Edge::TieLine(tie_line));
        self.equipment.insert(id, EquipmentRef::Edge(edge));
        Ok(edge)
    }

    pub fn add_generator(&mut self, gen: Gen) -> GatResult<NodeIndex> {
        self.ensure_new_equipment(&gen.id)?;
        self.require_bus_in(&gen.bus, &gen.voltage_level)?;
        let id = gen.id.clone();
        let node = self.graph.add_node(Node::Gen(gen));
        self.equipment.insert(id, EquipmentRef::Node(node));
        Ok(node)
    }

    pub fn add_load(&mut self, load: Load) -> GatResult<NodeIndex> {
        self.ensure_new_equipment(&load.id)?;
        self.require_bus_in(&load.bus, &load.voltage_level)?;
        let id = load.id.clone();
        let node = self.graph.add_node(Node::Load(load));
        self.equipment.insert(id, EquipmentRef::Node(node));
        Ok(node)
    }

    fn ensure_new_equipment(&self, id: &EquipmentId) -> GatResult<()> {
        if self.equipment.contains_key(id) {
            return Err(GatError::DuplicateEquipment(id.to_string()));
        }
        Ok(())
    }

    fn require_voltage_level(&self, id: &str) -> GatResult<NodeIndex> {
        self.voltage_level_index(id)
            .ok_or_else(|| GatError::UnknownVoltageLevel(id.to_string()))
    }

    fn require_equipment_node(
        &self,
        id: &EquipmentId,
        expected: impl Fn(&Node) -> bool,
    ) -> GatResult<NodeIndex> {
        match self.equipment.get(id) {
            Some(EquipmentRef::Node(idx)) if expected(&self.graph[*idx]) => Ok(*idx),
            _ => Err(GatError::UnknownEquipment(id.to_string())),
        }
    }

    fn require_bus_in(&self, bus: &BusId, voltage_level: &VoltageLevelId) -> GatResult<()> {
        let vl = self.voltage_level(voltage_level.as_str())?;
        if vl.bus(bus.as_str()).is_none() {
            return Err(GatError::UnknownBus(bus.to_string()));
        }
        Ok(())
    }

    pub fn voltage_level_index(&self, id: &str) -> Option<NodeIndex> {
        self.voltage_levels.get(id).copied()
    }

    pub fn voltage_level_at(&self, idx: NodeIndex) -> Option<&VoltageLevel> {
        match self.graph.node_weight(idx) {
            Some(Node::VoltageLevel(vl)) => Some(vl),
            _ => None,
        }
    }

    pub fn voltage_level(&self, id: &str) -> GatResult<&VoltageLevel> {
        self.voltage_level_index(id)
            .and_then(|idx| self.voltage_level_at(idx))
            .ok_or_else(|| GatError::UnknownVoltageLevel(id.to_string()))
    }

    pub fn voltage_levels(&self) -> impl Iterator<Item = &VoltageLevel> {
        self.graph.node_weights().filter_map(|n| match n {
            Node::VoltageLevel(vl) => Some(vl),
            _ => None,
        })
    }

    pub fn substation(&self, id: &str) -> GatResult<&Substation> {
        self.substations
            .get(id)
            .ok_or_else(|| GatError::UnknownSubstation(id.to_string()))
    }

    pub fn substations(&self) -> impl Iterator<Item = &Substation> {
        self.substations.values()
    }

    /// Resolve a bus id to the voltage level holding it.
    pub fn bus(&self, id: &str) -> GatResult<(&VoltageLevel, &Bus)> {
        self.buses
            .get(id)
            .and_then(|idx| self.voltage_level_at(*idx))
            .and_then(|vl| vl.bus(id).map(|bus| (vl, bus)))
            .ok_or_else(|| GatError::UnknownBus(id.to_string()))
    }

    /// Generators connected to a bus.
    pub fn generators_at_bus(&self, bus_id: &str) -> Vec<&Gen> {
        self.graph
            .node_weights()
            .filter_map(|n| match n {
                Node::Gen(g) if g.bus.as_str() == bus_id => Some(g),
                _ => None,
            })
            .collect()
    }

    /// Loads connected to a bus.
    pub fn loads_at_bus(&self, bus_id: &str) -> Vec<&Load> {
        self.graph
            .node_weights()
            .filter_map(|n| match n {
                Node::Load(l) if l.bus.as_str() == bus_id => Some(l),
                _ => None,
            })
            .collect()
    }

    pub fn branches(&self) -> Vec<&Branch> {
        self.graph
            .edge_weights()
            .filter_map(|e| match e {
                Edge::Branch(b) => Some(b),
                _ => None,
            })
            .collect()
    }

    /// Equipment attached to the voltage level at `idx`, one entry per terminal.
    pub fn incident_equipment(&self, idx: NodeIndex) -> Vec<IncidentEquipment<'_>> {
        let mut incident = Vec::new();
        for edge in self.graph.edges(idx) {
            let other = other_end(edge, idx);
            match (edge.weight(), &self.graph[other]) {
                (Edge::Branch(branch), _) => incident.push(IncidentEquipment::Branch(branch)),
                (Edge::ThreeWindingLeg(leg), _) => {
                    incident.push(IncidentEquipment::ThreeWindingLeg { leg, star: other })
                }
                (Edge::Terminal(_), Node::ConverterStation(station)) => {
                    incident.push(IncidentEquipment::HvdcConverter {
                        station,
                        node: other,
                    })
                }
                (Edge::Terminal(_), Node::DanglingLine(line)) => {
                    incident.push(IncidentEquipment::DanglingLine { line, node: other })
                }
                _ => {}
            }
        }
        incident
    }

    /// Legs of the three-winding transformer whose star point is `star`.
    pub fn three_winding_legs(&self, star: NodeIndex) -> Vec<&ThreeWindingLeg> {
        self.graph
            .edges(star)
            .filter_map(|e| match e.weight() {
                Edge::ThreeWindingLeg(leg) => Some(leg),
                _ => None,
            })
            .collect()
    }

    /// Converter station at the other end of the HVDC line, if the line exists.
    pub fn hvdc_peer(&self, station: NodeIndex) -> Option<&ConverterStation> {
        self.graph.edges(station).find_map(|e| match e.weight() {
            Edge::HvdcLine(_) => match &self.graph[other_end(e, station)] {
                Node::ConverterStation(peer) => Some(peer),
                _ => None,
            },
            _ => None,
        })
    }

    /// Dangling line on the other side of the tie line, if the line is paired.
    pub fn tie_line_peer(&self, line: NodeIndex) -> Option<&DanglingLine> {
        self.graph.edges(line).find_map(|e| match e.weight() {
            Edge::TieLine(_) => match &self.graph[other_end(e, line)] {
                Node::DanglingLine(peer) => Some(peer),
                _ => None,
            },
            _ => None,
        })
    }

    /// Voltage levels an equipment id touches. A voltage level id resolves to itself.
    pub fn equipment_voltage_levels(&self, id: &str) -> GatResult<Vec<VoltageLevelId>> {
        if let Some(idx) = self.voltage_level_index(id) {
            if let Some(vl) = self.voltage_level_at(idx) {
                return Ok(vec![vl.id.clone()]);
            }
        }
        let found = match self.equipment.get(id) {
            Some(EquipmentRef::Node(idx)) => match &self.graph[*idx] {
                Node::Gen(g) => vec![g.voltage_level.clone()],
                Node::Load(l) => vec![l.voltage_level.clone()],
                Node::ConverterStation(cs) => vec![cs.voltage_level.clone()],
                Node::DanglingLine(dl) => vec![dl.voltage_level.clone()],
                Node::ThreeWindingStar(_) => self
                    .three_winding_legs(*idx)
                    .into_iter()
                    .map(|leg| leg.voltage_level.clone())
                    .collect(),
                Node::VoltageLevel(vl) => vec![vl.id.clone()],
            },
            Some(EquipmentRef::Edge(idx)) => {
                let Some((a, b)) = self.graph.edge_endpoints(*idx) else {
                    return Err(GatError::UnknownEquipment(id.to_string()));
                };
                [a, b]
                    .into_iter()
                    .filter_map(|n| match &self.graph[n] {
                        Node::VoltageLevel(vl) => Some(vl.id.clone()),
                        Node::ConverterStation(cs) => Some(cs.voltage_level.clone()),
                        Node::DanglingLine(dl) => Some(dl.voltage_level.clone()),
                        _ => None,
                    })
                    .collect()
            }
            None => return Err(GatError::UnknownEquipment(id.to_string())),
        };
        let mut ids = found;
        ids.dedup();
        Ok(ids)
    }

    /// Operating status of every equipment that is not in operation.
    pub fn abnormal_operating_statuses(&self) -> HashMap<EquipmentId, OperatingStatus> {
        let branches = self.graph.edge_weights().filter_map(|e| match e {
            Edge::Branch(b) => Some((&b.id, b.operating_status)),
            _ => None,
        });
        let stars = self.graph.node_weights().filter_map(|n| match n {
            Node::ThreeWindingStar(t) => Some((&t.id, t.operating_status)),
            _ => None,
        });
        branches
            .chain(stars)
            .filter(|(_, status)| *status != OperatingStatus::InOperation)
            .map(|(id, status)| (id.clone(), status))
            .collect()
    }

    /// Compute basic statistics about the network
    pub fn stats(&self) -> NetworkStats {
        let mut stats = NetworkStats {
            num_substations: self.substations.len(),
            ..NetworkStats::default()
        };
        for (idx, node) in self.graph.node_indices().zip(self.graph.node_weights()) {
            match node {
                Node::VoltageLevel(_) => stats.num_voltage_levels += 1,
                Node::Gen(_) => stats.num_gens += 1,
                Node::Load(_) => stats.num_loads += 1,
                Node::ThreeWindingStar(_) => stats.num_three_winding_transformers += 1,
                Node::ConverterStation(_) => {}
                Node::DanglingLine(_) => {
                    if self.tie_line_peer(idx).is_none() {
                        stats.num_unpaired_dangling_lines += 1;
                    }
                }
            }
        }
        for edge in self.graph.edge_weights() {
            match edge {
                Edge::Branch(_) => stats.num_branches += 1,
                Edge::HvdcLine(_) => stats.num_hvdc_lines += 1,
                Edge::TieLine(_) => stats.num_tie_lines += 1,
                Edge::ThreeWindingLeg(_) | Edge::Terminal(_) => {}
            }
        }
        stats
    }

    /// Report structural oddities that do not prevent rendering.
    pub fn validate_into(&self, diag: &mut Diagnostics) {
        for idx in self.graph.node_indices() {
            match &self.graph[idx] {
                Node::VoltageLevel(vl) if vl.buses.is_empty() => {
                    diag.add_warning_with_entity("structure", "voltage level has no buses", vl.id.as_str())
                }
                Node::ConverterStation(cs) if self.hvdc_peer(idx).is_none() => diag
                    .add_warning_with_entity(
                        "structure",
                        "converter station is not linked to an HVDC line",
                        cs.id.as_str(),
                    ),
                Node::DanglingLine(dl) if self.tie_line_peer(idx).is_none() => diag
                    .add_warning_with_entity("structure", "dangling line is unpaired", dl.id.as_str()),
                _ => {}
            }
        }
    }
}

/// Statistics about a network's size
#[derive(Debug, Clone, Default)]
pub struct NetworkStats {
    pub num_substations: usize,
    pub num_voltage_levels: usize,
    pub num_branches: usize,
    pub num_three_winding_transformers: usize,
    pub num_hvdc_lines: usize,
    pub num_tie_lines: usize,
    pub num_unpaired_dangling_lines: usize,
    pub num_gens: usize,
    pub num_loads: usize,
}

impl std::fmt::Display for NetworkStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} substations, {} voltage levels, {} branches, {} 3w transformers, {} hvdc lines, {} tie lines, {} gens, {} loads",
            self.num_substations,
            self.num_voltage_levels,
            self.num_branches,
            self.num_three_winding_transformers,
            self.num_hvdc_lines,
            self.num_tie_lines,
            self.num_gens,
            self.num_loads
        )
    }
}
