//! Depth-bounded reachability over the voltage-level graph.
//!
//! A network-area diagram shows the voltage levels within `depth` hops of a set of
//! seeds. A hop crosses one piece of equipment: a line or two-winding transformer,
//! a three-winding transformer (to either of its other two windings), an HVDC link
//! (to the paired converter station) or a tie line (to the paired dangling line).
//!
//! Newly discovered neighbours must satisfy an [`InclusionPredicate`]. Seeds are
//! always kept; a seed that fails the predicate only produces a warning.

use std::collections::HashSet;
use std::sync::Arc;

use petgraph::graph::NodeIndex;
use tracing::{debug, warn};

use crate::diagnostics::Diagnostics;
use crate::units::Kilovolts;
use crate::{GatError, GatResult, IncidentEquipment, Network, VoltageLevel, VoltageLevelId};

/// Decides whether a newly discovered voltage level joins the traversal.
pub type InclusionPredicate = Arc<dyn Fn(&VoltageLevel) -> bool + Send + Sync>;

/// Predicate accepting every voltage level.
pub fn no_filter() -> InclusionPredicate {
    Arc::new(|_| true)
}

/// Predicate keeping voltage levels whose nominal voltage is at least `min`.
pub fn nominal_voltage_at_least(min: Kilovolts) -> InclusionPredicate {
    Arc::new(move |vl| vl.nominal_v >= min)
}

/// Voltage levels visited by [`filter_voltage_levels`].
///
/// Membership is what matters; iteration order is unspecified.
#[derive(Debug, Clone, Default)]
pub struct ReachabilitySet {
    ids: HashSet<VoltageLevelId>,
    /// Seeds that failed the inclusion predicate, category `"reachability"`.
    pub diagnostics: Diagnostics,
}

impl ReachabilitySet {
    fn insert(&mut self, id: &VoltageLevelId) -> bool {
        if self.ids.contains(id) {
            return false;
        }
        self.ids.insert(id.clone())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VoltageLevelId> {
        self.ids.iter()
    }

    /// Ids in lexical order, for deterministic output.
    pub fn sorted_ids(&self) -> Vec<VoltageLevelId> {
        let mut ids: Vec<_> = self.ids.iter().cloned().collect();
        ids.sort();
        ids
    }

    pub fn into_ids(self) -> HashSet<VoltageLevelId> {
        self.ids
    }
}

/// Breadth-first, depth-bounded traversal from `seeds`.
///
/// Depth 0 returns the seeds alone. Every seed must name an existing voltage
/// level, otherwise [`GatError::UnknownVoltageLevel`] is returned. No voltage
/// level is expanded twice, so at most `depth + 1` layers are processed.
pub fn filter_voltage_levels<I, S>(
    network: &Network,
    seeds: I,
    depth: usize,
    predicate: &InclusionPredicate,
) -> GatResult<ReachabilitySet>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut reached = ReachabilitySet::default();
    let mut frontier: Vec<NodeIndex> = Vec::new();
    let mut seen_seeds = HashSet::new();

    for seed in seeds {
        let id = seed.as_ref();
        let idx = network
            .voltage_level_index(id)
            .ok_or_else(|| GatError::UnknownVoltageLevel(id.to_string()))?;
        if !seen_seeds.insert(idx) {
            continue;
        }
        let vl = voltage_level_at(network, idx)?;
        if !predicate(vl) {
            warn!(voltage_level = id, "seed voltage level does not satisfy the inclusion predicate");
            reached.diagnostics.add_warning_with_entity(
                "reachability",
                "seed voltage level does not satisfy the inclusion predicate",
                id,
            );
        }
        frontier.push(idx);
    }

    for layer in 0..=depth {
        if frontier.is_empty() {
            break;
        }
        let mut next = Vec::new();
        for idx in std::mem::take(&mut frontier) {
            let vl = voltage_level_at(network, idx)?;
            if !reached.insert(&vl.id) {
                continue;
            }
            if layer == depth {
                continue;
            }
            for equipment in network.incident_equipment(idx) {
                for candidate in opposite_voltage_levels(network, &vl.id, equipment) {
                    let Some(candidate_idx) = network.voltage_level_index(candidate.as_str()) else {
                        continue;
                    };
                    if reached.contains(candidate.as_str()) {
                        continue;
                    }
                    if predicate(voltage_level_at(network, candidate_idx)?) {
                        next.push(candidate_idx);
                    }
                }
            }
        }
        debug!(layer, reached = reached.len(), next = next.len(), "reachability layer expanded");
        frontier = next;
    }

    Ok(reached)
}

/// Voltage levels one hop away from `current` that are not already in it.
///
/// Used for "expand by one" actions on an existing area diagram.
pub fn next_depth_frontier<I, S>(
    network: &Network,
    current: I,
    predicate: &InclusionPredicate,
) -> GatResult<Vec<VoltageLevelId>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let current: Vec<String> = current.into_iter().map(|s| s.as_ref().to_string()).collect();
    let expanded = filter_voltage_levels(network, &current, 1, predicate)?;
    let mut added: Vec<VoltageLevelId> = expanded
        .into_ids()
        .into_iter()
        .filter(|id| !current.iter().any(|c| c == id.as_str()))
        .collect();
    added.sort();
    Ok(added)
}

fn voltage_level_at(network: &Network, idx: NodeIndex) -> GatResult<&VoltageLevel> {
    network
        .voltage_level_at(idx)
        .ok_or_else(|| GatError::Other(format!("node {} is not a voltage level", idx.index())))
}

/// Voltage levels on the far side of `equipment` when entered from `current`.
fn opposite_voltage_levels<'a>(
    network: &'a Network,
    current: &VoltageLevelId,
    equipment: IncidentEquipment<'a>,
) -> Vec<&'a VoltageLevelId> {
    match equipment {
        IncidentEquipment::Branch(branch) => vec![branch.opposite(current)],
        IncidentEquipment::ThreeWindingLeg { leg, star } => network
            .three_winding_legs(star)
            .into_iter()
            .filter(|other| other.side != leg.side)
            .map(|other| &other.voltage_level)
            .collect(),
        IncidentEquipment::HvdcConverter { node, .. } => network
            .hvdc_peer(node)
            .map(|peer| vec![&peer.voltage_level])
            .unwrap_or_default(),
        IncidentEquipment::DanglingLine { node, .. } => network
            .tie_line_peer(node)
            .map(|peer| vec![&peer.voltage_level])
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::*;

    /// VL1 -line- VL2 -2wt- VL3, VL4 isolated.
    fn chain_network() -> Network {
        let mut network = Network::new();
        for (id, kv) in [("VL1", 400.0), ("VL2", 225.0), ("VL3", 63.0), ("VL4", 20.0)] {
            network.add_voltage_level(VoltageLevel::new(id, kv)).unwrap();
        }
        network.add_branch(Branch::line("LINE12", "VL1", "VL2")).unwrap();
        network
            .add_branch(Branch::two_winding_transformer("TR23", "VL2", "VL3"))
            .unwrap();
        network
    }

    fn ids(set: &ReachabilitySet) -> Vec<&str> {
        let mut ids: Vec<&str> = set.iter().map(|id| id.as_str()).collect();
        ids.sort();
        ids
    }

    #[test]
    fn test_depth_zero_is_seed_set() {
        let network = chain_network();
        let reached = filter_voltage_levels(&network, ["VL2", "VL4"], 0, &no_filter()).unwrap();
        assert_eq!(ids(&reached), vec!["VL2", "VL4"]);
    }

    #[test]
    fn test_chain_by_depth() {
        let network = chain_network();
        let d1 = filter_voltage_levels(&network, ["VL1"], 1, &no_filter()).unwrap();
        assert_eq!(ids(&d1), vec!["VL1", "VL2"]);
        let d2 = filter_voltage_levels(&network, ["VL1"], 2, &no_filter()).unwrap();
        assert_eq!(ids(&d2), vec!["VL1", "VL2", "VL3"]);
        let d9 = filter_voltage_levels(&network, ["VL1"], 9, &no_filter()).unwrap();
        assert!(!d9.contains("VL4"));
        assert_eq!(d9.len(), 3);
    }

    #[test]
    fn test_unknown_seed() {
        let network = chain_network();
        let err = filter_voltage_levels(&network, ["VL1", "VLX"], 1, &no_filter()).unwrap_err();
        assert!(matches!(err, GatError::UnknownVoltageLevel(id) if id == "VLX"));
    }

    #[test]
    fn test_predicate_prunes_neighbours_not_seeds() {
        let network = chain_network();
        let hv_only = nominal_voltage_at_least(Kilovolts(100.0));
        let reached = filter_voltage_levels(&network, ["VL3"], 2, &hv_only).unwrap();
        assert_eq!(ids(&reached), vec!["VL1", "VL2", "VL3"]);
        assert_eq!(reached.diagnostics.warning_count(), 1);

        let reached = filter_voltage_levels(&network, ["VL1"], 5, &hv_only).unwrap();
        assert_eq!(ids(&reached), vec!["VL1", "VL2"]);
        assert!(reached.diagnostics.is_empty());
    }

    #[test]
    fn test_three_winding_transformer_reaches_other_legs() {
        let mut network = chain_network();
        network.add_voltage_level(VoltageLevel::new("VL5", 90.0)).unwrap();
        network
            .add_three_winding_transformer(
                ThreeWindingTransformer::new("T3W"),
                ["VL4".into(), "VL5".into(), "VL3".into()],
            )
            .unwrap();
        let reached = filter_voltage_levels(&network, ["VL4"], 1, &no_filter()).unwrap();
        assert_eq!(ids(&reached), vec!["VL3", "VL4", "VL5"]);
    }

    #[test]
    fn test_hvdc_requires_line() {
        let mut network = chain_network();
        network
            .add_converter_station(ConverterStation::new("CS1", "VL1"))
            .unwrap();
        network
            .add_converter_station(ConverterStation::new("CS4", "VL4"))
            .unwrap();
        let reached = filter_voltage_levels(&network, ["VL4"], 3, &no_filter()).unwrap();
        assert_eq!(ids(&reached), vec!["VL4"]);

        network.add_hvdc_line(HvdcLine::new("HVDC1", "CS1", "CS4")).unwrap();
        let reached = filter_voltage_levels(&network, ["VL4"], 1, &no_filter()).unwrap();
        assert_eq!(ids(&reached), vec!["VL1", "VL4"]);
    }

    #[test]
    fn test_only_paired_dangling_lines_connect() {
        let mut network = chain_network();
        network.add_dangling_line(DanglingLine::new("DL3", "VL3")).unwrap();
        network.add_dangling_line(DanglingLine::new("DL4", "VL4")).unwrap();
        let reached = filter_voltage_levels(&network, ["VL4"], 2, &no_filter()).unwrap();
        assert_eq!(ids(&reached), vec!["VL4"]);

        network
            .pair_dangling_lines(TieLine::new("TL34", "DL3", "DL4"))
            .unwrap();
        let reached = filter_voltage_levels(&network, ["VL4"], 2, &no_filter()).unwrap();
        assert_eq!(ids(&reached), vec!["VL2", "VL3", "VL4"]);
    }

    #[test]
    fn test_monotonic_in_depth() {
        let network = chain_network();
        let mut previous = filter_voltage_levels(&network, ["VL3"], 0, &no_filter()).unwrap();
        for depth in 1..5 {
            let current = filter_voltage_levels(&network, ["VL3"], depth, &no_filter()).unwrap();
            assert!(previous.iter().all(|id| current.contains(id.as_str())));
            previous = current;
        }
    }

    #[test]
    fn test_duplicate_seeds_and_empty_seeds() {
        let network = chain_network();
        let reached = filter_voltage_levels(&network, ["VL1", "VL1"], 0, &no_filter()).unwrap();
        assert_eq!(reached.len(), 1);
        let none: [&str; 0] = [];
        assert!(filter_voltage_levels(&network, none, 3, &no_filter())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_next_depth_frontier_is_disjoint() {
        let network = chain_network();
        let added = next_depth_frontier(&network, ["VL1", "VL2"], &no_filter()).unwrap();
        assert_eq!(added, vec![VoltageLevelId::new("VL3")]);
        let added = next_depth_frontier(&network, ["VL4"], &no_filter()).unwrap();
        assert!(added.is_empty());
    }
}
