//! Capability interfaces the rendering backend queries while drawing.
//!
//! The backend walks its own diagram graph and asks, per element, which CSS
//! classes to attach ([`StyleSource`]), which text to print next to a feeder
//! ([`LabelSource`]) and what to show in a bus legend ([`LegendSource`]).

use serde::Serialize;

use crate::legend::BusLegendEntry;

/// Diagram element the backend asks styles for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagramElement<'a> {
    /// One caption line of a bus legend, tagged by kind (`v`, `angle`, ...).
    BusCaption { kind: &'a str },
    Bus {
        voltage_level_id: &'a str,
        bus_id: &'a str,
        /// Position of the bus within its voltage level.
        bus_index: usize,
    },
    /// A branch drawn between two voltage levels or feeders.
    Line {
        equipment_id: &'a str,
        voltage_level_id: Option<&'a str>,
        bus_index: Option<usize>,
    },
    /// A feeder or switch node inside a voltage level.
    Node {
        equipment_id: &'a str,
        voltage_level_id: &'a str,
        bus_index: Option<usize>,
    },
}

impl<'a> DiagramElement<'a> {
    pub fn equipment_id(&self) -> Option<&'a str> {
        match *self {
            DiagramElement::Line { equipment_id, .. } | DiagramElement::Node { equipment_id, .. } => {
                Some(equipment_id)
            }
            DiagramElement::BusCaption { .. } | DiagramElement::Bus { .. } => None,
        }
    }

    pub fn voltage_level_id(&self) -> Option<&'a str> {
        match *self {
            DiagramElement::Bus { voltage_level_id, .. }
            | DiagramElement::Node { voltage_level_id, .. } => Some(voltage_level_id),
            DiagramElement::Line { voltage_level_id, .. } => voltage_level_id,
            DiagramElement::BusCaption { .. } => None,
        }
    }

    pub fn bus_index(&self) -> Option<usize> {
        match *self {
            DiagramElement::Bus { bus_index, .. } => Some(bus_index),
            DiagramElement::Line { bus_index, .. } | DiagramElement::Node { bus_index, .. } => {
                bus_index
            }
            DiagramElement::BusCaption { .. } => None,
        }
    }
}

/// Feeder as seen by a label source.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeederNode<'a> {
    pub equipment_id: &'a str,
    pub voltage_level_id: &'a str,
    pub name: Option<&'a str>,
    /// Explicit label; wins over name and id.
    pub label: Option<&'a str>,
}

impl<'a> FeederNode<'a> {
    /// Explicit label, else name (when `use_name`), else equipment id.
    pub fn display_label(&self, use_name: bool) -> &'a str {
        self.label
            .or(if use_name { self.name } else { None })
            .unwrap_or(self.equipment_id)
    }
}

/// Extra marking drawn on a feeder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeederDecoration {
    LimitViolation { style_class: String },
}

pub trait StyleSource {
    fn styles(&self, element: &DiagramElement<'_>) -> Vec<String>;
}

pub trait LabelSource {
    fn feeder_label(&self, node: &FeederNode<'_>) -> String;

    fn feeder_decoration(&self, _node: &FeederNode<'_>) -> Option<FeederDecoration> {
        None
    }
}

pub trait LegendSource {
    fn bus_legend(&self, bus_id: &str) -> Option<BusLegendEntry>;

    /// Instantaneous current caption for a bus, when one was supplied.
    fn bus_current(&self, _bus_id: &str) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_precedence() {
        let mut node = FeederNode {
            equipment_id: "GEN1",
            voltage_level_id: "VL1",
            name: Some("Blayais 1"),
            label: None,
        };
        assert_eq!(node.display_label(false), "GEN1");
        assert_eq!(node.display_label(true), "Blayais 1");
        node.label = Some("G-1");
        assert_eq!(node.display_label(true), "G-1");
        assert_eq!(node.display_label(false), "G-1");
    }

    #[test]
    fn test_element_accessors() {
        let line = DiagramElement::Line {
            equipment_id: "LINE1",
            voltage_level_id: None,
            bus_index: Some(2),
        };
        assert_eq!(line.equipment_id(), Some("LINE1"));
        assert_eq!(line.voltage_level_id(), None);
        assert_eq!(line.bus_index(), Some(2));
        assert_eq!(DiagramElement::BusCaption { kind: "v" }.equipment_id(), None);
    }
}
