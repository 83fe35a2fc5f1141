//! Assembles pipelines the way the service does and queries them like a renderer.

use std::sync::Arc;

use gat_core::{Branch, Bus, Gen, Load, Network, OperatingStatus, TopologyKind, VoltageLevel};
use gat_viz::{
    BaseVoltageBand, ComponentLibraryRegistry, CurrentLimitViolation, DiagramElement,
    DiagramRequestConfig, FeederDecoration, FeederNode, LabelSource, LayoutStrategy,
    LegendSource, PipelineAssembler, StyleSource, VizError,
};

fn network() -> Arc<Network> {
    let mut network = Network::new();
    network
        .add_voltage_level(
            VoltageLevel::new("VL400", 400.0)
                .with_bus(Bus::new("B400").with_state(405.04, 2.0))
                .with_feeder_position("LINE1", 10),
        )
        .unwrap();
    network
        .add_voltage_level(
            VoltageLevel::new("VL63", 63.0)
                .with_topology(TopologyKind::NodeBreaker)
                .with_bus(Bus::new("B63")),
        )
        .unwrap();
    network.add_branch(Branch::line("LINE1", "VL400", "VL63")).unwrap();
    network
        .add_branch(Branch::line("LINE2", "VL400", "VL63").with_status(OperatingStatus::PlannedOutage))
        .unwrap();
    network
        .add_generator(Gen::new("G1", "VL400", "B400").with_active_power(-480.0))
        .unwrap();
    network
        .add_load(Load::new("L1", "VL400", "B400").with_active_power(12.4))
        .unwrap();
    Arc::new(network)
}

fn assembler() -> PipelineAssembler {
    PipelineAssembler::new(Arc::new(ComponentLibraryRegistry::with_defaults()))
}

fn line<'a>(equipment_id: &'a str, voltage_level_id: &'a str) -> DiagramElement<'a> {
    DiagramElement::Line {
        equipment_id,
        voltage_level_id: Some(voltage_level_id),
        bus_index: None,
    }
}

#[test]
fn state_variable_pipeline_styles_labels_and_legends() {
    let config = DiagramRequestConfig {
        current_limit_violations: vec![CurrentLimitViolation::new("LINE1", Some("IST Limit (A)"))],
        ..Default::default()
    };
    let pipeline = assembler().assemble(&config, network()).unwrap();

    assert_eq!(
        pipeline.styles.styles(&line("LINE1", "VL400")),
        vec!["sld-vl300to500", "sld-overload-ist-limit-a"]
    );
    assert_eq!(
        pipeline.styles.styles(&line("LINE2", "VL63")),
        vec!["sld-vl50to70", "sld-planned-outage"]
    );
    assert_eq!(
        pipeline.styles.styles(&DiagramElement::BusCaption { kind: "p_prod" }),
        vec!["sld-bus-legend-production"]
    );
    assert!(pipeline
        .styles
        .styles(&DiagramElement::BusCaption { kind: "unknown" })
        .is_empty());

    let feeder = FeederNode {
        equipment_id: "LINE1",
        voltage_level_id: "VL400",
        ..Default::default()
    };
    assert_eq!(pipeline.labels.feeder_label(&feeder), "LINE1");
    assert_eq!(
        pipeline.labels.feeder_decoration(&feeder),
        Some(FeederDecoration::LimitViolation {
            style_class: "sld-overload-ist-limit-a".to_string()
        })
    );

    let legend = pipeline.labels.bus_legend("B400").unwrap();
    assert_eq!(legend.formatted_voltage, "405.0 kV");
    assert_eq!(legend.formatted_angle, "2.0°");
    assert_eq!(legend.formatted_production, "480 MW");
    assert_eq!(legend.formatted_consumption, "12 MW");

    let empty = pipeline.labels.bus_legend("B63").unwrap();
    assert_eq!(empty.formatted_production, "\u{2014}");
    assert_eq!(empty.formatted_consumption, "\u{2014}");
}

#[test]
fn feeder_position_pipeline_and_layout_selection() {
    let config = DiagramRequestConfig {
        display_mode: "feeder-position".to_string(),
        topological_coloring: true,
        ..Default::default()
    };
    let pipeline = assembler().assemble(&config, network()).unwrap();

    let feeder = FeederNode {
        equipment_id: "LINE1",
        voltage_level_id: "VL400",
        name: Some("Line one"),
        label: None,
    };
    assert_eq!(pipeline.labels.feeder_label(&feeder), "LINE1 pos: 10");
    assert!(pipeline.labels.bus_legend("B400").is_none());
    assert!(pipeline.parameters.diagonal_label);

    let bus = DiagramElement::Bus {
        voltage_level_id: "VL63",
        bus_id: "B63",
        bus_index: 2,
    };
    assert_eq!(pipeline.styles.styles(&bus), vec!["sld-bus-2"]);

    assert_eq!(pipeline.layout.strategy_for("VL400").unwrap(), LayoutStrategy::Position);
    assert_eq!(pipeline.layout.strategy_for("VL63").unwrap(), LayoutStrategy::Clustering);
}

#[test]
fn custom_bands_outside_default_profile_are_ignored() {
    let mut other = BaseVoltageBand::new("hv", 300.0, 500.0);
    other.profile = Some("Alternative".to_string());
    let config = DiagramRequestConfig {
        base_voltage_bands: vec![other, BaseVoltageBand::new("ehv", 350.0, 1000.0)],
        ..Default::default()
    };
    let pipeline = assembler().assemble(&config, network()).unwrap();
    assert_eq!(pipeline.styles.styles(&line("LINE1", "VL400")), vec!["sld-ehv"]);
    assert!(pipeline.styles.styles(&line("LINE1", "VL63")).is_empty());
}

#[test]
fn rejects_unknown_values() {
    let config = DiagramRequestConfig {
        substation_layout: "diagonal".to_string(),
        ..Default::default()
    };
    assert!(matches!(
        assembler().assemble(&config, network()),
        Err(VizError::InvalidSubstationLayout(_))
    ));
}
