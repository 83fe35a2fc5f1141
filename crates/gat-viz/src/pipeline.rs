//! Turns a [`DiagramRequestConfig`] into the immutable bundle the renderer runs.

use std::sync::Arc;

use gat_core::Network;
use serde::Serialize;
use tracing::debug;

use crate::error::VizResult;
use crate::labels::{FeederPositionLabels, LabelProvider, StateVariableLabels};
use crate::layout::LayoutFactorySelector;
use crate::legend::{LegendAggregator, DEFAULT_UNDEFINED_SYMBOL};
use crate::library::{ComponentLibraryHandle, ComponentLibraryRegistry};
use crate::request::{DiagramRequestConfig, DisplayMode, SubstationLayout};
use crate::style::{LimitViolationIndex, StyleChain, StyleChainBuilder};

/// Scalar rendering switches passed through to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderParameters {
    pub diagonal_label: bool,
    pub center_label: bool,
    pub substation_layout: SubstationLayout,
    pub display_mode: DisplayMode,
    pub language: String,
}

#[derive(Debug, Clone)]
pub struct RenderPipeline {
    pub layout: LayoutFactorySelector,
    pub labels: LabelProvider,
    pub styles: StyleChain,
    pub component_library: ComponentLibraryHandle,
    pub parameters: RenderParameters,
}

#[derive(Debug, Clone)]
pub struct PipelineAssembler {
    libraries: Arc<ComponentLibraryRegistry>,
    undefined_symbol: String,
}

impl PipelineAssembler {
    pub fn new(libraries: Arc<ComponentLibraryRegistry>) -> Self {
        Self {
            libraries,
            undefined_symbol: DEFAULT_UNDEFINED_SYMBOL.to_string(),
        }
    }

    pub fn with_undefined_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.undefined_symbol = symbol.into();
        self
    }

    pub fn libraries(&self) -> &ComponentLibraryRegistry {
        &self.libraries
    }

    /// Validate the request and compose layout, labels and styles for it.
    ///
    /// Checks run in order: substation layout, component library, display mode.
    /// The first failure is returned and nothing is built.
    pub fn assemble(
        &self,
        config: &DiagramRequestConfig,
        network: Arc<Network>,
    ) -> VizResult<RenderPipeline> {
        let substation_layout: SubstationLayout = config.substation_layout.parse()?;
        let component_library = self.libraries.find(&config.component_library)?;
        let display_mode: DisplayMode = config.display_mode.parse()?;

        let violations = LimitViolationIndex::from_violations(&config.current_limit_violations);
        let (labels, bus_legend, diagonal_label) = match display_mode {
            DisplayMode::FeederPosition => (
                LabelProvider::FeederPosition(FeederPositionLabels::new(
                    Arc::clone(&network),
                    config.use_name,
                )),
                false,
                true,
            ),
            DisplayMode::StateVariable => (
                LabelProvider::StateVariable(StateVariableLabels::new(
                    LegendAggregator::new(Arc::clone(&network))
                        .with_undefined_symbol(self.undefined_symbol.clone()),
                    config.use_name,
                    violations.clone(),
                    &config.bus_currents,
                )),
                true,
                config.diagonal_label,
            ),
        };

        let styles = StyleChainBuilder::new(&network)
            .bus_legend(bus_legend)
            .build(config, &violations);

        debug!(
            library = %component_library.name,
            ?display_mode,
            ?substation_layout,
            violations = violations.len(),
            "assembled render pipeline"
        );

        Ok(RenderPipeline {
            layout: LayoutFactorySelector::new(network, substation_layout),
            labels,
            styles,
            component_library,
            parameters: RenderParameters {
                diagonal_label,
                center_label: config.center_label,
                substation_layout,
                display_mode,
                language: config.language.clone(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VizError;
    use crate::provider::{DiagramElement, FeederNode, LabelSource, LegendSource, StyleSource};
    use crate::style::{StyleContributorKind, VOLTAGE_CAPTION_STYLE_CLASS};
    use gat_core::{Bus, VoltageLevel};

    fn network() -> Arc<Network> {
        let mut network = Network::new();
        network
            .add_voltage_level(
                VoltageLevel::new("VL1", 400.0)
                    .with_bus(Bus::new("B1"))
                    .with_feeder_position("LINE1", 7),
            )
            .unwrap();
        Arc::new(network)
    }

    fn assembler() -> PipelineAssembler {
        PipelineAssembler::new(Arc::new(ComponentLibraryRegistry::with_defaults()))
            .with_undefined_symbol("?")
    }

    #[test]
    fn test_unsupported_substation_layout() {
        let config = DiagramRequestConfig {
            substation_layout: "diagonal".to_string(),
            ..Default::default()
        };
        let err = assembler().assemble(&config, network()).unwrap_err();
        assert!(matches!(err, VizError::InvalidSubstationLayout(v) if v == "diagonal"));
    }

    #[test]
    fn test_layout_checked_before_library_and_mode() {
        let config = DiagramRequestConfig {
            substation_layout: "diagonal".to_string(),
            component_library: "Missing".to_string(),
            display_mode: "bogus".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            assembler().assemble(&config, network()),
            Err(VizError::InvalidSubstationLayout(_))
        ));
    }

    #[test]
    fn test_unknown_library_and_display_mode() {
        let config = DiagramRequestConfig {
            component_library: "Missing".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            assembler().assemble(&config, network()),
            Err(VizError::ComponentLibraryNotFound(name)) if name == "Missing"
        ));

        let config = DiagramRequestConfig {
            display_mode: "bogus".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            assembler().assemble(&config, network()),
            Err(VizError::InvalidDisplayMode(mode)) if mode == "bogus"
        ));
    }

    #[test]
    fn test_feeder_position_mode() {
        let config = DiagramRequestConfig {
            display_mode: "FEEDER_POSITION".to_string(),
            substation_layout: "vertical".to_string(),
            diagonal_label: false,
            ..Default::default()
        };
        let pipeline = assembler().assemble(&config, network()).unwrap();
        assert!(pipeline.parameters.diagonal_label);
        assert_eq!(pipeline.parameters.substation_layout, SubstationLayout::Vertical);
        assert_eq!(
            pipeline.styles.kinds(),
            vec![
                StyleContributorKind::BaseColor,
                StyleContributorKind::OperatingStatus,
                StyleContributorKind::LimitViolation,
                StyleContributorKind::BusLegend,
            ]
        );
        assert!(pipeline
            .styles
            .styles(&DiagramElement::BusCaption { kind: "v" })
            .is_empty());
        let node = FeederNode {
            equipment_id: "LINE1",
            voltage_level_id: "VL1",
            ..Default::default()
        };
        assert_eq!(pipeline.labels.feeder_label(&node), "LINE1 pos: 7");
        assert!(pipeline.labels.bus_legend("B1").is_none());
    }

    #[test]
    fn test_state_variable_mode() {
        let pipeline = assembler()
            .assemble(&DiagramRequestConfig::default(), network())
            .unwrap();
        assert!(!pipeline.parameters.diagonal_label);
        assert_eq!(pipeline.parameters.display_mode, DisplayMode::StateVariable);
        assert_eq!(
            pipeline.styles.styles(&DiagramElement::BusCaption { kind: "v" }),
            vec![VOLTAGE_CAPTION_STYLE_CLASS.to_string()]
        );
        let legend = pipeline.labels.bus_legend("B1").unwrap();
        assert_eq!(legend.formatted_voltage, "?");
        assert_eq!(pipeline.component_library.name, "GridSuiteAndConvergence");
    }
}
