//! # GAT Viz
//!
//! Rendering strategy assembly for single-line and network-area diagrams.
//!
//! The geometry and SVG output belong to an external renderer. This crate decides
//! *what* that renderer runs for one request:
//!
//! ```text
//! DiagramRequestConfig ──► PipelineAssembler ──► RenderPipeline
//!                                                  ├─ LayoutFactorySelector
//!                                                  ├─ LabelProvider ──► LegendAggregator
//!                                                  ├─ StyleChain (4 contributors)
//!                                                  └─ ComponentLibraryHandle
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use gat_viz::{ComponentLibraryRegistry, DiagramRequestConfig, PipelineAssembler};
//!
//! let assembler = PipelineAssembler::new(Arc::new(ComponentLibraryRegistry::with_defaults()));
//! let pipeline = assembler.assemble(&DiagramRequestConfig::default(), network)?;
//! ```

pub mod error;
pub mod labels;
pub mod layout;
pub mod legend;
pub mod library;
pub mod pipeline;
pub mod provider;
pub mod request;
pub mod style;

pub use error::{VizError, VizResult};
pub use labels::{FeederPositionLabels, LabelProvider, StateVariableLabels};
pub use layout::{LayoutFactorySelector, LayoutStrategy};
pub use legend::{BusLegendEntry, LegendAggregator, DEFAULT_UNDEFINED_SYMBOL};
pub use library::{
    ComponentLibrary, ComponentLibraryHandle, ComponentLibraryRegistry, DEFAULT_COMPONENT_LIBRARY,
};
pub use pipeline::{PipelineAssembler, RenderParameters, RenderPipeline};
pub use provider::{
    DiagramElement, FeederDecoration, FeederNode, LabelSource, LegendSource, StyleSource,
};
pub use request::{
    BaseVoltageBand, CurrentLimitViolation, DiagramRequestConfig, DisplayMode, SubstationLayout,
};
pub use style::{LimitViolationIndex, StyleChain, StyleChainBuilder, StyleContributorKind};
