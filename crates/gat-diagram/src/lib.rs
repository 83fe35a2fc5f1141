//! # GAT Diagram
//!
//! Diagram generation service on top of `gat-core` and `gat-viz`.
//!
//! ## Architecture
//!
//! ```text
//!                      ┌─► single_line_diagram (inline)
//! DiagramService ──────┤
//!                      └─► GenerationScheduler ──► filter_voltage_levels ──► RendererBackend
//! ```
//!
//! ## Core Components
//!
//! - [`DiagramService`]: entry point wiring collaborators, assembler and pool
//! - [`GenerationScheduler`]: fixed-size pool with awaitable handles
//! - [`InMemoryConfigStore`]: saved area-diagram configurations with position merging
//! - [`DiagramServiceConfig`]: `~/.gat/diagram.toml`

pub mod config;
pub mod config_store;
pub mod error;
pub mod logging;
pub mod providers;
pub mod scheduler;
pub mod service;

pub use config::{DiagramServiceConfig, LoggingConfig, RenderingConfig, SchedulerConfig};
pub use config_store::{
    merge_positions, DiagramConfig, DiagramConfigStore, DiagramConfigUpdate,
    InMemoryConfigStore, NewDiagramConfig, VoltageLevelPosition,
};
pub use error::{Error, ErrorClass, Result};
pub use logging::{init_from_config, init_logging};
pub use providers::{
    Coordinate, DiagramOutput, DiagramSelection, FilterExportClient, GeoDataClient,
    NetworkModelProvider, RendererBackend, SubstationGeoData,
};
pub use scheduler::{GenerationHandle, GenerationId, GenerationScheduler, PoolOccupancy};
pub use service::{AreaDiagramRequest, AreaSeeds, Collaborators, DiagramService};
