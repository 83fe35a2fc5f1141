//! External collaborators the service treats as black boxes.
//!
//! Implementations live outside this crate (network store, SVG renderer, filter
//! and geographic-data services). Remote lookups return `Ok(None)` for a missing
//! resource; the service turns that into [`Error::NotFound`](crate::Error::NotFound).

use std::io::Write;
use std::sync::Arc;

use gat_core::{EquipmentId, Network, SubstationId, VoltageLevelId};
use gat_viz::RenderPipeline;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config_store::VoltageLevelPosition;
use crate::error::Result;

/// Supplies read-only network snapshots.
pub trait NetworkModelProvider: Send + Sync {
    /// Fails with `NetworkNotFound` or `VariantNotFound` when the ids do not resolve.
    fn graph(&self, network_id: &str, variant_id: Option<&str>) -> Result<Arc<Network>>;
}

/// Latitude/longitude of a substation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstationGeoData {
    pub substation_id: SubstationId,
    pub coordinate: Coordinate,
}

/// What the renderer is asked to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagramSelection {
    VoltageLevel {
        id: VoltageLevelId,
    },
    Substation {
        id: SubstationId,
    },
    /// Network-area diagram over a set of voltage levels.
    Area {
        /// Sorted voltage-level ids.
        voltage_levels: Vec<VoltageLevelId>,
        depth: usize,
        geo_data: Vec<SubstationGeoData>,
        positions: Vec<VoltageLevelPosition>,
        scaling_factor: Option<f64>,
    },
}

impl DiagramSelection {
    /// Short description used in logs and errors.
    pub fn target(&self) -> String {
        match self {
            DiagramSelection::VoltageLevel { id } => format!("voltage level {id}"),
            DiagramSelection::Substation { id } => format!("substation {id}"),
            DiagramSelection::Area { voltage_levels, .. } => {
                format!("area of {} voltage levels", voltage_levels.len())
            }
        }
    }
}

/// Draws a diagram. SVG goes to `svg`; the returned value is the metadata document.
pub trait RendererBackend: Send + Sync {
    fn render(
        &self,
        pipeline: &RenderPipeline,
        network: &Network,
        selection: &DiagramSelection,
        svg: &mut dyn Write,
    ) -> anyhow::Result<serde_json::Value>;
}

/// Resolves saved equipment filters.
pub trait FilterExportClient: Send + Sync {
    fn equipment_ids(
        &self,
        network_id: &str,
        variant_id: Option<&str>,
        filter_id: Uuid,
    ) -> Result<Option<Vec<EquipmentId>>>;
}

pub trait GeoDataClient: Send + Sync {
    fn substation_positions(
        &self,
        network_id: &str,
        variant_id: Option<&str>,
        substation_ids: &[SubstationId],
    ) -> Result<Option<Vec<SubstationGeoData>>>;
}

/// Rendered diagram returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagramOutput {
    pub svg: String,
    pub metadata: serde_json::Value,
}
