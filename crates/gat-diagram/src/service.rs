//! Main diagram service entry point.
//!
//! Single-line diagrams render inline on the caller's thread. Network-area
//! diagrams go through the [`GenerationScheduler`]: each task fetches its own
//! network snapshot, runs the reachability filter and renders.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use gat_core::{
    filter_voltage_levels, next_depth_frontier, no_filter, nominal_voltage_at_least,
    InclusionPredicate, Kilovolts, Network, SubstationId, VoltageLevelId,
};
use gat_viz::{ComponentLibraryRegistry, DiagramRequestConfig, PipelineAssembler};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::DiagramServiceConfig;
use crate::config_store::{DiagramConfigStore, VoltageLevelPosition};
use crate::error::{Error, Result};
use crate::providers::{
    DiagramOutput, DiagramSelection, FilterExportClient, GeoDataClient, NetworkModelProvider,
    RendererBackend,
};
use crate::scheduler::{GenerationHandle, GenerationScheduler, PoolOccupancy};

/// External collaborators wired into the service.
#[derive(Clone)]
pub struct Collaborators {
    pub networks: Arc<dyn NetworkModelProvider>,
    pub renderer: Arc<dyn RendererBackend>,
    pub filters: Arc<dyn FilterExportClient>,
    pub geo: Arc<dyn GeoDataClient>,
    pub configs: Arc<dyn DiagramConfigStore>,
}

/// Where an area diagram's seed voltage levels come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AreaSeeds {
    VoltageLevels { ids: Vec<VoltageLevelId> },
    /// Voltage levels of the equipment matched by a saved filter.
    Filter { filter_id: Uuid },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaDiagramRequest {
    pub network_id: String,
    #[serde(default)]
    pub variant_id: Option<String>,
    pub seeds: AreaSeeds,
    #[serde(default)]
    pub depth: usize,
    /// Hide voltage levels below this nominal voltage (seeds are always kept).
    #[serde(default)]
    pub min_nominal_voltage_kv: Option<f64>,
    /// Attach substation coordinates from the geographic-data service.
    #[serde(default)]
    pub with_geo_data: bool,
    #[serde(default)]
    pub positions: Vec<VoltageLevelPosition>,
    #[serde(default)]
    pub scaling_factor: Option<f64>,
    #[serde(default)]
    pub render: DiagramRequestConfig,
}

impl AreaDiagramRequest {
    pub fn new(network_id: impl Into<String>, seeds: AreaSeeds, depth: usize) -> Self {
        Self {
            network_id: network_id.into(),
            variant_id: None,
            seeds,
            depth,
            min_nominal_voltage_kv: None,
            with_geo_data: false,
            positions: Vec::new(),
            scaling_factor: None,
            render: DiagramRequestConfig::default(),
        }
    }

    fn predicate(&self) -> InclusionPredicate {
        match self.min_nominal_voltage_kv {
            Some(kv) => nominal_voltage_at_least(Kilovolts(kv)),
            None => no_filter(),
        }
    }
}

/// State shared with generation tasks.
struct Renderer {
    collaborators: Collaborators,
    assembler: PipelineAssembler,
    default_component_library: String,
}

impl Renderer {
    fn render(
        &self,
        network: Arc<Network>,
        request: &DiagramRequestConfig,
        selection: DiagramSelection,
    ) -> Result<DiagramOutput> {
        let mut request = request.clone();
        if request.component_library.trim().is_empty() {
            request.component_library = self.default_component_library.clone();
        }
        let pipeline = self.assembler.assemble(&request, Arc::clone(&network))?;

        let mut svg = Vec::new();
        let metadata = self
            .collaborators
            .renderer
            .render(&pipeline, &network, &selection, &mut svg)
            .map_err(|source| Error::Render {
                target: selection.target(),
                source,
            })?;
        let svg = String::from_utf8(svg)
            .map_err(|e| Error::Serialization(format!("renderer emitted invalid UTF-8: {e}")))?;
        Ok(DiagramOutput { svg, metadata })
    }

    fn seed_voltage_levels(
        &self,
        network: &Network,
        request: &AreaDiagramRequest,
    ) -> Result<Vec<VoltageLevelId>> {
        match &request.seeds {
            AreaSeeds::VoltageLevels { ids } => Ok(ids.clone()),
            AreaSeeds::Filter { filter_id } => {
                let equipment = self
                    .collaborators
                    .filters
                    .equipment_ids(
                        &request.network_id,
                        request.variant_id.as_deref(),
                        *filter_id,
                    )?
                    .ok_or_else(|| Error::NotFound(format!("filter {filter_id}")))?;
                let mut seeds = BTreeSet::new();
                for id in &equipment {
                    seeds.extend(network.equipment_voltage_levels(id.as_str())?);
                }
                debug!(%filter_id, equipment = equipment.len(), seeds = seeds.len(), "filter resolved");
                Ok(seeds.into_iter().collect())
            }
        }
    }

    fn area_diagram(&self, request: &AreaDiagramRequest) -> Result<DiagramOutput> {
        let started = Instant::now();
        let network = self
            .collaborators
            .networks
            .graph(&request.network_id, request.variant_id.as_deref())?;

        let seeds = self.seed_voltage_levels(&network, request)?;
        let reached = filter_voltage_levels(&network, &seeds, request.depth, &request.predicate())?;
        let voltage_levels = reached.sorted_ids();

        let geo_data = if request.with_geo_data {
            let substations: Vec<SubstationId> = voltage_levels
                .iter()
                .filter_map(|id| network.voltage_level(id.as_str()).ok())
                .filter_map(|vl| vl.substation_id.clone())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            self.collaborators
                .geo
                .substation_positions(
                    &request.network_id,
                    request.variant_id.as_deref(),
                    &substations,
                )?
                .ok_or_else(|| {
                    Error::NotFound(format!("geographic data for network {}", request.network_id))
                })?
        } else {
            Vec::new()
        };

        let selection = DiagramSelection::Area {
            voltage_levels,
            depth: request.depth,
            geo_data,
            positions: request.positions.clone(),
            scaling_factor: request.scaling_factor,
        };
        let output = self.render(Arc::clone(&network), &request.render, selection)?;
        info!(
            network = %request.network_id,
            voltage_levels = reached.len(),
            warnings = reached.diagnostics.warning_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "area diagram generated"
        );
        Ok(output)
    }
}

/// Diagram generation service.
///
/// # Example
///
/// ```ignore
/// let service = DiagramService::with_config(DiagramServiceConfig::load()?, collaborators)?;
/// let handle = service.network_area_diagram(request)?;
/// let output = handle.wait().await?;
/// ```
pub struct DiagramService {
    renderer: Arc<Renderer>,
    scheduler: GenerationScheduler,
    config: DiagramServiceConfig,
}

impl DiagramService {
    /// Create a service with the bundled component libraries.
    pub fn with_config(config: DiagramServiceConfig, collaborators: Collaborators) -> Result<Self> {
        Self::with_libraries(config, collaborators, ComponentLibraryRegistry::with_defaults())
    }

    pub fn with_libraries(
        config: DiagramServiceConfig,
        collaborators: Collaborators,
        libraries: ComponentLibraryRegistry,
    ) -> Result<Self> {
        let assembler = PipelineAssembler::new(Arc::new(libraries))
            .with_undefined_symbol(config.rendering.undefined_symbol.clone());
        // Fail at start rather than on the first request.
        assembler
            .libraries()
            .find(&config.rendering.default_component_library)?;

        let scheduler = GenerationScheduler::new(config.scheduler.worker_threads)?;
        Ok(Self {
            renderer: Arc::new(Renderer {
                collaborators,
                assembler,
                default_component_library: config.rendering.default_component_library.clone(),
            }),
            scheduler,
            config,
        })
    }

    pub fn config(&self) -> &DiagramServiceConfig {
        &self.config
    }

    pub fn config_store(&self) -> &Arc<dyn DiagramConfigStore> {
        &self.renderer.collaborators.configs
    }

    pub fn occupancy(&self) -> PoolOccupancy {
        self.scheduler.occupancy()
    }

    /// Render a voltage level or substation diagram on the calling thread.
    pub fn single_line_diagram(
        &self,
        network_id: &str,
        variant_id: Option<&str>,
        target: &str,
        request: &DiagramRequestConfig,
    ) -> Result<DiagramOutput> {
        info!(network = network_id, target_id = target, "single-line diagram requested");
        let network = self
            .renderer
            .collaborators
            .networks
            .graph(network_id, variant_id)?;

        let selection = if let Ok(vl) = network.voltage_level(target) {
            DiagramSelection::VoltageLevel { id: vl.id.clone() }
        } else if let Ok(substation) = network.substation(target) {
            DiagramSelection::Substation {
                id: substation.id.clone(),
            }
        } else {
            return Err(Error::NotFound(format!(
                "voltage level or substation {target}"
            )));
        };

        self.renderer.render(network, request, selection)
    }

    /// Queue a network-area diagram.
    pub fn network_area_diagram(
        &self,
        request: AreaDiagramRequest,
    ) -> Result<GenerationHandle<DiagramOutput>> {
        info!(
            network = %request.network_id,
            depth = request.depth,
            "area diagram requested"
        );
        let renderer = Arc::clone(&self.renderer);
        self.scheduler
            .submit(move || renderer.area_diagram(&request))
    }

    /// Queue an area diagram seeded by the voltage levels of a filter's equipment.
    pub fn network_area_diagram_from_filter(
        &self,
        network_id: &str,
        variant_id: Option<&str>,
        filter_id: Uuid,
        depth: usize,
        render: DiagramRequestConfig,
    ) -> Result<GenerationHandle<DiagramOutput>> {
        let mut request = AreaDiagramRequest::new(network_id, AreaSeeds::Filter { filter_id }, depth);
        request.variant_id = variant_id.map(str::to_string);
        request.render = render;
        self.network_area_diagram(request)
    }

    /// Queue an area diagram from a saved configuration: its seeds, depth and positions.
    pub fn network_area_diagram_from_config(
        &self,
        config_id: Uuid,
        network_id: &str,
        variant_id: Option<&str>,
        render: DiagramRequestConfig,
    ) -> Result<GenerationHandle<DiagramOutput>> {
        let saved = self.config_store().get(config_id)?;
        let mut request = AreaDiagramRequest::new(
            network_id,
            AreaSeeds::VoltageLevels {
                ids: saved.voltage_level_ids,
            },
            saved.depth,
        );
        request.variant_id = variant_id.map(str::to_string);
        request.positions = saved.positions;
        request.scaling_factor = saved.scaling_factor;
        request.render = render;
        self.network_area_diagram(request)
    }

    /// Voltage levels one step beyond `current`, for "expand" actions.
    pub fn next_depth_voltage_levels(
        &self,
        network_id: &str,
        variant_id: Option<&str>,
        current: &[VoltageLevelId],
    ) -> Result<Vec<VoltageLevelId>> {
        let network = self
            .renderer
            .collaborators
            .networks
            .graph(network_id, variant_id)?;
        Ok(next_depth_frontier(&network, current, &no_filter())?)
    }

    /// Stop accepting area-diagram work and wait for running tasks.
    pub fn shutdown(&self) {
        self.scheduler.shutdown();
    }
}
