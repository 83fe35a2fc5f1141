//! Named component libraries (symbol sets) available to the renderer.
//!
//! The registry is an explicit value built at service start and handed to the
//! [`PipelineAssembler`](crate::PipelineAssembler).

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::error::{VizError, VizResult};

pub const DEFAULT_COMPONENT_LIBRARY: &str = "GridSuiteAndConvergence";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentLibrary {
    pub name: String,
    /// Style sheets shipped with the symbol set, in load order.
    pub style_sheets: Vec<String>,
}

impl ComponentLibrary {
    pub fn new(name: impl Into<String>, style_sheets: &[&str]) -> Self {
        Self {
            name: name.into(),
            style_sheets: style_sheets.iter().map(|s| s.to_string()).collect(),
        }
    }
}

pub type ComponentLibraryHandle = Arc<ComponentLibrary>;

#[derive(Debug, Clone, Default)]
pub struct ComponentLibraryRegistry {
    libraries: BTreeMap<String, ComponentLibraryHandle>,
}

impl ComponentLibraryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the libraries bundled with the renderer.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(ComponentLibrary::new(
            DEFAULT_COMPONENT_LIBRARY,
            &["components.css", "convergence.css", "gridsuite.css"],
        ));
        registry.register(ComponentLibrary::new(
            "Convergence",
            &["components.css", "convergence.css"],
        ));
        registry.register(ComponentLibrary::new("FlatDesign", &["flat-design.css"]));
        registry
    }

    /// Add or replace a library, returning the one it replaced.
    pub fn register(&mut self, library: ComponentLibrary) -> Option<ComponentLibraryHandle> {
        self.libraries
            .insert(library.name.clone(), Arc::new(library))
    }

    pub fn find(&self, name: &str) -> VizResult<ComponentLibraryHandle> {
        self.libraries
            .get(name)
            .cloned()
            .ok_or_else(|| VizError::ComponentLibraryNotFound(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.libraries.keys().map(String::as_str)
    }
}
