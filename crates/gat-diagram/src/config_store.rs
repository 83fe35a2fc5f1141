//! Saved network-area diagram configurations.
//!
//! A configuration stores the seed voltage levels, the depth and the manual
//! positions of voltage levels. Updates merge positions instead of replacing
//! them: an update entry matches an existing position first by position id,
//! then by voltage-level id, and is inserted when neither matches. When a batch
//! names the same voltage level several times, the last entry wins.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use gat_core::VoltageLevelId;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoltageLevelPosition {
    /// Assigned by the store; `None` in new entries.
    #[serde(default)]
    pub id: Option<Uuid>,
    pub voltage_level_id: VoltageLevelId,
    pub x_position: Option<f64>,
    pub y_position: Option<f64>,
    pub x_label_position: Option<f64>,
    pub y_label_position: Option<f64>,
}

impl VoltageLevelPosition {
    pub fn new(voltage_level_id: impl Into<VoltageLevelId>, x: f64, y: f64) -> Self {
        Self {
            id: None,
            voltage_level_id: voltage_level_id.into(),
            x_position: Some(x),
            y_position: Some(y),
            x_label_position: None,
            y_label_position: None,
        }
    }

    pub fn with_label_position(mut self, x: f64, y: f64) -> Self {
        self.x_label_position = Some(x);
        self.y_label_position = Some(y);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramConfig {
    pub id: Uuid,
    pub depth: usize,
    pub scaling_factor: Option<f64>,
    pub voltage_level_ids: Vec<VoltageLevelId>,
    pub positions: Vec<VoltageLevelPosition>,
    pub updated_at: DateTime<Utc>,
}

/// Body of a create request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewDiagramConfig {
    pub depth: usize,
    pub scaling_factor: Option<f64>,
    pub voltage_level_ids: Vec<VoltageLevelId>,
    pub positions: Vec<VoltageLevelPosition>,
}

/// Body of an update request. Scalars overwrite when present; positions merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramConfigUpdate {
    pub depth: Option<usize>,
    pub scaling_factor: Option<f64>,
    pub voltage_level_ids: Option<Vec<VoltageLevelId>>,
    pub positions: Vec<VoltageLevelPosition>,
}

/// CRUD keyed by an opaque config id.
pub trait DiagramConfigStore: Send + Sync {
    fn create(&self, config: NewDiagramConfig) -> Result<Uuid>;
    fn get(&self, id: Uuid) -> Result<DiagramConfig>;
    fn update(&self, id: Uuid, update: DiagramConfigUpdate) -> Result<DiagramConfig>;
    fn delete(&self, id: Uuid) -> Result<()>;
}

/// Keep only the last entry per voltage level, in the order those entries appear.
fn last_per_voltage_level(entries: Vec<VoltageLevelPosition>) -> Vec<VoltageLevelPosition> {
    let mut seen = HashSet::new();
    let mut kept: Vec<VoltageLevelPosition> = entries
        .into_iter()
        .rev()
        .filter(|p| seen.insert(p.voltage_level_id.clone()))
        .collect();
    kept.reverse();
    kept
}

/// Apply a batch of position updates to `existing`.
pub fn merge_positions(existing: &mut Vec<VoltageLevelPosition>, updates: Vec<VoltageLevelPosition>) {
    for update in last_per_voltage_level(updates) {
        let slot = update
            .id
            .and_then(|id| existing.iter().position(|p| p.id == Some(id)))
            .or_else(|| {
                existing
                    .iter()
                    .position(|p| p.voltage_level_id == update.voltage_level_id)
            });
        match slot {
            Some(i) => {
                let id = existing[i].id.or(update.id);
                existing[i] = VoltageLevelPosition { id, ..update };
            }
            None => existing.push(VoltageLevelPosition {
                id: Some(update.id.unwrap_or_else(Uuid::new_v4)),
                ..update
            }),
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryConfigStore {
    configs: DashMap<Uuid, DiagramConfig>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}

fn config_not_found(id: Uuid) -> Error {
    Error::NotFound(format!("diagram config {id}"))
}

impl DiagramConfigStore for InMemoryConfigStore {
    fn create(&self, config: NewDiagramConfig) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let mut positions = Vec::new();
        merge_positions(&mut positions, config.positions);
        self.configs.insert(
            id,
            DiagramConfig {
                id,
                depth: config.depth,
                scaling_factor: config.scaling_factor,
                voltage_level_ids: config.voltage_level_ids,
                positions,
                updated_at: Utc::now(),
            },
        );
        debug!(%id, "diagram config created");
        Ok(id)
    }

    fn get(&self, id: Uuid) -> Result<DiagramConfig> {
        self.configs
            .get(&id)
            .map(|c| c.value().clone())
            .ok_or_else(|| config_not_found(id))
    }

    fn update(&self, id: Uuid, update: DiagramConfigUpdate) -> Result<DiagramConfig> {
        let mut config = self.configs.get_mut(&id).ok_or_else(|| config_not_found(id))?;
        if let Some(depth) = update.depth {
            config.depth = depth;
        }
        if let Some(scaling_factor) = update.scaling_factor {
            config.scaling_factor = Some(scaling_factor);
        }
        if let Some(ids) = update.voltage_level_ids {
            config.voltage_level_ids = ids;
        }
        merge_positions(&mut config.positions, update.positions);
        config.updated_at = Utc::now();
        debug!(%id, positions = config.positions.len(), "diagram config updated");
        Ok(config.value().clone())
    }

    fn delete(&self, id: Uuid) -> Result<()> {
        self.configs
            .remove(&id)
            .map(|_| debug!(%id, "diagram config deleted"))
            .ok_or_else(|| config_not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(positions: Vec<VoltageLevelPosition>) -> (InMemoryConfigStore, Uuid) {
        let store = InMemoryConfigStore::new();
        let id = store
            .create(NewDiagramConfig {
                depth: 1,
                voltage_level_ids: vec!["VL1".into()],
                positions,
                ..Default::default()
            })
            .unwrap();
        (store, id)
    }

    #[test]
    fn test_create_assigns_position_ids() {
        let (store, id) = store_with(vec![
            VoltageLevelPosition::new("VL1", 0.0, 0.0),
            VoltageLevelPosition::new("VL2", 1.0, 1.0),
        ]);
        let config = store.get(id).unwrap();
        assert_eq!(config.depth, 1);
        assert!(config.positions.iter().all(|p| p.id.is_some()));
    }

    #[test]
    fn test_update_matches_by_voltage_level_then_inserts() {
        let (store, id) = store_with(vec![VoltageLevelPosition::new("VL1", 0.0, 0.0)]);
        let original_id = store.get(id).unwrap().positions[0].id;

        let config = store
            .update(
                id,
                DiagramConfigUpdate {
                    positions: vec![
                        VoltageLevelPosition::new("VL1", 5.0, 6.0),
                        VoltageLevelPosition::new("VL3", 7.0, 8.0),
                    ],
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(config.positions.len(), 2);
        assert_eq!(config.positions[0].id, original_id);
        assert_eq!(config.positions[0].x_position, Some(5.0));
        assert_eq!(config.positions[1].voltage_level_id.as_str(), "VL3");
        assert!(config.positions[1].id.is_some());
    }

    #[test]
    fn test_update_matches_by_position_id_first() {
        let (store, id) = store_with(vec![VoltageLevelPosition::new("VL1", 0.0, 0.0)]);
        let position_id = store.get(id).unwrap().positions[0].id;

        let mut renamed = VoltageLevelPosition::new("VL1_NEW", 2.0, 2.0);
        renamed.id = position_id;
        let config = store
            .update(
                id,
                DiagramConfigUpdate {
                    positions: vec![renamed],
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(config.positions.len(), 1);
        assert_eq!(config.positions[0].voltage_level_id.as_str(), "VL1_NEW");
        assert_eq!(config.positions[0].id, position_id);
    }

    #[test]
    fn test_last_duplicate_in_batch_wins() {
        let (store, id) = store_with(Vec::new());
        let config = store
            .update(
                id,
                DiagramConfigUpdate {
                    depth: Some(3),
                    positions: vec![
                        VoltageLevelPosition::new("VL2", 1.0, 1.0),
                        VoltageLevelPosition::new("VL2", 9.0, 9.0).with_label_position(1.0, 2.0),
                    ],
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(config.depth, 3);
        assert_eq!(config.positions.len(), 1);
        assert_eq!(config.positions[0].x_position, Some(9.0));
        assert_eq!(config.positions[0].y_label_position, Some(2.0));
    }

    #[test]
    fn test_missing_config() {
        let store = InMemoryConfigStore::new();
        let id = Uuid::new_v4();
        assert!(matches!(store.get(id), Err(Error::NotFound(_))));
        assert!(matches!(
            store.update(id, DiagramConfigUpdate::default()),
            Err(Error::NotFound(_))
        ));

        let (store, id) = store_with(Vec::new());
        store.delete(id).unwrap();
        assert!(store.is_empty());
        assert!(store.delete(id).is_err());
    }
}
