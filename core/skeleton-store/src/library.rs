//! FILENAME: core/skeleton-store/src/library.rs
//! Skeleton Library - In-memory owner of skeletons and scenarios.
//!
//! Every mutation goes through this type so that:
//! - scenario membership never points at a deleted skeleton
//! - scenario names stay unique (case-insensitive)
//! - exactly one StoreEvent is emitted per successful mutation
//!
//! Persistence is the caller's job: take `snapshot()` after a mutation and
//! hand it to a `SyncQueue` or `JsonStorage`.

use crate::bundle::ScenarioBundle;
use crate::error::StoreError;
use crate::events::{EventBus, StoreEvent};
use crate::model::{new_id, LibrarySnapshot, Scenario, Skeleton, SkeletonSummary};
use chrono::Utc;
use payload_engine::{LightPayload, ValueShapeConfig};
use std::sync::mpsc::Receiver;

#[derive(Debug, Default)]
pub struct SkeletonLibrary {
    snapshot: LibrarySnapshot,
    events: EventBus,
}

impl SkeletonLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: LibrarySnapshot) -> Self {
        SkeletonLibrary {
            snapshot,
            events: EventBus::new(),
        }
    }

    pub fn snapshot(&self) -> &LibrarySnapshot {
        &self.snapshot
    }

    pub fn subscribe(&mut self) -> Receiver<StoreEvent> {
        self.events.subscribe()
    }

    // ========================================================================
    // SKELETONS
    // ========================================================================

    /// Inserts or replaces (by id) a skeleton. Returns its id.
    pub fn save_skeleton(&mut self, skeleton: Skeleton) -> String {
        let id = skeleton.id.clone();
        match self.snapshot.skeletons.iter_mut().find(|s| s.id == id) {
            Some(existing) => *existing = skeleton,
            None => self.snapshot.skeletons.push(skeleton),
        }
        self.events.emit(StoreEvent::SkeletonSaved { id: id.clone() });
        id
    }

    pub fn get_skeleton(&self, id: &str) -> Result<&Skeleton, StoreError> {
        self.snapshot
            .skeletons
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| StoreError::SkeletonNotFound(id.to_string()))
    }

    /// Removes a skeleton and every scenario reference to it.
    pub fn delete_skeleton(&mut self, id: &str) -> Result<Skeleton, StoreError> {
        let index = self
            .snapshot
            .skeletons
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| StoreError::SkeletonNotFound(id.to_string()))?;
        let removed = self.snapshot.skeletons.remove(index);

        for scenario in &mut self.snapshot.scenarios {
            let before = scenario.skeleton_ids.len();
            scenario.skeleton_ids.retain(|sid| sid != id);
            if scenario.skeleton_ids.len() != before {
                scenario.touch();
            }
        }

        self.events.emit(StoreEvent::SkeletonDeleted { id: id.to_string() });
        Ok(removed)
    }

    pub fn list_skeletons(&self) -> Vec<SkeletonSummary> {
        self.snapshot.skeletons.iter().map(SkeletonSummary::from).collect()
    }

    /// Stores user-edited labels of one query.
    pub fn save_light_payload(
        &mut self,
        skeleton_id: &str,
        query_id: &str,
        light: LightPayload,
    ) -> Result<(), StoreError> {
        self.query_mut(skeleton_id, query_id)?.light = Some(light);
        self.events.emit(StoreEvent::LightPayloadSaved {
            skeleton_id: skeleton_id.to_string(),
            query_id: query_id.to_string(),
        });
        Ok(())
    }

    /// Sets or clears the per-query masking override.
    pub fn set_query_shape(
        &mut self,
        skeleton_id: &str,
        query_id: &str,
        shape: Option<ValueShapeConfig>,
    ) -> Result<(), StoreError> {
        self.query_mut(skeleton_id, query_id)?.shape = shape;
        self.events.emit(StoreEvent::QueryShapeChanged {
            skeleton_id: skeleton_id.to_string(),
            query_id: query_id.to_string(),
        });
        Ok(())
    }

    /// Records the column count of a query's first inflate. Later inflates
    /// reuse it so the axis keeps its width while labels stay fresh.
    pub fn pin_column_count(
        &mut self,
        skeleton_id: &str,
        query_id: &str,
        count: usize,
    ) -> Result<(), StoreError> {
        self.query_mut(skeleton_id, query_id)?.prior_column_count = Some(count);
        self.events.emit(StoreEvent::ColumnCountPinned {
            skeleton_id: skeleton_id.to_string(),
            query_id: query_id.to_string(),
            count,
        });
        Ok(())
    }

    fn query_mut(
        &mut self,
        skeleton_id: &str,
        query_id: &str,
    ) -> Result<&mut crate::model::QueryCapture, StoreError> {
        let skeleton = self
            .snapshot
            .skeletons
            .iter_mut()
            .find(|s| s.id == skeleton_id)
            .ok_or_else(|| StoreError::SkeletonNotFound(skeleton_id.to_string()))?;
        skeleton
            .query_mut(query_id)
            .ok_or_else(|| StoreError::QueryNotFound {
                skeleton_id: skeleton_id.to_string(),
                query_id: query_id.to_string(),
            })
    }

    // ========================================================================
    // SCENARIOS
    // ========================================================================

    pub fn list_scenarios(&self) -> &[Scenario] {
        &self.snapshot.scenarios
    }

    pub fn get_scenario(&self, id: &str) -> Result<&Scenario, StoreError> {
        self.snapshot
            .scenarios
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| StoreError::ScenarioNotFound(id.to_string()))
    }

    pub fn create_scenario(&mut self, name: &str, description: Option<&str>) -> Result<Scenario, StoreError> {
        let name = name.trim();
        self.ensure_unique_name(name, None)?;

        let scenario = Scenario::new(name, description);
        self.snapshot.scenarios.push(scenario.clone());
        self.events.emit(StoreEvent::ScenarioCreated {
            id: scenario.id.clone(),
        });
        Ok(scenario)
    }

    pub fn rename_scenario(&mut self, id: &str, name: &str) -> Result<(), StoreError> {
        let name = name.trim();
        self.ensure_unique_name(name, Some(id))?;
        let scenario = self.scenario_mut(id)?;
        scenario.name = name.to_string();
        scenario.touch();
        self.events.emit(StoreEvent::ScenarioRenamed {
            id: id.to_string(),
            name: name.to_string(),
        });
        Ok(())
    }

    /// Appends a skeleton to a scenario. Adding one already present is a no-op.
    pub fn add_to_scenario(&mut self, scenario_id: &str, skeleton_id: &str) -> Result<(), StoreError> {
        self.get_skeleton(skeleton_id)?;
        let scenario = self.scenario_mut(scenario_id)?;
        if !scenario.skeleton_ids.iter().any(|sid| sid == skeleton_id) {
            scenario.skeleton_ids.push(skeleton_id.to_string());
            scenario.touch();
        }
        self.events.emit(StoreEvent::ScenarioUpdated {
            id: scenario_id.to_string(),
        });
        Ok(())
    }

    pub fn remove_from_scenario(&mut self, scenario_id: &str, skeleton_id: &str) -> Result<(), StoreError> {
        let scenario = self.scenario_mut(scenario_id)?;
        let before = scenario.skeleton_ids.len();
        scenario.skeleton_ids.retain(|sid| sid != skeleton_id);
        if scenario.skeleton_ids.len() != before {
            scenario.touch();
        }
        self.events.emit(StoreEvent::ScenarioUpdated {
            id: scenario_id.to_string(),
        });
        Ok(())
    }

    /// Deletes a scenario, deactivating it if it was active. Skeletons stay.
    pub fn delete_scenario(&mut self, id: &str) -> Result<Scenario, StoreError> {
        let index = self
            .snapshot
            .scenarios
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| StoreError::ScenarioNotFound(id.to_string()))?;
        let removed = self.snapshot.scenarios.remove(index);

        if self.snapshot.active_scenario_id.as_deref() == Some(id) {
            self.snapshot.active_scenario_id = None;
        }

        self.events.emit(StoreEvent::ScenarioDeleted { id: id.to_string() });
        Ok(removed)
    }

    /// Selects the scenario used for playback; `None` deactivates.
    pub fn activate_scenario(&mut self, id: Option<&str>) -> Result<(), StoreError> {
        if let Some(id) = id {
            self.get_scenario(id)?;
        }
        self.snapshot.active_scenario_id = id.map(str::to_string);
        self.events.emit(StoreEvent::ScenarioActivated {
            id: id.map(str::to_string),
        });
        Ok(())
    }

    pub fn active_scenario(&self) -> Option<&Scenario> {
        let id = self.snapshot.active_scenario_id.as_deref()?;
        self.snapshot.scenarios.iter().find(|s| s.id == id)
    }

    /// The scenario's skeletons, in playlist order.
    pub fn scenario_skeletons(&self, id: &str) -> Result<Vec<&Skeleton>, StoreError> {
        let scenario = self.get_scenario(id)?;
        Ok(scenario
            .skeleton_ids
            .iter()
            .filter_map(|sid| self.snapshot.skeletons.iter().find(|s| &s.id == sid))
            .collect())
    }

    /// Adds an imported bundle under fresh ids. A clashing scenario name gets
    /// a numeric suffix.
    pub fn import_bundle(&mut self, bundle: ScenarioBundle) -> Result<Scenario, StoreError> {
        let ScenarioBundle {
            scenario, skeletons, ..
        } = bundle;

        let mut id_map = Vec::with_capacity(skeletons.len());
        for mut skeleton in skeletons {
            let fresh = new_id();
            id_map.push((skeleton.id.clone(), fresh.clone()));
            skeleton.id = fresh;
            self.snapshot.skeletons.push(skeleton);
        }

        let skeleton_ids = scenario
            .skeleton_ids
            .iter()
            .filter_map(|old| id_map.iter().find(|(o, _)| o == old).map(|(_, n)| n.clone()))
            .collect();

        let now = Utc::now();
        let imported = Scenario {
            id: new_id(),
            name: self.unique_name(scenario.name.trim()),
            skeleton_ids,
            created_at: now,
            updated_at: now,
            ..scenario
        };
        self.snapshot.scenarios.push(imported.clone());

        self.events.emit(StoreEvent::BundleImported {
            scenario_id: imported.id.clone(),
        });
        Ok(imported)
    }

    fn scenario_mut(&mut self, id: &str) -> Result<&mut Scenario, StoreError> {
        self.snapshot
            .scenarios
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| StoreError::ScenarioNotFound(id.to_string()))
    }

    fn name_taken(&self, name: &str, except: Option<&str>) -> bool {
        self.snapshot
            .scenarios
            .iter()
            .any(|s| Some(s.id.as_str()) != except && s.name.eq_ignore_ascii_case(name))
    }

    fn ensure_unique_name(&self, name: &str, except: Option<&str>) -> Result<(), StoreError> {
        if name.is_empty() {
            return Err(StoreError::InvalidFormat("scenario name is empty".to_string()));
        }
        if self.name_taken(name, except) {
            return Err(StoreError::DuplicateName(name.to_string()));
        }
        Ok(())
    }

    fn unique_name(&self, base: &str) -> String {
        if !self.name_taken(base, None) {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{} ({})", base, n))
            .find(|candidate| !self.name_taken(candidate, None))
            .unwrap_or_else(|| base.to_string())
    }
}
