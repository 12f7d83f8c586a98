//! FILENAME: app/demolens/src/commands/scenarios.rs
// PURPOSE: Scenario management, including ZIP export and import.

use crate::error::AppError;
use crate::{log_info, AppState};
use skeleton_store::{export_bundle, import_bundle, Scenario};
use std::path::Path;

pub fn create_scenario(state: &AppState, name: &str, description: Option<&str>) -> Result<Scenario, AppError> {
    let mut library = state.lock_library();
    let scenario = library.create_scenario(name, description)?;
    state.persist(&library);
    log_info!("STORE", "create_scenario id={} name={}", scenario.id, scenario.name);
    Ok(scenario)
}

pub fn rename_scenario(state: &AppState, scenario_id: &str, name: &str) -> Result<Scenario, AppError> {
    let mut library = state.lock_library();
    library.rename_scenario(scenario_id, name)?;
    state.persist(&library);
    Ok(library.get_scenario(scenario_id)?.clone())
}

pub fn add_to_scenario(state: &AppState, scenario_id: &str, skeleton_id: &str) -> Result<Scenario, AppError> {
    let mut library = state.lock_library();
    library.add_to_scenario(scenario_id, skeleton_id)?;
    state.persist(&library);
    Ok(library.get_scenario(scenario_id)?.clone())
}

pub fn remove_from_scenario(
    state: &AppState,
    scenario_id: &str,
    skeleton_id: &str,
) -> Result<Scenario, AppError> {
    let mut library = state.lock_library();
    library.remove_from_scenario(scenario_id, skeleton_id)?;
    state.persist(&library);
    Ok(library.get_scenario(scenario_id)?.clone())
}

pub fn delete_scenario(state: &AppState, scenario_id: &str) -> Result<(), AppError> {
    let mut library = state.lock_library();
    library.delete_scenario(scenario_id)?;
    state.persist(&library);
    log_info!("STORE", "delete_scenario id={}", scenario_id);
    Ok(())
}

pub fn activate_scenario(state: &AppState, scenario_id: Option<&str>) -> Result<(), AppError> {
    let mut library = state.lock_library();
    library.activate_scenario(scenario_id)?;
    state.persist(&library);
    log_info!("STORE", "activate_scenario id={:?}", scenario_id);
    Ok(())
}

/// All scenarios plus the active id.
pub fn list_scenarios(state: &AppState) -> (Vec<Scenario>, Option<String>) {
    let library = state.lock_library();
    (
        library.list_scenarios().to_vec(),
        library.active_scenario().map(|s| s.id.clone()),
    )
}

pub fn export_scenario(state: &AppState, scenario_id: &str, path: &Path) -> Result<(), AppError> {
    let library = state.lock_library();
    export_bundle(path, library.snapshot(), scenario_id)?;
    log_info!("STORE", "export_scenario id={} path={}", scenario_id, path.display());
    Ok(())
}

/// Imports a bundle; its skeletons and scenario get fresh ids.
pub fn import_scenario(state: &AppState, path: &Path) -> Result<Scenario, AppError> {
    let bundle = import_bundle(path)?;
    let mut library = state.lock_library();
    let scenario = library.import_bundle(bundle)?;
    state.persist(&library);
    log_info!(
        "STORE",
        "import_scenario id={} skeletons={}",
        scenario.id,
        scenario.skeleton_ids.len()
    );
    Ok(scenario)
}
