//! FILENAME: tests/test_scenarios.rs
//! Integration tests for skeleton capture, scenario management and persistence.

mod common;

use common::{SampleDashboard, TestHarness};
use demolens_lib::{commands, create_app_state, CapturedQuery, DemoLensConfig};
use payload_engine::{LightMember, LightPayload, LightTuple};
use skeleton_store::Product;
use serde_json::json;

// ============================================================================
// CAPTURE
// ============================================================================

#[test]
fn test_capture_lists_skeleton() {
    let harness = TestHarness::new();
    let id = harness.capture_sample("Support overview");

    let skeletons = commands::list_skeletons(&harness.state);
    assert_eq!(skeletons.len(), 1);
    assert_eq!(skeletons[0].id, id);
    assert_eq!(skeletons[0].name, "Support overview");
    assert_eq!(skeletons[0].query_count, SampleDashboard::queries().len());
    assert_eq!(skeletons[0].product, Product::Explore);

    let library = harness.state.lock_library();
    let skeleton = library.get_skeleton(&id).unwrap();
    assert_eq!(skeleton.query("tickets-over-time").unwrap().title, "Tickets over time");
    assert_eq!(skeleton.query("group-grid").unwrap().title, "");
}

#[test]
fn test_capture_product_selects_admin_profile() {
    let harness = TestHarness::new();
    let (id, _) = commands::capture_skeleton(
        &harness.state,
        "Copilot",
        None,
        None,
        Some(Product::Wfm),
        vec![SampleDashboard::bar_chart()],
    )
    .unwrap();

    let inflated = commands::inflate_query(&harness.state, &id, "by-channel", None).unwrap();
    let first = &inflated.payload["content"]["result"]["columns"][0]["members"][0]["name"];
    assert_eq!(first, "1");
}

#[test]
fn test_capture_generates_missing_query_ids() {
    let harness = TestHarness::new();
    let mut query = SampleDashboard::kpi();
    query.id = None;

    let (_, ids) = commands::capture_skeleton(&harness.state, "KPI", None, None, None, vec![query]).unwrap();
    assert_eq!(ids.len(), 1);
    assert!(!ids[0].is_empty());
}

#[test]
fn test_capture_rejects_bad_input() {
    let harness = TestHarness::new();

    let err = commands::capture_skeleton(&harness.state, "  ", None, None, None, SampleDashboard::queries())
        .unwrap_err();
    assert_eq!(err.kind(), "invalid_request");

    let err = commands::capture_skeleton(&harness.state, "Empty", None, None, None, Vec::new()).unwrap_err();
    assert_eq!(err.kind(), "invalid_request");

    let duplicate = vec![SampleDashboard::kpi(), SampleDashboard::kpi()];
    let err = commands::capture_skeleton(&harness.state, "Dup", None, None, None, duplicate).unwrap_err();
    assert_eq!(err.kind(), "invalid_request");

    let bad_schema = CapturedQuery {
        schema: "not a schema".to_string(),
        ..SampleDashboard::kpi()
    };
    let err = commands::capture_skeleton(&harness.state, "Bad", None, None, None, vec![bad_schema]).unwrap_err();
    assert_eq!(err.kind(), "decode");

    let bad_template = CapturedQuery {
        template: json!({ "content": { "result": { "columns": [] } } }),
        ..SampleDashboard::kpi()
    };
    let err = commands::capture_skeleton(&harness.state, "Bad", None, None, None, vec![bad_template]).unwrap_err();
    assert_eq!(err.kind(), "shape");

    assert!(commands::list_skeletons(&harness.state).is_empty());
}

#[test]
fn test_saved_labels_survive_inflate() {
    let harness = TestHarness::new();
    let id = harness.capture_sample("Support");

    let light = LightPayload {
        columns: vec![LightTuple {
            members: vec![
                LightMember::default(),
                LightMember {
                    name: None,
                    display_name: Some("Renamed".to_string()),
                },
            ],
        }],
        rows: Vec::new(),
    };
    commands::save_light_payload(&harness.state, &id, "solved-kpi", light).unwrap();

    let inflated = commands::inflate_query(&harness.state, &id, "solved-kpi", None).unwrap();
    let members = &inflated.payload["content"]["result"]["columns"][0]["members"];
    assert_eq!(members.as_array().unwrap().last().unwrap()["displayName"], "Renamed");
}

// ============================================================================
// SCENARIOS
// ============================================================================

#[test]
fn test_scenario_lifecycle() {
    let harness = TestHarness::new();
    let skeleton = harness.capture_sample("Support");

    let scenario = commands::create_scenario(&harness.state, "Q3 demo", Some("for sales")).unwrap();
    let scenario = commands::add_to_scenario(&harness.state, &scenario.id, &skeleton).unwrap();
    assert_eq!(scenario.skeleton_ids, vec![skeleton.clone()]);

    assert_eq!(scenario.description.as_deref(), Some("for sales"));

    let renamed = commands::rename_scenario(&harness.state, &scenario.id, "Q4 demo").unwrap();
    assert_eq!(renamed.name, "Q4 demo");
    assert!(renamed.updated_at >= scenario.updated_at);
    assert_eq!(renamed.created_at, scenario.created_at);

    commands::activate_scenario(&harness.state, Some(&scenario.id)).unwrap();
    let (scenarios, active) = commands::list_scenarios(&harness.state);
    assert_eq!(scenarios.len(), 1);
    assert_eq!(active.as_deref(), Some(scenario.id.as_str()));

    let emptied = commands::remove_from_scenario(&harness.state, &scenario.id, &skeleton).unwrap();
    assert!(emptied.skeleton_ids.is_empty());

    commands::delete_scenario(&harness.state, &scenario.id).unwrap();
    let (scenarios, active) = commands::list_scenarios(&harness.state);
    assert!(scenarios.is_empty());
    assert!(active.is_none());
}

#[test]
fn test_duplicate_scenario_name_rejected() {
    let harness = TestHarness::new();
    commands::create_scenario(&harness.state, "Demo", None).unwrap();

    let err = commands::create_scenario(&harness.state, "demo", None).unwrap_err();
    assert_eq!(err.kind(), "invalid_request");
}

#[test]
fn test_deleting_skeleton_removes_it_from_scenarios() {
    let harness = TestHarness::new();
    let skeleton = harness.capture_sample("Support");
    let scenario = commands::create_scenario(&harness.state, "Demo", None).unwrap();
    commands::add_to_scenario(&harness.state, &scenario.id, &skeleton).unwrap();

    commands::delete_skeleton(&harness.state, &skeleton).unwrap();

    let (scenarios, _) = commands::list_scenarios(&harness.state);
    assert!(scenarios[0].skeleton_ids.is_empty());
    let err = commands::delete_skeleton(&harness.state, &skeleton).unwrap_err();
    assert_eq!(err.kind(), "not_found");
}

// ============================================================================
// BUNDLES & PERSISTENCE
// ============================================================================

#[test]
fn test_export_then_import_copies_scenario() {
    let harness = TestHarness::new();
    let skeleton = harness.capture_sample("Support");
    let scenario = commands::create_scenario(&harness.state, "Demo", None).unwrap();
    commands::add_to_scenario(&harness.state, &scenario.id, &skeleton).unwrap();

    let bundle_path = harness.dir.path().join("demo.zip");
    commands::export_scenario(&harness.state, &scenario.id, &bundle_path).unwrap();

    let other = TestHarness::new();
    let imported = commands::import_scenario(&other.state, &bundle_path).unwrap();
    assert_eq!(imported.name, "Demo");
    assert_eq!(imported.skeleton_ids.len(), 1);

    let result = commands::play_scenario(&other.state, Some(&imported.id)).unwrap();
    assert_eq!(result.queries.len(), SampleDashboard::queries().len());

    // Importing into the source library keeps both copies apart.
    let again = commands::import_scenario(&harness.state, &bundle_path).unwrap();
    assert_ne!(again.id, scenario.id);
    assert_ne!(again.name, "Demo");
    assert_eq!(commands::list_skeletons(&harness.state).len(), 2);
}

#[test]
fn test_import_missing_file_is_storage_error() {
    let harness = TestHarness::new();
    let err = commands::import_scenario(&harness.state, &harness.dir.path().join("nope.zip")).unwrap_err();
    assert_eq!(err.kind(), "storage");
}

#[test]
fn test_library_survives_restart() {
    let harness = TestHarness::new();
    let skeleton = harness.capture_sample("Support");
    let scenario = commands::create_scenario(&harness.state, "Demo", None).unwrap();
    commands::add_to_scenario(&harness.state, &scenario.id, &skeleton).unwrap();
    commands::activate_scenario(&harness.state, Some(&scenario.id)).unwrap();
    harness.state.sync.flush();
    assert!(harness.state.sync.last_error().is_none());

    let reopened = TestHarness::with_dir(harness.into_dir());
    let (scenarios, active) = commands::list_scenarios(&reopened.state);
    assert_eq!(scenarios.len(), 1);
    assert_eq!(active.as_deref(), Some(scenario.id.as_str()));
    assert_eq!(commands::list_skeletons(&reopened.state)[0].id, skeleton);
}

#[test]
fn test_corrupt_library_file_fails_startup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("library.json");
    std::fs::write(&path, "{ not json").unwrap();

    let config = DemoLensConfig {
        storage_path: path,
        ..Default::default()
    };
    assert!(create_app_state(config).is_err());
}
