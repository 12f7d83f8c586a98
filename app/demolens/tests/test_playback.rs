//! FILENAME: tests/test_playback.rs
//! Integration tests for inflating captured queries and playing scenarios.

mod common;

use common::{SampleDashboard, TestHarness};
use demolens_lib::commands;
use payload_engine::{MaskingPreset, ValueShapeConfig};
use serde_json::Value;

fn cell_rows(payload: &Value) -> Vec<Vec<f64>> {
    payload["content"]["result"]["cellData"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| {
            row.as_array()
                .unwrap()
                .iter()
                .map(|c| c["value"].as_f64().unwrap())
                .collect()
        })
        .collect()
}

fn column_count(payload: &Value) -> usize {
    payload["content"]["result"]["columns"].as_array().unwrap().len()
}

// ============================================================================
// SINGLE QUERY
// ============================================================================

#[test]
fn test_inflate_line_chart() {
    let harness = TestHarness::new();
    let id = harness.capture_sample("Support");

    let inflated = commands::inflate_query(&harness.state, &id, "tickets-over-time", None).unwrap();
    let rows = cell_rows(&inflated.payload);

    assert!(column_count(&inflated.payload) >= 10);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].len(), column_count(&inflated.payload));
    assert!(rows[0].iter().all(|v| v.fract() == 0.0));
    assert_eq!(inflated.payload["id"], "captured");
    assert!(inflated.payload["measures"].is_array());
}

#[test]
fn test_inflate_kpi_is_one_cell() {
    let harness = TestHarness::new();
    let id = harness.capture_sample("Support");

    let inflated = commands::inflate_query(&harness.state, &id, "solved-kpi", None).unwrap();
    let rows = cell_rows(&inflated.payload);
    assert_eq!(column_count(&inflated.payload), 1);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].len(), 1);
}

#[test]
fn test_inflate_grid_clamps_percentages() {
    let harness = TestHarness::new();
    let id = harness.capture_sample("Support");

    let inflated = commands::inflate_query(&harness.state, &id, "group-grid", None).unwrap();
    let rows = cell_rows(&inflated.payload);

    assert_eq!(rows.len(), 4);
    for row in &rows {
        assert_eq!(row.len(), 2);
        assert!((0.2..=0.95).contains(&row[1]));
    }
}

#[test]
fn test_shape_override_and_stored_shape() {
    let harness = TestHarness::new();
    let id = harness.capture_sample("Support");

    commands::set_query_shape(
        &harness.state,
        &id,
        "by-channel",
        Some(ValueShapeConfig::new(10.0, 20.0, MaskingPreset::Random)),
    )
    .unwrap();
    let stored = commands::inflate_query(&harness.state, &id, "by-channel", None).unwrap();
    assert!(cell_rows(&stored.payload)[0].iter().all(|v| (10.0..=20.0).contains(v)));

    let overridden = commands::inflate_query(
        &harness.state,
        &id,
        "by-channel",
        Some(ValueShapeConfig::new(500.0, 600.0, MaskingPreset::Random)),
    )
    .unwrap();
    assert!(cell_rows(&overridden.payload)[0].iter().all(|v| (500.0..=600.0).contains(v)));
}

#[test]
fn test_first_inflate_pins_column_count_only() {
    let harness = TestHarness::new();
    let id = harness.capture_sample("Support");

    let first = commands::inflate_query(&harness.state, &id, "by-channel", None).unwrap();
    {
        let library = harness.state.lock_library();
        let query = library.get_skeleton(&id).unwrap().query("by-channel").unwrap();
        assert_eq!(query.prior_column_count, Some(column_count(&first.payload)));
        assert!(query.light.is_none());
    }

    for _ in 0..5 {
        let again = commands::inflate_query(&harness.state, &id, "by-channel", None).unwrap();
        assert_eq!(column_count(&again.payload), column_count(&first.payload));
    }
}

#[test]
fn test_time_axis_ends_today_after_pinning() {
    let harness = TestHarness::new();
    let id = harness.capture_sample("Support");
    let day = || chrono::Local::now().date_naive().format("%Y-%m-%d").to_string();

    let first = commands::inflate_query(&harness.state, &id, "tickets-over-time", None).unwrap();
    let width = column_count(&first.payload);

    let before = day();
    let again = commands::inflate_query(&harness.state, &id, "tickets-over-time", None).unwrap();
    let after = day();

    let columns = again.payload["content"]["result"]["columns"].as_array().unwrap();
    assert_eq!(columns.len(), width);
    let last = columns[width - 1]["members"][0]["name"].as_str().unwrap();
    assert!(last == before || last == after, "last label {}", last);
}

#[test]
fn test_missing_query_is_not_found() {
    let harness = TestHarness::new();
    let id = harness.capture_sample("Support");

    let err = commands::inflate_query(&harness.state, &id, "nope", None).unwrap_err();
    assert_eq!(err.kind(), "not_found");
    let err = commands::inflate_query(&harness.state, "nope", "x", None).unwrap_err();
    assert_eq!(err.kind(), "not_found");
}

// ============================================================================
// SCENARIOS
// ============================================================================

#[test]
fn test_play_active_scenario_in_playlist_order() {
    let harness = TestHarness::new();
    let first = harness.capture_sample("First");
    let second = harness.capture_sample("Second");

    let scenario = commands::create_scenario(&harness.state, "Demo", None).unwrap();
    commands::add_to_scenario(&harness.state, &scenario.id, &second).unwrap();
    commands::add_to_scenario(&harness.state, &scenario.id, &first).unwrap();
    commands::activate_scenario(&harness.state, Some(&scenario.id)).unwrap();

    let result = commands::play_scenario(&harness.state, None).unwrap();
    assert_eq!(result.scenario_id, scenario.id);
    assert_eq!(result.queries.len(), 2 * SampleDashboard::queries().len());
    assert_eq!(result.queries[0].skeleton_id, second);
    assert_eq!(result.queries[0].query_id, "tickets-over-time");
    assert_eq!(result.queries.last().unwrap().skeleton_id, first);
}

#[test]
fn test_large_playlist_keeps_order() {
    let harness = TestHarness::new();
    let scenario = commands::create_scenario(&harness.state, "Big", None).unwrap();
    let mut expected = Vec::new();
    for i in 0..6 {
        let id = harness.capture_sample(&format!("Dashboard {}", i));
        commands::add_to_scenario(&harness.state, &scenario.id, &id).unwrap();
        for query in SampleDashboard::queries() {
            expected.push((id.clone(), query.id.unwrap()));
        }
    }

    let result = commands::play_scenario(&harness.state, Some(&scenario.id)).unwrap();
    let got: Vec<_> = result
        .queries
        .iter()
        .map(|q| (q.skeleton_id.clone(), q.query_id.clone()))
        .collect();
    assert_eq!(got, expected);
}

#[test]
fn test_play_without_active_scenario() {
    let harness = TestHarness::new();
    let err = commands::play_scenario(&harness.state, None).unwrap_err();
    assert_eq!(err.kind(), "invalid_request");
}

#[test]
fn test_broken_template_aborts_playback_with_shape_error() {
    let harness = TestHarness::new();
    let id = harness.capture_sample("Support");

    // Corrupt a stored template behind the capture-time validation.
    {
        let mut library = harness.state.lock_library();
        let mut skeleton = library.get_skeleton(&id).unwrap().clone();
        skeleton.queries[1].template = serde_json::json!({ "content": {} });
        library.save_skeleton(skeleton);
    }

    let scenario = commands::create_scenario(&harness.state, "Demo", None).unwrap();
    commands::add_to_scenario(&harness.state, &scenario.id, &id).unwrap();

    let err = commands::play_scenario(&harness.state, Some(&scenario.id)).unwrap_err();
    assert_eq!(err.kind(), "shape");
}
