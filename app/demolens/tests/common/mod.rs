//! FILENAME: tests/common/mod.rs
//! Test harness and fixtures for DemoLens backend integration tests.

#![allow(dead_code)]

use demolens_lib::{create_app_state, AppState, CapturedQuery, DemoLensConfig};
use query_schema::{encode_config, encode_schema};
use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;

/// Test harness owning an app state backed by a temporary library file.
pub struct TestHarness {
    pub state: AppState,
    pub dir: TempDir,
}

impl TestHarness {
    /// Create a new test harness with an empty library.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        Self::with_dir(dir)
    }

    /// Create a harness over an existing directory (to test reloads).
    pub fn with_dir(dir: TempDir) -> Self {
        Self::build(dir, 5, 3)
    }

    /// Create a harness with a longer dashboard wait.
    pub fn with_polling(interval_ms: u64, attempts: u32) -> Self {
        Self::build(tempfile::tempdir().unwrap(), interval_ms, attempts)
    }

    fn build(dir: TempDir, interval_ms: u64, attempts: u32) -> Self {
        let config = DemoLensConfig {
            storage_path: dir.path().join("library.json"),
            poll_interval_ms: interval_ms,
            poll_max_attempts: attempts,
            ..Default::default()
        };
        TestHarness {
            state: create_app_state(config).unwrap(),
            dir,
        }
    }

    pub fn storage_path(&self) -> PathBuf {
        self.state.config.storage_path.clone()
    }

    /// Drops the state (draining pending writes) and hands back the directory.
    pub fn into_dir(self) -> TempDir {
        let TestHarness { state, dir } = self;
        drop(state);
        dir
    }

    /// Captures the sample dashboard and returns the skeleton id.
    pub fn capture_sample(&self, name: &str) -> String {
        let (id, _) = demolens_lib::commands::capture_skeleton(
            &self.state,
            name,
            Some("dash-1".to_string()),
            None,
            None,
            SampleDashboard::queries(),
        )
        .unwrap();
        id
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub struct SampleDashboard;

impl SampleDashboard {
    pub const TIME_COLUMN: &'static str = r#"<Hierarchy hierarchyName="created_date" hierarchyDisplayName="Ticket created - Date" dimension="Ticket created" dimensionType="time" dataField="created_date" isTime="true"/>"#;
    pub const CHANNEL: &'static str = r#"<Hierarchy hierarchyName="channel" hierarchyDisplayName="Ticket channel" dimension="Ticket" dimensionType="attribute" dataField="channel"/>"#;
    pub const GROUP: &'static str = r#"<Hierarchy hierarchyName="group" hierarchyDisplayName="Ticket group" dimension="Ticket" dimensionType="attribute" dataField="group_name"/>"#;

    pub fn measure(field: &str, agg: &str, label: &str) -> String {
        format!(
            r#"<Measure dataField="{}" aggregationType="{}" displayName="{}"/>"#,
            field, agg, label
        )
    }

    pub fn schema(measures: &[String], columns: &str, rows: &str, config: Value) -> String {
        encode_schema(&format!(
            r#"<Query><Measures>{}</Measures><Columns>{}</Columns><Rows>{}</Rows><Config json="{}"/></Query>"#,
            measures.concat(),
            columns,
            rows,
            encode_config(&config)
        ))
    }

    pub fn template() -> Value {
        json!({
            "id": "captured",
            "content": {
                "result": {
                    "columns": [{
                        "members": [
                            { "name": "Email", "displayName": "Email" },
                            { "name": "COUNT(tickets)", "displayName": "COUNT(Tickets)" }
                        ]
                    }],
                    "cellData": [[{ "value": 1 }]]
                }
            }
        })
    }

    pub fn line_chart() -> CapturedQuery {
        CapturedQuery {
            id: Some("tickets-over-time".to_string()),
            title: Some("Tickets over time".to_string()),
            visualization_type: "lineChart".to_string(),
            schema: Self::schema(
                &[Self::measure("tickets", "SUM", "Tickets")],
                Self::TIME_COLUMN,
                "",
                json!({}),
            ),
            template: Self::template(),
        }
    }

    pub fn kpi() -> CapturedQuery {
        CapturedQuery {
            id: Some("solved-kpi".to_string()),
            title: Some("Solved tickets".to_string()),
            visualization_type: "kpiChart".to_string(),
            schema: Self::schema(&[Self::measure("solved", "COUNT", "Solved")], "", "", json!({})),
            template: Self::template(),
        }
    }

    pub fn grid() -> CapturedQuery {
        CapturedQuery {
            id: Some("group-grid".to_string()),
            title: None,
            visualization_type: "simpleGrid2".to_string(),
            schema: Self::schema(
                &[
                    Self::measure("tickets", "COUNT", "Tickets"),
                    Self::measure("csat", "AVG", "Satisfaction"),
                ],
                "",
                Self::GROUP,
                json!({ "AVG(csat)": { "suffix": "%", "scale": 0.01 } }),
            ),
            template: Self::template(),
        }
    }

    pub fn bar_chart() -> CapturedQuery {
        CapturedQuery {
            id: Some("by-channel".to_string()),
            title: Some("Tickets by channel".to_string()),
            visualization_type: "barChart".to_string(),
            schema: Self::schema(&[Self::measure("tickets", "COUNT", "Tickets")], Self::CHANNEL, "", json!({})),
            template: Self::template(),
        }
    }

    pub fn queries() -> Vec<CapturedQuery> {
        vec![Self::line_chart(), Self::kpi(), Self::grid(), Self::bar_chart()]
    }
}
