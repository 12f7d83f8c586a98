//! FILENAME: core/skeleton-store/src/model.rs
//! PURPOSE: Persisted shapes of skeletons, scenarios and the whole library.
//! CONTEXT: Serialized as camelCase JSON, both in the storage file and inside
//! scenario bundles.

use chrono::{DateTime, Utc};
use payload_engine::{LightPayload, ValueShapeConfig, VisualizationProfile};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Version of the storage file layout.
pub const STORAGE_VERSION: u32 = 1;

// ============================================================================
// SKELETON
// ============================================================================

/// One query (dashboard widget) captured from a live dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryCapture {
    pub id: String,
    /// Widget title as shown on the dashboard.
    #[serde(default)]
    pub title: String,
    pub visualization_type: String,
    /// base64 + gzip XML query schema.
    pub schema: String,
    /// Raw captured result used as the inflate template.
    pub template: Value,
    /// Labels edited by the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light: Option<LightPayload>,
    /// Column count of the first inflate; keeps later playbacks the same width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior_column_count: Option<usize>,
    /// Per-query masking override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<ValueShapeConfig>,
}

/// Product a dashboard was captured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Product {
    #[default]
    Explore,
    AdminCopilot,
    Wfm,
    Other,
}

impl Product {
    /// Synthesis profile for dashboards of this product.
    pub fn profile(&self) -> VisualizationProfile {
        match self {
            Product::Explore | Product::Other => VisualizationProfile::Explore,
            Product::AdminCopilot | Product::Wfm => VisualizationProfile::Admin,
        }
    }
}

impl From<VisualizationProfile> for Product {
    fn from(profile: VisualizationProfile) -> Self {
        match profile {
            VisualizationProfile::Explore => Product::Explore,
            VisualizationProfile::Admin => Product::AdminCopilot,
        }
    }
}

/// A captured dashboard: its identity plus every query on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skeleton {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default)]
    pub product: Product,
    pub captured_at: DateTime<Utc>,
    #[serde(default)]
    pub queries: Vec<QueryCapture>,
}

impl Skeleton {
    pub fn new(name: impl Into<String>, product: Product) -> Self {
        Skeleton {
            id: new_id(),
            name: name.into(),
            dashboard_id: None,
            source_url: None,
            product,
            captured_at: Utc::now(),
            queries: Vec::new(),
        }
    }

    pub fn profile(&self) -> VisualizationProfile {
        self.product.profile()
    }

    pub fn query(&self, query_id: &str) -> Option<&QueryCapture> {
        self.queries.iter().find(|q| q.id == query_id)
    }

    pub fn query_mut(&mut self, query_id: &str) -> Option<&mut QueryCapture> {
        self.queries.iter_mut().find(|q| q.id == query_id)
    }
}

/// Listing entry, without the heavy query payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkeletonSummary {
    pub id: String,
    pub name: String,
    pub dashboard_id: Option<String>,
    pub product: Product,
    pub captured_at: DateTime<Utc>,
    pub query_count: usize,
}

impl From<&Skeleton> for SkeletonSummary {
    fn from(s: &Skeleton) -> Self {
        SkeletonSummary {
            id: s.id.clone(),
            name: s.name.clone(),
            dashboard_id: s.dashboard_id.clone(),
            product: s.product,
            captured_at: s.captured_at,
            query_count: s.queries.len(),
        }
    }
}

// ============================================================================
// SCENARIO
// ============================================================================

/// A named, ordered playlist of skeletons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub skeleton_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Scenario {
    /// A blank description is stored as none.
    pub fn new(name: impl Into<String>, description: Option<&str>) -> Self {
        let now = Utc::now();
        Scenario {
            id: new_id(),
            name: name.into(),
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            skeleton_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Marks the scenario as modified now.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.updated_at);
    }
}

// ============================================================================
// SNAPSHOT
// ============================================================================

/// Everything the library persists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibrarySnapshot {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub skeletons: Vec<Skeleton>,
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_scenario_id: Option<String>,
}

impl Default for LibrarySnapshot {
    fn default() -> Self {
        LibrarySnapshot {
            version: STORAGE_VERSION,
            skeletons: Vec::new(),
            scenarios: Vec::new(),
            active_scenario_id: None,
        }
    }
}

fn default_version() -> u32 {
    STORAGE_VERSION
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_snapshot_defaults_when_fields_missing() {
        let snapshot: LibrarySnapshot = serde_json::from_value(json!({})).unwrap();
        assert_eq!(snapshot, LibrarySnapshot::default());
    }

    #[test]
    fn test_skeleton_serializes_camel_case() {
        let mut skeleton = Skeleton::new("Support overview", Product::Explore);
        skeleton.queries.push(QueryCapture {
            id: "q1".to_string(),
            title: "Tickets".to_string(),
            visualization_type: "lineChart".to_string(),
            schema: "H4sI".to_string(),
            template: json!({}),
            light: None,
            prior_column_count: None,
            shape: None,
        });

        let value = serde_json::to_value(&skeleton).unwrap();
        assert!(value.get("capturedAt").is_some());
        assert_eq!(value["queries"][0]["visualizationType"], "lineChart");
        assert!(value["queries"][0].get("light").is_none());
        assert_eq!(value["queries"][0]["title"], "Tickets");
        assert_eq!(value["product"], "explore");

        let back: Skeleton = serde_json::from_value(value).unwrap();
        assert_eq!(back, skeleton);
    }

    #[test]
    fn test_summary_counts_queries() {
        let skeleton = Skeleton::new("x", Product::Wfm);
        let summary = SkeletonSummary::from(&skeleton);
        assert_eq!(summary.query_count, 0);
        assert_eq!(summary.product, Product::Wfm);
    }

    #[test]
    fn test_product_selects_profile() {
        assert_eq!(Product::Explore.profile(), VisualizationProfile::Explore);
        assert_eq!(Product::Other.profile(), VisualizationProfile::Explore);
        assert_eq!(Product::AdminCopilot.profile(), VisualizationProfile::Admin);
        assert_eq!(Product::Wfm.profile(), VisualizationProfile::Admin);
        assert_eq!(Product::from(VisualizationProfile::Admin), Product::AdminCopilot);
    }

    #[test]
    fn test_scenario_description_and_timestamps() {
        let blank = Scenario::new("Demo", Some("   "));
        assert_eq!(blank.description, None);
        assert_eq!(blank.created_at, blank.updated_at);

        let mut scenario = Scenario::new("Demo", Some(" Quarterly "));
        assert_eq!(scenario.description.as_deref(), Some("Quarterly"));
        let before = scenario.updated_at;
        scenario.touch();
        assert!(scenario.updated_at >= before);
    }

    #[test]
    fn test_old_scenario_without_updated_at_loads() {
        let scenario: Scenario = serde_json::from_value(json!({
            "id": "s1",
            "name": "Demo",
            "createdAt": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        assert!(scenario.description.is_none());
        assert!(scenario.updated_at >= scenario.created_at);
    }
}
