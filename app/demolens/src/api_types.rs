//! FILENAME: app/demolens/src/api_types.rs
// PURPOSE: Message types exchanged with the browser extension.
// CONTEXT: Every message is a JSON object tagged by `type`; fields use
// camelCase for JavaScript interoperability.

use chrono::{DateTime, Utc};
use payload_engine::{LightPayload, ValueShapeConfig};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use skeleton_store::{Product, Scenario, SkeletonSummary};

/// The dashboard the content script currently sees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardRef {
    pub dashboard_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seen_at: Option<DateTime<Utc>>,
}

/// One query as captured by the content script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedQuery {
    /// Generated when the page gives none.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    pub visualization_type: String,
    pub schema: String,
    pub template: Value,
}

/// A freshly inflated query, ready for injection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InflatedQuery {
    pub skeleton_id: String,
    pub query_id: String,
    pub visualization_type: String,
    pub payload: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackResult {
    pub scenario_id: String,
    pub queries: Vec<InflatedQuery>,
}

// ============================================================================
// REQUESTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Request {
    CaptureSkeleton {
        name: String,
        #[serde(default)]
        dashboard_id: Option<String>,
        #[serde(default)]
        source_url: Option<String>,
        /// Defaults to the product of the configured profile.
        #[serde(default)]
        product: Option<Product>,
        queries: Vec<CapturedQuery>,
    },
    DeleteSkeleton {
        skeleton_id: String,
    },
    ListSkeletons,
    CreateScenario {
        name: String,
        #[serde(default)]
        description: Option<String>,
    },
    RenameScenario {
        scenario_id: String,
        name: String,
    },
    AddToScenario {
        scenario_id: String,
        skeleton_id: String,
    },
    RemoveFromScenario {
        scenario_id: String,
        skeleton_id: String,
    },
    DeleteScenario {
        scenario_id: String,
    },
    ActivateScenario {
        #[serde(default)]
        scenario_id: Option<String>,
    },
    ListScenarios,
    InflateQuery {
        skeleton_id: String,
        query_id: String,
        #[serde(default)]
        shape: Option<ValueShapeConfig>,
    },
    /// Plays the given scenario, or the active one.
    PlayScenario {
        #[serde(default)]
        scenario_id: Option<String>,
    },
    SaveLightPayload {
        skeleton_id: String,
        query_id: String,
        light: LightPayload,
    },
    SetQueryShape {
        skeleton_id: String,
        query_id: String,
        #[serde(default)]
        shape: Option<ValueShapeConfig>,
    },
    SetCurrentDashboard {
        #[serde(default)]
        dashboard: Option<DashboardRef>,
    },
    /// With `wait`, polls until a dashboard is current or the poll budget runs out.
    GetCurrentDashboard {
        #[serde(default)]
        wait: bool,
    },
    ExportScenario {
        scenario_id: String,
        path: String,
    },
    ImportScenario {
        path: String,
    },
}

impl Request {
    /// Short name used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Request::CaptureSkeleton { .. } => "captureSkeleton",
            Request::DeleteSkeleton { .. } => "deleteSkeleton",
            Request::ListSkeletons => "listSkeletons",
            Request::CreateScenario { .. } => "createScenario",
            Request::RenameScenario { .. } => "renameScenario",
            Request::AddToScenario { .. } => "addToScenario",
            Request::RemoveFromScenario { .. } => "removeFromScenario",
            Request::DeleteScenario { .. } => "deleteScenario",
            Request::ActivateScenario { .. } => "activateScenario",
            Request::ListScenarios => "listScenarios",
            Request::InflateQuery { .. } => "inflateQuery",
            Request::PlayScenario { .. } => "playScenario",
            Request::SaveLightPayload { .. } => "saveLightPayload",
            Request::SetQueryShape { .. } => "setQueryShape",
            Request::SetCurrentDashboard { .. } => "setCurrentDashboard",
            Request::GetCurrentDashboard { .. } => "getCurrentDashboard",
            Request::ExportScenario { .. } => "exportScenario",
            Request::ImportScenario { .. } => "importScenario",
        }
    }
}

// ============================================================================
// RESPONSES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Response {
    Ok,
    SkeletonCaptured {
        skeleton_id: String,
        query_ids: Vec<String>,
    },
    Skeletons {
        skeletons: Vec<SkeletonSummary>,
    },
    Scenario {
        scenario: Scenario,
    },
    Scenarios {
        scenarios: Vec<Scenario>,
        active_scenario_id: Option<String>,
    },
    Inflated {
        query: InflatedQuery,
    },
    Playback {
        result: PlaybackResult,
    },
    CurrentDashboard {
        dashboard: Option<DashboardRef>,
    },
    Error {
        kind: String,
        message: String,
    },
}
