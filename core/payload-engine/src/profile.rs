//! FILENAME: core/payload-engine/src/profile.rs
//! PURPOSE: Constants that differ between the Explore and Admin dashboards.
//! CONTEXT: Both dashboards render the same pivot result shape; they only
//! disagree on category labels, which queries count as grids, and how tightly
//! percentage values are clamped.

use query_schema::GridRule;
use serde::{Deserialize, Serialize};

/// Chart family a payload is synthesized for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualizationProfile {
    /// Zendesk Explore dashboards.
    #[default]
    Explore,
    /// Admin Center dashboards (AI Copilot, WFM).
    Admin,
}

impl VisualizationProfile {
    /// Parses a profile name. Unknown names fall back to Explore.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "admin" | "admin_copilot" | "wfm" => VisualizationProfile::Admin,
            _ => VisualizationProfile::Explore,
        }
    }

    pub fn grid_rule(&self) -> GridRule {
        match self {
            VisualizationProfile::Explore => GridRule::Explore,
            VisualizationProfile::Admin => GridRule::Admin,
        }
    }

    /// Label of the category at 0-based `index`.
    pub fn category_label(&self, index: usize) -> String {
        match self {
            VisualizationProfile::Explore => format!("Category {}", index + 1),
            VisualizationProfile::Admin => format!("{}", index + 1),
        }
    }

    /// Inclusive bounds percentage values are clamped to.
    pub fn percent_clamp(&self) -> (f64, f64) {
        match self {
            VisualizationProfile::Explore => (0.2, 0.95),
            VisualizationProfile::Admin => (0.1, 0.9),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_labels() {
        assert_eq!(VisualizationProfile::Explore.category_label(0), "Category 1");
        assert_eq!(VisualizationProfile::Admin.category_label(2), "3");
    }

    #[test]
    fn test_parse() {
        assert_eq!(VisualizationProfile::parse("Admin"), VisualizationProfile::Admin);
        assert_eq!(VisualizationProfile::parse("explore"), VisualizationProfile::Explore);
        assert_eq!(VisualizationProfile::parse("??"), VisualizationProfile::Explore);
    }
}
