use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata describing a survey campaign; read-only to the exporters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyProject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
    /// Grid spacing in decimal degrees, when the project was planned on a grid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_spacing: Option<f64>,
    /// Serialized boundary polygon as supplied by the collector.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boundary: Option<String>,
}

impl SurveyProject {
    pub fn new(id: impl Into<String>, name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            created_at,
            grid_spacing: None,
            boundary: None,
        }
    }
}
