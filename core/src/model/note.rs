use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Geolocated free-text annotation recorded in the field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldNote {
    pub latitude: f64,
    pub longitude: f64,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_path: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub project_id: String,
}

impl FieldNote {
    pub fn has_image(&self) -> bool {
        self.image_path.as_deref().is_some_and(|p| !p.is_empty())
    }

    pub fn has_audio(&self) -> bool {
        self.audio_path.as_deref().is_some_and(|p| !p.is_empty())
    }

    /// Media tag such as `IMAGE;AUDIO;`, empty when nothing is attached.
    pub fn media_tag(&self) -> String {
        let mut tag = String::new();
        if self.has_image() {
            tag.push_str("IMAGE;");
        }
        if self.has_audio() {
            tag.push_str("AUDIO;");
        }
        tag
    }
}
