use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Single geolocated magnetometer sample. Field components are in μT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MagneticReading {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude: Option<f64>,
    pub magnetic_x: f64,
    pub magnetic_y: f64,
    pub magnetic_z: f64,
    pub total_field: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Horizontal GPS accuracy in meters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
    pub project_id: String,
}

impl MagneticReading {
    /// Builds a reading whose total field is derived from the three components.
    pub fn from_components(
        project_id: impl Into<String>,
        latitude: f64,
        longitude: f64,
        (magnetic_x, magnetic_y, magnetic_z): (f64, f64, f64),
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            latitude,
            longitude,
            altitude: None,
            magnetic_x,
            magnetic_y,
            magnetic_z,
            total_field: total_field(magnetic_x, magnetic_y, magnetic_z),
            timestamp,
            notes: None,
            accuracy: None,
            heading: None,
            project_id: project_id.into(),
        }
    }

    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = Some(altitude);
        self
    }

    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = Some(accuracy);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn altitude_or_zero(&self) -> f64 {
        self.altitude.unwrap_or(0.0)
    }
}

/// Magnitude of the three-axis field vector.
pub fn total_field(x: f64, y: f64, z: f64) -> f64 {
    (x * x + y * y + z * z).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_field_is_vector_magnitude() {
        assert_eq!(total_field(3.0, 4.0, 0.0), 5.0);
        assert_eq!(total_field(0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn from_components_derives_total_field() {
        let at = DateTime::from_timestamp(0, 0).unwrap();
        let reading = MagneticReading::from_components("p", 1.0, 2.0, (2.0, 3.0, 6.0), at);
        assert_eq!(reading.total_field, 7.0);
        assert_eq!(reading.altitude_or_zero(), 0.0);
    }
}
