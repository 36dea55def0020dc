use crate::math::{BoundingBox, StatsHelper};
use crate::model::MagneticReading;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Descriptive statistics of a survey's readings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurveyStatistics {
    pub total_points: usize,
    pub min_field: f64,
    pub max_field: f64,
    pub mean_field: f64,
    pub median_field: f64,
    /// Population standard deviation of the total field.
    pub std_dev_field: f64,
    pub mean_altitude: f64,
    /// Mean over readings reporting a positive accuracy; `None` when none do.
    pub mean_accuracy: Option<f64>,
    /// Whole hours between the earliest and latest reading.
    pub duration_hours: f64,
    pub area_km2: f64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SurveyStatistics {
    /// Computes statistics over `readings` in any order. Returns `None` when empty.
    pub fn compute(readings: &[MagneticReading]) -> Option<Self> {
        if readings.is_empty() {
            return None;
        }

        let mut by_time: Vec<&MagneticReading> = readings.iter().collect();
        by_time.sort_by_key(|r| r.timestamp);
        let started_at = by_time.first()?.timestamp;
        let finished_at = by_time.last()?.timestamp;

        let fields: Vec<f64> = readings.iter().map(|r| r.total_field).collect();
        let sorted = StatsHelper::sorted(&fields);
        let mean_field = StatsHelper::mean(&sorted);

        let altitudes: Vec<f64> = readings.iter().map(|r| r.altitude_or_zero()).collect();
        let accuracies: Vec<f64> = readings
            .iter()
            .filter_map(|r| r.accuracy)
            .filter(|&a| a > 0.0)
            .collect();
        let mean_accuracy = (!accuracies.is_empty()).then(|| StatsHelper::mean(&accuracies));

        let area_km2 = BoundingBox::from_points(readings.iter().map(|r| (r.latitude, r.longitude)))
            .map(|b| b.area_km2())
            .unwrap_or(0.0);

        Some(Self {
            total_points: readings.len(),
            min_field: sorted[0],
            max_field: sorted[sorted.len() - 1],
            mean_field,
            median_field: StatsHelper::median_sorted(&sorted),
            std_dev_field: StatsHelper::std_dev(&sorted, mean_field),
            mean_altitude: StatsHelper::mean(&altitudes),
            mean_accuracy,
            duration_hours: (finished_at - started_at).num_hours() as f64,
            area_km2,
            started_at,
            finished_at,
        })
    }

    /// Named metric view used by summaries and reports.
    pub fn metrics(&self) -> BTreeMap<&'static str, Option<f64>> {
        BTreeMap::from([
            ("total_points", Some(self.total_points as f64)),
            ("min_field", Some(self.min_field)),
            ("max_field", Some(self.max_field)),
            ("mean_field", Some(self.mean_field)),
            ("median_field", Some(self.median_field)),
            ("std_dev_field", Some(self.std_dev_field)),
            ("mean_altitude", Some(self.mean_altitude)),
            ("mean_accuracy", self.mean_accuracy),
            ("duration_hours", Some(self.duration_hours)),
            ("area_km2", Some(self.area_km2)),
        ])
    }
}
