use crate::generator::template::{dipole_anomaly, field_components};
use chrono::{DateTime, Duration, Utc};
use magcore::model::{GridCell, MagneticReading};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Buried source injected into the synthetic field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DipoleSource {
    pub latitude: f64,
    pub longitude: f64,
    /// Peak total-field contribution in μT.
    pub strength: f64,
    /// Half-width of the response in degrees.
    pub radius: f64,
}

/// Configuration for generating a synthetic walk over the grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub points_per_cell: u32,
    pub base_field: f64,
    /// Regional gradient in μT per degree of latitude.
    pub gradient: f64,
    pub noise: f64,
    pub inclination_deg: f64,
    pub declination_deg: f64,
    pub interval_secs: i64,
    pub altitude: f64,
    pub accuracy: f64,
    pub seed: u64,
    pub anomaly: Option<DipoleSource>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            points_per_cell: 6,
            base_field: 48.0,
            gradient: 15.0,
            noise: 0.25,
            inclination_deg: -12.0,
            declination_deg: -4.0,
            interval_secs: 20,
            altitude: 60.0,
            accuracy: 4.0,
            seed: 0,
            anomaly: None,
        }
    }
}

fn cell_half_extent(cell: &GridCell) -> (f64, f64) {
    let lat = cell
        .bounds
        .iter()
        .map(|p| (p.latitude - cell.center.latitude).abs())
        .fold(0.0, f64::max);
    let lon = cell
        .bounds
        .iter()
        .map(|p| (p.longitude - cell.center.longitude).abs())
        .fold(0.0, f64::max);
    (lat, lon)
}

/// Walks `path` in order, dropping `points_per_cell` jittered readings into each cell.
pub fn build_readings(
    config: &GeneratorConfig,
    path: &[GridCell],
    project_id: &str,
    start: DateTime<Utc>,
) -> Vec<MagneticReading> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut readings = Vec::with_capacity(path.len() * config.points_per_cell as usize);
    let mut at = start;

    for cell in path {
        let (half_lat, half_lon) = cell_half_extent(cell);
        for _ in 0..config.points_per_cell {
            let latitude = cell.center.latitude + rng.gen_range(-0.9f64..=0.9) * half_lat;
            let longitude = cell.center.longitude + rng.gen_range(-0.9f64..=0.9) * half_lon;

            let mut total =
                config.base_field + config.gradient * (latitude - path[0].center.latitude);
            if let Some(source) = &config.anomaly {
                let distance =
                    (latitude - source.latitude).hypot(longitude - source.longitude);
                total += dipole_anomaly(distance, source.strength, source.radius);
            }
            if config.noise > 0.0 {
                total += rng.gen_range(-config.noise..config.noise);
            }

            let components =
                field_components(total, config.inclination_deg, config.declination_deg);
            let reading =
                MagneticReading::from_components(project_id, latitude, longitude, components, at)
                    .with_altitude(config.altitude + rng.gen_range(-1.5f64..1.5))
                    .with_accuracy(config.accuracy);
            readings.push(reading);
            at += Duration::seconds(config.interval_secs);
        }
    }

    readings
}
