use crate::generator::profile::GeneratorConfig;
use anyhow::Context;
use magcore::export::ExportFormat;
use magcore::model::GeoPoint;
use magcore::SurveyConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GridConfig {
    pub center_lat: f64,
    pub center_lon: f64,
    /// Cell side in decimal degrees.
    pub spacing: f64,
    pub rows: u32,
    pub cols: u32,
    /// Points a cell needs before the driver marks it completed.
    #[serde(default = "default_complete_after")]
    pub complete_after: u32,
}

fn default_complete_after() -> u32 {
    5
}

impl GridConfig {
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(self.center_lat, self.center_lon)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: ExportFormat,
    pub output_dir: PathBuf,
    #[serde(default)]
    pub store_path: Option<PathBuf>,
    /// Summarize only; nothing is encoded or copied.
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkflowConfig {
    pub project: ProjectConfig,
    pub grid: GridConfig,
    pub export: OutputConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub survey: SurveyConfig,
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(
        rows: u32,
        cols: u32,
        spacing: f64,
        format: ExportFormat,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            project: ProjectConfig {
                name: "Survey".into(),
                description: "Synthetic magnetometer survey".into(),
            },
            grid: GridConfig {
                center_lat: 5.6037,
                center_lon: -0.187,
                spacing,
                rows,
                cols,
                complete_after: default_complete_after(),
            },
            export: OutputConfig {
                format,
                output_dir,
                store_path: None,
                dry_run: false,
            },
            generator: GeneratorConfig::default(),
            survey: SurveyConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_uses_defaults() {
        let cfg = WorkflowConfig::from_args(3, 4, 0.0005, ExportFormat::Kml, "out".into());
        assert_eq!(cfg.grid.rows, 3);
        assert_eq!(cfg.grid.complete_after, 5);
        assert_eq!(cfg.survey.quality.max_total_field, 70.0);
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"project:\n  name: North Ridge\n\
grid:\n  center_lat: 5.6\n  center_lon: -0.18\n  spacing: 0.0005\n  rows: 3\n  cols: 2\n\
export:\n  format: geojson\n  output_dir: exports\n\
generator:\n  seed: 7\n  points_per_cell: 2\n\
survey:\n  quality:\n    min_total_field: 25.0\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.project.name, "North Ridge");
        assert_eq!(cfg.export.format, ExportFormat::GeoJson);
        assert!(!cfg.export.dry_run);
        assert_eq!(cfg.generator.seed, 7);
        assert_eq!(cfg.generator.base_field, 48.0);
        assert_eq!(cfg.survey.quality.min_total_field, 25.0);
        assert_eq!(cfg.survey.anomaly.min_readings, 10);
    }

    #[test]
    fn config_load_reports_bad_format_tag() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"project: {name: X}\ngrid: {center_lat: 0, center_lon: 0, spacing: 1, rows: 1, cols: 1}\nexport: {format: shp, output_dir: out}\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let err = WorkflowConfig::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("parsing workflow config"));
    }
}
