use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use chrono::{DateTime, Utc};
use log::{info, warn};
use magcore::analysis::{
    AnomalyDetector, AnomalyReport, CoverageSummary, GridPlanner, SurveyStatistics,
};
use magcore::export::{ExportContext, ExportOutput, ExportRequest, GeoExporter, StorageAccess};
use magcore::model::{CellStatus, FieldNote, GridCell, MagneticReading, SurveyProject};
use magcore::SurveyError;

pub struct WorkflowResult {
    pub cells: Vec<GridCell>,
    pub path: Vec<GridCell>,
    pub coverage: CoverageSummary,
    /// `None` when no readings were recorded.
    pub statistics: Option<SurveyStatistics>,
    pub anomalies: Option<AnomalyReport>,
    /// `None` on a dry run.
    pub output: Option<ExportOutput>,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub fn project(&self, created_at: DateTime<Utc>) -> SurveyProject {
        let mut project = SurveyProject::new(
            format!("{}-{}", self.config.project.name, created_at.timestamp()),
            self.config.project.name.clone(),
            created_at,
        );
        project.description = self.config.project.description.clone();
        project.grid_spacing = Some(self.config.grid.spacing);
        project
    }

    fn planned_cells(&self, planner: &GridPlanner) -> Vec<GridCell> {
        let grid = &self.config.grid;
        planner.create_regular_grid(grid.center(), grid.spacing, grid.rows, grid.cols)
    }

    /// Grid cells in snake order, ready for a collector to walk.
    pub fn plan(&self) -> Vec<GridCell> {
        let planner = GridPlanner::new();
        planner.optimize_survey_path(&self.planned_cells(&planner))
    }

    fn export_context(&self, exported_at: DateTime<Utc>) -> ExportContext {
        let export = &self.config.export;
        let storage = match &export.store_path {
            Some(store_path) => StorageAccess::Filesystem {
                store_path: store_path.clone(),
                export_dir: export.output_dir.clone(),
            },
            None => StorageAccess::Unavailable,
        };
        ExportContext::new(exported_at).with_storage(storage)
    }

    pub fn execute(
        &self,
        project: &SurveyProject,
        readings: &[MagneticReading],
        notes: &[FieldNote],
        exported_at: DateTime<Utc>,
    ) -> anyhow::Result<WorkflowResult> {
        if readings.is_empty() && notes.is_empty() {
            return Err(SurveyError::EmptyInput).context("survey has no readings or field notes");
        }

        let planner = GridPlanner::new();
        let complete_after = self.config.grid.complete_after;
        let cells: Vec<GridCell> = planner
            .assign_readings(&self.planned_cells(&planner), readings)
            .into_iter()
            .map(|cell| {
                if complete_after > 0 && cell.point_count >= complete_after {
                    cell.with_status(CellStatus::Completed, exported_at)
                } else {
                    cell
                }
            })
            .collect();
        let path = planner.optimize_survey_path(&cells);
        let coverage = planner.coverage_summary(&cells);

        let statistics = SurveyStatistics::compute(readings);
        let detector = AnomalyDetector::new(self.config.survey.anomaly);
        let anomalies = statistics
            .as_ref()
            .map(|stats| detector.detect(readings, stats));
        if statistics.is_none() {
            warn!("workflow '{}': no readings, statistics skipped", project.name);
        }

        let format = self.config.export.format;
        let output = if self.config.export.dry_run {
            info!("workflow '{}': dry run, {} export skipped", project.name, format);
            None
        } else {
            let exporter =
                GeoExporter::new(self.config.survey.quality, self.export_context(exported_at));
            let request = ExportRequest {
                project,
                readings,
                cells: &cells,
                notes,
            };
            let output = exporter
                .export(&request, format)
                .with_context(|| format!("exporting survey as {}", format))?;
            Some(output)
        };

        info!(
            "workflow '{}': {} readings, {:.1}% coverage, {} anomalies",
            project.name,
            readings.len(),
            coverage.coverage_percent,
            anomalies.as_ref().map_or(0, AnomalyReport::len)
        );

        Ok(WorkflowResult {
            cells,
            path,
            coverage,
            statistics,
            anomalies,
            output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::{build_readings, DipoleSource};
    use magcore::export::ExportFormat;
    use tempfile::tempdir;

    fn config(format: ExportFormat) -> WorkflowConfig {
        WorkflowConfig::from_args(3, 3, 0.001, format, "exports".into())
    }

    fn start() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn runner_executes_workflow() {
        let cfg = config(ExportFormat::GeoJson);
        let runner = Runner::new(cfg.clone());
        let project = runner.project(start());
        let readings = build_readings(&cfg.generator, &runner.plan(), &project.id, start());

        let result = runner.execute(&project, &readings, &[], start()).unwrap();
        assert_eq!(result.cells.len(), 9);
        assert_eq!(result.path.len(), 9);
        let stats = result.statistics.unwrap();
        assert_eq!(stats.total_points, 9 * cfg.generator.points_per_cell as usize);
        assert_eq!(result.coverage.coverage_percent, 100.0);
        let output = result.output.unwrap();
        assert_eq!(output.mime_type(), "application/geo+json");
        assert!(output.body().unwrap().contains("\"FeatureCollection\""));
    }

    #[test]
    fn injected_source_is_flagged() {
        let mut cfg = config(ExportFormat::Csv);
        let runner = Runner::new(cfg.clone());
        let path = runner.plan();
        let project = runner.project(start());
        cfg.generator.noise = 0.05;
        cfg.generator.gradient = 0.0;

        let hit_index = 4 * cfg.generator.points_per_cell as usize;
        let baseline = build_readings(&cfg.generator, &path, &project.id, start());
        cfg.generator.anomaly = Some(DipoleSource {
            latitude: baseline[hit_index].latitude,
            longitude: baseline[hit_index].longitude,
            strength: 25.0,
            radius: 0.0001,
        });
        let readings = build_readings(&cfg.generator, &path, &project.id, start());

        let result = runner.execute(&project, &readings, &[], start()).unwrap();
        let anomalies = result.anomalies.unwrap();
        let strongest = &anomalies.top()[0];
        assert_eq!(strongest.index, hit_index);
        assert!(path[4].contains(strongest.reading.latitude, strongest.reading.longitude));
    }

    #[test]
    fn dry_run_writes_nothing() {
        let dir = tempdir().unwrap();
        let store_path = dir.path().join("survey.db");
        std::fs::write(&store_path, b"SQLite format 3\0").unwrap();
        let out_dir = dir.path().join("exports");

        let mut cfg =
            WorkflowConfig::from_args(2, 2, 0.001, ExportFormat::Database, out_dir.clone());
        cfg.export.store_path = Some(store_path);
        cfg.export.dry_run = true;
        let runner = Runner::new(cfg.clone());
        let project = runner.project(start());
        let readings = build_readings(&cfg.generator, &runner.plan(), &project.id, start());

        let result = runner.execute(&project, &readings, &[], start()).unwrap();
        assert!(result.output.is_none());
        assert!(result.statistics.is_some());
        assert!(!out_dir.exists());
    }

    #[test]
    fn notes_only_survey_is_still_exported() {
        let runner = Runner::new(config(ExportFormat::Csv));
        let project = runner.project(start());
        let notes = vec![FieldNote {
            latitude: 5.6037,
            longitude: -0.187,
            content: "fence line".into(),
            image_path: None,
            audio_path: None,
            timestamp: start(),
            project_id: project.id.clone(),
        }];

        let result = runner.execute(&project, &[], &notes, start()).unwrap();
        assert!(result.statistics.is_none());
        assert!(result.anomalies.is_none());
        assert_eq!(result.coverage.not_started, 9);
        let body = result.output.unwrap().body().unwrap().to_string();
        assert!(body.contains("# Total Points: 0"));
        assert!(body.contains("NOTE_1"));
    }

    #[test]
    fn empty_survey_is_reported() {
        let runner = Runner::new(config(ExportFormat::Csv));
        let err = runner
            .execute(&runner.project(start()), &[], &[], start())
            .err()
            .unwrap();
        assert!(matches!(
            err.downcast_ref::<SurveyError>(),
            Some(SurveyError::EmptyInput)
        ));
    }
}
