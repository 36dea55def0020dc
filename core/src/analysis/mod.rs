pub mod anomaly;
pub mod grid;
pub mod statistics;

pub use anomaly::{Anomaly, AnomalyDetector, AnomalyReport, Severity};
pub use grid::{CoverageSummary, GridPlanner};
pub use statistics::SurveyStatistics;
