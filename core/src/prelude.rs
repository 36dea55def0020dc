use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Exclusive total-field bounds, in μT, for a reading to be flagged `GOOD`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityBand {
    pub min_total_field: f64,
    pub max_total_field: f64,
}

impl Default for QualityBand {
    fn default() -> Self {
        Self {
            min_total_field: 20.0,
            max_total_field: 70.0,
        }
    }
}

impl QualityBand {
    pub fn is_good(&self, total_field: f64) -> bool {
        total_field > self.min_total_field && total_field < self.max_total_field
    }

    pub fn flag(&self, total_field: f64) -> QualityFlag {
        if self.is_good(total_field) {
            QualityFlag::Good
        } else {
            QualityFlag::Poor
        }
    }
}

/// Plausibility tag written next to each exported reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QualityFlag {
    Good,
    Poor,
}

impl QualityFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityFlag::Good => "GOOD",
            QualityFlag::Poor => "POOR",
        }
    }
}

/// Tuning for the sigma-threshold anomaly pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    pub min_readings: usize,
    pub threshold_sigma: f64,
    pub high_sigma: f64,
    pub display_limit: usize,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            min_readings: 10,
            threshold_sigma: 2.0,
            high_sigma: 3.0,
            display_limit: 20,
        }
    }
}

/// Shared configuration for the analysis and export components.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurveyConfig {
    pub quality: QualityBand,
    pub anomaly: AnomalyConfig,
}

/// Common error type for survey analysis and export.
#[derive(thiserror::Error, Debug)]
pub enum SurveyError {
    #[error("no readings available")]
    EmptyInput,
    #[error("backing store not found at {0}")]
    MissingBackingStore(PathBuf),
    #[error("failed to write {path}: {source}")]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported environment: {0}")]
    UnsupportedEnvironment(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("encoding failure: {0}")]
    Encoding(String),
    #[error("internal failure: {0}")]
    Internal(String),
}

pub type SurveyResult<T> = Result<T, SurveyError>;
