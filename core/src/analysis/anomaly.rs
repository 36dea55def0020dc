use crate::analysis::statistics::SurveyStatistics;
use crate::model::MagneticReading;
use crate::prelude::AnomalyConfig;
use crate::telemetry::log::LogManager;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Medium => f.write_str("medium"),
            Severity::High => f.write_str("high"),
        }
    }
}

/// A reading whose total field strays beyond the sigma threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Anomaly {
    /// Position of the reading in the caller's sequence.
    pub index: usize,
    pub reading: MagneticReading,
    pub deviation: f64,
    pub severity: Severity,
}

/// Every detected anomaly, strongest first, plus the threshold that produced them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyReport {
    pub mean: f64,
    pub threshold: f64,
    pub anomalies: Vec<Anomaly>,
    display_limit: usize,
}

impl AnomalyReport {
    fn skipped(display_limit: usize) -> Self {
        Self {
            mean: 0.0,
            threshold: 0.0,
            anomalies: Vec::new(),
            display_limit,
        }
    }

    /// The strongest anomalies, capped at the display limit.
    pub fn top(&self) -> &[Anomaly] {
        let end = self.anomalies.len().min(self.display_limit);
        &self.anomalies[..end]
    }

    pub fn len(&self) -> usize {
        self.anomalies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anomalies.is_empty()
    }

    pub fn high_count(&self) -> usize {
        self.anomalies
            .iter()
            .filter(|a| a.severity == Severity::High)
            .count()
    }
}

/// Flags readings deviating more than `threshold_sigma` standard deviations from the mean.
pub struct AnomalyDetector {
    config: AnomalyConfig,
    logger: LogManager,
}

impl AnomalyDetector {
    pub fn new(config: AnomalyConfig) -> Self {
        Self {
            config,
            logger: LogManager::new("magcore::anomaly"),
        }
    }

    pub fn detect(&self, readings: &[MagneticReading], stats: &SurveyStatistics) -> AnomalyReport {
        if readings.len() < self.config.min_readings {
            self.logger.warn(&format!(
                "anomaly detection skipped: {} readings, need {}",
                readings.len(),
                self.config.min_readings
            ));
            return AnomalyReport::skipped(self.config.display_limit);
        }

        let mean = stats.mean_field;
        let threshold = self.config.threshold_sigma * stats.std_dev_field;
        let high = self.config.high_sigma * stats.std_dev_field;

        let mut anomalies: Vec<Anomaly> = readings
            .iter()
            .enumerate()
            .filter_map(|(index, reading)| {
                let deviation = (reading.total_field - mean).abs();
                (deviation > threshold).then(|| Anomaly {
                    index,
                    reading: reading.clone(),
                    deviation,
                    severity: if deviation > high {
                        Severity::High
                    } else {
                        Severity::Medium
                    },
                })
            })
            .collect();
        anomalies.sort_by(|a, b| b.deviation.total_cmp(&a.deviation));

        self.logger.record(&format!(
            "Anomalies {} (threshold {:.3} μT)",
            anomalies.len(),
            threshold
        ));

        AnomalyReport {
            mean,
            threshold,
            anomalies,
            display_limit: self.config.display_limit,
        }
    }

    /// Detection result truncated to the display limit.
    pub fn detect_top(
        &self,
        readings: &[MagneticReading],
        stats: &SurveyStatistics,
    ) -> Vec<Anomaly> {
        self.detect(readings, stats).top().to_vec()
    }
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new(AnomalyConfig::default())
    }
}
