//! Encoders that turn a survey into files for GIS tools, spreadsheets and Google Earth.
//!
//! Every text encoder is a pure function of an [`ExportRequest`] plus the export
//! timestamp carried by [`ExportContext`], so identical inputs give identical bytes.
//! Only the raw-store snapshot and the persist helpers in [`share`] touch the disk.

pub mod csv;
pub mod fields;
pub mod geojson;
pub mod kml;
pub mod share;
pub mod snapshot;
pub mod wkt;

use crate::model::{FieldNote, GridCell, MagneticReading, SurveyProject};
use crate::prelude::{QualityBand, SurveyError, SurveyResult};
use crate::telemetry::{LogManager, MetricsRecorder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub use share::{persist, persist_and_share, persist_async, ShareTarget};

pub const SOFTWARE_TAG: &str = concat!("magcore ", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    GeoJson,
    Kml,
    Shapefile,
    Database,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 5] = [
        ExportFormat::Csv,
        ExportFormat::GeoJson,
        ExportFormat::Kml,
        ExportFormat::Shapefile,
        ExportFormat::Database,
    ];

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv | ExportFormat::Shapefile => "csv",
            ExportFormat::GeoJson => "geojson",
            ExportFormat::Kml => "kml",
            ExportFormat::Database => "db",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv | ExportFormat::Shapefile => "text/csv",
            ExportFormat::GeoJson => "application/geo+json",
            ExportFormat::Kml => "application/vnd.google-earth.kml+xml",
            ExportFormat::Database => "application/vnd.sqlite3",
        }
    }

    fn tag(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::GeoJson => "geojson",
            ExportFormat::Kml => "kml",
            ExportFormat::Shapefile => "shapefile",
            ExportFormat::Database => "database",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ExportFormat {
    type Err = SurveyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        ExportFormat::ALL
            .into_iter()
            .find(|f| f.tag() == needle)
            .ok_or_else(|| SurveyError::InvalidInput(format!("unknown export format '{}'", s)))
    }
}

/// Where the exporter may read the backing store and write snapshots.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageAccess {
    Filesystem {
        store_path: PathBuf,
        export_dir: PathBuf,
    },
    Unavailable,
}

/// Environment of a single export run.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportContext {
    pub exported_at: DateTime<Utc>,
    pub software: String,
    pub storage: StorageAccess,
}

impl ExportContext {
    pub fn new(exported_at: DateTime<Utc>) -> Self {
        Self {
            exported_at,
            software: SOFTWARE_TAG.to_string(),
            storage: StorageAccess::Unavailable,
        }
    }

    pub fn with_storage(mut self, storage: StorageAccess) -> Self {
        self.storage = storage;
        self
    }
}

/// Borrowed survey content shared by every encoder.
#[derive(Debug, Clone, Copy)]
pub struct ExportRequest<'a> {
    pub project: &'a SurveyProject,
    pub readings: &'a [MagneticReading],
    pub cells: &'a [GridCell],
    pub notes: &'a [FieldNote],
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutput {
    Text {
        file_name: String,
        mime_type: &'static str,
        body: String,
    },
    File {
        path: PathBuf,
        mime_type: &'static str,
    },
}

impl ExportOutput {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportOutput::Text { mime_type, .. } | ExportOutput::File { mime_type, .. } => {
                *mime_type
            }
        }
    }

    pub fn body(&self) -> Option<&str> {
        match self {
            ExportOutput::Text { body, .. } => Some(body.as_str()),
            ExportOutput::File { .. } => None,
        }
    }
}

/// `{project_name}_{unix_millis}.{ext}` with separators and whitespace replaced.
pub fn export_file_name(project_name: &str, at: DateTime<Utc>, format: ExportFormat) -> String {
    let stem: String = project_name
        .trim()
        .chars()
        .map(|c| {
            if c.is_whitespace() || matches!(c, '/' | '\\' | ':') {
                '_'
            } else {
                c
            }
        })
        .collect();
    let stem: &str = if stem.is_empty() { "survey" } else { &stem };
    format!("{}_{}.{}", stem, at.timestamp_millis(), format.extension())
}

/// Dispatches a survey to one of the encoders.
pub struct GeoExporter {
    quality: QualityBand,
    context: ExportContext,
    logger: LogManager,
    metrics: MetricsRecorder,
}

impl GeoExporter {
    pub fn new(quality: QualityBand, context: ExportContext) -> Self {
        Self {
            quality,
            context,
            logger: LogManager::new("magcore::export"),
            metrics: MetricsRecorder::new(),
        }
    }

    pub fn metrics(&self) -> &MetricsRecorder {
        &self.metrics
    }

    pub fn export(
        &self,
        request: &ExportRequest<'_>,
        format: ExportFormat,
    ) -> SurveyResult<ExportOutput> {
        match self.encode(request, format) {
            Ok(output) => {
                self.metrics.record_export();
                self.logger.record(&format!(
                    "Exported '{}' as {} ({} readings, {} cells, {} notes)",
                    request.project.name,
                    format,
                    request.readings.len(),
                    request.cells.len(),
                    request.notes.len()
                ));
                Ok(output)
            }
            Err(err) => {
                self.metrics.record_failure();
                self.logger
                    .warn(&format!("{} export failed: {}", format, err));
                Err(err)
            }
        }
    }

    fn encode(
        &self,
        request: &ExportRequest<'_>,
        format: ExportFormat,
    ) -> SurveyResult<ExportOutput> {
        let ctx = &self.context;
        let body = match format {
            ExportFormat::Csv => csv::encode(request, &self.quality, ctx),
            ExportFormat::GeoJson => geojson::encode(request, &self.quality, ctx)?,
            ExportFormat::Kml => kml::encode(request, &self.quality)?,
            ExportFormat::Shapefile => wkt::encode(request, &self.quality),
            ExportFormat::Database => {
                let path =
                    snapshot::copy_store(&ctx.storage, &request.project.name, ctx.exported_at)?;
                return Ok(ExportOutput::File {
                    path,
                    mime_type: format.mime_type(),
                });
            }
        };
        self.logger
            .trace(&format!("{} encoder produced {} bytes", format, body.len()));
        Ok(ExportOutput::Text {
            file_name: export_file_name(&request.project.name, ctx.exported_at, format),
            mime_type: format.mime_type(),
            body,
        })
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::model::{CellStatus, GeoPoint};

    pub fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    pub fn project() -> SurveyProject {
        let mut project = SurveyProject::new("p1", "Test", at(1_704_067_200));
        project.description = "Ridge traverse".into();
        project
    }

    pub fn reading(lat: f64, lon: f64, total: f64, secs: i64) -> MagneticReading {
        let mut r = MagneticReading::from_components("p1", lat, lon, (30.0, 20.0, 25.0), at(secs));
        r.total_field = total;
        r
    }

    pub fn readings() -> Vec<MagneticReading> {
        vec![
            reading(5.60, -0.18, 45.0, 1_704_070_800).with_altitude(12.5),
            reading(5.61, -0.19, 46.0, 1_704_074_400),
        ]
    }

    pub fn cell(row: u32, col: u32, status: CellStatus) -> GridCell {
        let mut cell = GridCell::new(
            row,
            col,
            GeoPoint::new(0.5, 0.5),
            vec![
                GeoPoint::new(0.0, 0.0),
                GeoPoint::new(0.0, 1.0),
                GeoPoint::new(1.0, 1.0),
                GeoPoint::new(1.0, 0.0),
            ],
        );
        cell.status = status;
        cell
    }

    pub fn note(content: &str, image: bool, audio: bool) -> FieldNote {
        FieldNote {
            latitude: 5.605,
            longitude: -0.185,
            content: content.into(),
            image_path: image.then(|| "photos/n1.jpg".to_string()),
            audio_path: audio.then(|| "audio/n1.m4a".to_string()),
            timestamp: at(1_704_072_000),
            project_id: "p1".into(),
        }
    }

    pub fn context() -> ExportContext {
        ExportContext::new(at(1_704_153_600))
    }
}
