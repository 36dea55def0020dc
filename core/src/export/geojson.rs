use crate::export::fields::iso;
use crate::export::{ExportContext, ExportRequest};
use crate::model::{FieldNote, GridCell, MagneticReading};
use crate::prelude::{QualityBand, QualityFlag, SurveyError, SurveyResult};
use serde::Serialize;

#[derive(Serialize)]
struct FeatureCollection<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    metadata: Metadata<'a>,
    features: Vec<Feature<'a>>,
}

#[derive(Serialize)]
struct Metadata<'a> {
    name: &'a str,
    description: &'a str,
    created: String,
    exported: String,
    software: &'a str,
    crs: &'static str,
    units: Units,
    total_points: usize,
    grid_cells: usize,
    field_notes: usize,
}

#[derive(Serialize)]
struct Units {
    coordinates: &'static str,
    altitude: &'static str,
    magnetic_field: &'static str,
}

#[derive(Serialize)]
struct Feature<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    geometry: Geometry,
    properties: Properties<'a>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum Geometry {
    Point { coordinates: Vec<f64> },
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },
}

#[derive(Serialize)]
#[serde(untagged)]
enum Properties<'a> {
    Reading(ReadingProperties<'a>),
    Cell(CellProperties<'a>),
    Note(NoteProperties<'a>),
}

#[derive(Serialize)]
struct ReadingProperties<'a> {
    feature_type: &'static str,
    id: String,
    timestamp: String,
    altitude: Option<f64>,
    magnetic_x: f64,
    magnetic_y: f64,
    magnetic_z: f64,
    total_field: f64,
    accuracy: Option<f64>,
    heading: Option<f64>,
    quality_flag: QualityFlag,
    notes: Option<&'a str>,
}

#[derive(Serialize)]
struct CellProperties<'a> {
    feature_type: &'static str,
    id: String,
    row: u32,
    col: u32,
    status: &'static str,
    point_count: u32,
    started_at: Option<String>,
    completed_at: Option<String>,
    notes: Option<&'a str>,
}

#[derive(Serialize)]
struct NoteProperties<'a> {
    feature_type: &'static str,
    id: String,
    timestamp: String,
    content: &'a str,
    has_image: bool,
    has_audio: bool,
    image_path: Option<&'a str>,
    audio_path: Option<&'a str>,
}

fn reading_feature<'a>(
    i: usize,
    reading: &'a MagneticReading,
    quality: &QualityBand,
) -> Feature<'a> {
    Feature {
        kind: "Feature",
        geometry: Geometry::Point {
            coordinates: vec![reading.longitude, reading.latitude, reading.altitude_or_zero()],
        },
        properties: Properties::Reading(ReadingProperties {
            feature_type: "magnetic_reading",
            id: format!("MAG_{}", i + 1),
            timestamp: iso(reading.timestamp),
            altitude: reading.altitude,
            magnetic_x: reading.magnetic_x,
            magnetic_y: reading.magnetic_y,
            magnetic_z: reading.magnetic_z,
            total_field: reading.total_field,
            accuracy: reading.accuracy,
            heading: reading.heading,
            quality_flag: quality.flag(reading.total_field),
            notes: reading.notes.as_deref(),
        }),
    }
}

fn cell_feature(cell: &GridCell) -> Feature<'_> {
    let ring = cell
        .closed_ring()
        .iter()
        .map(|p| [p.longitude, p.latitude])
        .collect();
    Feature {
        kind: "Feature",
        geometry: Geometry::Polygon {
            coordinates: vec![ring],
        },
        properties: Properties::Cell(CellProperties {
            feature_type: "grid_cell",
            id: cell.id(),
            row: cell.row,
            col: cell.col,
            status: cell.status.as_str(),
            point_count: cell.point_count,
            started_at: cell.started_at.map(iso),
            completed_at: cell.completed_at.map(iso),
            notes: cell.notes.as_deref(),
        }),
    }
}

fn note_feature(i: usize, note: &FieldNote) -> Feature<'_> {
    Feature {
        kind: "Feature",
        geometry: Geometry::Point {
            coordinates: vec![note.longitude, note.latitude],
        },
        properties: Properties::Note(NoteProperties {
            feature_type: "field_note",
            id: format!("NOTE_{}", i + 1),
            timestamp: iso(note.timestamp),
            content: &note.content,
            has_image: note.has_image(),
            has_audio: note.has_audio(),
            image_path: note.image_path.as_deref(),
            audio_path: note.audio_path.as_deref(),
        }),
    }
}

/// Pretty-printed FeatureCollection: readings, then grid cells, then field notes.
pub fn encode(
    request: &ExportRequest<'_>,
    quality: &QualityBand,
    ctx: &ExportContext,
) -> SurveyResult<String> {
    let project = request.project;
    let features: Vec<Feature<'_>> = request
        .readings
        .iter()
        .enumerate()
        .map(|(i, r)| reading_feature(i, r, quality))
        .chain(request.cells.iter().map(cell_feature))
        .chain(request.notes.iter().enumerate().map(|(i, n)| note_feature(i, n)))
        .collect();

    let collection = FeatureCollection {
        kind: "FeatureCollection",
        metadata: Metadata {
            name: &project.name,
            description: &project.description,
            created: iso(project.created_at),
            exported: iso(ctx.exported_at),
            software: &ctx.software,
            crs: "EPSG:4326",
            units: Units {
                coordinates: "decimal degrees",
                altitude: "meters",
                magnetic_field: "microtesla",
            },
            total_points: request.readings.len(),
            grid_cells: request.cells.len(),
            field_notes: request.notes.len(),
        },
        features,
    };

    serde_json::to_string_pretty(&collection).map_err(|e| SurveyError::Encoding(e.to_string()))
}
