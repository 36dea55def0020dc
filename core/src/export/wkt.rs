use crate::export::fields::{altitude, coord, field, iso, quoted};
use crate::export::ExportRequest;
use crate::prelude::QualityBand;

pub const HEADER: &str =
    "id,geometry,timestamp,altitude,magnetic_x,magnetic_y,magnetic_z,total_field,quality_flag,notes";

/// Well-Known-Text point geometry, longitude first.
pub fn point(longitude: f64, latitude: f64) -> String {
    format!("POINT({} {})", coord(longitude), coord(latitude))
}

/// CSV table with one WKT point per reading, loadable as a delimited-text GIS layer.
pub fn encode(request: &ExportRequest<'_>, quality: &QualityBand) -> String {
    let mut lines = Vec::with_capacity(request.readings.len() + 1);
    lines.push(HEADER.to_string());
    for (i, reading) in request.readings.iter().enumerate() {
        lines.push(
            [
                format!("MAG_{}", i + 1),
                quoted(&point(reading.longitude, reading.latitude)),
                iso(reading.timestamp),
                altitude(reading.altitude_or_zero()),
                field(reading.magnetic_x),
                field(reading.magnetic_y),
                field(reading.magnetic_z),
                field(reading.total_field),
                quality.flag(reading.total_field).as_str().to_string(),
                quoted(reading.notes.as_deref().unwrap_or_default()),
            ]
            .join(","),
        );
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::fixtures::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn readings_become_wkt_rows() {
        let project = project();
        let readings = readings();
        let request = ExportRequest {
            project: &project,
            readings: &readings,
            cells: &[],
            notes: &[],
        };
        let out = encode(&request, &QualityBand::default());
        let expected = format!(
            "{}\n{}\n{}\n",
            HEADER,
            "MAG_1,\"POINT(-0.18000000 5.60000000)\",2024-01-01T01:00:00.000Z,12.50,30.000,20.000,25.000,45.000,GOOD,\"\"",
            "MAG_2,\"POINT(-0.19000000 5.61000000)\",2024-01-01T02:00:00.000Z,0.00,30.000,20.000,25.000,46.000,GOOD,\"\""
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn multi_line_note_stays_on_one_row() {
        let project = project();
        let readings = vec![reading(5.60, -0.18, 45.0, 0).with_notes("pipe\r\ncrossing")];
        let request = ExportRequest {
            project: &project,
            readings: &readings,
            cells: &[],
            notes: &[],
        };
        let out = encode(&request, &QualityBand::default());
        assert_eq!(out.lines().count(), 2);
        assert!(out.lines().nth(1).unwrap().ends_with(",GOOD,\"pipe crossing\""));
    }

    #[test]
    fn empty_survey_is_header_only() {
        let project = project();
        let request = ExportRequest {
            project: &project,
            readings: &[],
            cells: &[],
            notes: &[],
        };
        assert_eq!(encode(&request, &QualityBand::default()), format!("{}\n", HEADER));
    }
}
