use crate::export::fields::{altitude, coord, field, iso, one_line, quoted};
use crate::export::{ExportContext, ExportRequest};
use crate::prelude::QualityBand;

pub const READING_HEADER: &str = "point_id,timestamp,latitude,longitude,altitude,magnetic_x,magnetic_y,magnetic_z,total_field,quality_flag,notes";
pub const NOTE_HEADER: &str = "note_id,timestamp,latitude,longitude,content,media_type";

/// Commented metadata block, reading table and, when present, a field-note table.
pub fn encode(request: &ExportRequest<'_>, quality: &QualityBand, ctx: &ExportContext) -> String {
    let project = request.project;
    let mut lines = vec![
        "# Magnetic Survey Data Export".to_string(),
        format!("# Project: {}", one_line(&project.name)),
        format!("# Description: {}", one_line(&project.description)),
        format!("# Survey Date: {}", iso(project.created_at)),
        format!("# Export Date: {}", iso(ctx.exported_at)),
        format!("# Total Points: {}", request.readings.len()),
        format!("# Grid Cells: {}", request.cells.len()),
        format!("# Field Notes: {}", request.notes.len()),
        "# Coordinate System: WGS84 (EPSG:4326)".to_string(),
        "# Magnetic Field Units: microtesla (μT)".to_string(),
        "# Altitude Units: meters".to_string(),
        "#".to_string(),
        READING_HEADER.to_string(),
    ];

    for (i, reading) in request.readings.iter().enumerate() {
        lines.push(
            [
                format!("MAG_{}", i + 1),
                iso(reading.timestamp),
                coord(reading.latitude),
                coord(reading.longitude),
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

    if !request.notes.is_empty() {
        lines.push(String::new());
        lines.push("# Field Notes".to_string());
        lines.push(NOTE_HEADER.to_string());
        for (i, note) in request.notes.iter().enumerate() {
            lines.push(
                [
                    format!("NOTE_{}", i + 1),
                    iso(note.timestamp),
                    coord(note.latitude),
                    coord(note.longitude),
                    quoted(&note.content),
                    quoted(&note.media_tag()),
                ]
                .join(","),
            );
        }
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
    fn two_reading_survey_matches_golden_output() {
        let project = project();
        let readings = readings();
        let request = ExportRequest {
            project: &project,
            readings: &readings,
            cells: &[],
            notes: &[],
        };
        let out = encode(&request, &QualityBand::default(), &context());
        let expected = "\
# Magnetic Survey Data Export
# Project: Test
# Description: Ridge traverse
# Survey Date: 2024-01-01T00:00:00.000Z
# Export Date: 2024-01-02T00:00:00.000Z
# Total Points: 2
# Grid Cells: 0
# Field Notes: 0
# Coordinate System: WGS84 (EPSG:4326)
# Magnetic Field Units: microtesla (μT)
# Altitude Units: meters
#
point_id,timestamp,latitude,longitude,altitude,magnetic_x,magnetic_y,magnetic_z,total_field,quality_flag,notes
MAG_1,2024-01-01T01:00:00.000Z,5.60000000,-0.18000000,12.50,30.000,20.000,25.000,45.000,GOOD,\"\"
MAG_2,2024-01-01T02:00:00.000Z,5.61000000,-0.19000000,0.00,30.000,20.000,25.000,46.000,GOOD,\"\"
";
        assert_eq!(out, expected);

        let data_rows: Vec<&str> = out.lines().filter(|l| l.starts_with("MAG_")).collect();
        assert_eq!(data_rows.len(), 2);
        assert!(data_rows.iter().all(|row| row.contains(",GOOD,")));
    }

    #[test]
    fn out_of_band_readings_are_flagged_poor() {
        let project = project();
        let readings = vec![reading(0.0, 0.0, 20.0, 0), reading(0.0, 0.0, 70.5, 1)];
        let request = ExportRequest {
            project: &project,
            readings: &readings,
            cells: &[],
            notes: &[],
        };
        let out = encode(&request, &QualityBand::default(), &context());
        assert_eq!(out.matches(",POOR,").count(), 2);
    }

    #[test]
    fn configured_band_changes_quality_flag() {
        let project = project();
        let readings = vec![reading(0.0, 0.0, 75.0, 0)];
        let request = ExportRequest {
            project: &project,
            readings: &readings,
            cells: &[],
            notes: &[],
        };
        let band = QualityBand {
            min_total_field: 20.0,
            max_total_field: 80.0,
        };
        assert!(encode(&request, &band, &context()).contains(",GOOD,"));
    }

    #[test]
    fn field_notes_table_follows_readings() {
        let project = project();
        let readings = readings();
        let notes = vec![note("cairn, \"north\"", true, true), note("gate", false, false)];
        let request = ExportRequest {
            project: &project,
            readings: &readings,
            cells: &[],
            notes: &notes,
        };
        let out = encode(&request, &QualityBand::default(), &context());
        let tail: Vec<&str> = out.lines().skip_while(|l| *l != "# Field Notes").collect();
        assert_eq!(
            tail,
            vec![
                "# Field Notes",
                NOTE_HEADER,
                "NOTE_1,2024-01-01T01:20:00.000Z,5.60500000,-0.18500000,\"cairn, \"\"north\"\"\",\"IMAGE;AUDIO;\"",
                "NOTE_2,2024-01-01T01:20:00.000Z,5.60500000,-0.18500000,\"gate\",\"\"",
            ]
        );
    }

    #[test]
    fn multi_line_note_stays_on_one_row() {
        let project = project();
        let readings = vec![reading(5.60, -0.18, 45.0, 0).with_notes("line one\nline two")];
        let request = ExportRequest {
            project: &project,
            readings: &readings,
            cells: &[],
            notes: &[],
        };
        let out = encode(&request, &QualityBand::default(), &context());
        let rows: Vec<&str> = out.lines().skip_while(|l| *l != READING_HEADER).skip(1).collect();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].ends_with(",GOOD,\"line one line two\""));
    }

    #[test]
    fn empty_survey_still_has_header_and_column_row() {
        let project = project();
        let request = ExportRequest {
            project: &project,
            readings: &[],
            cells: &[],
            notes: &[],
        };
        let out = encode(&request, &QualityBand::default(), &context());
        assert!(out.ends_with(&format!("{}\n", READING_HEADER)));
        assert!(out.contains("# Total Points: 0"));
    }
}
