use anyhow::Context;
use log::debug;
use magcore::model::{FieldNote, MagneticReading};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

fn load_json<T: DeserializeOwned>(path: &Path, what: &str) -> anyhow::Result<Vec<T>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading {} file {}", what, path.display()))?;
    let items: Vec<T> = serde_json::from_str(&contents)
        .with_context(|| format!("parsing {} file {}", what, path.display()))?;
    debug!("loaded {} {} from {}", items.len(), what, path.display());
    Ok(items)
}

/// Readings recorded by a collector, as a JSON array in collection order.
pub fn load_readings(path: &Path) -> anyhow::Result<Vec<MagneticReading>> {
    load_json(path, "readings")
}

pub fn load_notes(path: &Path) -> anyhow::Result<Vec<FieldNote>> {
    load_json(path, "notes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn readings_file_is_parsed_in_order() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            br#"[
  {"latitude": 5.61, "longitude": -0.19, "magnetic_x": 30.0, "magnetic_y": 20.0,
   "magnetic_z": 25.0, "total_field": 46.0, "timestamp": "2024-01-01T02:00:00Z", "project_id": "p1"},
  {"latitude": 5.60, "longitude": -0.18, "altitude": 12.5, "magnetic_x": 30.0, "magnetic_y": 20.0,
   "magnetic_z": 25.0, "total_field": 45.0, "timestamp": "2024-01-01T01:00:00Z", "project_id": "p1",
   "accuracy": 3.5}
]"#,
        )
        .unwrap();
        let readings = load_readings(temp.path()).unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].total_field, 46.0);
        assert_eq!(readings[0].altitude, None);
        assert_eq!(readings[1].accuracy, Some(3.5));
    }

    #[test]
    fn malformed_notes_file_names_the_path() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"{not json").unwrap();
        let err = load_notes(temp.path()).unwrap_err();
        assert!(err.to_string().starts_with("parsing notes file"));
    }
}
