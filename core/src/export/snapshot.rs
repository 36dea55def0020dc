use crate::export::{export_file_name, ExportFormat, StorageAccess};
use crate::prelude::{SurveyError, SurveyResult};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::PathBuf;

/// Copies the backing store byte for byte into `export_dir` under a timestamped name.
pub fn copy_store(
    storage: &StorageAccess,
    project_name: &str,
    at: DateTime<Utc>,
) -> SurveyResult<PathBuf> {
    let (store_path, export_dir) = match storage {
        StorageAccess::Filesystem {
            store_path,
            export_dir,
        } => (store_path, export_dir),
        StorageAccess::Unavailable => {
            return Err(SurveyError::UnsupportedEnvironment(
                "raw store snapshots need direct filesystem access".into(),
            ))
        }
    };

    if !store_path.is_file() {
        return Err(SurveyError::MissingBackingStore(store_path.clone()));
    }

    fs::create_dir_all(export_dir).map_err(|source| SurveyError::WriteFailure {
        path: export_dir.clone(),
        source,
    })?;

    let target = export_dir.join(export_file_name(project_name, at, ExportFormat::Database));
    fs::copy(store_path, &target).map_err(|source| SurveyError::WriteFailure {
        path: target.clone(),
        source,
    })?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn at() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn snapshot_copies_store_bytes() {
        let mut store = NamedTempFile::new().unwrap();
        store.write_all(b"SQLite format 3\0payload").unwrap();
        let dir = tempdir().unwrap();
        let storage = StorageAccess::Filesystem {
            store_path: store.path().to_path_buf(),
            export_dir: dir.path().join("exports"),
        };

        let path = copy_store(&storage, "Test", at()).unwrap();
        assert_eq!(path.file_name().unwrap(), "Test_1700000000000.db");
        assert_eq!(fs::read(&path).unwrap(), b"SQLite format 3\0payload");
    }

    #[test]
    fn missing_store_is_reported() {
        let dir = tempdir().unwrap();
        let storage = StorageAccess::Filesystem {
            store_path: dir.path().join("absent.db"),
            export_dir: dir.path().to_path_buf(),
        };
        let err = copy_store(&storage, "Test", at()).unwrap_err();
        assert!(matches!(err, SurveyError::MissingBackingStore(_)));
    }

    #[test]
    fn unavailable_storage_fails_explicitly() {
        let err = copy_store(&StorageAccess::Unavailable, "Test", at()).unwrap_err();
        assert!(matches!(err, SurveyError::UnsupportedEnvironment(_)));
    }
}
