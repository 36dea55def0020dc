use crate::export::ExportOutput;
use crate::prelude::{SurveyError, SurveyResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Platform hand-off for a finished export (share sheet, upload, file manager).
pub trait ShareTarget {
    fn share(&self, path: &Path, mime_type: &str) -> SurveyResult<()>;
}

/// Writes text output to `dir/file_name`; file outputs are already on disk.
pub fn persist(output: &ExportOutput, dir: &Path) -> SurveyResult<PathBuf> {
    match output {
        ExportOutput::Text {
            file_name, body, ..
        } => {
            fs::create_dir_all(dir).map_err(|source| SurveyError::WriteFailure {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = dir.join(file_name);
            fs::write(&path, body).map_err(|source| SurveyError::WriteFailure {
                path: path.clone(),
                source,
            })?;
            Ok(path)
        }
        ExportOutput::File { path, .. } => Ok(path.clone()),
    }
}

pub fn persist_and_share(
    output: &ExportOutput,
    dir: &Path,
    target: &dyn ShareTarget,
) -> SurveyResult<PathBuf> {
    let path = persist(output, dir)?;
    target.share(&path, output.mime_type())?;
    Ok(path)
}

/// Runs [`persist`] on the blocking pool so async callers keep their thread free.
pub async fn persist_async(output: ExportOutput, dir: PathBuf) -> SurveyResult<PathBuf> {
    tokio::task::spawn_blocking(move || persist(&output, &dir))
        .await
        .map_err(|e| SurveyError::Internal(format!("persist task failed: {}", e)))?
}
