use crate::config::config::ExportConfig;
use crate::data_exporter::AnalysisPayload;
use crate::logging::targets;
use crate::utils::app_paths::AppPaths;
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

const HANDOFF_FILE_NAME: &str = "analysis_data.json";

/// Channel the analysis view reads selected rows from
pub trait AnalysisHandoff {
    fn persist(&self, payload: &AnalysisPayload) -> Result<()>;
}

/// Writes the payload as JSON to a well-known file
pub struct FileHandoff {
    path: PathBuf,
}

impl FileHandoff {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `handoff_dir` from the config, or the application data dir
    pub fn from_config(config: &ExportConfig) -> Result<Self> {
        let path = match &config.handoff_dir {
            Some(dir) => dir.join(HANDOFF_FILE_NAME),
            None => AppPaths::analysis_handoff_file()?,
        };
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AnalysisHandoff for FileHandoff {
    fn persist(&self, payload: &AnalysisPayload) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = File::create(&self.path)
            .with_context(|| format!("Cannot create {}", self.path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, payload)?;
        writer.flush()?;

        info!(
            target: targets::EXPORT,
            "Handed {} rows to analysis via {}",
            payload.data.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::DataSourceId;
    use serde_json::json;

    fn payload() -> AnalysisPayload {
        AnalysisPayload {
            data: vec![json!({"问题描述": "漏油"}).as_object().unwrap().clone()],
            columns: vec!["问题描述".to_string()],
            data_source: DataSourceId::Faults,
        }
    }

    #[test]
    fn test_file_handoff_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let handoff = FileHandoff::from_config(&ExportConfig {
            analysis_row_limit: 300,
            handoff_dir: Some(dir.path().join("out")),
        })
        .unwrap();

        handoff.persist(&payload()).unwrap();

        let written: AnalysisPayload =
            serde_json::from_str(&fs::read_to_string(handoff.path()).unwrap()).unwrap();
        assert_eq!(written, payload());
    }

    #[test]
    fn test_unwritable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        // a directory where the file should go
        let blocked = dir.path().join(HANDOFF_FILE_NAME);
        fs::create_dir_all(&blocked).unwrap();
        assert!(FileHandoff::new(blocked).persist(&payload()).is_err());
    }
}
