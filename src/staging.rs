use crate::error::{Result, WorkerError};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

/// Isolated working directory for one job run. The directory and everything
/// in it are removed when the value drops, on success and failure alike.
pub struct StagingDir {
    dir: TempDir,
}

impl StagingDir {
    /// `work_dir` empty means the system temp dir.
    pub fn create_in(work_dir: &str) -> Result<Self> {
        let builder = {
            let mut b = tempfile::Builder::new();
            b.prefix("mediaforge-job-");
            b
        };
        let dir = if work_dir.is_empty() {
            builder.tempdir()?
        } else {
            std::fs::create_dir_all(work_dir)?;
            builder.tempdir_in(work_dir)?
        };
        debug!("staging dir {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

/// Every stage transition validates the artifact it just produced before the
/// next stage consumes it. Returns the byte size.
pub fn validate(path: &Path, step: &str) -> Result<u64> {
    let meta = std::fs::metadata(path).map_err(|_| WorkerError::MissingArtifact {
        step: step.to_string(),
        path: path.to_path_buf(),
    })?;
    if meta.len() == 0 {
        return Err(WorkerError::EmptyArtifact {
            step: step.to_string(),
            path: path.to_path_buf(),
        });
    }
    Ok(meta.len())
}
