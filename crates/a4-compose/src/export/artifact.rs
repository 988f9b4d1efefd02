//! Delivery of a finished artifact

use crate::types::{ComposeError, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempPath;

/// How the finished artifact is handed to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportMode {
    /// Write to a temporary file that lives as long as the returned handle
    Preview,
    /// Persist at `path`
    Download { path: PathBuf },
}

impl ExportMode {
    /// Download into `dir` under the default file name
    pub fn download_in(dir: impl AsRef<Path>, default_filename: &str) -> Self {
        ExportMode::Download {
            path: dir.as_ref().join(default_filename),
        }
    }
}

/// A transient, viewable artifact. The file is deleted when dropped.
#[derive(Debug)]
pub struct PreviewHandle {
    path: TempPath,
}

impl PreviewHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn url(&self) -> String {
        format!("file://{}", self.path.display())
    }
}

#[derive(Debug)]
pub enum Artifact {
    Preview(PreviewHandle),
    Saved(PathBuf),
}

impl Artifact {
    pub fn path(&self) -> &Path {
        match self {
            Artifact::Preview(handle) => handle.path(),
            Artifact::Saved(path) => path,
        }
    }
}

/// Write `bytes` according to `mode`.
///
/// Downloads go through a temporary file in the target directory that is
/// renamed into place, so a failed write never leaves a partial file.
pub(crate) async fn deliver(bytes: Vec<u8>, mode: &ExportMode) -> Result<Artifact> {
    match mode {
        ExportMode::Preview => {
            let path = tokio::task::spawn_blocking(move || {
                let mut file = tempfile::Builder::new()
                    .prefix("a4-preview-")
                    .suffix(".pdf")
                    .tempfile()?;
                file.write_all(&bytes)?;
                file.flush()?;
                Ok::<_, ComposeError>(file.into_temp_path())
            })
            .await??;
            Ok(Artifact::Preview(PreviewHandle { path }))
        }
        ExportMode::Download { path } => {
            let target = path.clone();
            let saved = tokio::task::spawn_blocking(move || {
                let dir = match target.parent() {
                    Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                    _ => PathBuf::from("."),
                };
                let mut file = tempfile::NamedTempFile::new_in(dir)?;
                file.write_all(&bytes)?;
                file.flush()?;
                file.persist(&target).map_err(|e| e.error)?;
                Ok::<_, ComposeError>(target)
            })
            .await??;
            Ok(Artifact::Saved(saved))
        }
    }
}
