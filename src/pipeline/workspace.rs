use crate::config::OutputConfig;
use crate::error::{CertSplitError, Result};
use crate::pipeline::DocumentKind;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const REPORT_FILE_NAME: &str = "certsplit_report.json";

/// The result directories and the combined directory under the output base.
pub struct Workspace {
    base_path: PathBuf,
    certificate_dir: PathBuf,
    receipt_dir: PathBuf,
    combined_dir: PathBuf,
    force_overwrite: bool,
    inputs: Vec<PathBuf>,
}

impl Workspace {
    pub fn new(config: &OutputConfig) -> Self {
        let base_path = config.base_directory.clone();
        Self {
            certificate_dir: base_path.join(&config.certificate_dir),
            receipt_dir: base_path.join(&config.receipt_dir),
            combined_dir: base_path.join(&config.combined_dir),
            base_path,
            force_overwrite: false,
            inputs: Vec::new(),
        }
    }

    pub fn with_force_overwrite(mut self, force: bool) -> Self {
        self.force_overwrite = force;
        self
    }

    /// Mark a path that [`Workspace::prepare`] must never delete.
    pub fn protecting(mut self, input: impl Into<PathBuf>) -> Self {
        self.inputs.push(input.into());
        self
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn result_dir(&self, kind: DocumentKind) -> &Path {
        match kind {
            DocumentKind::Certificate => &self.certificate_dir,
            DocumentKind::Receipt => &self.receipt_dir,
        }
    }

    pub fn combined_dir(&self) -> &Path {
        &self.combined_dir
    }

    pub fn combined_path(&self, kind: DocumentKind) -> PathBuf {
        self.combined_dir.join(kind.combined_file_name())
    }

    pub fn report_path(&self) -> PathBuf {
        self.base_path.join(REPORT_FILE_NAME)
    }

    /// Create all three directories. Leftover results from an earlier run are refused
    /// unless overwriting was requested; a stale combined directory is always replaced.
    pub fn prepare(&self) -> Result<()> {
        for dir in [&self.certificate_dir, &self.receipt_dir, &self.combined_dir] {
            self.ensure_removable(dir)?;
        }

        for kind in DocumentKind::ALL {
            let dir = self.result_dir(kind);
            if is_occupied(dir)? {
                if !self.force_overwrite {
                    return Err(CertSplitError::OutputDirectoryExists {
                        path: dir.display().to_string(),
                    });
                }
                tracing::info!(directory = %dir.display(), "removing previous results");
                remove_path(dir)?;
            }
        }

        if self.combined_dir.exists() {
            tracing::debug!(directory = %self.combined_dir.display(), "clearing stale combined directory");
            remove_path(&self.combined_dir)?;
        }

        for dir in [&self.certificate_dir, &self.receipt_dir, &self.combined_dir] {
            fs::create_dir_all(dir).map_err(|e| with_path(e, dir))?;
        }

        tracing::info!(base = %self.base_path.display(), "output directories ready");
        Ok(())
    }

    fn ensure_removable(&self, dir: &Path) -> Result<()> {
        // A directory that does not exist yet cannot hold an existing input.
        let Ok(dir) = fs::canonicalize(dir) else {
            return Ok(());
        };
        for input in &self.inputs {
            let Ok(input) = fs::canonicalize(input) else {
                continue;
            };
            if input.starts_with(&dir) {
                return Err(CertSplitError::OutputOverlapsInput {
                    path: dir.display().to_string(),
                    input: input.display().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Remove the combined directory and the result directories of archived kinds.
    /// Failures are returned as warnings rather than errors.
    pub fn cleanup(&self, archived: &[DocumentKind]) -> Vec<String> {
        let mut targets = vec![self.combined_dir.as_path()];
        targets.extend(archived.iter().map(|kind| self.result_dir(*kind)));

        let mut warnings = Vec::new();
        for dir in targets {
            match remove_path(dir) {
                Ok(true) => tracing::debug!(directory = %dir.display(), "removed"),
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(directory = %dir.display(), error = %e, "cleanup failed");
                    warnings.push(format!("Could not remove {}: {}", dir.display(), e));
                }
            }
        }
        warnings
    }
}

fn is_occupied(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    if !path.is_dir() {
        return Ok(true);
    }
    let mut entries = fs::read_dir(path).map_err(|e| with_path(e, path))?;
    Ok(entries.next().is_some())
}

fn remove_path(path: &Path) -> Result<bool> {
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else if path.exists() {
        fs::remove_file(path)
    } else {
        return Ok(false);
    };
    result.map_err(|e| with_path(e, path))?;
    Ok(true)
}

fn with_path(error: io::Error, path: &Path) -> CertSplitError {
    if error.kind() == io::ErrorKind::PermissionDenied {
        CertSplitError::Permission {
            path: path.display().to_string(),
        }
    } else {
        CertSplitError::Io(error)
    }
}
