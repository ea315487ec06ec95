use crate::error::{CertSplitError, Result};
use crate::scanner::file_filter::{has_extension, FileFilter};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Lists input files directly inside a directory. Sub-directories are never descended.
pub struct SourceScanner;

impl SourceScanner {
    pub fn new() -> Self {
        Self
    }

    /// Locate the roster file in `data_dir`. The first match in sorted order wins.
    pub fn find_roster(&self, data_dir: &Path, pattern: &str) -> Result<PathBuf> {
        let not_found = || CertSplitError::RosterNotFound {
            directory: data_dir.display().to_string(),
            pattern: pattern.to_string(),
        };

        if !data_dir.is_dir() {
            return Err(not_found());
        }

        let filter = FileFilter::from_glob(pattern)?;
        let mut candidates = self.list_files(data_dir, |path| filter.matches(path))?;

        if candidates.len() > 1 {
            tracing::warn!(
                count = candidates.len(),
                pattern = filter.pattern(),
                "multiple roster files match, using the first in sorted order"
            );
        }

        if candidates.is_empty() {
            return Err(not_found());
        }
        Ok(candidates.swap_remove(0))
    }

    /// Source documents of one kind, sorted lexicographically by path.
    pub fn list_documents(&self, dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
        if !dir.exists() {
            tracing::debug!(directory = %dir.display(), "source directory does not exist");
            return Ok(Vec::new());
        }

        if !dir.is_dir() {
            return Err(CertSplitError::InvalidPath {
                path: format!("{} is not a directory", dir.display()),
            });
        }

        self.list_files(dir, |path| has_extension(path, extension))
    }

    fn list_files<F>(&self, dir: &Path, accept: F) -> Result<Vec<PathBuf>>
    where
        F: Fn(&Path) -> bool,
    {
        let mut files = Vec::new();

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry.map_err(|err| match err.into_io_error() {
                Some(io) if io.kind() == std::io::ErrorKind::PermissionDenied => {
                    CertSplitError::Permission {
                        path: dir.display().to_string(),
                    }
                }
                Some(io) => CertSplitError::Io(io),
                None => CertSplitError::InvalidPath {
                    path: format!("Filesystem loop detected under {}", dir.display()),
                },
            })?;

            if entry.file_type().is_file() && accept(entry.path()) {
                files.push(entry.into_path());
            }
        }

        files.sort();
        Ok(files)
    }
}

impl Default for SourceScanner {
    fn default() -> Self {
        Self::new()
    }
}
