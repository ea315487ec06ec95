use crate::error::{CertSplitError, Result};
use serde::Serialize;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ArchiveOutcome {
    Created { path: PathBuf, entries: usize },
    NothingToArchive,
}

impl ArchiveOutcome {
    pub fn path(&self) -> Option<&Path> {
        match self {
            ArchiveOutcome::Created { path, .. } => Some(path),
            ArchiveOutcome::NothingToArchive => None,
        }
    }
}

/// Packs a directory into `<parent>/<dir name>.zip`.
pub struct Archiver {
    options: SimpleFileOptions,
}

impl Archiver {
    pub fn new() -> Self {
        Self {
            options: SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
        }
    }

    pub fn archive_path(directory: &Path) -> Result<PathBuf> {
        let name = directory
            .file_name()
            .ok_or_else(|| CertSplitError::InvalidPath {
                path: directory.display().to_string(),
            })?;
        let mut file_name = name.to_os_string();
        file_name.push(".zip");
        Ok(directory.with_file_name(file_name))
    }

    pub fn archive_directory(&self, directory: &Path) -> Result<ArchiveOutcome> {
        if !directory.is_dir() {
            tracing::warn!(directory = %directory.display(), "nothing to archive, directory missing");
            return Ok(ArchiveOutcome::NothingToArchive);
        }

        let entries = collect_entries(directory)?;
        if !entries.iter().any(|(_, path)| path.is_file()) {
            tracing::warn!(directory = %directory.display(), "nothing to archive, directory empty");
            return Ok(ArchiveOutcome::NothingToArchive);
        }

        let archive_path = Self::archive_path(directory)?;
        let wrap = |source: zip::result::ZipError| CertSplitError::Archive {
            path: archive_path.display().to_string(),
            source,
        };

        let mut writer = ZipWriter::new(File::create(&archive_path)?);
        let mut count = 0;

        for (name, path) in &entries {
            if path.is_dir() {
                writer
                    .add_directory(name.as_str(), self.options)
                    .map_err(wrap)?;
            } else {
                writer.start_file(name.as_str(), self.options).map_err(wrap)?;
                let mut source = File::open(path)?;
                io::copy(&mut source, &mut writer)?;
                count += 1;
            }
        }
        writer.finish().map_err(wrap)?;

        tracing::info!(archive = %archive_path.display(), entries = count, "archive created");

        Ok(ArchiveOutcome::Created {
            path: archive_path,
            entries: count,
        })
    }
}

impl Default for Archiver {
    fn default() -> Self {
        Self::new()
    }
}

/// Entries below `directory` with forward-slash names relative to it, sorted.
fn collect_entries(directory: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut entries = Vec::new();

    for entry in WalkDir::new(directory).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            CertSplitError::Io(e.into_io_error().unwrap_or_else(|| {
                io::Error::new(io::ErrorKind::Other, "directory walk failed")
            }))
        })?;
        let relative = entry
            .path()
            .strip_prefix(directory)
            .map_err(|_| CertSplitError::InvalidPath {
                path: entry.path().display().to_string(),
            })?;

        let mut name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect::<Vec<_>>()
            .join("/");
        if entry.file_type().is_dir() {
            name.push('/');
        }
        entries.push((name, entry.path().to_path_buf()));
    }

    Ok(entries)
}
