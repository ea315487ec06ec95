use crate::config::InputConfig;
use crate::error::{CertSplitError, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Participant names in page order, plus the course code shared by the whole run.
#[derive(Debug, Clone, Serialize)]
pub struct Roster {
    pub source: PathBuf,
    pub course_code: String,
    pub names: Vec<String>,
}

impl Roster {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

pub struct NameExtractor {
    name_column: String,
    course_code_column: String,
    start_row: usize,
}

impl NameExtractor {
    pub fn new(config: &InputConfig) -> Self {
        Self {
            name_column: config.name_column.clone(),
            course_code_column: config.course_code_column.clone(),
            start_row: config.start_row,
        }
    }

    pub fn with_start_row(mut self, start_row: usize) -> Self {
        self.start_row = start_row;
        self
    }

    pub fn extract(&self, path: &Path) -> Result<Roster> {
        let roster_path = path.display().to_string();

        if !path.is_file() {
            return Err(CertSplitError::RosterNotFound {
                directory: path
                    .parent()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
                pattern: path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
            });
        }

        let csv_error = |source: csv::Error| CertSplitError::Csv {
            path: roster_path.clone(),
            source,
        };

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_path(path)
            .map_err(csv_error)?;

        let headers = reader.headers().map_err(csv_error)?.clone();
        let course_idx = self.column_index(&headers, &self.course_code_column, &roster_path)?;
        let name_idx = self.column_index(&headers, &self.name_column, &roster_path)?;

        let mut course_code = None;
        let mut names = Vec::new();

        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(csv_error)?;

            if row == 0 {
                course_code = Some(cell(&record, course_idx).to_string());
            }
            if row >= self.start_row {
                names.push(cell(&record, name_idx).to_string());
            }
        }

        let course_code = course_code.ok_or_else(|| CertSplitError::EmptyRoster {
            path: roster_path.clone(),
        })?;

        if names.is_empty() {
            return Err(CertSplitError::EmptyRoster { path: roster_path });
        }

        tracing::info!(
            roster = %roster_path,
            participants = names.len(),
            course_code = %course_code,
            "roster loaded"
        );

        Ok(Roster {
            source: path.to_path_buf(),
            course_code,
            names,
        })
    }

    fn column_index(&self, headers: &StringRecord, column: &str, path: &str) -> Result<usize> {
        headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}').trim() == column)
            .ok_or_else(|| CertSplitError::MissingColumn {
                path: path.to_string(),
                column: column.to_string(),
            })
    }
}

fn cell(record: &StringRecord, index: usize) -> &str {
    record.get(index).unwrap_or("").trim()
}
