pub mod orchestrator;
pub mod workspace;

pub use orchestrator::{KindPlan, Pipeline, RunPlan};
pub use workspace::Workspace;

use crate::archive::ArchiveOutcome;
use crate::config::{InputConfig, OutputConfig};
use crate::error::{CertSplitError, Result, UserFriendlyError};
use crate::pdf::{MergeSummary, SplitSummary};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Certificate,
    Receipt,
}

impl DocumentKind {
    /// Processing order.
    pub const ALL: [DocumentKind; 2] = [DocumentKind::Certificate, DocumentKind::Receipt];

    /// Suffix used in output file names.
    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::Certificate => "Certificate",
            DocumentKind::Receipt => "Receipt",
        }
    }

    pub fn combined_file_name(self) -> &'static str {
        match self {
            DocumentKind::Certificate => "combined_certificates.pdf",
            DocumentKind::Receipt => "combined_receipts.pdf",
        }
    }

    pub fn source_dir(self, input: &InputConfig) -> PathBuf {
        let name = match self {
            DocumentKind::Certificate => &input.certificate_dir,
            DocumentKind::Receipt => &input.receipt_dir,
        };
        input.data_dir.join(name)
    }

    pub fn result_dir_name(self, output: &OutputConfig) -> &str {
        match self {
            DocumentKind::Certificate => &output.certificate_dir,
            DocumentKind::Receipt => &output.receipt_dir,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Certificate => write!(f, "certificates"),
            DocumentKind::Receipt => write!(f, "receipts"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Scan,
    Merge,
    Split,
    Archive,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Scan => "scan",
            Stage::Merge => "merge",
            Stage::Split => "split",
            Stage::Archive => "archive",
        };
        f.write_str(name)
    }
}

/// Outcome of one document kind. A failed stage leaves the later stages as `None`.
#[derive(Debug, Clone, Serialize)]
pub struct KindReport {
    pub kind: DocumentKind,
    pub sources: usize,
    pub merge: Option<MergeSummary>,
    pub split: Option<SplitSummary>,
    pub archive: Option<ArchiveOutcome>,
    pub failed_stage: Option<Stage>,
    pub error: Option<String>,
}

impl KindReport {
    pub fn new(kind: DocumentKind) -> Self {
        Self {
            kind,
            sources: 0,
            merge: None,
            split: None,
            archive: None,
            failed_stage: None,
            error: None,
        }
    }

    pub fn record_failure(&mut self, stage: Stage, error: &CertSplitError) {
        self.failed_stage = Some(stage);
        self.error = Some(error.user_message());
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    pub fn files_written(&self) -> usize {
        self.split.as_ref().map(SplitSummary::distinct_files).unwrap_or(0)
    }

    pub fn archive_path(&self) -> Option<&Path> {
        self.archive.as_ref().and_then(ArchiveOutcome::path)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub roster: PathBuf,
    pub course_code: String,
    pub participants: usize,
    pub kinds: Vec<KindReport>,
    pub cleanup_warnings: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
}

impl RunReport {
    pub fn has_failures(&self) -> bool {
        self.kinds.iter().any(|k| !k.succeeded())
    }

    pub fn kind(&self, kind: DocumentKind) -> Option<&KindReport> {
        self.kinds.iter().find(|k| k.kind == kind)
    }

    pub fn files_written(&self) -> usize {
        self.kinds.iter().map(KindReport::files_written).sum()
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).map_err(|e| CertSplitError::Config {
            message: format!("Failed to serialize run report: {}", e),
        })?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
