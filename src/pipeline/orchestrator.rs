use crate::archive::{ArchiveOutcome, Archiver};
use crate::config::Config;
use crate::error::{CertSplitError, Result};
use crate::pdf::{DocumentMerger, PageSplitter, SplitProgress};
use crate::pipeline::{DocumentKind, KindReport, RunReport, Stage, Workspace};
use crate::roster::{NameExtractor, Roster};
use crate::scanner::SourceScanner;
use crate::ui::{GracefulShutdown, OutputFormatter, ProgressManager};
use chrono::Utc;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Output file extension of split documents.
const OUTPUT_EXTENSION: &str = "pdf";

type StageResult<T> = std::result::Result<T, (Stage, CertSplitError)>;

/// Asks for a course code given the value found in the roster.
pub type CourseCodeResolver<'a> = dyn Fn(&str) -> Result<String> + 'a;

#[derive(Debug, Clone, Serialize)]
pub struct KindPlan {
    pub kind: DocumentKind,
    pub source_dir: PathBuf,
    pub sources: Vec<PathBuf>,
    pub combined: PathBuf,
    pub result_dir: PathBuf,
    pub archive: Option<PathBuf>,
}

/// What a run would do, computed without writing anything.
#[derive(Debug, Clone, Serialize)]
pub struct RunPlan {
    pub roster: PathBuf,
    pub course_code: String,
    pub participants: usize,
    pub sample_names: Vec<String>,
    pub kinds: Vec<KindPlan>,
}

pub struct Pipeline<'a> {
    config: &'a Config,
    shutdown: &'a GracefulShutdown,
    progress: &'a ProgressManager,
    output: &'a OutputFormatter,
    resolver: Option<&'a CourseCodeResolver<'a>>,
    scanner: SourceScanner,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a Config,
        shutdown: &'a GracefulShutdown,
        progress: &'a ProgressManager,
        output: &'a OutputFormatter,
    ) -> Self {
        Self {
            config,
            shutdown,
            progress,
            output,
            resolver: None,
            scanner: SourceScanner::new(),
        }
    }

    pub fn with_course_code_resolver(mut self, resolver: &'a CourseCodeResolver<'a>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Run every stage for both document kinds.
    ///
    /// Roster and directory failures abort the run. A failure inside one document kind
    /// is recorded in its [`KindReport`] and the other kind still runs.
    pub fn run(&self) -> Result<RunReport> {
        let started_at = Utc::now();
        let start = Instant::now();

        let roster = self.shutdown.with_shutdown_check(|| self.load_roster())?;
        self.output.info(&format!(
            "Loaded {} participants for course {} from {}",
            roster.len(),
            roster.course_code,
            roster.source.display()
        ));

        let workspace = Workspace::new(&self.config.output)
            .with_force_overwrite(self.config.output.force_overwrite)
            .protecting(&self.config.input.data_dir);
        self.shutdown.with_shutdown_check(|| workspace.prepare())?;

        let mut kinds = Vec::with_capacity(DocumentKind::ALL.len());
        for kind in DocumentKind::ALL {
            kinds.push(self.process_kind(kind, &roster, &workspace)?);
        }

        let cleanup_warnings = if self.config.output.cleanup {
            let archived: Vec<DocumentKind> = kinds
                .iter()
                .filter(|k| matches!(k.archive, Some(ArchiveOutcome::Created { .. })))
                .map(|k| k.kind)
                .collect();
            let warnings = workspace.cleanup(&archived);
            for warning in &warnings {
                self.output.warning(warning);
            }
            warnings
        } else {
            tracing::info!("cleanup disabled, keeping working directories");
            Vec::new()
        };

        let report = RunReport {
            roster: roster.source.clone(),
            course_code: roster.course_code.clone(),
            participants: roster.len(),
            kinds,
            cleanup_warnings,
            started_at,
            duration: start.elapsed(),
        };

        if self.config.output.generate_report {
            let path = workspace.report_path();
            report.save_json(&path)?;
            self.output
                .info(&format!("Run report written to {}", path.display()));
        }

        tracing::info!(
            files = report.files_written(),
            failed = report.has_failures(),
            "run finished"
        );
        Ok(report)
    }

    /// Read the roster and list sources without touching the output directories.
    pub fn plan(&self) -> Result<RunPlan> {
        let roster = self.load_roster()?;
        let workspace = Workspace::new(&self.config.output);
        let input = &self.config.input;

        let mut kinds = Vec::new();
        for kind in DocumentKind::ALL {
            let source_dir = kind.source_dir(input);
            let sources = self
                .scanner
                .list_documents(&source_dir, &input.document_extension)?;
            let result_dir = workspace.result_dir(kind).to_path_buf();
            let archive = if self.config.output.create_archives {
                Some(Archiver::archive_path(&result_dir)?)
            } else {
                None
            };

            kinds.push(KindPlan {
                kind,
                source_dir,
                sources,
                combined: workspace.combined_path(kind),
                result_dir,
                archive,
            });
        }

        Ok(RunPlan {
            roster: roster.source.clone(),
            course_code: roster.course_code.clone(),
            participants: roster.len(),
            sample_names: roster.names.iter().take(5).cloned().collect(),
            kinds,
        })
    }

    fn load_roster(&self) -> Result<Roster> {
        let input = &self.config.input;
        let path = self
            .scanner
            .find_roster(&input.data_dir, &input.roster_pattern)?;
        let mut roster = NameExtractor::new(input).extract(&path)?;
        roster.course_code = self.resolve_course_code(&roster.course_code)?;

        if roster.course_code.is_empty() {
            tracing::warn!("course code is empty, file names will contain an empty segment");
        }
        Ok(roster)
    }

    /// Configured value first, then the interactive resolver, then the roster value.
    fn resolve_course_code(&self, from_roster: &str) -> Result<String> {
        if let Some(code) = &self.config.input.course_code {
            tracing::debug!(course_code = %code, "using configured course code");
            return Ok(code.clone());
        }

        match self.resolver {
            Some(resolver) => {
                let code = self.progress.suspend(|| resolver(from_roster))?;
                Ok(code.trim().to_string())
            }
            None => Ok(from_roster.to_string()),
        }
    }

    fn process_kind(
        &self,
        kind: DocumentKind,
        roster: &Roster,
        workspace: &Workspace,
    ) -> Result<KindReport> {
        let mut report = KindReport::new(kind);
        self.output.step(&format!("Processing {}", kind));

        match self.run_stages(kind, roster, workspace, &mut report) {
            Ok(()) => {
                self.output.success(&format!(
                    "{}: {} files written",
                    kind.label(),
                    report.files_written()
                ));
            }
            Err((_, CertSplitError::Cancelled)) => return Err(CertSplitError::Cancelled),
            Err((stage, error)) => {
                tracing::error!(kind = %kind, stage = %stage, error = %error, "document kind failed");
                report.record_failure(stage, &error);
                self.progress
                    .suspend(|| self.output.print_error(&error));
            }
        }

        Ok(report)
    }

    fn run_stages(
        &self,
        kind: DocumentKind,
        roster: &Roster,
        workspace: &Workspace,
        report: &mut KindReport,
    ) -> StageResult<()> {
        let input = &self.config.input;
        let at = |stage: Stage| move |error: CertSplitError| (stage, error);

        let source_dir = kind.source_dir(input);
        let sources = self
            .shutdown
            .with_shutdown_check(|| {
                self.scanner
                    .list_documents(&source_dir, &input.document_extension)
            })
            .map_err(at(Stage::Scan))?;
        report.sources = sources.len();

        if sources.is_empty() {
            return Err((
                Stage::Merge,
                CertSplitError::NoSourceDocuments {
                    directory: source_dir.display().to_string(),
                    extension: input.document_extension.clone(),
                },
            ));
        }

        let combined = workspace.combined_path(kind);
        let merge = self
            .shutdown
            .with_shutdown_check(|| self.merge(kind, &sources, &combined))
            .map_err(at(Stage::Merge))?;
        report.merge = Some(merge);

        let result_dir = workspace.result_dir(kind);
        let split = self
            .shutdown
            .with_shutdown_check(|| self.split(kind, &combined, roster, result_dir))
            .map_err(at(Stage::Split))?;
        report.split = Some(split);

        if self.config.output.create_archives {
            let archive = self
                .shutdown
                .with_shutdown_check(|| self.archive(result_dir))
                .map_err(at(Stage::Archive))?;
            report.archive = Some(archive);
        }

        Ok(())
    }

    fn merge(
        &self,
        kind: DocumentKind,
        sources: &[PathBuf],
        combined: &Path,
    ) -> Result<crate::pdf::MergeSummary> {
        let spinner = self.progress.spinner(
            kind.label(),
            &format!("merging {} source files", sources.len()),
        );

        DocumentMerger::new()
            .merge(sources, combined)
            .map(|summary| {
                spinner.finish(&format!("merged {} pages", summary.pages));
                summary
            })
            .map_err(|e| {
                spinner.fail("merge failed");
                e
            })
    }

    fn split(
        &self,
        kind: DocumentKind,
        combined: &Path,
        roster: &Roster,
        result_dir: &Path,
    ) -> Result<crate::pdf::SplitSummary> {
        let bar = self.progress.pages(kind.label(), roster.len());
        let on_page = |progress: &SplitProgress| bar.page(progress);

        let result = PageSplitter::new(kind.label(), OUTPUT_EXTENSION).split(
            combined,
            &roster.names,
            &roster.course_code,
            result_dir,
            Some(&on_page),
        );

        match result {
            Ok(summary) => {
                bar.finish(&format!("wrote {} files", summary.distinct_files()));
                for name in &summary.collisions {
                    self.progress.suspend(|| {
                        self.output
                            .warning(&format!("Duplicate output file overwritten: {}", name))
                    });
                }
                Ok(summary)
            }
            Err(e) => {
                bar.fail("split failed");
                Err(e)
            }
        }
    }

    fn archive(&self, result_dir: &Path) -> Result<ArchiveOutcome> {
        let outcome = Archiver::new().archive_directory(result_dir)?;
        match &outcome {
            ArchiveOutcome::Created { path, entries } => self.output.info(&format!(
                "Archived {} files into {}",
                entries,
                path.display()
            )),
            ArchiveOutcome::NothingToArchive => self.output.warning(&format!(
                "Nothing to archive in {}",
                result_dir.display()
            )),
        }
        Ok(outcome)
    }
}
