use crate::cli::OutputFormat;
use crate::error::{CertSplitError, UserFriendlyError};
use crate::pipeline::{KindReport, RunPlan, RunReport};
use crate::ui::progress::format_duration;
use console::{style, Emoji, Style, Term};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

impl From<&OutputFormat> for OutputMode {
    fn from(format: &OutputFormat) -> Self {
        match format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum Level {
    Step,
    Success,
    Info,
    Warning,
    Error,
}

impl Level {
    /// Verbosity needed to print this level. Errors ignore quiet mode.
    fn threshold(self) -> Option<u8> {
        match self {
            Level::Error => None,
            Level::Info => Some(1),
            _ => Some(0),
        }
    }

    fn emoji(self) -> Emoji<'static, 'static> {
        match self {
            Level::Step => Emoji("🚀 ", "> "),
            Level::Success => Emoji("✅ ", "✓ "),
            Level::Info => Emoji("ℹ️  ", "i "),
            Level::Warning => Emoji("⚠️  ", "! "),
            Level::Error => Emoji("❌ ", "✗ "),
        }
    }

    fn style(self) -> Style {
        match self {
            Level::Step => Style::new().bold(),
            Level::Success => Style::new().green().bold(),
            Level::Info => Style::new().cyan(),
            Level::Warning => Style::new().yellow().bold(),
            Level::Error => Style::new().red().bold(),
        }
    }

    fn tag(self) -> &'static str {
        match self {
            Level::Step => "STEP",
            Level::Success => "OK",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
        }
    }
}

/// One JSON line on stdout.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Event<'a> {
    Message {
        level: Level,
        message: &'a str,
        timestamp: String,
    },
    Suggestion {
        message: &'a str,
    },
    Summary {
        report: &'a RunReport,
    },
    Plan {
        plan: &'a RunPlan,
    },
}

/// Console output for the three output modes. Diagnostics for the log file go through
/// `tracing`; this is what the operator sees.
pub struct OutputFormatter {
    mode: OutputMode,
    colors: bool,
    verbosity: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let colors =
            mode == OutputMode::Human && !quiet && Term::stdout().features().colors_supported();

        Self {
            mode,
            colors,
            verbosity: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    pub fn step(&self, message: &str) {
        self.emit(Level::Step, message);
    }

    pub fn success(&self, message: &str) {
        self.emit(Level::Success, message);
    }

    pub fn info(&self, message: &str) {
        self.emit(Level::Info, message);
    }

    pub fn warning(&self, message: &str) {
        self.emit(Level::Warning, message);
    }

    pub fn error(&self, message: &str) {
        self.emit(Level::Error, message);
    }

    /// Error message followed by the hint from [`UserFriendlyError::suggestion`].
    pub fn print_error(&self, error: &CertSplitError) {
        self.error(&error.user_message());

        let Some(suggestion) = error.suggestion() else {
            return;
        };
        match self.mode {
            OutputMode::Json => self.emit_json(&Event::Suggestion {
                message: &suggestion,
            }),
            OutputMode::Human if self.colors => eprintln!(
                "{}{}",
                Level::Info.emoji(),
                style(format!("Suggestion: {}", suggestion)).cyan()
            ),
            _ => eprintln!("Suggestion: {}", suggestion),
        }
    }

    pub fn print_summary(&self, report: &RunReport) {
        match self.mode {
            OutputMode::Json => self.emit_json(&Event::Summary { report }),
            _ if self.quiet => {}
            OutputMode::Human => self.human_summary(report),
            OutputMode::Plain => {
                println!("COMPLETED: course {}", report.course_code);
                println!("Participants: {}", report.participants);
                for kind in &report.kinds {
                    println!("{}: {}", kind.kind.label(), describe_kind(kind));
                }
                println!("Duration: {}", format_duration(report.duration));
                for warning in &report.cleanup_warnings {
                    println!("Cleanup: {}", warning);
                }
            }
        }
    }

    pub fn print_plan(&self, plan: &RunPlan) {
        if self.mode == OutputMode::Json {
            self.emit_json(&Event::Plan { plan });
            return;
        }

        self.heading("Dry run");
        println!("Roster:       {}", plan.roster.display());
        println!("Course code:  {}", plan.course_code);
        println!("Participants: {}", plan.participants);
        if !plan.sample_names.is_empty() {
            println!("First names:  {}", plan.sample_names.join(", "));
        }

        for kind in &plan.kinds {
            println!();
            println!("{}:", kind.kind.label());
            println!(
                "  {} source files in {}",
                kind.sources.len(),
                kind.source_dir.display()
            );
            for source in &kind.sources {
                println!("    {}", source.display());
            }
            println!("  combined -> {}", kind.combined.display());
            println!("  results  -> {}", kind.result_dir.display());
            if let Some(archive) = &kind.archive {
                println!("  archive  -> {}", archive.display());
            }
        }
        self.rule();
    }

    fn shows(&self, level: Level) -> bool {
        match level.threshold() {
            None => true,
            Some(min) => !self.quiet && self.verbosity >= min,
        }
    }

    fn emit(&self, level: Level, message: &str) {
        if !self.shows(level) {
            return;
        }

        let line = match self.mode {
            OutputMode::Json => {
                return self.emit_json(&Event::Message {
                    level,
                    message,
                    timestamp: chrono::Utc::now().to_rfc3339(),
                })
            }
            OutputMode::Human if self.colors => {
                format!("{}{}", level.emoji(), level.style().apply_to(message))
            }
            OutputMode::Human => format!("{}{}", level.emoji(), message),
            OutputMode::Plain => format!("{}: {}", level.tag(), message),
        };

        if level == Level::Error {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }

    fn emit_json(&self, event: &Event<'_>) {
        match serde_json::to_string(event) {
            Ok(json) => println!("{}", json),
            Err(e) => tracing::warn!(error = %e, "could not serialize output event"),
        }
    }

    fn heading(&self, title: &str) {
        if self.quiet {
            return;
        }
        if self.colors {
            println!("\n{}{}\n", Emoji("✨ ", "* "), style(title).bold().cyan());
        } else {
            println!("=== {} ===", title);
        }
    }

    fn rule(&self) {
        if self.quiet || self.mode == OutputMode::Json {
            return;
        }
        if self.colors {
            println!("{}", style("─".repeat(60)).dim());
        } else {
            println!("{}", "-".repeat(60));
        }
    }

    fn human_summary(&self, report: &RunReport) {
        let (level, headline) = if report.has_failures() {
            (Level::Warning, "Finished with errors")
        } else {
            (Level::Success, "All documents split")
        };

        println!();
        self.rule();
        self.emit(level, headline);
        println!();

        let value = |text: String| {
            if self.colors {
                style(text).cyan().bold().to_string()
            } else {
                text
            }
        };
        println!("  {:<14} {}", "Course code:", value(report.course_code.clone()));
        println!("  {:<14} {}", "Participants:", value(report.participants.to_string()));
        for kind in &report.kinds {
            println!("  {:<14} {}", format!("{}:", kind.kind.label()), describe_kind(kind));
        }
        println!("  {:<14} {}", "Time taken:", value(format_duration(report.duration)));
        for warning in &report.cleanup_warnings {
            println!("  {:<14} {}", "Cleanup:", warning);
        }
        self.rule();
    }
}

fn describe_kind(kind: &KindReport) -> String {
    if let Some(error) = &kind.error {
        let stage = kind
            .failed_stage
            .map(|stage| stage.to_string())
            .unwrap_or_else(|| "unknown stage".to_string());
        return format!("failed at {} ({})", stage, error);
    }

    match kind.archive_path() {
        Some(archive) => format!(
            "{} files, archived to {}",
            kind.files_written(),
            archive.display()
        ),
        None => format!("{} files", kind.files_written()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{DocumentKind, Stage};

    #[test]
    fn output_mode_follows_cli_format() {
        assert_eq!(OutputMode::from(&OutputFormat::Json), OutputMode::Json);
        assert_eq!(OutputMode::from(&OutputFormat::Plain), OutputMode::Plain);
        assert_eq!(OutputMode::from(&OutputFormat::Human), OutputMode::Human);
    }

    #[test]
    fn quiet_mode_silences_all_but_errors() {
        let formatter = OutputFormatter::new(OutputMode::Human, 2, true);
        assert_eq!(formatter.verbosity, 0);
        assert!(!formatter.colors);

        assert!(formatter.shows(Level::Error));
        assert!(!formatter.shows(Level::Warning));
        assert!(!formatter.shows(Level::Success));
    }

    #[test]
    fn info_needs_verbose() {
        let normal = OutputFormatter::new(OutputMode::Plain, 0, false);
        assert!(normal.shows(Level::Step));
        assert!(!normal.shows(Level::Info));

        let verbose = OutputFormatter::new(OutputMode::Plain, 1, false);
        assert!(verbose.shows(Level::Info));
    }

    #[test]
    fn json_events_are_tagged() {
        let event = Event::Message {
            level: Level::Warning,
            message: "Nothing to archive",
            timestamp: "2024-01-01T00:00:00Z".to_string(),
        };
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&event).unwrap()).unwrap();

        assert_eq!(json["type"], "message");
        assert_eq!(json["level"], "warning");
        assert_eq!(json["message"], "Nothing to archive");

        let suggestion = serde_json::to_string(&Event::Suggestion { message: "retry" }).unwrap();
        assert_eq!(suggestion, r#"{"type":"suggestion","message":"retry"}"#);
    }

    #[test]
    fn kind_description() {
        let mut report = KindReport::new(DocumentKind::Receipt);
        assert_eq!(describe_kind(&report), "0 files");

        report.record_failure(
            Stage::Merge,
            &CertSplitError::NoSourceDocuments {
                directory: "data/Receipt".to_string(),
                extension: "pdf".to_string(),
            },
        );
        let description = describe_kind(&report);
        assert!(description.starts_with("failed at merge"));
        assert!(description.contains("data/Receipt"));
    }
}
