pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod pdf;
pub mod pipeline;
pub mod roster;
pub mod scanner;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, InputConfig, LoggingConfig, OutputConfig};
pub use error::{CertSplitError, Result, UserFriendlyError};
pub use logging::Logger;

// Core functionality re-exports
pub use archive::{ArchiveOutcome, Archiver};
pub use pdf::{DocumentMerger, MergeSummary, PageSplitter, SplitProgress, SplitSummary};
pub use pipeline::{DocumentKind, KindReport, Pipeline, RunPlan, RunReport, Stage, Workspace};
pub use roster::{NameExtractor, Roster};
pub use scanner::{FileFilter, SourceScanner};
pub use ui::{GracefulShutdown, OutputFormatter, OutputMode, ProgressManager};

use std::path::Path;

/// Main library interface for certsplit
pub struct CertSplit {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    shutdown: GracefulShutdown,
    prompt_course_code: bool,
}

impl CertSplit {
    /// Create an instance that installs the Ctrl+C handler.
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Result<Self> {
        let shutdown = GracefulShutdown::new()?;
        Ok(Self::with_shutdown(config, output_mode, verbose, quiet, shutdown))
    }

    /// Create an instance without a signal handler, for embedding and tests.
    pub fn new_detached(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        Self::with_shutdown(
            config,
            output_mode,
            verbose,
            quiet,
            GracefulShutdown::detached(),
        )
    }

    fn with_shutdown(
        config: Config,
        output_mode: OutputMode,
        verbose: u8,
        quiet: bool,
        shutdown: GracefulShutdown,
    ) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        // Progress bars would interleave with JSON lines on stdout.
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);

        Self {
            config,
            output_formatter,
            progress_manager,
            shutdown,
            prompt_course_code: false,
        }
    }

    /// Create a CertSplit instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = OutputMode::from(&cli_args.output_format);

        Ok(Self::new(config, output_mode, cli_args.verbose, cli_args.quiet)?
            .with_course_code_prompt(cli_args.prompt_course_code))
    }

    pub fn with_course_code_prompt(mut self, prompt: bool) -> Self {
        self.prompt_course_code = prompt;
        self
    }

    /// Run the full merge, split, archive and cleanup sequence.
    pub fn run(&self) -> Result<RunReport> {
        self.output_formatter.step("Splitting certificates and receipts");

        let prompt = |default: &str| ui::prompt::ask_course_code(default);
        let pipeline = self.pipeline();
        let pipeline = if self.prompt_course_code {
            pipeline.with_course_code_resolver(&prompt)
        } else {
            pipeline
        };

        let report = pipeline.run()?;
        self.progress_manager.clear();
        self.output_formatter.print_summary(&report);
        Ok(report)
    }

    /// Describe what [`CertSplit::run`] would do without writing anything.
    pub fn plan(&self) -> Result<RunPlan> {
        self.pipeline().plan()
    }

    fn pipeline(&self) -> Pipeline<'_> {
        Pipeline::new(
            &self.config,
            &self.shutdown,
            &self.progress_manager,
            &self.output_formatter,
        )
    }

    /// Build the logger described by the configuration.
    pub fn logger(&self, verbose: u8) -> Result<Logger> {
        Logger::new(&self.config.logging, verbose)
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config)?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn progress_manager(&self) -> &ProgressManager {
        &self.progress_manager
    }

    /// Check if shutdown has been requested
    pub fn is_running(&self) -> bool {
        self.shutdown.is_running()
    }

    pub fn request_shutdown(&self) {
        self.shutdown.request_shutdown();
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &CertSplitError) {
        self.progress_manager.clear();
        self.output_formatter.print_error(error);
    }
}

/// Get version information
pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
