use crate::config::{CliOverrides, Config};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "certsplit")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Split merged certificate and receipt PDFs into per-participant files")]
#[command(
    long_about = "certsplit reads a participant roster, merges the certificate and receipt \
                  PDFs found in the data directory, writes one single-page PDF per participant \
                  and bundles each result folder into a zip archive."
)]
#[command(before_help = "📄 certsplit - Certificate and Receipt Splitter")]
#[command(after_help = "EXAMPLES:\n  \
    certsplit\n  \
    certsplit --data-dir ./march --output ./dist --course-code CS101\n  \
    certsplit --start-row 1 --no-archive --keep-work-dirs\n  \
    certsplit --dry-run --output-format json\n  \
    certsplit --generate-config --config certsplit.toml")]
pub struct Cli {
    /// Directory holding the roster CSV and the Certificate/Receipt folders
    #[arg(long, env = "CERTSPLIT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Base directory for result folders and archives
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Course code used in every output file name (overrides the roster)
    #[arg(long)]
    pub course_code: Option<String>,

    /// Ask for the course code on the terminal before processing
    #[arg(long, conflicts_with = "course_code")]
    pub prompt_course_code: bool,

    /// First roster data row to use (0-based)
    #[arg(long)]
    pub start_row: Option<usize>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Skip creating zip archives of the result folders
    #[arg(long)]
    pub no_archive: bool,

    /// Keep the combined and result folders after the run
    #[arg(long)]
    pub keep_work_dirs: bool,

    /// Overwrite result folders left by a previous run
    #[arg(long)]
    pub force: bool,

    /// Write log events to this file instead of stderr (truncated at start)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Dry run (show what would be done without executing)
    #[arg(long, help = "Show the roster, sources and planned outputs without writing anything")]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Write a sample configuration file (to --config or certsplit.toml) and exit")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_data_dir(self.data_dir.clone())
            .with_output_dir(self.output.clone())
            .with_course_code(self.course_code.clone())
            .with_start_row(self.start_row)
            .with_no_archive(self.no_archive)
            .with_keep_work_dirs(self.keep_work_dirs)
            .with_force(self.force)
            .with_log_file(self.log_file.clone())
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose > 0 && !self.quiet
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}
