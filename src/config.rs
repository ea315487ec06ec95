use crate::error::{CertSplitError, Result};
use crate::scanner::FileFilter;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InputConfig {
    pub data_dir: PathBuf,
    pub roster_pattern: String,
    pub name_column: String,
    pub course_code_column: String,
    pub start_row: usize,
    pub certificate_dir: String,
    pub receipt_dir: String,
    pub document_extension: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub base_directory: PathBuf,
    pub certificate_dir: String,
    pub receipt_dir: String,
    pub combined_dir: String,
    pub create_archives: bool,
    pub cleanup: bool,
    pub force_overwrite: bool,
    pub generate_report: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            roster_pattern: "*.csv".to_string(),
            name_column: "User Name".to_string(),
            course_code_column: "Course Code".to_string(),
            start_row: 0,
            certificate_dir: "Certificate".to_string(),
            receipt_dir: "Receipt".to_string(),
            document_extension: "pdf".to_string(),
            course_code: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            base_directory: PathBuf::from("."),
            certificate_dir: "Certificate_Result".to_string(),
            receipt_dir: "Receipt_Result".to_string(),
            combined_dir: "combined".to_string(),
            create_archives: true,
            cleanup: true,
            force_overwrite: false,
            generate_report: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(CertSplitError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CertSplitError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| CertSplitError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["certsplit.toml", ".certsplit.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref data_dir) = cli_args.data_dir {
            self.input.data_dir = data_dir.clone();
        }

        if let Some(start_row) = cli_args.start_row {
            self.input.start_row = start_row;
        }

        if let Some(ref course_code) = cli_args.course_code {
            self.input.course_code = Some(course_code.trim().to_string());
        }

        if let Some(ref output_dir) = cli_args.output_dir {
            self.output.base_directory = output_dir.clone();
        }

        if cli_args.no_archive {
            self.output.create_archives = false;
        }

        if cli_args.keep_work_dirs {
            self.output.cleanup = false;
        }

        if cli_args.force {
            self.output.force_overwrite = true;
        }

        if let Some(ref log_file) = cli_args.log_file {
            self.logging.file = Some(log_file.clone());
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| CertSplitError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| CertSplitError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let required = [
            ("input.roster_pattern", &self.input.roster_pattern),
            ("input.name_column", &self.input.name_column),
            ("input.course_code_column", &self.input.course_code_column),
            ("input.certificate_dir", &self.input.certificate_dir),
            ("input.receipt_dir", &self.input.receipt_dir),
            ("input.document_extension", &self.input.document_extension),
            ("output.certificate_dir", &self.output.certificate_dir),
            ("output.receipt_dir", &self.output.receipt_dir),
            ("output.combined_dir", &self.output.combined_dir),
        ];

        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(CertSplitError::Config {
                    message: format!("{} must not be empty", key),
                });
            }
        }

        FileFilter::from_glob(&self.input.roster_pattern)?;

        // The three working folders are removed independently, so they must not overlap
        let work_dirs = [
            &self.output.certificate_dir,
            &self.output.receipt_dir,
            &self.output.combined_dir,
        ];
        for (i, a) in work_dirs.iter().enumerate() {
            if work_dirs[i + 1..].iter().any(|b| a == b) {
                return Err(CertSplitError::Config {
                    message: format!("Output directory '{}' is configured more than once", a),
                });
            }
            if a.contains('/') || a.contains('\\') || a.as_str() == "." || a.as_str() == ".." {
                return Err(CertSplitError::Config {
                    message: format!("Output directory '{}' must be a plain folder name", a),
                });
            }
        }

        if let Some(ref code) = self.input.course_code {
            if code.trim().is_empty() {
                return Err(CertSplitError::Config {
                    message: "input.course_code must not be empty when set".to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn create_sample_config() -> String {
        let mut sample_config = Self::default();
        sample_config.logging.file = Some(PathBuf::from("app_errors.log"));
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub data_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub course_code: Option<String>,
    pub start_row: Option<usize>,
    pub no_archive: bool,
    pub keep_work_dirs: bool,
    pub force: bool,
    pub log_file: Option<PathBuf>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data_dir(mut self, data_dir: Option<PathBuf>) -> Self {
        self.data_dir = data_dir;
        self
    }

    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }

    pub fn with_course_code(mut self, course_code: Option<String>) -> Self {
        self.course_code = course_code;
        self
    }

    pub fn with_start_row(mut self, start_row: Option<usize>) -> Self {
        self.start_row = start_row;
        self
    }

    pub fn with_no_archive(mut self, no_archive: bool) -> Self {
        self.no_archive = no_archive;
        self
    }

    pub fn with_keep_work_dirs(mut self, keep: bool) -> Self {
        self.keep_work_dirs = keep;
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_log_file(mut self, log_file: Option<PathBuf>) -> Self {
        self.log_file = log_file;
        self
    }
}
