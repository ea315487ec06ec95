use thiserror::Error;

#[derive(Error, Debug)]
pub enum CertSplitError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("No roster file matching '{pattern}' found in {directory}")]
    RosterNotFound { directory: String, pattern: String },

    #[error("Failed to read roster {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("Roster {path} is missing required column '{column}'")]
    MissingColumn { path: String, column: String },

    #[error("Roster {path} contains no participant rows")]
    EmptyRoster { path: String },

    #[error("No .{extension} documents found in {directory}")]
    NoSourceDocuments { directory: String, extension: String },

    #[error("No input documents given for {output}")]
    NothingToMerge { output: String },

    #[error("Document not found: {path}")]
    DocumentNotFound { path: String },

    #[error("Failed to process document {path}: {source}")]
    Document {
        path: String,
        #[source]
        source: lopdf::Error,
    },

    #[error("Malformed document {path}: {reason}")]
    MalformedDocument { path: String, reason: String },

    #[error("{path} has {pages} pages but the roster lists {names} names")]
    PageCountMismatch {
        path: String,
        names: usize,
        pages: usize,
    },

    #[error("Failed to write archive {path}: {source}")]
    Archive {
        path: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Permission denied: {path}")]
    Permission { path: String },

    #[error("Path validation failed: {path}")]
    InvalidPath { path: String },

    #[error("Output directory already exists: {path}")]
    OutputDirectoryExists { path: String },

    #[error("Output directory {path} would delete the input directory {input}")]
    OutputOverlapsInput { path: String, input: String },

    #[error("Operation was cancelled by user")]
    Cancelled,
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for CertSplitError {
    fn user_message(&self) -> String {
        match self {
            CertSplitError::RosterNotFound { directory, pattern } => {
                format!("No roster file matching '{}' in {}", pattern, directory)
            }
            CertSplitError::Csv { path, source } => {
                format!("Could not read roster {}: {}", path, source)
            }
            CertSplitError::MissingColumn { path, column } => {
                format!("Roster {} has no '{}' column", path, column)
            }
            CertSplitError::EmptyRoster { path } => {
                format!("Roster {} has no participants", path)
            }
            CertSplitError::NoSourceDocuments { directory, extension } => {
                format!("No .{} files to merge in {}", extension, directory)
            }
            CertSplitError::DocumentNotFound { path } => {
                format!("Combined document is missing: {}", path)
            }
            CertSplitError::Document { path, source } => {
                format!("Unreadable or corrupt document {}: {}", path, source)
            }
            CertSplitError::MalformedDocument { path, reason } => {
                format!("Document {} is malformed: {}", path, reason)
            }
            CertSplitError::PageCountMismatch { path, names, pages } => {
                format!(
                    "Name count ({}) does not match page count ({}) of {}",
                    names, pages, path
                )
            }
            CertSplitError::Archive { path, .. } => {
                format!("Could not create archive: {}", path)
            }
            CertSplitError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            CertSplitError::Permission { path } => {
                format!("Permission denied accessing: {}", path)
            }
            CertSplitError::InvalidPath { path } => {
                format!("Invalid file path: {}", path)
            }
            CertSplitError::OutputDirectoryExists { path } => {
                format!("Output directory already exists and is not empty: {}", path)
            }
            CertSplitError::Cancelled => "Operation was cancelled by user".to_string(),
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            CertSplitError::RosterNotFound { .. } => Some(
                "Place the roster CSV in the data directory, or point to it with --data-dir and the roster_pattern setting.".to_string()
            ),
            CertSplitError::MissingColumn { .. } => Some(
                "Check the header row of the roster, or set name_column / course_code_column in the configuration file.".to_string()
            ),
            CertSplitError::EmptyRoster { .. } => Some(
                "Make sure the roster has data rows and that --start-row is within range.".to_string()
            ),
            CertSplitError::NoSourceDocuments { .. } => Some(
                "Copy the generated PDFs into the Certificate and Receipt folders of the data directory.".to_string()
            ),
            CertSplitError::PageCountMismatch { .. } => Some(
                "Each combined document must have exactly one page per roster row. Check for missing or extra source files, or adjust --start-row.".to_string()
            ),
            CertSplitError::Config { .. } => Some(
                "Check your configuration file syntax and ensure all required fields are present.".to_string()
            ),
            CertSplitError::Permission { .. } => Some(
                "Ensure you have the necessary read/write permissions for the target directory.".to_string()
            ),
            CertSplitError::OutputDirectoryExists { .. } => Some(
                "Remove the leftover result folders from a previous run, or use --force to overwrite them.".to_string()
            ),
            CertSplitError::OutputOverlapsInput { .. } => Some(
                "Choose an output directory and folder names outside the data directory.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for CertSplitError {
    fn from(error: toml::de::Error) -> Self {
        CertSplitError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CertSplitError>;
