use crate::error::{CertSplitError, Result};
use regex::Regex;
use std::path::Path;

/// Matches file names against a shell-style glob (`*`, `?`) and an optional extension.
pub struct FileFilter {
    pattern: Regex,
    source: String,
}

impl FileFilter {
    pub fn from_glob(glob: &str) -> Result<Self> {
        let mut expr = String::from("^");
        for ch in glob.chars() {
            match ch {
                '*' => expr.push_str(".*"),
                '?' => expr.push('.'),
                c => expr.push_str(&regex::escape(c.encode_utf8(&mut [0u8; 4]))),
            }
        }
        expr.push('$');

        let pattern = Regex::new(&expr).map_err(|e| CertSplitError::Config {
            message: format!("Invalid file pattern '{}': {}", glob, e),
        })?;

        Ok(Self {
            pattern,
            source: glob.to_string(),
        })
    }

    pub fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|s| s.to_str())
            .is_some_and(|name| self.pattern.is_match(name))
    }

    pub fn pattern(&self) -> &str {
        &self.source
    }
}

pub fn has_extension(path: &Path, extension: &str) -> bool {
    let wanted = extension.trim_start_matches('.');
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted))
}
