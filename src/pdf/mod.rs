pub mod merger;
pub mod naming;
pub mod splitter;

pub use merger::{DocumentMerger, MergeSummary};
pub use naming::{output_file_name, sanitize_name};
pub use splitter::{PageSplitter, SplitProgress, SplitSummary};

use crate::error::{CertSplitError, Result};
use lopdf::Document;
use std::path::Path;

pub(crate) fn load_document(path: &Path) -> Result<Document> {
    if !path.is_file() {
        return Err(CertSplitError::DocumentNotFound {
            path: path.display().to_string(),
        });
    }

    Document::load(path).map_err(|source| CertSplitError::Document {
        path: path.display().to_string(),
        source,
    })
}

pub(crate) fn save_document(document: &mut Document, path: &Path) -> Result<()> {
    document.save(path).map(|_| ()).map_err(|e| {
        CertSplitError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("failed to write {}: {}", path.display(), e),
        ))
    })
}
