use crate::error::{CertSplitError, Result};
use crate::pdf::merger::{flatten_page, type_name};
use crate::pdf::naming::output_file_name;
use crate::pdf::{load_document, save_document};
use lopdf::{Dictionary, Document, Object, ObjectId};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct SplitProgress {
    pub current: usize,
    pub total: usize,
    pub file_name: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SplitSummary {
    /// One entry per page, in roster order. Colliding names repeat a path.
    pub files: Vec<PathBuf>,
    /// File names produced by more than one roster row; the later page wins.
    pub collisions: Vec<String>,
}

impl SplitSummary {
    pub fn written(&self) -> usize {
        self.files.len()
    }

    /// Files left on disk once later pages have overwritten earlier ones.
    pub fn distinct_files(&self) -> usize {
        self.files.len() - self.collisions.len()
    }
}

/// Writes page N of a combined document to a file named after roster entry N.
pub struct PageSplitter<'a> {
    label: &'a str,
    extension: &'a str,
}

impl<'a> PageSplitter<'a> {
    pub fn new(label: &'a str, extension: &'a str) -> Self {
        Self { label, extension }
    }

    /// Files already written stay in place if a later page fails.
    pub fn split(
        &self,
        combined: &Path,
        names: &[String],
        course_code: &str,
        output_dir: &Path,
        on_page: Option<&dyn Fn(&SplitProgress)>,
    ) -> Result<SplitSummary> {
        let document = load_document(combined)?;
        let pages = document.get_pages();

        if pages.len() != names.len() {
            return Err(CertSplitError::PageCountMismatch {
                path: combined.display().to_string(),
                names: names.len(),
                pages: pages.len(),
            });
        }

        fs::create_dir_all(output_dir)?;

        let mut summary = SplitSummary::default();
        let mut seen = HashSet::new();

        for (index, (page_id, name)) in pages.values().zip(names).enumerate() {
            let file_name = output_file_name(name, course_code, self.label, self.extension);
            if !seen.insert(file_name.clone()) {
                tracing::warn!(
                    file = %file_name,
                    row = index,
                    "duplicate output name, earlier file will be overwritten"
                );
                summary.collisions.push(file_name.clone());
            }

            let mut single =
                extract_page(&document, *page_id).map_err(|source| CertSplitError::Document {
                    path: combined.display().to_string(),
                    source,
                })?;

            let target = output_dir.join(&file_name);
            save_document(&mut single, &target)?;
            tracing::debug!(page = index + 1, file = %target.display(), "page written");

            if let Some(callback) = on_page {
                callback(&SplitProgress {
                    current: index + 1,
                    total: names.len(),
                    file_name,
                });
            }

            summary.files.push(target);
        }

        tracing::info!(
            source = %combined.display(),
            output = %output_dir.display(),
            files = summary.distinct_files(),
            "document split into pages"
        );

        Ok(summary)
    }
}

/// Copy one page and the objects it reaches into a new document under a one-page tree.
/// Other pages and page-tree nodes are never followed; references to them become null.
fn extract_page(source: &Document, page_id: ObjectId) -> lopdf::Result<Document> {
    let mut page = flatten_page(source, page_id)?;
    page.remove(b"Parent");

    let mut single = Document::with_version(source.version.as_str());
    let mut pending = Vec::new();
    let mut copied = HashSet::from([page_id]);
    let mut page = Object::Dictionary(page);
    detach(&mut page, source, page_id, &mut pending);

    while let Some(id) = pending.pop() {
        if !copied.insert(id) {
            continue;
        }
        let Ok(object) = source.get_object(id) else {
            continue;
        };
        let mut object = object.clone();
        detach(&mut object, source, page_id, &mut pending);
        single.objects.insert(id, object);
    }

    single.max_id = single
        .objects
        .keys()
        .map(|(id, _)| *id)
        .chain([page_id.0])
        .max()
        .unwrap_or(0);
    let tree_id = single.new_object_id();
    let catalog_id = single.new_object_id();

    if let Object::Dictionary(dictionary) = &mut page {
        dictionary.set("Parent", tree_id);
    }
    single.objects.insert(page_id, page);

    let mut tree = Dictionary::new();
    tree.set("Type", Object::Name(b"Pages".to_vec()));
    tree.set("Count", 1_i64);
    tree.set("Kids", vec![Object::Reference(page_id)]);
    single.objects.insert(tree_id, Object::Dictionary(tree));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", tree_id);
    single.objects.insert(catalog_id, Object::Dictionary(catalog));
    single.trailer.set("Root", catalog_id);

    single.renumber_objects();
    single.compress();
    Ok(single)
}

/// Queue the references held by `object`, nulling out the ones that lead to other pages.
fn detach(object: &mut Object, source: &Document, page_id: ObjectId, pending: &mut Vec<ObjectId>) {
    match object {
        Object::Reference(id) => {
            let id = *id;
            if id == page_id {
                return;
            }
            let foreign = source
                .get_object(id)
                .ok()
                .and_then(type_name)
                .is_some_and(|name| name == b"Page" || name == b"Pages");
            if foreign {
                *object = Object::Null;
            } else {
                pending.push(id);
            }
        }
        Object::Array(items) => {
            for item in items {
                detach(item, source, page_id, pending);
            }
        }
        Object::Dictionary(dictionary) => {
            for (_, value) in dictionary.iter_mut() {
                detach(value, source, page_id, pending);
            }
        }
        Object::Stream(stream) => {
            for (_, value) in stream.dict.iter_mut() {
                detach(value, source, page_id, pending);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::test_support::{page_count, page_labels, write_sample_pdf};
    use std::cell::Cell;
    use tempfile::TempDir;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_split_names_pages_in_roster_order() {
        let temp_dir = TempDir::new().unwrap();
        let combined = write_sample_pdf(&temp_dir.path().join("combined.pdf"), &["p1", "p2"]);
        let output = temp_dir.path().join("Certificate_Result");

        let summary = PageSplitter::new("Certificate", "pdf")
            .split(&combined, &names(&["Alice", "Bob"]), "CS101", &output, None)
            .unwrap();

        assert_eq!(summary.written(), 2);
        assert!(summary.collisions.is_empty());

        let alice = output.join("Alice_CS101_Certificate.pdf");
        let bob = output.join("Bob_CS101_Certificate.pdf");
        assert_eq!(page_count(&alice), 1);
        assert_eq!(page_count(&bob), 1);
        assert_eq!(page_labels(&alice), vec!["p1"]);
        assert_eq!(page_labels(&bob), vec!["p2"]);
    }

    #[test]
    fn test_split_mismatch_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let combined = write_sample_pdf(&temp_dir.path().join("combined.pdf"), &["p1", "p2"]);
        let output = temp_dir.path().join("Receipt_Result");

        let result = PageSplitter::new("Receipt", "pdf").split(
            &combined,
            &names(&["Alice", "Bob", "Carol"]),
            "CS101",
            &output,
            None,
        );

        match result {
            Err(CertSplitError::PageCountMismatch { names, pages, .. }) => {
                assert_eq!(names, 3);
                assert_eq!(pages, 2);
            }
            other => panic!("expected mismatch, got {:?}", other),
        }
        assert!(!output.exists());
    }

    #[test]
    fn test_split_missing_combined_document() {
        let temp_dir = TempDir::new().unwrap();
        let result = PageSplitter::new("Receipt", "pdf").split(
            &temp_dir.path().join("nope.pdf"),
            &names(&["Alice"]),
            "CS101",
            &temp_dir.path().join("out"),
            None,
        );
        assert!(matches!(result, Err(CertSplitError::DocumentNotFound { .. })));
    }

    #[test]
    fn test_split_reports_collisions() {
        let temp_dir = TempDir::new().unwrap();
        let combined = write_sample_pdf(&temp_dir.path().join("combined.pdf"), &["first", "second"]);
        let output = temp_dir.path().join("out");

        let summary = PageSplitter::new("Certificate", "pdf")
            .split(&combined, &names(&["Ann", "Ann?"]), "CS101", &output, None)
            .unwrap();

        assert_eq!(summary.collisions, vec!["Ann_CS101_Certificate.pdf"]);
        assert_eq!(summary.files.len(), 2);
        assert_eq!(summary.files[0], summary.files[1]);
        assert_eq!(summary.distinct_files(), 1);
        assert_eq!(page_labels(&output.join("Ann_CS101_Certificate.pdf")), vec!["second"]);
    }

    #[test]
    fn test_split_progress_callback() {
        let temp_dir = TempDir::new().unwrap();
        let combined = write_sample_pdf(&temp_dir.path().join("combined.pdf"), &["a", "b", "c"]);
        let calls = Cell::new(0);
        let last_total = Cell::new(0);
        let callback = |progress: &SplitProgress| {
            calls.set(calls.get() + 1);
            last_total.set(progress.total);
        };

        PageSplitter::new("Certificate", "pdf")
            .split(
                &combined,
                &names(&["A", "B", "C"]),
                "X1",
                &temp_dir.path().join("out"),
                Some(&callback),
            )
            .unwrap();

        assert_eq!(calls.get(), 3);
        assert_eq!(last_total.get(), 3);
    }

    #[test]
    fn test_split_failure_keeps_earlier_files() {
        let temp_dir = TempDir::new().unwrap();
        let combined = write_sample_pdf(&temp_dir.path().join("combined.pdf"), &["a", "b", "c"]);
        let output = temp_dir.path().join("out");
        fs::create_dir_all(output.join("Bob_CS101_Receipt.pdf")).unwrap();

        let result = PageSplitter::new("Receipt", "pdf").split(
            &combined,
            &names(&["Alice", "Bob", "Carol"]),
            "CS101",
            &output,
            None,
        );

        assert!(result.is_err());
        assert_eq!(page_labels(&output.join("Alice_CS101_Receipt.pdf")), vec!["a"]);
        assert!(output.join("Bob_CS101_Receipt.pdf").is_dir());
        assert!(!output.join("Carol_CS101_Receipt.pdf").exists());
    }

    #[test]
    fn test_split_pages_hold_only_their_own_content() {
        let temp_dir = TempDir::new().unwrap();
        let labels: Vec<String> = (1..=40).map(|n| format!("page {}", n)).collect();
        let label_refs: Vec<&str> = labels.iter().map(String::as_str).collect();
        let combined = write_sample_pdf(&temp_dir.path().join("combined.pdf"), &label_refs);
        let output = temp_dir.path().join("out");
        let roster: Vec<String> = (1..=40).map(|n| format!("P{}", n)).collect();

        let summary = PageSplitter::new("Certificate", "pdf")
            .split(&combined, &roster, "CS101", &output, None)
            .unwrap();
        assert_eq!(summary.written(), 40);

        let last = output.join("P40_CS101_Certificate.pdf");
        assert_eq!(page_labels(&last), vec!["page 40"]);

        let document = Document::load(&last).unwrap();
        let page_objects = document
            .objects
            .values()
            .filter(|object| type_name(object) == Some(b"Page".as_slice()))
            .count();
        assert_eq!(page_objects, 1);

        let page_id = *document.get_pages().values().next().unwrap();
        let page = document.get_dictionary(page_id).unwrap();
        assert!(page.has(b"MediaBox"));
        assert!(page.has(b"Resources"));
    }
}
