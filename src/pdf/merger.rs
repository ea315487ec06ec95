use crate::error::{CertSplitError, Result};
use crate::pdf::{load_document, save_document};
use lopdf::{Dictionary, Document, Object, ObjectId};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize)]
pub struct MergeSummary {
    pub inputs: usize,
    pub pages: usize,
    pub output: PathBuf,
}

/// Concatenates PDF files page by page, in the order given.
pub struct DocumentMerger {
    pdf_version: String,
}

impl DocumentMerger {
    pub fn new() -> Self {
        Self {
            pdf_version: "1.5".to_string(),
        }
    }

    pub fn merge(&self, inputs: &[PathBuf], output: &Path) -> Result<MergeSummary> {
        let first = inputs.first().ok_or_else(|| CertSplitError::NothingToMerge {
            output: output.display().to_string(),
        })?;
        tracing::debug!(first = %first.display(), count = inputs.len(), "merging documents");

        let mut max_id = 1;
        let mut pages: Vec<(ObjectId, Object)> = Vec::new();
        let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

        for input in inputs {
            let mut document = load_document(input)?;
            document.renumber_objects_with(max_id);
            max_id = document.max_id + 1;

            for (_, page_id) in document.get_pages() {
                let page = flatten_page(&document, page_id).map_err(|source| {
                    CertSplitError::Document {
                        path: input.display().to_string(),
                        source,
                    }
                })?;
                pages.push((page_id, Object::Dictionary(page)));
            }
            objects.extend(document.objects);
        }

        let mut merged = self.assemble(pages.as_slice(), &objects, output)?;

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        save_document(&mut merged, output)?;

        tracing::info!(
            output = %output.display(),
            inputs = inputs.len(),
            pages = pages.len(),
            "combined document written"
        );

        Ok(MergeSummary {
            inputs: inputs.len(),
            pages: pages.len(),
            output: output.to_path_buf(),
        })
    }

    fn assemble(
        &self,
        pages: &[(ObjectId, Object)],
        objects: &BTreeMap<ObjectId, Object>,
        output: &Path,
    ) -> Result<Document> {
        let mut document = Document::with_version(self.pdf_version.as_str());
        let mut catalog: Option<(ObjectId, Object)> = None;
        let mut tree_id: Option<ObjectId> = None;

        for (object_id, object) in objects {
            match type_name(object) {
                Some(b"Catalog") => {
                    if catalog.is_none() {
                        catalog = Some((*object_id, object.clone()));
                    }
                }
                Some(b"Pages") => {
                    if tree_id.is_none() {
                        tree_id = Some(*object_id);
                    }
                }
                // Pages are re-parented below; outlines point into the old trees.
                Some(b"Page") | Some(b"Outlines") | Some(b"Outline") => {}
                _ => {
                    document.objects.insert(*object_id, object.clone());
                }
            }
        }

        let malformed = |reason: &str| CertSplitError::MalformedDocument {
            path: output.display().to_string(),
            reason: reason.to_string(),
        };
        let tree_id = tree_id.ok_or_else(|| malformed("no page tree in any input"))?;
        let (catalog_id, catalog) = catalog.ok_or_else(|| malformed("no catalog in any input"))?;

        for (page_id, page) in pages {
            if let Ok(dictionary) = page.as_dict() {
                let mut dictionary = dictionary.clone();
                dictionary.set("Parent", tree_id);
                document.objects.insert(*page_id, Object::Dictionary(dictionary));
            }
        }

        let mut tree = Dictionary::new();
        tree.set("Type", Object::Name(b"Pages".to_vec()));
        tree.set("Count", pages.len() as i64);
        tree.set(
            "Kids",
            pages
                .iter()
                .map(|(id, _)| Object::Reference(*id))
                .collect::<Vec<_>>(),
        );
        document.objects.insert(tree_id, Object::Dictionary(tree));

        if let Ok(dictionary) = catalog.as_dict() {
            let mut dictionary = dictionary.clone();
            dictionary.set("Pages", tree_id);
            dictionary.remove(b"Outlines");
            document.objects.insert(catalog_id, Object::Dictionary(dictionary));
        }

        document.trailer.set("Root", catalog_id);
        document.max_id = document.objects.keys().map(|(id, _)| *id).max().unwrap_or(0);
        document.renumber_objects();
        document.compress();

        Ok(document)
    }
}

impl Default for DocumentMerger {
    fn default() -> Self {
        Self::new()
    }
}

const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Copy attributes a page inherits from its page-tree ancestors into the page itself,
/// since the ancestors are replaced by a single new tree.
pub(crate) fn flatten_page(document: &Document, page_id: ObjectId) -> lopdf::Result<Dictionary> {
    let mut page = document.get_dictionary(page_id)?.clone();
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;

    while let Some(parent_id) = parent {
        depth += 1;
        if depth > 64 {
            break;
        }
        let Ok(node) = document.get_dictionary(parent_id) else {
            break;
        };
        for key in INHERITABLE {
            if !page.has(key) {
                if let Ok(value) = node.get(key) {
                    page.set(key, value.clone());
                }
            }
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    Ok(page)
}

pub(crate) fn type_name(object: &Object) -> Option<&[u8]> {
    object
        .as_dict()
        .ok()
        .and_then(|dictionary| dictionary.get(b"Type").ok())
        .and_then(|value| value.as_name().ok())
}
