mod common;

use certsplit::{
    ArchiveOutcome, CertSplit, CertSplitError, Config, DocumentKind, OutputMode, Stage,
};
use common::{page_count, Project, ROSTER};
use std::fs::File;
use zip::ZipArchive;

fn config_for(project: &Project) -> Config {
    let mut config = Config::default();
    config.input.data_dir = project.data();
    config.output.base_directory = project.out();
    config
}

fn run(config: Config) -> certsplit::Result<certsplit::RunReport> {
    CertSplit::new_detached(config, OutputMode::Plain, 0, true).run()
}

fn zip_names(path: &std::path::Path) -> Vec<String> {
    let archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut names: Vec<String> = archive.file_names().map(String::from).collect();
    names.sort();
    names
}

#[test]
fn end_to_end_archives_and_cleans_up() {
    let project = Project::new(ROSTER);
    project
        .certificates("certificates.pdf", &["cert Alice", "cert Bob"])
        .receipts("a_receipt.pdf", &["receipt Alice"])
        .receipts("b_receipt.pdf", &["receipt Bob"]);

    let report = run(config_for(&project)).unwrap();

    assert!(!report.has_failures());
    assert_eq!(report.participants, 2);
    assert_eq!(report.course_code, "CS101");
    assert_eq!(report.files_written(), 4);

    let out = project.out();
    assert_eq!(
        zip_names(&out.join("Certificate_Result.zip")),
        vec!["Alice_CS101_Certificate.pdf", "Bob_CS101_Certificate.pdf"]
    );
    assert_eq!(
        zip_names(&out.join("Receipt_Result.zip")),
        vec!["Alice_CS101_Receipt.pdf", "Bob_CS101_Receipt.pdf"]
    );

    assert!(!out.join("Certificate_Result").exists());
    assert!(!out.join("Receipt_Result").exists());
    assert!(!out.join("combined").exists());
}

#[test]
fn outputs_match_names_and_pages() {
    let project = Project::new(
        "Course Code,User Name\nBIO7,Ana Lima\nBIO7,Ben O'Hara\nBIO7,Chen Wu\n",
    );
    project
        .certificates("batch.pdf", &["1", "2", "3"])
        .receipts("batch.pdf", &["1", "2", "3"]);

    let mut config = config_for(&project);
    config.output.cleanup = false;
    let report = run(config).unwrap();

    let certificates = report.kind(DocumentKind::Certificate).unwrap();
    assert_eq!(certificates.merge.as_ref().unwrap().pages, 3);
    assert_eq!(certificates.files_written(), 3);

    let results = project.out().join("Certificate_Result");
    for name in ["Ana Lima", "Ben OHara", "Chen Wu"] {
        let file = results.join(format!("{}_BIO7_Certificate.pdf", name));
        assert_eq!(page_count(&file), 1, "{}", file.display());
    }
    assert!(project
        .out()
        .join("combined")
        .join("combined_certificates.pdf")
        .exists());
}

#[test]
fn receipt_mismatch_fails_only_receipts() {
    let project = Project::new(ROSTER);
    project
        .certificates("batch.pdf", &["a", "b"])
        .receipts("batch.pdf", &["a", "b", "c"]);

    let report = run(config_for(&project)).unwrap();

    assert!(report.has_failures());
    assert!(report.kind(DocumentKind::Certificate).unwrap().succeeded());

    let receipts = report.kind(DocumentKind::Receipt).unwrap();
    assert_eq!(receipts.failed_stage, Some(Stage::Split));
    assert!(receipts.split.is_none());

    let out = project.out();
    assert!(out.join("Certificate_Result.zip").exists());
    assert!(!out.join("Receipt_Result.zip").exists());
    let leftover: Vec<_> = std::fs::read_dir(out.join("Receipt_Result"))
        .unwrap()
        .collect();
    assert!(leftover.is_empty());
}

#[test]
fn no_archive_keeps_result_folders() {
    let project = Project::new(ROSTER);
    project
        .certificates("batch.pdf", &["a", "b"])
        .receipts("batch.pdf", &["a", "b"]);

    let mut config = config_for(&project);
    config.output.create_archives = false;
    let report = run(config).unwrap();

    for kind in &report.kinds {
        assert!(kind.archive.is_none());
    }
    let out = project.out();
    assert!(out.join("Certificate_Result").join("Bob_CS101_Certificate.pdf").exists());
    assert!(out.join("Receipt_Result").join("Alice_CS101_Receipt.pdf").exists());
    assert!(!out.join("Certificate_Result.zip").exists());
    assert!(!out.join("combined").exists());
}

#[test]
fn start_row_and_configured_course_code() {
    let project = Project::new("Course Code,User Name\nCS101,Header Row Person\nCS101,Alice\n");
    project
        .certificates("batch.pdf", &["a"])
        .receipts("batch.pdf", &["a"]);

    let mut config = config_for(&project);
    config.input.start_row = 1;
    config.input.course_code = Some("CS-2024".to_string());
    config.output.create_archives = false;
    let report = run(config).unwrap();

    assert!(!report.has_failures());
    assert_eq!(report.participants, 1);
    assert!(project
        .out()
        .join("Receipt_Result")
        .join("Alice_CS-2024_Receipt.pdf")
        .exists());
}

#[test]
fn leftover_results_abort_without_force() {
    let project = Project::new(ROSTER);
    project
        .certificates("batch.pdf", &["a", "b"])
        .receipts("batch.pdf", &["a", "b"]);
    let leftover = project.out().join("Certificate_Result");
    std::fs::create_dir_all(&leftover).unwrap();
    std::fs::write(leftover.join("old.pdf"), b"old").unwrap();

    let result = run(config_for(&project));
    assert!(matches!(
        result,
        Err(CertSplitError::OutputDirectoryExists { .. })
    ));

    let mut config = config_for(&project);
    config.output.force_overwrite = true;
    let report = run(config).unwrap();
    let certificates = report.kind(DocumentKind::Certificate).unwrap();
    assert!(matches!(
        certificates.archive,
        Some(ArchiveOutcome::Created { entries: 2, .. })
    ));
}

#[test]
fn missing_column_is_fatal() {
    let project = Project::new("Course,Name\nCS101,Alice\n");
    project.certificates("batch.pdf", &["a"]);

    let result = run(config_for(&project));
    assert!(matches!(
        result,
        Err(CertSplitError::MissingColumn { ref column, .. }) if column == "Course Code"
    ));
    assert!(!project.out().exists());
}

#[test]
fn work_folder_naming_the_data_folder_is_refused() {
    let project = Project::new(ROSTER);
    project
        .certificates("batch.pdf", &["a", "b"])
        .receipts("batch.pdf", &["a", "b"]);

    let mut config = config_for(&project);
    config.output.base_directory = project.root().to_path_buf();
    config.output.combined_dir = "data".to_string();
    assert!(config.validate().is_ok());

    let result = run(config);
    assert!(matches!(
        result,
        Err(CertSplitError::OutputOverlapsInput { .. })
    ));
    assert!(project.data().join("participants.csv").exists());
    assert!(project.data().join("Certificate").join("batch.pdf").exists());
}
