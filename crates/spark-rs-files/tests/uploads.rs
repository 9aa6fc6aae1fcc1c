use pretty_assertions::assert_eq;
use spark_rs_config::UploadsConfig;
use spark_rs_files::{FileError, FileProcessor};
use std::fs::File;
use tempfile::TempDir;

#[test]
fn oversized_pdf_is_rejected_before_extraction() {
    let temp = TempDir::new().expect("tmp");
    let path = temp.path().join("resume.pdf");
    // Zero-filled and not a PDF, so any extraction attempt would differ.
    File::create(&path)
        .and_then(|file| file.set_len(15 * 1024 * 1024))
        .expect("sized file");

    let err = FileProcessor::new(UploadsConfig::default())
        .process_path(&path)
        .unwrap_err();
    match &err {
        FileError::TooLarge { name, limit_mb, .. } => {
            assert_eq!(name, "resume.pdf");
            assert_eq!(*limit_mb, 10);
        }
        other => panic!("unexpected error: {other}"),
    }
    let message = err.to_string();
    assert!(message.contains("resume.pdf"));
    assert!(message.contains("10MB"));
}

#[test]
fn batch_reports_failures_per_file() {
    let temp = TempDir::new().expect("tmp");
    let notes = temp.path().join("notes.txt");
    std::fs::write(&notes, "Topic: remote work").expect("write");
    let archive = temp.path().join("bundle.zip");
    std::fs::write(&archive, "PK").expect("write");
    let missing = temp.path().join("gone.txt");

    let results = FileProcessor::default()
        .process_batch(&[&notes, &archive, &missing])
        .expect("batch accepted");
    assert_eq!(results.len(), 3);
    assert_eq!(
        results[0].as_ref().map(|file| file.content.as_str()).ok(),
        Some("Topic: remote work")
    );
    assert!(matches!(results[1], Err(FileError::UnsupportedType { .. })));
    assert!(matches!(results[2], Err(FileError::Read { .. })));
}

#[test]
fn oversized_batch_is_rejected_whole() {
    let temp = TempDir::new().expect("tmp");
    let paths: Vec<_> = (0..3)
        .map(|index| {
            let path = temp.path().join(format!("doc-{index}.txt"));
            std::fs::write(&path, "text").expect("write");
            path
        })
        .collect();
    let processor = FileProcessor::new(UploadsConfig {
        max_files: 2,
        ..UploadsConfig::default()
    });
    let err = processor.process_batch(&paths).unwrap_err();
    assert!(matches!(err, FileError::TooManyFiles { count: 3, max: 2 }));
    assert_eq!(err.file_name(), None);
}
