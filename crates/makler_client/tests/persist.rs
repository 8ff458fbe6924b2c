use std::fs;

use makler_client::{AtomicFileWriter, ExportFile, PersistError};
use tempfile::TempDir;

#[test]
fn first_export_creates_missing_directory() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("exports").join("2026");
    assert!(!new_dir.exists());

    let writer = AtomicFileWriter::new(new_dir.clone());
    let path = writer.write("links_2026_07.csv", b"URL\n").unwrap();
    assert!(new_dir.is_dir());
    assert_eq!(path, new_dir.join("links_2026_07.csv"));
}

#[test]
fn export_directory_that_is_a_file_is_rejected() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("exports");
    fs::write(&blocker, b"not a directory").unwrap();

    let writer = AtomicFileWriter::new(blocker.clone());
    let err = writer.write("alle_links.csv", b"URL\n").unwrap_err();
    assert!(matches!(err, PersistError::ExportDir { ref dir, .. } if dir == &blocker));
}

#[test]
fn export_replaces_existing_file() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer
        .write_export(&ExportFile {
            filename: "alle_links.csv".to_string(),
            bytes: b"URL\nhttps://x/1\n".to_vec(),
        })
        .unwrap();
    assert_eq!(first.file_name().unwrap(), "alle_links.csv");

    let second = writer.write("alle_links.csv", b"URL\n").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read(&second).unwrap(), b"URL\n");
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
}

#[test]
fn rejects_filenames_with_separators() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());
    for name in ["", "..", "../x.csv", "a/b.csv", r"a\b.csv"] {
        let err = writer.write(name, b"x").unwrap_err();
        assert!(matches!(err, PersistError::InvalidFilename(_)), "{name:?}");
    }
}

#[test]
fn no_partial_file_on_error() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let result = writer.write("links.csv", b"data");
    assert!(result.is_err());
    assert!(!file_path.with_file_name("links.csv").exists());
}
