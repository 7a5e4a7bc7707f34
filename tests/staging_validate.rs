use mediaforge_worker::error::WorkerError;
use mediaforge_worker::staging::{validate, StagingDir};
use std::path::PathBuf;

#[test]
fn missing_artifact_is_rejected() {
    let err = validate(&PathBuf::from("/nonexistent/artifact.pdf"), "preprocess").unwrap_err();
    assert!(matches!(err, WorkerError::MissingArtifact { ref step, .. } if step == "preprocess"));
}

#[test]
fn empty_artifact_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.pdf");
    std::fs::write(&path, b"").unwrap();
    let err = validate(&path, "compress").unwrap_err();
    assert!(matches!(err, WorkerError::EmptyArtifact { ref step, .. } if step == "compress"));
}

#[test]
fn validate_returns_byte_size() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("src.pdf");
    std::fs::write(&path, b"%PDF-1.5 data").unwrap();
    assert_eq!(validate(&path, "download").unwrap(), 13);
}

#[test]
fn staging_dir_is_removed_on_drop() {
    let work = tempfile::tempdir().unwrap();
    let root = {
        let staging = StagingDir::create_in(&work.path().display().to_string()).unwrap();
        std::fs::write(staging.path("src.pdf"), b"data").unwrap();
        staging.root().to_path_buf()
    };
    assert!(!root.exists());
}
