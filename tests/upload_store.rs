use mediaforge_worker::upload::{FsUploader, ResourceKind, Uploader};
use std::path::Path;

#[test]
fn resource_kind_selects_storage_segment() {
    let out = tempfile::tempdir().unwrap();
    let uploader = FsUploader::new(&out.path().display().to_string());

    let raw = uploader
        .upload_bytes(b"data", "doc.pdf", "folder", ResourceKind::Binary)
        .unwrap();
    let img = uploader
        .upload_bytes(b"data", "pic.png", "folder", ResourceKind::Image)
        .unwrap();

    assert!(raw.contains("/folder/raw/"), "{raw}");
    assert!(img.contains("/folder/image/"), "{img}");
}

#[test]
fn repeated_uploads_of_same_name_do_not_clobber() {
    let out = tempfile::tempdir().unwrap();
    let uploader = FsUploader::new(&out.path().display().to_string());

    let a = uploader
        .upload_bytes(b"aaaa", "doc.pdf", "folder", ResourceKind::Binary)
        .unwrap();
    let b = uploader
        .upload_bytes(b"bbbb", "doc.pdf", "folder", ResourceKind::Binary)
        .unwrap();

    assert_ne!(a, b);
    assert!(Path::new(a.strip_prefix("file://").unwrap()).exists());
    assert!(Path::new(b.strip_prefix("file://").unwrap()).exists());
}
