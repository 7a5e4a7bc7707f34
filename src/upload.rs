use crate::error::{Result, WorkerError};
use crate::util::{ensure_dir, sha256_hex};
use std::path::Path;
use tracing::info;

/// How the storage backend should treat the payload. `Binary` maps to an
/// opaque download ("raw" in most CDNs), `Image` to a typed, transformable
/// resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Binary,
    Image,
}

impl ResourceKind {
    /// Storage segment, mirroring the raw-vs-typed resource split of the
    /// real backend.
    pub fn segment(&self) -> &'static str {
        match self {
            ResourceKind::Binary => "raw",
            ResourceKind::Image => "image",
        }
    }
}

/// Object-storage boundary. Returns a publicly resolvable URL for the
/// uploaded artifact.
pub trait Uploader: Send + Sync {
    fn upload_bytes(
        &self,
        bytes: &[u8],
        file_name: &str,
        folder: &str,
        kind: ResourceKind,
    ) -> Result<String>;

    fn upload_file(&self, path: &Path, folder: &str, kind: ResourceKind) -> Result<String> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("artifact");
        self.upload_bytes(&bytes, file_name, folder, kind)
    }
}

/// Local stand-in for the CDN collaborator: copies artifacts under an output
/// root and hands back a `file://` URL. A content-hash suffix keeps repeated
/// uploads of the same name from clobbering each other.
pub struct FsUploader {
    out_dir: String,
}

impl FsUploader {
    pub fn new(out_dir: &str) -> Self {
        Self {
            out_dir: out_dir.to_string(),
        }
    }
}

impl Uploader for FsUploader {
    fn upload_bytes(
        &self,
        bytes: &[u8],
        file_name: &str,
        folder: &str,
        kind: ResourceKind,
    ) -> Result<String> {
        let dir = Path::new(&self.out_dir).join(folder).join(kind.segment());
        ensure_dir(&dir).map_err(|e| WorkerError::Upload(format!("{e:#}")))?;

        let (stem, ext) = match file_name.rsplit_once('.') {
            Some((s, e)) => (s, e),
            None => (file_name, "bin"),
        };
        let suffix = &sha256_hex(bytes)[..8];
        let target = dir.join(format!("{stem}-{suffix}.{ext}"));

        std::fs::write(&target, bytes).map_err(|e| {
            WorkerError::Upload(format!("writing {}: {e}", target.display()))
        })?;

        let abs = target
            .canonicalize()
            .map_err(|e| WorkerError::Upload(format!("canonicalize: {e}")))?;
        info!("stored {} bytes at {}", bytes.len(), abs.display());
        Ok(format!("file://{}", abs.display()))
    }
}
