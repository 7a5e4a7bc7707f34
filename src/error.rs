use std::path::PathBuf;
use thiserror::Error;

/// Failure kinds a task run can surface. External-binary failures
/// (`Process`) are kept distinct from staging/validation failures so a
/// truncated intermediate file is never misreported as a tool crash.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("download failed for {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("[{step}] file not found: {path}")]
    MissingArtifact { step: String, path: PathBuf },

    #[error("[{step}] generated file is 0 bytes: {path}")]
    EmptyArtifact { step: String, path: PathBuf },

    #[error("[{step}] produced an empty document")]
    EmptyOutput { step: String },

    #[error("{tool} failed ({status}): {stderr}")]
    Process {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid page range {start}-{end} for document with {page_count} pages")]
    PageRange {
        start: u32,
        end: u32,
        page_count: u32,
    },

    #[error("upload failed: {0}")]
    Upload(String),

    #[error("pdf error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, WorkerError>;
