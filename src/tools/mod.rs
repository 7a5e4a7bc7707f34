pub mod exec;
pub mod shell;

use crate::error::Result;
use crate::profile::QualityProfile;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use shell::ShellTools;

/// External-binary seam of the compression pipeline. `ShellTools` shells out
/// to ocrmypdf and ghostscript; tests substitute mocks.
pub trait PdfTools {
    fn diagnostics(&self) -> ToolDiag;

    /// Whether the OCR binary was found at startup. When it wasn't, the OCR
    /// stage is skipped entirely rather than failed.
    fn ocr_available(&self) -> bool;

    /// Inject a searchable text layer into `input`, writing `output`.
    fn ocr(&self, input: &Path, output: &Path, profile: QualityProfile) -> Result<()>;

    /// Rasterize/compress `input` into `output` with the profile's preset.
    fn compress(&self, input: &Path, output: &Path, profile: QualityProfile) -> Result<()>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDiag {
    pub gs_exe: String,
    pub gs_version: Option<String>,
    pub ocr_exe: Option<String>,
    pub ocr_version: Option<String>,
    pub ok: bool,
}

/// PATH lookup with a Windows alternate name, mirroring how the binaries are
/// installed on each platform.
pub fn find_executable(unix_name: &str, windows_alt: Option<&str>) -> Option<PathBuf> {
    if cfg!(windows) {
        if let Some(alt) = windows_alt {
            if let Some(p) = search_path(alt) {
                return Some(p);
            }
        }
    }
    search_path(unix_name)
}

fn search_path(name: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&paths) {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
        if cfg!(windows) {
            let exe = dir.join(format!("{name}.exe"));
            if exe.is_file() {
                return Some(exe);
            }
        }
    }
    None
}
