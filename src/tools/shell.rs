use super::exec::run_tool;
use super::{find_executable, PdfTools, ToolDiag};
use crate::config::Config;
use crate::error::{Result, WorkerError};
use crate::profile::QualityProfile;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tracing::{info, warn};

pub struct ShellTools {
    gs: PathBuf,
    ocr: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl ShellTools {
    /// Resolves both binaries once at worker startup. Ghostscript is
    /// required; a missing OCR tool only disables the OCR stage.
    pub fn new(cfg: &Config) -> Result<Self> {
        let gs = resolve(&cfg.tools.gs_exe, "GS_EXE", "gs", Some("gswin64c")).ok_or_else(|| {
            WorkerError::Process {
                tool: "gs".to_string(),
                status: "not found".to_string(),
                stderr: "ghostscript executable not found on PATH".to_string(),
            }
        })?;

        let ocr = resolve(&cfg.tools.ocr_exe, "OCR_EXE", "ocrmypdf", None);
        if ocr.is_none() {
            warn!("ocrmypdf not found; scanned documents will skip the OCR stage");
        }

        let timeout = match cfg.tools.process_timeout_seconds {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        info!(
            "tools gs={} ocr={}",
            gs.display(),
            ocr.as_deref().map(Path::display).map(|d| d.to_string()).unwrap_or_else(|| "-".into())
        );
        Ok(Self { gs, ocr, timeout })
    }

    fn version_of(&self, exe: &Path, tool: &str) -> Option<String> {
        let mut cmd = Command::new(exe);
        cmd.arg("--version");
        let out = run_tool(tool, cmd, Some(Duration::from_secs(10))).ok()?;
        Some(String::from_utf8_lossy(&out.stdout).trim().to_string())
    }
}

impl PdfTools for ShellTools {
    fn diagnostics(&self) -> ToolDiag {
        let gs_version = self.version_of(&self.gs, "gs");
        let ocr_version = self
            .ocr
            .as_deref()
            .and_then(|p| self.version_of(p, "ocrmypdf"));
        ToolDiag {
            gs_exe: self.gs.display().to_string(),
            ok: gs_version.is_some(),
            gs_version,
            ocr_exe: self.ocr.as_deref().map(|p| p.display().to_string()),
            ocr_version,
        }
    }

    fn ocr_available(&self) -> bool {
        self.ocr.is_some()
    }

    fn ocr(&self, input: &Path, output: &Path, profile: QualityProfile) -> Result<()> {
        let exe = self.ocr.as_deref().ok_or_else(|| WorkerError::Process {
            tool: "ocrmypdf".to_string(),
            status: "not found".to_string(),
            stderr: "ocr stage invoked without an OCR binary".to_string(),
        })?;

        let mut cmd = Command::new(exe);
        cmd.arg("--skip-text")
            .args(["--optimize", "2"])
            .args(["--jpeg-quality", &profile.jpeg_quality().to_string()])
            .args(["--image-dpi", &profile.dpi().to_string()])
            .arg(profile.jbig2_flag())
            .args(["--output-type", "pdf"])
            .arg(input)
            .arg(output);

        run_tool("ocrmypdf", cmd, self.timeout)?;
        Ok(())
    }

    fn compress(&self, input: &Path, output: &Path, profile: QualityProfile) -> Result<()> {
        // Ghostscript rejects backslash separators; every path crossing this
        // boundary goes through gs_path().
        let mut cmd = Command::new(&self.gs);
        cmd.arg("-sDEVICE=pdfwrite")
            .arg("-dCompatibilityLevel=1.4")
            .arg(format!("-dPDFSETTINGS={}", profile.gs_preset()))
            .arg("-dNOPAUSE")
            .arg("-dQUIET")
            .arg("-dBATCH")
            .arg("-dSAFER")
            .arg(format!("-sOutputFile={}", gs_path(output)))
            .arg(gs_path(input));

        run_tool("gs", cmd, self.timeout)?;
        Ok(())
    }
}

fn resolve(
    configured: &str,
    env_var: &str,
    unix_name: &str,
    windows_alt: Option<&str>,
) -> Option<PathBuf> {
    if !configured.is_empty() {
        return Some(PathBuf::from(configured));
    }
    if let Some(p) = std::env::var_os(env_var) {
        return Some(PathBuf::from(p));
    }
    find_executable(unix_name, windows_alt)
}

/// Forward-slash form of a path, required on Windows where ghostscript
/// chokes on native separators.
pub fn gs_path(path: &Path) -> String {
    let raw = path.display().to_string();
    if cfg!(windows) {
        raw.replace('\\', "/")
    } else {
        raw
    }
}
