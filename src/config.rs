use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub download: Download,
    #[serde(default)]
    pub tools: Tools,
    #[serde(default)]
    pub classification: Classification,
    #[serde(default)]
    pub state: State,
    #[serde(default)]
    pub upload: Upload,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: Default::default(),
            download: Default::default(),
            tools: Default::default(),
            classification: Default::default(),
            state: Default::default(),
            upload: Default::default(),
            logging: Default::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paths {
    /// Root the filesystem uploader writes under.
    pub out_dir: String,
    /// Where staging dirs are created. Empty means the system temp dir.
    pub work_dir: String,
}
impl Default for Paths {
    fn default() -> Self {
        Self {
            out_dir: "out".into(),
            work_dir: "".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Download {
    pub timeout_seconds: u64,
}
impl Default for Download {
    fn default() -> Self {
        Self { timeout_seconds: 60 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tools {
    /// Ghostscript executable. Empty means auto-resolve (GS_EXE env, then
    /// PATH: `gs`, or `gswin64c` on Windows).
    pub gs_exe: String,
    /// ocrmypdf executable. Empty means auto-resolve (OCR_EXE env, then
    /// PATH). Missing OCR is a degraded mode, not an error.
    pub ocr_exe: String,
    /// Wall-clock bound on each external-binary invocation. 0 disables.
    pub process_timeout_seconds: u64,
}
impl Default for Tools {
    fn default() -> Self {
        Self {
            gs_exe: "".into(),
            ocr_exe: "".into(),
            process_timeout_seconds: 600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub sample_pages: u32,
    /// Fraction of sampled pages that must look scanned for the whole
    /// document to classify as scanned.
    pub scanned_page_fraction: f32,
}
impl Default for Classification {
    fn default() -> Self {
        Self {
            sample_pages: 3,
            scanned_page_fraction: 0.8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct State {
    pub channel_prefix: String,
}
impl Default for State {
    fn default() -> Self {
        Self {
            channel_prefix: "progress".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Upload {
    pub folder_compressed: String,
    pub folder_extracted: String,
    pub folder_converted: String,
}
impl Default for Upload {
    fn default() -> Self {
        Self {
            folder_compressed: "mediaforge/pdf_compressed".into(),
            folder_extracted: "mediaforge/pdf_extracted".into(),
            folder_converted: "mediaforge/converted".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: false,
            file_path: "".into(),
        }
    }
}
