use crate::classify;
use crate::config::Config;
use crate::download::{fetch_source, Fetcher};
use crate::error::Result;
use crate::profile::QualityProfile;
use crate::staging::{validate, StagingDir};
use crate::state::StateReporter;
use crate::tools::PdfTools;
use crate::upload::{ResourceKind, Uploader};
use lopdf::Document;
use tracing::{error, info};

pub struct CompressRequest {
    pub task_id: String,
    pub source_url: String,
    pub profile: String,
}

/// Drives one job to completion: staging, classification, conditional OCR,
/// compression, upload. All collaborators sit behind traits so the worker
/// runs standalone and the pipeline is testable without network or binaries.
pub struct Pipeline<T: PdfTools> {
    pub(crate) cfg: Config,
    pub(crate) tools: T,
    pub(crate) fetcher: Box<dyn Fetcher>,
    pub(crate) reporter: StateReporter,
    pub(crate) uploader: Box<dyn Uploader>,
}

impl<T: PdfTools> Pipeline<T> {
    pub fn new(
        cfg: &Config,
        tools: T,
        fetcher: Box<dyn Fetcher>,
        reporter: StateReporter,
        uploader: Box<dyn Uploader>,
    ) -> Self {
        Self {
            cfg: cfg.clone(),
            tools,
            fetcher,
            reporter,
            uploader,
        }
    }

    /// Returns the result URL on success. On any stage error the job state
    /// is set to failed with the error message, then the error propagates to
    /// the dispatcher; retry policy lives there, not here.
    pub fn run_compress(&self, req: &CompressRequest) -> Result<String> {
        self.guarded(&req.task_id, |p| p.compress_job(req))
    }

    fn compress_job(&self, req: &CompressRequest) -> Result<String> {
        let task_id = req.task_id.as_str();
        let profile = QualityProfile::from_name(&req.profile);
        info!(
            "compress task={} url={} profile={}",
            task_id, req.source_url, profile.name()
        );

        self.reporter.report(
            task_id,
            [("status", "processing".to_string()), ("progress", "5".to_string())],
        );

        // Download happens before any staging so a dead source never leaves
        // a directory behind.
        let pdf_bytes = fetch_source(self.fetcher.as_ref(), &req.source_url)?;
        let orig_size = pdf_bytes.len() as u64;
        self.reporter.progress(task_id, 20);

        let staging = StagingDir::create_in(&self.cfg.paths.work_dir)?;
        let src = staging.path("src.pdf");
        std::fs::write(&src, &pdf_bytes)?;
        validate(&src, "download")?;
        self.reporter.progress(task_id, 30);

        // Pre-process: re-save with compressed streams. Linearization is
        // deliberately not applied; it breaks ghostscript on some inputs.
        let mut doc = Document::load_mem(&pdf_bytes)?;
        let scanned = classify::is_scanned(
            &doc,
            self.cfg.classification.sample_pages,
            self.cfg.classification.scanned_page_fraction,
        );
        let pre = staging.path("pre.pdf");
        doc.compress();
        doc.save(&pre)?;
        validate(&pre, "preprocess")?;

        let mut compress_input = pre.clone();
        if scanned && self.tools.ocr_available() {
            self.reporter.progress(task_id, 45);
            let ocred = staging.path("ocr.pdf");
            self.tools.ocr(&pre, &ocred, profile)?;
            validate(&ocred, "ocr")?;
            compress_input = ocred;
        } else if scanned {
            info!("document looks scanned but no OCR binary is available; skipping");
        }

        self.reporter.progress(task_id, 70);
        let out = staging.path("out.pdf");
        self.tools.compress(&compress_input, &out, profile)?;
        let final_size = validate(&out, "compress")?;

        let saving = savings_percent(orig_size, final_size);
        self.reporter.progress(task_id, 85);

        let url = self.uploader.upload_file(
            &out,
            &self.cfg.upload.folder_compressed,
            ResourceKind::Binary,
        )?;

        self.reporter.report(
            task_id,
            [
                ("status", "completed".to_string()),
                ("progress", "100".to_string()),
                ("result_url", url.clone()),
                ("original_kb", format!("{:.1}", orig_size as f64 / 1024.0)),
                ("compressed_kb", format!("{:.1}", final_size as f64 / 1024.0)),
                ("saving", format!("{saving:.1}%")),
            ],
        );

        info!(
            "compress task={} done: {} -> {} bytes ({:.1}%)",
            task_id, orig_size, final_size, saving
        );
        Ok(url)
    }

    /// Records failure state before re-raising, so the job is observable as
    /// failed even when the dispatcher drops the error.
    pub(crate) fn guarded<R>(
        &self,
        task_id: &str,
        run: impl FnOnce(&Self) -> Result<R>,
    ) -> Result<R> {
        match run(self) {
            Ok(v) => Ok(v),
            Err(err) => {
                error!("task {} failed: {}", task_id, err);
                self.reporter.failed(task_id, &err.to_string());
                Err(err)
            }
        }
    }
}

/// `100 × (1 − compressed/original)`. Negative when the output grew; that is
/// reported as-is rather than clamped.
pub fn savings_percent(original: u64, compressed: u64) -> f64 {
    if original == 0 {
        return 0.0;
    }
    100.0 * (1.0 - compressed as f64 / original as f64)
}
