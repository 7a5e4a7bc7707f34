use crate::download::fetch_source;
use crate::error::{Result, WorkerError};
use crate::pipeline::Pipeline;
use crate::tools::PdfTools;
use crate::upload::ResourceKind;
use lopdf::Document;
use tracing::info;

pub struct ExtractRequest {
    pub task_id: String,
    pub source_url: String,
    /// 1-based inclusive.
    pub start_page: u32,
    /// 1-based inclusive.
    pub end_page: u32,
}

impl<T: PdfTools> Pipeline<T> {
    /// Page-extraction task: copy a 1-based inclusive page range into a new
    /// PDF. A linear single-pass job with no staging chain.
    pub fn run_extract(&self, req: &ExtractRequest) -> Result<String> {
        self.guarded(&req.task_id, |p| p.extract_job(req))
    }

    fn extract_job(&self, req: &ExtractRequest) -> Result<String> {
        let task_id = req.task_id.as_str();
        info!(
            "extract task={} pages {}-{} url={}",
            task_id, req.start_page, req.end_page, req.source_url
        );

        self.reporter.report(
            task_id,
            [("status", "processing".to_string()), ("progress", "5".to_string())],
        );

        let pdf_bytes = fetch_source(self.fetcher.as_ref(), &req.source_url)?;
        self.reporter.progress(task_id, 15);

        let mut doc = Document::load_mem(&pdf_bytes)?;
        let page_count = doc.get_pages().len() as u32;
        validate_range(req.start_page, req.end_page, page_count)?;
        self.reporter.progress(task_id, 30);

        let discard: Vec<u32> = (1..=page_count)
            .filter(|n| *n < req.start_page || *n > req.end_page)
            .collect();
        doc.delete_pages(&discard);
        doc.prune_objects();
        doc.compress();
        self.reporter.progress(task_id, 60);

        let mut out = Vec::new();
        doc.save_to(&mut out)?;
        // The extracted document never touches disk, so an empty buffer is
        // an in-memory failure rather than a staging one.
        if out.is_empty() {
            return Err(WorkerError::EmptyOutput {
                step: "extract".to_string(),
            });
        }
        self.reporter.progress(task_id, 80);

        let url = self.uploader.upload_bytes(
            &out,
            &format!("{task_id}.pdf"),
            &self.cfg.upload.folder_extracted,
            ResourceKind::Binary,
        )?;

        self.reporter.report(
            task_id,
            [
                ("status", "completed".to_string()),
                ("progress", "100".to_string()),
                ("result_url", url.clone()),
            ],
        );
        Ok(url)
    }
}

fn validate_range(start: u32, end: u32, page_count: u32) -> Result<()> {
    if start < 1 || end > page_count || start > end {
        return Err(WorkerError::PageRange {
            start,
            end,
            page_count,
        });
    }
    Ok(())
}
