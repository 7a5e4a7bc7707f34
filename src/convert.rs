use crate::download::fetch_source;
use crate::error::{Result, WorkerError};
use crate::pipeline::Pipeline;
use crate::tools::PdfTools;
use crate::upload::ResourceKind;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use tracing::info;

pub struct ConvertRequest {
    pub task_id: String,
    pub source_url: String,
    pub target_format: String,
}

/// Case-insensitive target-format lookup. PDF targets are not supported by
/// this encoder stack and report `UnsupportedFormat`.
pub fn target_format(name: &str) -> Result<ImageFormat> {
    let fmt = match name.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => ImageFormat::Jpeg,
        "png" => ImageFormat::Png,
        "webp" => ImageFormat::WebP,
        "bmp" => ImageFormat::Bmp,
        "tiff" | "tif" => ImageFormat::Tiff,
        "gif" => ImageFormat::Gif,
        "ico" => ImageFormat::Ico,
        other => return Err(WorkerError::UnsupportedFormat(other.to_string())),
    };
    Ok(fmt)
}

impl<T: PdfTools> Pipeline<T> {
    /// Image format-conversion task: decode, adjust color mode for the
    /// target, re-encode, upload.
    pub fn run_convert(&self, req: &ConvertRequest) -> Result<String> {
        self.guarded(&req.task_id, |p| p.convert_job(req))
    }

    fn convert_job(&self, req: &ConvertRequest) -> Result<String> {
        let task_id = req.task_id.as_str();
        info!(
            "convert task={} target={} url={}",
            task_id, req.target_format, req.source_url
        );

        self.reporter.report(
            task_id,
            [("status", "processing".to_string()), ("progress", "10".to_string())],
        );

        let format = target_format(&req.target_format)?;
        let bytes = fetch_source(self.fetcher.as_ref(), &req.source_url)?;
        self.reporter.progress(task_id, 30);

        let image = image::load_from_memory(&bytes)?;
        let image = normalize_for(format, image);
        self.reporter.progress(task_id, 60);

        let mut buf = Vec::new();
        match format {
            ImageFormat::Jpeg => {
                let encoder = JpegEncoder::new_with_quality(&mut buf, 95);
                image.write_with_encoder(encoder)?;
            }
            _ => {
                image.write_to(&mut Cursor::new(&mut buf), format)?;
            }
        }
        self.reporter.progress(task_id, 80);

        let ext = format.extensions_str().first().copied().unwrap_or("bin");
        let url = self.uploader.upload_bytes(
            &buf,
            &format!("{task_id}.{ext}"),
            &self.cfg.upload.folder_converted,
            ResourceKind::Image,
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

/// Targets without alpha get flattened; PNG keeps alpha.
fn normalize_for(format: ImageFormat, image: DynamicImage) -> DynamicImage {
    match format {
        ImageFormat::Jpeg | ImageFormat::Bmp => DynamicImage::ImageRgb8(image.to_rgb8()),
        ImageFormat::Png => DynamicImage::ImageRgba8(image.to_rgba8()),
        _ => image,
    }
}
