#![allow(dead_code)]

use lopdf::{dictionary, Document, Object, Stream};
use mediaforge_worker::config::Config;
use mediaforge_worker::download::Fetcher;
use mediaforge_worker::error::{Result, WorkerError};
use mediaforge_worker::pipeline::Pipeline;
use mediaforge_worker::profile::QualityProfile;
use mediaforge_worker::state::{MemoryStore, StateReporter};
use mediaforge_worker::tools::{PdfTools, ToolDiag};
use mediaforge_worker::upload::FsUploader;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Build an in-memory PDF whose pages have (has_image, has_font) resources.
pub fn pdf_with_pages(specs: &[(bool, bool)]) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids: Vec<Object> = Vec::new();
    for &(image, font) in specs {
        let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
        let mut resources = dictionary! {};
        if font {
            resources.set("Font", dictionary! { "F1" => font_id });
        }
        if image {
            let img_id = doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => 1,
                    "Height" => 1,
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8,
                },
                vec![0u8],
            ));
            resources.set("XObject", dictionary! { "Im0" => img_id });
        }
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => resources,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

pub fn pdf_bytes(specs: &[(bool, bool)]) -> Vec<u8> {
    let mut doc = pdf_with_pages(specs);
    let mut out = Vec::new();
    doc.save_to(&mut out).expect("serialize fixture pdf");
    out
}

/// Fetcher stub handing back fixed bytes regardless of URL.
pub struct StubFetcher {
    pub bytes: Vec<u8>,
}

impl Fetcher for StubFetcher {
    fn fetch(&self, _url: &str) -> Result<Vec<u8>> {
        Ok(self.bytes.clone())
    }
}

/// Stand-in for the external binaries: "ocr" and "compress" just copy the
/// input artifact. `fail_compress` simulates a non-zero tool exit.
pub struct MockTools {
    pub ocr_present: bool,
    pub fail_compress: bool,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl MockTools {
    pub fn new(ocr_present: bool) -> Self {
        Self {
            ocr_present,
            fail_compress: false,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl PdfTools for MockTools {
    fn diagnostics(&self) -> ToolDiag {
        ToolDiag {
            gs_exe: "mock-gs".into(),
            gs_version: Some("0.0".into()),
            ocr_exe: self.ocr_present.then(|| "mock-ocr".into()),
            ocr_version: None,
            ok: true,
        }
    }

    fn ocr_available(&self) -> bool {
        self.ocr_present
    }

    fn ocr(&self, input: &Path, output: &Path, _profile: QualityProfile) -> Result<()> {
        self.calls.lock().unwrap().push("ocr".into());
        std::fs::copy(input, output)?;
        Ok(())
    }

    fn compress(&self, input: &Path, output: &Path, _profile: QualityProfile) -> Result<()> {
        self.calls.lock().unwrap().push("compress".into());
        if self.fail_compress {
            return Err(WorkerError::Process {
                tool: "gs".into(),
                status: "exit status: 1".into(),
                stderr: "simulated ghostscript failure".into(),
            });
        }
        std::fs::copy(input, output)?;
        Ok(())
    }
}

pub struct TestRig {
    pub pipeline: Pipeline<MockTools>,
    pub store: Arc<MemoryStore>,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub work_dir: tempfile::TempDir,
    pub out_dir: tempfile::TempDir,
}

pub fn rig(source: Vec<u8>, tools: MockTools) -> TestRig {
    let calls = tools.calls.clone();
    let work_dir = tempfile::tempdir().expect("work dir");
    let out_dir = tempfile::tempdir().expect("out dir");

    let mut cfg = Config::default();
    cfg.paths.work_dir = work_dir.path().display().to_string();
    cfg.paths.out_dir = out_dir.path().display().to_string();

    let store = Arc::new(MemoryStore::new());
    let reporter = StateReporter::new(store.clone(), &cfg.state.channel_prefix);
    let uploader = FsUploader::new(&cfg.paths.out_dir);
    let pipeline = Pipeline::new(
        &cfg,
        tools,
        Box::new(StubFetcher { bytes: source }),
        reporter,
        Box::new(uploader),
    );

    TestRig {
        pipeline,
        store,
        calls,
        work_dir,
        out_dir,
    }
}

/// Progress values published for a task, in publish order.
pub fn published_progress(store: &MemoryStore, task_id: &str) -> Vec<u32> {
    let channel = format!("progress:{task_id}");
    store
        .published()
        .iter()
        .filter(|(c, _)| *c == channel)
        .filter_map(|(_, payload)| {
            let v: serde_json::Value = serde_json::from_str(payload).ok()?;
            v.get("progress")?.as_str()?.parse().ok()
        })
        .collect()
}

pub fn dir_is_empty(path: &Path) -> bool {
    std::fs::read_dir(path)
        .map(|mut d| d.next().is_none())
        .unwrap_or(true)
}
