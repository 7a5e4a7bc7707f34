use crate::{
    classify,
    config::Config,
    convert::ConvertRequest,
    download::HttpFetcher,
    extract::ExtractRequest,
    pipeline::{CompressRequest, Pipeline},
    state::{MemoryStore, StateReporter},
    tools::{PdfTools, ShellTools},
    upload::FsUploader,
    util::{ensure_dir, now_rfc3339, sha256_hex},
};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "mediaforge-worker")]
#[command(about = "Document-transformation worker (PDF compression + OCR, extraction, conversion)")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./mediaforge-worker.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve the external binaries and print their versions.
    Doctor {},
    /// Run the scanned-vs-text heuristic against a local PDF.
    Classify {
        #[arg(long)]
        input: PathBuf,
    },
    /// Compress a PDF fetched from a URL.
    Compress {
        #[arg(long)]
        url: String,
        #[arg(long, default_value = "medium")]
        profile: String,
        #[arg(long)]
        task_id: Option<String>,
    },
    /// Extract a 1-based inclusive page range from a PDF.
    Extract {
        #[arg(long)]
        url: String,
        #[arg(long)]
        start_page: u32,
        #[arg(long)]
        end_page: u32,
        #[arg(long)]
        task_id: Option<String>,
    },
    /// Convert an image to another format.
    Convert {
        #[arg(long)]
        url: String,
        #[arg(long)]
        format: String,
        #[arg(long)]
        task_id: Option<String>,
    },
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg_path = resolve_config_path(args.config.as_deref());
    let cfg = match cfg_path {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };
    let _guard = init_logging(&args, &cfg)?;

    match &args.cmd {
        Command::Doctor {} => doctor(&cfg),
        Command::Classify { input } => classify_local(&cfg, input),
        Command::Compress {
            url,
            profile,
            task_id,
        } => {
            let (pipeline, store) = build_pipeline(&cfg)?;
            let req = CompressRequest {
                task_id: task_id.clone().unwrap_or_else(|| fresh_task_id(url)),
                source_url: url.clone(),
                profile: profile.clone(),
            };
            let run = pipeline.run_compress(&req);
            summarize(&store, &req.task_id, run.is_ok());
            run.map(|_| ()).map_err(Into::into)
        }
        Command::Extract {
            url,
            start_page,
            end_page,
            task_id,
        } => {
            let (pipeline, store) = build_pipeline(&cfg)?;
            let req = ExtractRequest {
                task_id: task_id.clone().unwrap_or_else(|| fresh_task_id(url)),
                source_url: url.clone(),
                start_page: *start_page,
                end_page: *end_page,
            };
            let run = pipeline.run_extract(&req);
            summarize(&store, &req.task_id, run.is_ok());
            run.map(|_| ()).map_err(Into::into)
        }
        Command::Convert {
            url,
            format,
            task_id,
        } => {
            let (pipeline, store) = build_pipeline(&cfg)?;
            let req = ConvertRequest {
                task_id: task_id.clone().unwrap_or_else(|| fresh_task_id(url)),
                source_url: url.clone(),
                target_format: format.clone(),
            };
            let run = pipeline.run_convert(&req);
            summarize(&store, &req.task_id, run.is_ok());
            run.map(|_| ()).map_err(Into::into)
        }
    }
}

/// One constructed context per invocation: resolved binaries, HTTP client,
/// state store, uploader. Nothing here is ambient global state.
fn build_pipeline(cfg: &Config) -> Result<(Pipeline<ShellTools>, Arc<MemoryStore>)> {
    let tools = ShellTools::new(cfg)?;
    let fetcher = HttpFetcher::new(cfg)?;
    let store = Arc::new(MemoryStore::new());
    let reporter = StateReporter::new(store.clone(), &cfg.state.channel_prefix);
    let uploader = FsUploader::new(&cfg.paths.out_dir);
    ensure_dir(Path::new(&cfg.paths.out_dir))?;

    let pipeline = Pipeline::new(cfg, tools, Box::new(fetcher), reporter, Box::new(uploader));
    Ok((pipeline, store))
}

fn fresh_task_id(url: &str) -> String {
    sha256_hex(format!("{url}:{}", now_rfc3339()).as_bytes())[..12].to_string()
}

fn summarize(store: &MemoryStore, task_id: &str, ok: bool) {
    let record = store.record(task_id).unwrap_or_default();
    let summary = serde_json::json!({
        "task_id": task_id,
        "ok": ok,
        "state": record,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).unwrap_or_default()
    );
}

fn doctor(cfg: &Config) -> Result<()> {
    let tools = ShellTools::new(cfg)?;
    let diag = tools.diagnostics();
    println!("{}", serde_json::to_string_pretty(&diag)?);
    Ok(())
}

fn classify_local(cfg: &Config, input: &Path) -> Result<()> {
    let doc = lopdf::Document::load(input)
        .with_context(|| format!("loading {}", input.display()))?;
    let scanned = classify::is_scanned(
        &doc,
        cfg.classification.sample_pages,
        cfg.classification.scanned_page_fraction,
    );
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "input": input,
            "page_count": doc.get_pages().len(),
            "scanned": scanned,
        }))?
    );
    Ok(())
}

fn resolve_config_path(user: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = user {
        return Some(p.to_path_buf());
    }
    let default = PathBuf::from("mediaforge-worker.toml");
    if default.exists() { Some(default) } else { None }
}

fn init_logging(args: &Args, cfg: &Config) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stdout_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed()
    };

    let (file_layer, guard) = if cfg.logging.write_to_file {
        let path = if cfg.logging.file_path.is_empty() {
            PathBuf::from(&cfg.paths.out_dir).join("mediaforge-worker.log")
        } else {
            PathBuf::from(&cfg.logging.file_path)
        };
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::File::create(&path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}
