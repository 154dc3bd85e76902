//! Batch runner: one job, many files, one worker thread.
//!
//! A job applies a single [`JobMode`] to an ordered list of sources. Job-level
//! problems (no inputs, missing or unreadable overlay template) are reported
//! before any file is touched. After that, each file moves through
//!
//! ```text
//! Pending → Loaded → Transformed → Written
//!              ↘          ↘           ↘
//!                        Failed
//! ```
//!
//! and a failure at any stage is logged, recorded with that stage, and the
//! loop moves on. No retries, no rollback of files already written.
//! A source whose output path was already written earlier in the same job
//! fails at the write stage rather than overwriting it.
//!
//! ## Output Structure
//!
//! ```text
//! shoots/
//! ├── shoe.png
//! ├── ad.psd
//! ├── Banner/
//! │   └── SummerShoe_2DayBanner_286x410.jpg
//! └── Converted/
//!     └── ad.jpg
//! ```
//!
//! ## Progress
//!
//! Callers receive [`BatchEvent`]s over an mpsc channel: one `Started`, one
//! `FileFinished` per processed file (in input order), one `Finished`.
//! [`spawn_batch`] runs the loop off the calling thread and hands back a
//! [`BatchHandle`] for events, cancellation, and the final summary.
//! Cancellation is only observed between files.

use crate::config::ToolConfig;
use crate::imaging::operations::{
    compose_banner, prepare_for_jpeg, prepare_overlay, resize_exact, write_output,
};
use crate::imaging::{BackendError, ImageBackend, RustBackend, TargetSize};
use crate::naming::{base_name_for, output_dir_for, output_file_name};
use crate::types::{BatchJob, JobMode};
use image::{DynamicImage, RgbImage, RgbaImage};
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;
use thiserror::Error;

/// Job-level failures. Nothing has been written when one of these is returned.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("no input files")]
    NoInputs,
    #[error("overlay template not found: {}", path.display())]
    MissingTemplate { path: PathBuf },
    #[error("overlay template {} is unreadable: {source}", path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
    #[error("batch worker panicked")]
    WorkerPanicked,
}

/// Where in the per-file pipeline a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Load,
    Transform,
    Write,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Load => "load",
            Stage::Transform => "transform",
            Stage::Write => "write",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Written { path: PathBuf },
    Failed { stage: Stage, message: String },
}

/// What happened to one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    pub source: PathBuf,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl FileRecord {
    pub fn is_written(&self) -> bool {
        matches!(self.outcome, Outcome::Written { .. })
    }
}

/// Result of a whole job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub mode: String,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Stopped early; sources after the last record were never started.
    pub cancelled: bool,
    pub records: Vec<FileRecord>,
}

/// Progress events emitted while a job runs.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    Started {
        mode: &'static str,
        total: usize,
    },
    FileFinished {
        /// 1-based position in the job.
        index: usize,
        total: usize,
        record: FileRecord,
    },
    Finished {
        summary: BatchSummary,
    },
}

/// The job mode with its job-level resources resolved.
enum Pipeline {
    Convert,
    Resize(TargetSize),
    Banner { overlay: RgbaImage },
}

/// Run a job on the current thread with the production backend.
pub fn run_batch(
    job: &BatchJob,
    config: &ToolConfig,
    events: Option<Sender<BatchEvent>>,
) -> Result<BatchSummary, BatchError> {
    let running = AtomicBool::new(true);
    run_batch_with_backend(&RustBackend::new(), job, config, events.as_ref(), &running)
}

/// Run a job with a specific backend (allows testing with mock).
///
/// `running` is checked before each file; clearing it stops the job after
/// the file in progress.
pub fn run_batch_with_backend(
    backend: &impl ImageBackend,
    job: &BatchJob,
    config: &ToolConfig,
    events: Option<&Sender<BatchEvent>>,
    running: &AtomicBool,
) -> Result<BatchSummary, BatchError> {
    if job.sources.is_empty() {
        return Err(BatchError::NoInputs);
    }
    let pipeline = prepare_pipeline(backend, &job.mode, config)?;

    let total = job.sources.len();
    let mode = job.mode.label();
    let folder = config.folders.for_mode(&job.mode);
    let separator = config.naming.separator.as_str();
    let suffix = job.mode.suffix();
    let (title, renames) = match &job.mode {
        JobMode::Banner(options) => (options.title.as_deref(), Some(&options.renames)),
        _ => (None, None),
    };

    info!("{mode}: starting {total} file(s)");
    emit(events, || BatchEvent::Started { mode, total });

    let mut records = Vec::with_capacity(total);
    let mut cancelled = false;
    // Output path -> the source that wrote it
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();

    for (i, source) in job.sources.iter().enumerate() {
        if !running.load(Ordering::SeqCst) {
            info!("{mode}: cancelled after {i} of {total} file(s)");
            cancelled = true;
            break;
        }

        let rename = renames.and_then(|r| r.get(source)).map(String::as_str);
        let base = base_name_for(source, i, total, title, rename, separator);
        let dest_dir = output_dir_for(source, folder);

        let target = dest_dir.join(output_file_name(&base, separator, &suffix));

        let written = match claimed.get(&target) {
            Some(earlier) => Err((
                Stage::Write,
                format!("output collides with {}", earlier.display()),
            )),
            None => process_file(
                backend, &pipeline, source, &dest_dir, &base, &suffix, separator,
            ),
        };
        let outcome = match written {
            Ok(path) => {
                debug!("{} -> {}", source.display(), path.display());
                claimed.insert(path.clone(), source);
                Outcome::Written { path }
            }
            Err((stage, message)) => {
                warn!("{} failed at {}: {message}", source.display(), stage.label());
                Outcome::Failed { stage, message }
            }
        };

        let record = FileRecord {
            source: source.clone(),
            outcome,
        };
        emit(events, || BatchEvent::FileFinished {
            index: i + 1,
            total,
            record: record.clone(),
        });
        records.push(record);
    }

    let succeeded = records.iter().filter(|r| r.is_written()).count();
    let summary = BatchSummary {
        mode: mode.to_string(),
        total,
        succeeded,
        failed: records.len() - succeeded,
        cancelled,
        records,
    };
    info!(
        "{mode}: {} written, {} failed",
        summary.succeeded, summary.failed
    );
    emit(events, || BatchEvent::Finished {
        summary: summary.clone(),
    });
    Ok(summary)
}

fn emit(events: Option<&Sender<BatchEvent>>, event: impl FnOnce() -> BatchEvent) {
    if let Some(tx) = events {
        // A dropped receiver only means nobody is watching
        tx.send(event()).ok();
    }
}

/// Resolve job-level resources: for banners, locate and pre-size the overlay once.
fn prepare_pipeline(
    backend: &impl ImageBackend,
    mode: &JobMode,
    config: &ToolConfig,
) -> Result<Pipeline, BatchError> {
    match mode {
        JobMode::Convert => Ok(Pipeline::Convert),
        JobMode::Resize(size) => Ok(Pipeline::Resize(*size)),
        JobMode::Banner(options) => {
            let path = config.banner.template_path(options.kind);
            if !path.is_file() {
                return Err(BatchError::MissingTemplate { path });
            }
            let loaded = backend.load(&path).map_err(|source| BatchError::Template {
                path: path.clone(),
                source,
            })?;
            debug!("overlay template {}", path.display());
            Ok(Pipeline::Banner {
                overlay: prepare_overlay(&loaded.image),
            })
        }
    }
}

/// Load → transform → write one file. Errors carry the failing stage.
fn process_file(
    backend: &impl ImageBackend,
    pipeline: &Pipeline,
    source: &Path,
    dest_dir: &Path,
    base: &str,
    suffix: &str,
    separator: &str,
) -> Result<PathBuf, (Stage, String)> {
    let loaded = backend
        .load(source)
        .map_err(|e| (Stage::Load, e.to_string()))?;

    let image = transform(pipeline, loaded.image).map_err(|m| (Stage::Transform, m))?;

    write_output(backend, &image, dest_dir, base, suffix, separator, loaded.dpi)
        .map_err(|e| (Stage::Write, e.to_string()))
}

fn transform(pipeline: &Pipeline, image: DynamicImage) -> Result<RgbImage, String> {
    if image.width() == 0 || image.height() == 0 {
        return Err(format!(
            "image has no pixels ({}x{})",
            image.width(),
            image.height()
        ));
    }
    Ok(match pipeline {
        Pipeline::Convert => prepare_for_jpeg(image),
        Pipeline::Resize(size) => prepare_for_jpeg(resize_exact(&image, *size)),
        Pipeline::Banner { overlay } => compose_banner(&image, overlay),
    })
}

// ============================================================================
// Worker thread
// ============================================================================

/// A job running on its own worker thread.
pub struct BatchHandle {
    events: Receiver<BatchEvent>,
    running: Arc<AtomicBool>,
    worker: JoinHandle<Result<BatchSummary, BatchError>>,
}

impl BatchHandle {
    /// Progress events. Iteration ends when the worker finishes.
    pub fn events(&self) -> &Receiver<BatchEvent> {
        &self.events
    }

    /// Ask the worker to stop before its next file.
    pub fn cancel(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Wait for the worker and return its summary.
    pub fn join(self) -> Result<BatchSummary, BatchError> {
        self.worker
            .join()
            .map_err(|_| BatchError::WorkerPanicked)?
    }
}

/// Run `job` on exactly one worker thread.
pub fn spawn_batch<B>(backend: B, job: BatchJob, config: ToolConfig) -> BatchHandle
where
    B: ImageBackend + 'static,
{
    let (tx, rx) = mpsc::channel();
    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    let worker = std::thread::spawn(move || {
        run_batch_with_backend(&backend, &job, &config, Some(&tx), &flag)
    });
    BatchHandle {
        events: rx,
        running,
        worker,
    }
}
