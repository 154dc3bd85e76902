//! # Media Workflow
//!
//! Batch image transforms for catalogue and ad production. A job takes a list
//! of source files and one mode, and writes a print-ready JPEG for each source
//! into a folder created next to it:
//!
//! ```text
//! convert   ad.psd      →  Converted/ad.jpg                         (native size)
//! resize    photo.jpg   →  Resized/photo_286x410.jpg                 (exact stretch)
//! banner    shoe.png    →  Banner/shoe_2DayBanner_286x410.jpg        (art + overlay)
//! ```
//!
//! Every output is a baseline JPEG at quality 100 with 4:4:4 chroma, tagged
//! with the source's DPI or 72x72 when the source carries none.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`batch`] | Runs a job file by file, on a worker thread, emitting progress events |
//! | [`imaging`] | Pure-Rust decode, flatten, resample, sharpen, composite, and encode |
//! | [`config`] | `media-workflow.toml` loading, stock defaults, merging, validation |
//! | [`types`] | Job modes and banner options shared by the CLI and the batch runner |
//! | [`naming`] | Output folder, base name, and file name rules |
//! | [`inputs`] | Expands command-line paths into the ordered source list |
//! | [`output`] | CLI output formatting for progress, file info, and presets |
//!
//! # Design Decisions
//!
//! ## Per-File Isolation
//!
//! A job only fails as a whole before it starts: no inputs, or a banner
//! overlay that is missing or unreadable. Once files are being processed,
//! each failure is recorded against its source with the stage it happened in
//! (load, transform, or write) and the job moves on. The summary accounts for
//! every source, so `succeeded + failed == total` unless the job was
//! cancelled.
//!
//! ## One Worker Thread
//!
//! [`batch::spawn_batch`] runs the job on a single worker so the caller's
//! thread stays free to render progress. Files are processed strictly in
//! order; cancellation takes effect between files and never leaves a partial
//! output behind.
//!
//! ## Deterministic Output
//!
//! The same source, mode, and overlay always produce byte-identical files.
//! Outputs overwrite earlier runs instead of picking a fresh name, so a batch
//! can be rerun after fixing the files that failed.
//! Within one job, the first source to write a path keeps it; a later source
//! mapping to the same path fails instead of replacing it.
//!
//! ## Backend Seam
//!
//! All file I/O for images goes through [`imaging::ImageBackend`]. The batch
//! runner is tested against a recording mock; the production
//! [`imaging::RustBackend`] is tested against real encoded files.

pub mod batch;
pub mod config;
pub mod imaging;
pub mod inputs;
pub mod naming;
pub mod output;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
