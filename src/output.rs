//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Batch progress
//!
//! ```text
//! banner: 3 files
//! [1/3] shoe.png → Banner/SummerShoe_2DayBanner_286x410.jpg
//! [2/3] broken.jpg FAILED (load): Decode failed: ...
//! [3/3] boot.png → Banner/boot_2DayBanner_286x410.jpg
//! Done: 2 of 3 files written, 1 failed
//! ```
//!
//! ## File info
//!
//! ```text
//! Filename:   shoe.png
//! Dimensions: 640 x 480 px
//! Format:     PNG | Mode: RGBA
//! Size:       0.42 MB
//! DPI:        300x300
//! ```
//!
//! # Architecture
//!
//! Each display has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::batch::{BatchEvent, BatchSummary, FileRecord, Outcome};
use crate::imaging::{FileInfo, TargetSize};
use std::path::Path;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Output path shown relative to the source's folder, e.g. `Resized/a_286x410.jpg`.
fn relative_output(source: &Path, output: &Path) -> String {
    let parent = source.parent().unwrap_or_else(|| Path::new(""));
    output
        .strip_prefix(parent)
        .unwrap_or(output)
        .display()
        .to_string()
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Batch progress
// ============================================================================

/// Format one per-file record as a progress line.
pub fn format_record(index: usize, total: usize, record: &FileRecord) -> String {
    let name = file_name(&record.source);
    match &record.outcome {
        Outcome::Written { path } => format!(
            "[{index}/{total}] {name} \u{2192} {}",
            relative_output(&record.source, path)
        ),
        Outcome::Failed { stage, message } => {
            format!("[{index}/{total}] {name} FAILED ({}): {message}", stage.label())
        }
    }
}

/// Format a batch progress event as display lines.
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Started { mode, total } => vec![format!("{mode}: {}", plural(*total, "file"))],
        BatchEvent::FileFinished {
            index,
            total,
            record,
        } => vec![format_record(*index, *total, record)],
        BatchEvent::Finished { summary } => format_summary(summary),
    }
}

/// Format the closing summary of a job.
pub fn format_summary(summary: &BatchSummary) -> Vec<String> {
    let mut lines = Vec::new();
    if summary.cancelled {
        lines.push(format!(
            "Cancelled after {} of {}",
            summary.records.len(),
            plural(summary.total, "file")
        ));
    }
    lines.push(format!(
        "Done: {} of {} written, {} failed",
        summary.succeeded,
        plural(summary.total, "file"),
        summary.failed
    ));
    lines
}

pub fn print_batch_event(event: &BatchEvent) {
    for line in format_batch_event(event) {
        println!("{}", line);
    }
}

// ============================================================================
// File info
// ============================================================================

/// Format a file-information block.
pub fn format_file_info(info: &FileInfo) -> Vec<String> {
    let dpi = info
        .dpi
        .map(|d| d.to_string())
        .unwrap_or_else(|| "not set".to_string());
    vec![
        format!("Filename:   {}", info.file_name),
        format!("Dimensions: {} x {} px", info.width, info.height),
        format!("Format:     {} | Mode: {}", info.format, info.color_mode),
        format!("Size:       {:.2} MB", info.size_bytes as f64 / BYTES_PER_MB),
        format!("DPI:        {dpi}"),
    ]
}

pub fn print_file_info(info: &FileInfo) {
    for line in format_file_info(info) {
        println!("{}", line);
    }
}

// ============================================================================
// Resize presets
// ============================================================================

/// Format the configured resize presets, marking the default.
pub fn format_presets(presets: &[TargetSize], default: TargetSize) -> Vec<String> {
    let mut lines = vec!["Resize presets".to_string()];
    for preset in presets {
        if *preset == default {
            lines.push(format!("    {preset} (default)"));
        } else {
            lines.push(format!("    {preset}"));
        }
    }
    if !presets.contains(&default) {
        lines.push(format!("    default: {default}"));
    }
    lines
}

pub fn print_presets(presets: &[TargetSize], default: TargetSize) {
    for line in format_presets(presets, default) {
        println!("{}", line);
    }
}
