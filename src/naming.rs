//! Output naming: where each result lands and what it is called.
//!
//! Every output goes into a per-mode folder created next to its source, so
//! results stay attributable to the folder they came from and never overwrite
//! sibling inputs:
//!
//! ```text
//! shoots/shoe.png   →  shoots/Banner/SummerShoe_2DayBanner_286x410.jpg
//! shoots/photo.jpg  →  shoots/Resized/photo_286x410.jpg
//! shoots/ad.psd     →  shoots/Converted/ad.jpg
//! ```
//!
//! ## Base names
//!
//! The part before the suffix is picked in priority order:
//! 1. a per-file override (banner rename map)
//! 2. the job title, numbered `{title}_01`, `{title}_02`, … when the job has more than one file
//! 3. the source file stem
//!
//! User-typed names pass through [`sanitize_base_name`] first; a name that
//! sanitizes to nothing falls through to the next rule.

use std::path::{Path, PathBuf};

/// Characters that are illegal in file names on at least one common filesystem.
const ILLEGAL_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Folder for a source's outputs: `{source parent}/{folder}`.
pub fn output_dir_for(source: &Path, folder: &str) -> PathBuf {
    source
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(folder)
}

/// `{base}{separator}{suffix}.jpg`, or `{base}.jpg` when `suffix` is empty.
pub fn output_file_name(base: &str, separator: &str, suffix: &str) -> String {
    if suffix.is_empty() {
        format!("{base}.jpg")
    } else {
        format!("{base}{separator}{suffix}.jpg")
    }
}

/// Make a user-typed name safe to use as a file name.
///
/// Trims surrounding whitespace, replaces path separators, control
/// characters and the Windows-reserved set with `_`. Returns `None` when
/// nothing usable is left.
pub fn sanitize_base_name(name: &str) -> Option<String> {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if ILLEGAL_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    // Trailing dots are stripped by Windows and "." / ".." are not file names
    let cleaned = cleaned.trim_end_matches('.');
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Stem of the source file, lossily converted.
pub fn source_stem(source: &Path) -> String {
    source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Pick the base name for the file at `index` (0-based) of a `total`-file job.
///
/// See the [module docs](self) for the priority order.
pub fn base_name_for(
    source: &Path,
    index: usize,
    total: usize,
    title: Option<&str>,
    rename: Option<&str>,
    separator: &str,
) -> String {
    if let Some(name) = rename.and_then(sanitize_base_name) {
        return name;
    }
    if let Some(title) = title.and_then(sanitize_base_name) {
        return if total > 1 {
            format!("{title}{separator}{:02}", index + 1)
        } else {
            title
        };
    }
    source_stem(source)
}
