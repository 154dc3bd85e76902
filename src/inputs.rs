//! Input collection for command-line jobs.
//!
//! Explicit file arguments are kept as given, in order. Unsupported or
//! missing files are not filtered here: they fail per-file in the batch, so
//! the summary accounts for every path the user named.
//!
//! Directory arguments expand to their immediate files (no recursion, since
//! output folders live beside the inputs) that carry a supported extension,
//! sorted by file name. Convert jobs only pick up `.psd` files from
//! directories; the other modes take every decodable raster plus `.psd`.

use crate::imaging::supported_input_extensions;
use crate::types::JobMode;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("cannot read directory: {0}")]
    Walk(#[from] walkdir::Error),
}

fn has_extension_in(path: &Path, allowed: &[&str]) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .is_some_and(|ext| allowed.contains(&ext.as_str()))
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|n| n.to_string_lossy().starts_with('.'))
}

/// Extensions a directory argument is expanded with for `mode`.
pub fn extensions_for(mode: &JobMode) -> &'static [&'static str] {
    match mode {
        JobMode::Convert => &["psd"],
        _ => supported_input_extensions(),
    }
}

/// Expand command-line paths into the ordered source list for a job.
pub fn collect_inputs(args: &[PathBuf], mode: &JobMode) -> Result<Vec<PathBuf>, InputError> {
    collect_with_extensions(args, extensions_for(mode))
}

/// Expand command-line paths, taking `allowed` extensions from directories.
pub fn collect_with_extensions(
    args: &[PathBuf],
    allowed: &[&str],
) -> Result<Vec<PathBuf>, InputError> {
    let mut sources = Vec::new();

    for arg in args {
        if !arg.is_dir() {
            sources.push(arg.clone());
            continue;
        }
        for entry in WalkDir::new(arg)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry?;
            let path = entry.path();
            let wanted = !is_hidden(path) && has_extension_in(path, allowed);
            if entry.file_type().is_file() && wanted {
                sources.push(path.to_path_buf());
            }
        }
    }

    Ok(sources)
}

/// Key `FILE=NAME` rename pairs by the collected source they refer to.
///
/// `FILE` matches a source by full path as given, or by bare file name so
/// renames work for files found by expanding a directory. Pairs matching no
/// source are returned separately so the caller can report them.
pub fn match_renames(
    sources: &[PathBuf],
    pairs: &[(PathBuf, String)],
) -> (BTreeMap<PathBuf, String>, Vec<PathBuf>) {
    let mut renames = BTreeMap::new();
    let mut unmatched = Vec::new();
    for (file, name) in pairs {
        let mut hit = false;
        for source in sources {
            let same_name =
                file.components().count() == 1 && source.file_name() == Some(file.as_os_str());
            if source == file || same_name {
                renames.insert(source.clone(), name.clone());
                hit = true;
            }
        }
        if !hit {
            unmatched.push(file.clone());
        }
    }
    (renames, unmatched)
}
