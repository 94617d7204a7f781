//! Input discovery: expand files and directories into the flat, ordered file
//! list the consolidator works from.

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Expand input paths to a flat, sorted file list.
///
/// Directories are searched recursively; `extension` (no leading dot) filters
/// directory matches only; explicitly named files are always taken. Any
/// missing path is a configuration error, as is a directory yielding no
/// matches (the output extension could not be inferred from nothing).
pub fn expand_inputs(inputs: &[PathBuf], extension: Option<&str>) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if !input.exists() {
            return Err(anyhow!("input path does not exist: {}", input.display()));
        }
        if input.is_dir() {
            let mut matched = Vec::new();
            for entry in WalkDir::new(input).min_depth(1) {
                let entry = entry?;
                if !entry.file_type().is_file() {
                    continue;
                }
                if matches_extension(entry.path(), extension) {
                    matched.push(entry.into_path());
                }
            }
            if matched.is_empty() {
                return Err(anyhow!(
                    "no files with extension '{}' under {}",
                    extension.unwrap_or("*"),
                    input.display()
                ));
            }
            files.extend(matched);
        } else {
            files.push(input.clone());
        }
    }
    if files.is_empty() {
        return Err(anyhow!("no input files to process"));
    }
    // Lexicographic order keeps consolidation deterministic across platforms.
    files.sort();
    Ok(files)
}

fn matches_extension(path: &Path, extension: Option<&str>) -> bool {
    match extension {
        None => true,
        Some(want) => path
            .extension()
            .map(|e| e.to_string_lossy() == want)
            .unwrap_or(false),
    }
}

/// Output extension for the run, taken from the first file (leading dot
/// included, empty when the first file has none). Mixed input extensions are
/// deliberately "first file wins".
pub fn resolve_extension(files: &[PathBuf]) -> String {
    files
        .first()
        .and_then(|p| p.extension())
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default()
}
