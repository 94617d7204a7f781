use anyhow::{anyhow, Context, Result};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::util::{open_file, remove_file};

/// One physical file moving through the pipeline.
///
/// `is_original` is true only for files the user supplied; those are never
/// deleted. Files synthesized by a stage belong to the pipeline and are
/// removed once the next stage has consumed them.
#[derive(Clone, Debug)]
pub struct ChopFile {
    pub path: PathBuf,
    pub is_original: bool,
}

impl ChopFile {
    pub fn original(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), is_original: true }
    }

    pub fn synthesized(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), is_original: false }
    }

    /// File name without extension, used to derive output names.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "chop".to_string())
    }

    /// First record of the file, terminator included. Every output derived
    /// from this file starts with exactly these bytes.
    pub fn read_header(&self) -> Result<Vec<u8>> {
        read_header_line(&self.path)
    }

    /// Delete the file if the pipeline owns it; user-supplied files stay.
    pub fn retire(&self) -> Result<()> {
        if self.is_original {
            return Ok(());
        }
        remove_file(&self.path)
    }
}

/// Read the header record (first line) of a file, terminator included.
pub fn read_header_line(path: &Path) -> Result<Vec<u8>> {
    let mut reader = BufReader::new(open_file(path)?);
    let mut header = Vec::with_capacity(256);
    let n = reader
        .read_until(b'\n', &mut header)
        .with_context(|| format!("read header of {}", path.display()))?;
    if n == 0 {
        return Err(anyhow!("{}: empty file, expected a header row", path.display()));
    }
    Ok(header)
}
