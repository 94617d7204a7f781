//! Input consolidation: stitch many inputs into the single logical file the
//! rest of the pipeline consumes.

use anyhow::{Context, Result};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use crate::config::ChopOptions;
use crate::dataset::ChopFile;
use crate::progress::{make_bytes_progress, total_size};
use crate::util::{create_file, open_file};

pub const COMBINED_NAME: &str = "combined";

/// Combine the expanded inputs into one logical dataset.
///
/// A single file is used in place (`is_original`, never deleted). Several
/// files are concatenated into `<output_dir>/combined`: the first file copied
/// whole, every later file with its header line skipped. No column alignment
/// or schema check happens across files; the first file's shape wins.
pub fn consolidate(files: &[PathBuf], opts: &ChopOptions) -> Result<ChopFile> {
    if files.len() == 1 {
        return Ok(ChopFile::original(&files[0]));
    }

    let pb = opts
        .progress
        .then(|| make_bytes_progress(total_size(files), "combining inputs"));

    let out_path = opts.output_dir.join(COMBINED_NAME);
    let mut out = BufWriter::with_capacity(opts.write_buffer_bytes, create_file(&out_path)?);

    let mut record = Vec::with_capacity(8 * 1024);
    for (i, path) in files.iter().enumerate() {
        let mut reader = BufReader::with_capacity(opts.read_buffer_bytes, open_file(path)?);
        let mut first_line = true;
        loop {
            record.clear();
            let n = reader
                .read_until(b'\n', &mut record)
                .with_context(|| format!("read {}", path.display()))?;
            if n == 0 {
                break;
            }
            if first_line {
                first_line = false;
                if i > 0 {
                    // Header of a later file: only the first file's survives.
                    continue;
                }
            }
            out.write_all(&record)?;
            // A source that ends without a newline must not fuse with the
            // first row of the next file.
            if !record.ends_with(b"\n") {
                out.write_all(b"\n")?;
            }
        }
        if let Some(pb) = &pb {
            pb.inc(std::fs::metadata(path).map(|m| m.len()).unwrap_or(0));
        }
    }
    out.flush()?;
    if let Some(pb) = pb {
        pb.finish_with_message("done");
    }

    tracing::info!("combined {} input files into {}", files.len(), out_path.display());
    Ok(ChopFile::synthesized(out_path))
}
