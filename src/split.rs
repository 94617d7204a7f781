//! Row-count splitters: fixed-threshold chunking and K-way round-robin
//! distribution. Mutually exclusive per run; both stream one record at a time.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use crate::config::ChopOptions;
use crate::dataset::ChopFile;
use crate::util::{create_file, open_file};

fn numbered_path(opts: &ChopOptions, stem: &str, n: usize) -> PathBuf {
    opts.output_dir.join(format!("{stem}_{n}"))
}

/// Split into files of at most `threshold` data rows each, in row order.
/// Outputs are `{stem}_{n}` for n = 1..ceil(rows / threshold); only the last
/// may hold fewer than `threshold` rows.
pub fn split_by_rows(file: &ChopFile, threshold: u64, opts: &ChopOptions) -> Result<Vec<ChopFile>> {
    let header = file.read_header()?;
    let stem = file.stem();
    let threshold = threshold.max(1);

    let mut reader = BufReader::with_capacity(opts.read_buffer_bytes, open_file(&file.path)?);
    let mut skip = Vec::with_capacity(header.len());
    reader.read_until(b'\n', &mut skip)?;

    let mut outputs: Vec<ChopFile> = Vec::new();
    let mut current: Option<BufWriter<File>> = None;
    let mut rows_in_current: u64 = 0;

    let mut record = Vec::with_capacity(8 * 1024);
    loop {
        record.clear();
        let n = reader
            .read_until(b'\n', &mut record)
            .with_context(|| format!("read rows of {}", file.path.display()))?;
        if n == 0 {
            break;
        }

        if rows_in_current == threshold {
            if let Some(mut done) = current.take() {
                done.flush()?;
            }
            rows_in_current = 0;
        }
        if current.is_none() {
            let path = numbered_path(opts, &stem, outputs.len() + 1);
            let mut w = BufWriter::with_capacity(opts.write_buffer_bytes, create_file(&path)?);
            w.write_all(&header)?;
            outputs.push(ChopFile::synthesized(path));
            current = Some(w);
        }
        if let Some(w) = current.as_mut() {
            w.write_all(&record)?;
            if !record.ends_with(b"\n") {
                w.write_all(b"\n")?;
            }
        }
        rows_in_current += 1;
    }
    if let Some(mut w) = current {
        w.flush()?;
    }
    file.retire()?;
    Ok(outputs)
}

/// Split into exactly `parts` files by round-robin: data row i (0-indexed)
/// goes to output `i mod parts`, so sizes differ by at most one row and
/// assignment ignores row content entirely. When `parts` exceeds the row
/// count, the excess outputs hold only the header.
pub fn split_by_equal(file: &ChopFile, parts: u64, opts: &ChopOptions) -> Result<Vec<ChopFile>> {
    let header = file.read_header()?;
    let stem = file.stem();
    let parts = parts.max(1) as usize;

    let mut writers = Vec::with_capacity(parts);
    let mut outputs = Vec::with_capacity(parts);
    for n in 1..=parts {
        let path = numbered_path(opts, &stem, n);
        let mut w = BufWriter::with_capacity(opts.write_buffer_bytes, create_file(&path)?);
        w.write_all(&header)?;
        writers.push(w);
        outputs.push(ChopFile::synthesized(path));
    }

    let mut reader = BufReader::with_capacity(opts.read_buffer_bytes, open_file(&file.path)?);
    let mut skip = Vec::with_capacity(header.len());
    reader.read_until(b'\n', &mut skip)?;

    let mut record = Vec::with_capacity(8 * 1024);
    let mut row: usize = 0;
    loop {
        record.clear();
        let n = reader
            .read_until(b'\n', &mut record)
            .with_context(|| format!("read rows of {}", file.path.display()))?;
        if n == 0 {
            break;
        }
        let w = &mut writers[row % parts];
        w.write_all(&record)?;
        if !record.ends_with(b"\n") {
            w.write_all(b"\n")?;
        }
        row += 1;
    }
    for w in &mut writers {
        w.flush()?;
    }
    drop(writers);
    file.retire()?;
    Ok(outputs)
}
