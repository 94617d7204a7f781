//! External shuffler: N independent header-preserving random permutations of
//! a file's data rows.

use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use std::fs;
use std::io::{BufRead, BufReader, BufWriter, Seek, SeekFrom, Write};
use std::path::PathBuf;

use crate::config::{ChopOptions, ShuffleMode};
use crate::dataset::ChopFile;
use crate::mem::fits_in_memory;
use crate::offsets::RowOffsetIndex;
use crate::util::{create_file, open_file, replace_file};

/// Shuffle `file` `count` times, one output file per shuffle.
///
/// The reference strategy permutes the row-offset index and rewrites records
/// by seeking, so peak memory stays O(row count) regardless of file size. The
/// buffered strategy holds every data row in memory instead;
/// `ShuffleMode::Auto` only takes that path when the file plainly fits in
/// RAM. Both strategies draw the same permutations from the same RNG state,
/// so a seeded generator reproduces identical outputs on either path.
///
/// Outputs are named `{stem}_shuffle{i}`; a single shuffle drops the suffix
/// and takes the plain `{stem}` name. The source is deleted afterward unless
/// it is a user-supplied original.
pub fn shuffle_file<R: Rng>(
    file: &ChopFile,
    count: u32,
    opts: &ChopOptions,
    rng: &mut R,
) -> Result<Vec<ChopFile>> {
    if count == 0 {
        return Ok(vec![file.clone()]);
    }

    let header = file.read_header()?;
    let stem = file.stem();

    let size = fs::metadata(&file.path).map(|m| m.len()).unwrap_or(u64::MAX);
    let buffered = match opts.shuffle_mode {
        ShuffleMode::InMemory => true,
        ShuffleMode::OffsetIndex => false,
        ShuffleMode::Auto => fits_in_memory(size),
    };
    tracing::debug!(
        "shuffling {} x{} ({})",
        file.path.display(),
        count,
        if buffered { "buffered" } else { "offset-indexed" }
    );

    let mut outputs = if buffered {
        shuffle_buffered(file, count, &header, &stem, opts, rng)?
    } else {
        shuffle_indexed(file, count, &header, &stem, opts, rng)?
    };

    file.retire()?;

    // A single shuffle needs no iteration suffix.
    if count == 1 {
        let plain = opts.output_dir.join(&stem);
        replace_file(&outputs[0].path, &plain)?;
        outputs[0].path = plain;
    }

    Ok(outputs)
}

fn iteration_path(opts: &ChopOptions, stem: &str, i: u32) -> PathBuf {
    opts.output_dir.join(format!("{stem}_shuffle{i}"))
}

/// Seek-based rewrite: permute row start offsets, then copy one record per
/// permuted offset. Only the offset list lives in memory.
fn shuffle_indexed<R: Rng>(
    file: &ChopFile,
    count: u32,
    header: &[u8],
    stem: &str,
    opts: &ChopOptions,
    rng: &mut R,
) -> Result<Vec<ChopFile>> {
    let index = RowOffsetIndex::scan(&file.path, opts.read_buffer_bytes)?;
    let mut src = BufReader::with_capacity(opts.read_buffer_bytes, open_file(&file.path)?);
    let mut record = Vec::with_capacity(8 * 1024);
    let mut order = index.offsets().to_vec();

    let mut outputs = Vec::with_capacity(count as usize);
    for i in 1..=count {
        order.shuffle(rng);

        let path = iteration_path(opts, stem, i);
        let mut out = BufWriter::with_capacity(opts.write_buffer_bytes, create_file(&path)?);
        out.write_all(header)?;
        for &offset in &order {
            src.seek(SeekFrom::Start(offset))
                .with_context(|| format!("seek to {} in {}", offset, file.path.display()))?;
            record.clear();
            src.read_until(b'\n', &mut record)
                .with_context(|| format!("read row at {} in {}", offset, file.path.display()))?;
            out.write_all(&record)?;
            // A final record without a terminator must not fuse with the row
            // written after it.
            if !record.ends_with(b"\n") {
                out.write_all(b"\n")?;
            }
        }
        out.flush()?;
        outputs.push(ChopFile::synthesized(path));
    }
    Ok(outputs)
}

/// Fast path for files known to fit in memory: buffer all data rows once and
/// permute the vector itself.
fn shuffle_buffered<R: Rng>(
    file: &ChopFile,
    count: u32,
    header: &[u8],
    stem: &str,
    opts: &ChopOptions,
    rng: &mut R,
) -> Result<Vec<ChopFile>> {
    let mut reader = BufReader::with_capacity(opts.read_buffer_bytes, open_file(&file.path)?);
    let mut skip = Vec::with_capacity(256);
    reader
        .read_until(b'\n', &mut skip)
        .with_context(|| format!("read header of {}", file.path.display()))?;

    let mut rows: Vec<Vec<u8>> = Vec::new();
    loop {
        let mut record = Vec::with_capacity(256);
        let n = reader
            .read_until(b'\n', &mut record)
            .with_context(|| format!("read rows of {}", file.path.display()))?;
        if n == 0 {
            break;
        }
        if !record.ends_with(b"\n") {
            record.push(b'\n');
        }
        rows.push(record);
    }

    let mut outputs = Vec::with_capacity(count as usize);
    for i in 1..=count {
        rows.shuffle(rng);

        let path = iteration_path(opts, stem, i);
        let mut out = BufWriter::with_capacity(opts.write_buffer_bytes, create_file(&path)?);
        out.write_all(header)?;
        for row in &rows {
            out.write_all(row)?;
        }
        out.flush()?;
        outputs.push(ChopFile::synthesized(path));
    }
    Ok(outputs)
}
