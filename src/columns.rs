//! Streaming column partitioner: fan a file out into one output per distinct
//! combination of values in the key columns.

use ahash::RandomState;
use anyhow::{anyhow, Context, Result};
use encoding_rs::Encoding;
use regex::Regex;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::sync::OnceLock;

use crate::config::ChopOptions;
use crate::dataset::ChopFile;
use crate::util::{create_file, open_file};

static SANITIZE: OnceLock<Regex> = OnceLock::new();

/// Clean an arbitrary key into a filesystem-safe name: every character that
/// is not alphanumeric or `_` becomes `_`.
///
/// Distinct keys can collide after cleaning (`"A,B"` and `"A B"` both map to
/// `A_B`); colliding groups then share one output file. This is documented,
/// accepted behavior, not corrected.
pub fn sanitize_key(raw: &str) -> String {
    let re = SANITIZE.get_or_init(|| Regex::new(r"\W").unwrap());
    re.replace_all(raw, "_").into_owned()
}

/// Split `file` into one output per distinct key-column value combination,
/// preserving the first-seen order of output files.
///
/// Rows stream through one at a time and are written back verbatim; the
/// configured encoding is used only to decode fields for key extraction.
/// Every first-seen key opens a new output (header first) whose handle stays
/// open until the scan ends, so the number of simultaneously open files
/// equals the number of distinct combinations, unbounded by design. Very
/// high-cardinality keys can exhaust the process file-descriptor limit; no
/// eviction is attempted.
pub fn partition_by_columns(
    file: &ChopFile,
    columns: &[String],
    opts: &ChopOptions,
) -> Result<Vec<ChopFile>> {
    let encoding = opts.resolved_encoding()?;
    let header = file.read_header()?;
    let key_positions = resolve_key_positions(&header, columns, opts.delimiter, encoding)
        .with_context(|| format!("partition {}", file.path.display()))?;

    let mut reader = BufReader::with_capacity(opts.read_buffer_bytes, open_file(&file.path)?);
    let mut skip = Vec::with_capacity(header.len());
    reader.read_until(b'\n', &mut skip)?;

    let mut writers: HashMap<String, BufWriter<File>, RandomState> = HashMap::default();
    let mut order: Vec<PathBuf> = Vec::new();

    let mut record = Vec::with_capacity(8 * 1024);
    let mut row_no: u64 = 0;
    loop {
        record.clear();
        let n = reader
            .read_until(b'\n', &mut record)
            .with_context(|| format!("read rows of {}", file.path.display()))?;
        if n == 0 {
            break;
        }
        row_no += 1;

        let key = row_key(&record, &key_positions, columns, opts.delimiter, encoding)
            .with_context(|| format!("{}: data row {}", file.path.display(), row_no))?;

        let writer = match writers.entry(key) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => {
                let path = opts.output_dir.join(e.key());
                let mut w = BufWriter::with_capacity(opts.write_buffer_bytes, create_file(&path)?);
                w.write_all(&header)?;
                order.push(path);
                e.insert(w)
            }
        };
        writer.write_all(&record)?;
        if !record.ends_with(b"\n") {
            writer.write_all(b"\n")?;
        }
    }

    for w in writers.values_mut() {
        w.flush()?;
    }
    drop(writers);
    file.retire()?;

    tracing::info!(
        "partitioned {} into {} group file(s)",
        file.path.display(),
        order.len()
    );
    Ok(order.into_iter().map(ChopFile::synthesized).collect())
}

fn decode_fields(line: &[u8], delimiter: char, encoding: &'static Encoding) -> Vec<String> {
    let (text, _, _) = encoding.decode(line);
    text.trim_end_matches(['\r', '\n'])
        .split(delimiter)
        .map(|s| s.to_string())
        .collect()
}

fn resolve_key_positions(
    header: &[u8],
    columns: &[String],
    delimiter: char,
    encoding: &'static Encoding,
) -> Result<Vec<usize>> {
    let fields = decode_fields(header, delimiter, encoding);
    columns
        .iter()
        .map(|col| {
            fields
                .iter()
                .position(|f| f == col)
                .ok_or_else(|| anyhow!("key column '{}' not found in header", col))
        })
        .collect()
}

/// Build the sanitized group key for one row: `{col}_{value}` per key column,
/// joined by `__`.
fn row_key(
    record: &[u8],
    positions: &[usize],
    columns: &[String],
    delimiter: char,
    encoding: &'static Encoding,
) -> Result<String> {
    let fields = decode_fields(record, delimiter, encoding);
    let mut parts = Vec::with_capacity(columns.len());
    for (col, &idx) in columns.iter().zip(positions) {
        let value = fields.get(idx).ok_or_else(|| {
            anyhow!(
                "row has {} fields, key column '{}' needs field {}",
                fields.len(),
                col,
                idx + 1
            )
        })?;
        parts.push(format!("{col}_{value}"));
    }
    Ok(sanitize_key(&parts.join("__")))
}
