//! Row-offset indexing: one forward scan records where every data row starts,
//! so the shuffler can seek to records instead of buffering them.

use anyhow::{Context, Result};
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::util::open_file;

/// Byte offsets of data-row starts (header excluded), in file order.
///
/// Each entry is the position immediately after a record terminator, starting
/// with the header's; the last row's end is implicitly the end of file.
/// Building costs O(file size) time and O(row count) memory; row contents are
/// never held. A header-only file yields an empty index.
#[derive(Clone, Debug, Default)]
pub struct RowOffsetIndex {
    offsets: Vec<u64>,
}

impl RowOffsetIndex {
    pub fn scan(path: &Path, read_buf: usize) -> Result<Self> {
        let mut reader = BufReader::with_capacity(read_buf, open_file(path)?);
        let mut record = Vec::with_capacity(8 * 1024);

        // The header is skipped, but its bytes still advance the cursor.
        let mut pos = reader
            .read_until(b'\n', &mut record)
            .with_context(|| format!("read header of {}", path.display()))?
            as u64;

        let mut offsets = Vec::new();
        loop {
            record.clear();
            let n = reader
                .read_until(b'\n', &mut record)
                .with_context(|| format!("scan rows of {}", path.display()))?;
            if n == 0 {
                break;
            }
            offsets.push(pos);
            pos += n as u64;
        }
        Ok(Self { offsets })
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn offsets(&self) -> &[u64] {
        &self.offsets
    }
}
