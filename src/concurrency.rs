//! Concurrency helper: bound how many files a fan-out stage processes in
//! parallel. Each worker owns one file end-to-end.

use anyhow::Result;
use rayon::prelude::*;

/// Run `f` over every item with at most `limit` in flight. Items are handed
/// over with their index so callers can reassemble ordered results.
pub fn for_each_limited<T, F>(items: &[T], limit: usize, f: F) -> Result<()>
where
    T: Sync,
    F: Sync + Fn(usize, &T) -> Result<()>,
{
    if limit <= 1 || items.len() <= 1 {
        for (i, item) in items.iter().enumerate() {
            f(i, item)?;
        }
        return Ok(());
    }
    for (chunk_no, chunk) in items.chunks(limit).enumerate() {
        let base = chunk_no * limit;
        chunk
            .par_iter()
            .enumerate()
            .try_for_each(|(i, item)| f(base + i, item))?;
    }
    Ok(())
}
