use crate::columns::partition_by_columns;
use crate::combine::consolidate;
use crate::config::{ChopOptions, ShuffleMode};
use crate::dataset::ChopFile;
use crate::discover::{expand_inputs, resolve_extension};
use crate::progress::make_count_progress;
use crate::shuffle::shuffle_file;
use crate::split::{split_by_equal, split_by_rows};
use crate::util::{init_tracing_once, replace_file};
use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};

/// Fluent front door to the chopping pipeline.
///
/// ```no_run
/// use chopper::Chopper;
/// use std::path::PathBuf;
///
/// let outputs = Chopper::new()
///     .output_dir("out")
///     .columns(["region"])
///     .shuffles(2)
///     .run(&[PathBuf::from("big.csv")])?;
/// # anyhow::Ok(())
/// ```
#[derive(Clone)]
pub struct Chopper {
    opts: ChopOptions,
}

impl Chopper {
    pub fn new() -> Self {
        Self { opts: ChopOptions::default() }
    }

    // -------- Builder methods --------
    pub fn output_dir(mut self, dir: impl AsRef<Path>) -> Self { self.opts = self.opts.with_output_dir(dir); self }
    pub fn extension(mut self, ext: impl AsRef<str>) -> Self { self.opts = self.opts.with_extension(ext); self }
    pub fn encoding(mut self, label: impl Into<String>) -> Self { self.opts = self.opts.with_encoding(label); self }
    pub fn delimiter(mut self, delimiter: char) -> Self { self.opts = self.opts.with_delimiter(delimiter); self }
    pub fn columns<I, S>(mut self, columns: I) -> Self where I: IntoIterator<Item = S>, S: Into<String> { self.opts = self.opts.with_columns(columns); self }
    pub fn max_rows(mut self, threshold: u64) -> Self { self.opts = self.opts.with_max_rows(threshold); self }
    pub fn equal_parts(mut self, parts: u64) -> Self { self.opts = self.opts.with_equal_parts(parts); self }
    pub fn shuffles(mut self, count: u32) -> Self { self.opts = self.opts.with_shuffles(count); self }
    pub fn shuffle_mode(mut self, mode: ShuffleMode) -> Self { self.opts = self.opts.with_shuffle_mode(mode); self }
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self { self.opts = self.opts.with_prefix(prefix); self }
    pub fn file_concurrency(mut self, n: usize) -> Self { self.opts = self.opts.with_file_concurrency(n); self }
    pub fn progress(mut self, yes: bool) -> Self { self.opts = self.opts.with_progress(yes); self }
    pub fn io_read_buffer(mut self, bytes: usize) -> Self { self.opts = self.opts.with_io_read_buffer(bytes); self }
    pub fn io_write_buffer(mut self, bytes: usize) -> Self { self.opts = self.opts.with_io_write_buffer(bytes); self }
    pub fn io_buffers(mut self, read_bytes: usize, write_bytes: usize) -> Self { self.opts = self.opts.with_io_buffers(read_bytes, write_bytes); self }

    pub fn options(&self) -> &ChopOptions {
        &self.opts
    }

    /// Run the full pipeline over `inputs` and return the final output paths.
    ///
    /// Stage order is fixed: partition by columns first (bounds the data
    /// every later stage must touch), then shuffle (must precede row chopping
    /// so chunk membership is randomized), then fixed-size or equal-count
    /// split. Each stage consumes the file set of the previous one and
    /// deletes consumed files it owns; user-supplied files are never deleted.
    /// Any stage failure aborts the run; files already produced by completed
    /// stages are left on disk for inspection.
    pub fn run(self, inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
        init_tracing_once();
        self.opts.validate()?;

        fs::create_dir_all(&self.opts.output_dir).with_context(|| {
            format!("create output directory {}", self.opts.output_dir.display())
        })?;

        let expanded = expand_inputs(inputs, self.opts.extension.as_deref())?;
        let extension = resolve_extension(&expanded);
        tracing::info!("processing {} input file(s)", expanded.len());

        let mut files = vec![consolidate(&expanded, &self.opts)?];

        if let Some(columns) = self.opts.columns.clone().filter(|c| !c.is_empty()) {
            files = self.apply_stage(files, "partition by columns", |f| {
                partition_by_columns(f, &columns, &self.opts)
            })?;
        }

        if self.opts.shuffles > 0 {
            let count = self.opts.shuffles;
            files = self.apply_stage(files, "shuffle", |f| {
                let mut rng = rand::thread_rng();
                shuffle_file(f, count, &self.opts, &mut rng)
            })?;
        }

        if let Some(threshold) = self.opts.max_rows {
            files = self.apply_stage(files, "split by rows", |f| {
                split_by_rows(f, threshold, &self.opts)
            })?;
        } else if let Some(parts) = self.opts.equal_parts {
            files = self.apply_stage(files, "split into equal parts", |f| {
                split_by_equal(f, parts, &self.opts)
            })?;
        }

        self.finalize(files, &extension)
    }

    /// Map every file of the current dataset through one stage operation,
    /// preserving input order in the combined output list. Fan-out across
    /// files runs on at most `file_concurrency` workers, each owning one file
    /// end-to-end; distinct source stems keep output paths from colliding.
    fn apply_stage<F>(&self, files: Vec<ChopFile>, stage: &str, op: F) -> Result<Vec<ChopFile>>
    where
        F: Sync + Fn(&ChopFile) -> Result<Vec<ChopFile>>,
    {
        let pb = (self.opts.progress && files.len() > 1)
            .then(|| make_count_progress(files.len() as u64, stage));

        let produced: Mutex<Vec<(usize, Vec<ChopFile>)>> =
            Mutex::new(Vec::with_capacity(files.len()));
        crate::concurrency::for_each_limited(&files, self.opts.file_concurrency, |idx, f| {
            let outs = op(f).with_context(|| format!("{} failed on {}", stage, f.path.display()))?;
            produced.lock().push((idx, outs));
            if let Some(pb) = &pb {
                pb.inc(1);
            }
            Ok(())
        })?;
        if let Some(pb) = pb {
            pb.finish_with_message("done");
        }

        let mut produced = produced.into_inner();
        produced.sort_by_key(|(idx, _)| *idx);
        let next: Vec<ChopFile> = produced.into_iter().flat_map(|(_, outs)| outs).collect();
        tracing::info!("{stage}: {} file(s) in the working set", next.len());
        Ok(next)
    }

    /// Rename the terminal file set to user-facing names,
    /// `{prefix_}{stem}{extension}`, overwriting any existing destination.
    fn finalize(&self, files: Vec<ChopFile>, extension: &str) -> Result<Vec<PathBuf>> {
        let mut finals = Vec::with_capacity(files.len());
        for f in files {
            let stem = f.stem();
            let name = match &self.opts.prefix {
                Some(prefix) => format!("{prefix}_{stem}{extension}"),
                None => format!("{stem}{extension}"),
            };
            let dest = self.opts.output_dir.join(name);
            if dest != f.path {
                replace_file(&f.path, &dest)?;
            }
            finals.push(dest);
        }
        tracing::info!(
            "wrote {} output file(s) to {}",
            finals.len(),
            self.opts.output_dir.display()
        );
        Ok(finals)
    }
}

impl Default for Chopper {
    fn default() -> Self {
        Self::new()
    }
}
