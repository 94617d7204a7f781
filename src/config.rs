use anyhow::{anyhow, Result};
use encoding_rs::Encoding;
use std::path::{Path, PathBuf};

/// Strategy for the shuffle stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShuffleMode {
    /// Offset-indexed seek rewrite unless the file comfortably fits in RAM.
    Auto,
    /// Always the offset-indexed seek rewrite (bounded memory).
    OffsetIndex,
    /// Always buffer all data rows (fastest; peak memory ~ file size).
    InMemory,
}

/// User-facing options with sensible defaults and builder chaining.
#[derive(Clone, Debug)]
pub struct ChopOptions {
    pub output_dir: PathBuf,
    pub extension: Option<String>,  // directory-input filter, no leading dot
    pub encoding: Option<String>,   // WHATWG label; None = UTF-8
    pub delimiter: char,
    pub columns: Option<Vec<String>>, // partition keys, header names
    pub max_rows: Option<u64>,      // fixed-size split threshold
    pub equal_parts: Option<u64>,   // equal-count split target
    pub shuffles: u32,
    pub shuffle_mode: ShuffleMode,
    pub prefix: Option<String>,     // prepended to every final output name
    pub file_concurrency: usize,    // files processed in parallel per fan-out stage
    pub progress: bool,

    // IO tuning
    pub read_buffer_bytes: usize,   // BufReader capacity
    pub write_buffer_bytes: usize,  // BufWriter capacity
}

impl Default for ChopOptions {
    fn default() -> Self {
        // Defaults chosen to be safe but noticeably faster than std defaults.
        // Adjust at runtime via the io_* builder methods.
        let default_read = 256 * 1024;
        let default_write = 256 * 1024;

        Self {
            output_dir: PathBuf::from("chopped"),
            extension: None,
            encoding: None,
            delimiter: ',',
            columns: None,
            max_rows: None,
            equal_parts: None,
            shuffles: 0,
            shuffle_mode: ShuffleMode::Auto,
            prefix: None,
            file_concurrency: 1, // safe default: one file at a time
            progress: true,

            read_buffer_bytes: default_read,
            write_buffer_bytes: default_write,
        }
    }
}

impl ChopOptions {
    pub fn with_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }
    pub fn with_extension(mut self, ext: impl AsRef<str>) -> Self {
        self.extension = Some(ext.as_ref().trim_start_matches('.').to_string());
        self
    }
    pub fn with_encoding(mut self, label: impl Into<String>) -> Self {
        self.encoding = Some(label.into());
        self
    }
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }
    pub fn with_max_rows(mut self, threshold: u64) -> Self {
        self.max_rows = Some(threshold);
        self
    }
    pub fn with_equal_parts(mut self, parts: u64) -> Self {
        self.equal_parts = Some(parts);
        self
    }
    pub fn with_shuffles(mut self, count: u32) -> Self {
        self.shuffles = count;
        self
    }
    pub fn with_shuffle_mode(mut self, mode: ShuffleMode) -> Self {
        self.shuffle_mode = mode;
        self
    }
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }
    pub fn with_file_concurrency(mut self, n: usize) -> Self {
        self.file_concurrency = n.max(1);
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }

    // IO buffers tuning
    pub fn with_io_read_buffer(mut self, bytes: usize) -> Self {
        self.read_buffer_bytes = bytes.max(8 * 1024);
        self
    }
    pub fn with_io_write_buffer(mut self, bytes: usize) -> Self {
        self.write_buffer_bytes = bytes.max(8 * 1024);
        self
    }
    pub fn with_io_buffers(mut self, read_bytes: usize, write_bytes: usize) -> Self {
        self.read_buffer_bytes = read_bytes.max(8 * 1024);
        self.write_buffer_bytes = write_bytes.max(8 * 1024);
        self
    }

    /// True when at least one transformation is requested.
    pub fn has_action(&self) -> bool {
        self.columns.as_ref().is_some_and(|c| !c.is_empty())
            || self.max_rows.is_some()
            || self.equal_parts.is_some()
            || self.shuffles > 0
    }

    /// Resolve the configured encoding label (default UTF-8).
    pub fn resolved_encoding(&self) -> Result<&'static Encoding> {
        match self.encoding.as_deref() {
            None => Ok(encoding_rs::UTF_8),
            Some(label) => Encoding::for_label(label.trim().as_bytes())
                .ok_or_else(|| anyhow!("unknown encoding label: {label}")),
        }
    }

    /// Validate the configuration. Fatal before any file I/O happens.
    pub fn validate(&self) -> Result<()> {
        if !self.has_action() {
            return Err(anyhow!(
                "no action selected: set at least one of columns, rows, equal, shuffles"
            ));
        }
        if self.max_rows.is_some() && self.equal_parts.is_some() {
            return Err(anyhow!("rows and equal are mutually exclusive"));
        }
        if self.max_rows == Some(0) {
            return Err(anyhow!("rows threshold must be at least 1"));
        }
        if self.equal_parts == Some(0) {
            return Err(anyhow!("equal part count must be at least 1"));
        }
        self.resolved_encoding()?;
        Ok(())
    }
}
