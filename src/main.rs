use anyhow::Result;
use chopper::{Chopper, ShuffleMode};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Chop large delimited-text files into smaller ones: combine directories,
/// partition by key columns, shuffle, and split by row counts, all without
/// loading whole files into memory.
#[derive(Debug, Parser)]
#[command(name = "chopper", version, about)]
struct Cli {
    /// Input files or directories. Directories are searched recursively and
    /// their matching files are treated as a single dataset.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory for output files. An empty or new directory is recommended;
    /// existing files may be overwritten.
    #[arg(short, long)]
    output_dir: PathBuf,

    /// File extension to match when an input is a directory (e.g. "csv").
    #[arg(short = 'x', long)]
    extension: Option<String>,

    /// Encoding label used when parsing key columns (default UTF-8).
    #[arg(short, long)]
    encoding: Option<String>,

    /// Field delimiter used when parsing rows.
    #[arg(short, long, default_value_t = ',')]
    delimiter: char,

    /// String prepended to every output file name.
    #[arg(short, long)]
    prefix: Option<String>,

    /// Perform N shuffles; outputs one set of files per shuffle.
    #[arg(short, long)]
    shuffles: Option<u32>,

    /// Comma-separated list of field names to partition by.
    #[arg(short, long, value_delimiter = ',')]
    columns: Vec<String>,

    /// Maximum number of data rows per output file.
    #[arg(short, long, conflicts_with = "equal")]
    rows: Option<u64>,

    /// Split into N files of approximately equal row counts.
    #[arg(short = 'q', long)]
    equal: Option<u64>,

    /// Shuffle strategy.
    #[arg(long, value_enum, default_value_t = ModeArg::Auto)]
    shuffle_mode: ModeArg,

    /// Process up to N files in parallel during fan-out stages.
    #[arg(short = 'j', long, default_value_t = 1)]
    jobs: usize,

    /// Disable progress bars.
    #[arg(long)]
    no_progress: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    /// Seek-based rewrite unless the file plainly fits in RAM.
    Auto,
    /// Always the memory-bounded seek-based rewrite.
    OffsetIndex,
    /// Always buffer all rows in memory.
    InMemory,
}

impl From<ModeArg> for ShuffleMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Auto => ShuffleMode::Auto,
            ModeArg::OffsetIndex => ShuffleMode::OffsetIndex,
            ModeArg::InMemory => ShuffleMode::InMemory,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut chopper = Chopper::new()
        .output_dir(&cli.output_dir)
        .delimiter(cli.delimiter)
        .shuffle_mode(cli.shuffle_mode.into())
        .file_concurrency(cli.jobs)
        .progress(!cli.no_progress);

    if let Some(ext) = &cli.extension {
        chopper = chopper.extension(ext);
    }
    if let Some(label) = &cli.encoding {
        chopper = chopper.encoding(label.clone());
    }
    if let Some(prefix) = &cli.prefix {
        chopper = chopper.prefix(prefix.clone());
    }
    if let Some(count) = cli.shuffles {
        chopper = chopper.shuffles(count);
    }
    if !cli.columns.is_empty() {
        chopper = chopper.columns(cli.columns.clone());
    }
    if let Some(threshold) = cli.rows {
        chopper = chopper.max_rows(threshold);
    }
    if let Some(parts) = cli.equal {
        chopper = chopper.equal_parts(parts);
    }

    let outputs = chopper.run(&cli.inputs)?;
    for path in &outputs {
        println!("{}", path.display());
    }
    Ok(())
}
