mod config;
mod dataset;
mod discover;
mod combine;
mod offsets;

mod shuffle;
mod columns;
mod split;
mod pipeline;

mod concurrency;
mod progress;
mod mem;
mod util;

pub use crate::config::{ChopOptions, ShuffleMode};
pub use crate::dataset::ChopFile;
pub use crate::pipeline::Chopper;

// Expose the stage operations for direct library use.
pub use crate::columns::{partition_by_columns, sanitize_key};
pub use crate::combine::{consolidate, COMBINED_NAME};
pub use crate::discover::{expand_inputs, resolve_extension};
pub use crate::offsets::RowOffsetIndex;
pub use crate::shuffle::shuffle_file;
pub use crate::split::{split_by_equal, split_by_rows};

// Expose memory helpers so callers can pick a shuffle strategy explicitly.
pub use crate::mem::{available_memory_bytes, fits_in_memory};
