#![allow(dead_code)]

use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use chopper::ChopOptions;

/// Write a delimited-text file: one header record plus the given data rows.
pub fn write_table(path: &Path, header: &str, rows: &[&str]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut f = File::create(path).unwrap();
    writeln!(f, "{}", header).unwrap();
    for row in rows {
        writeln!(f, "{}", row).unwrap();
    }
}

/// Read a file into trimmed lines (empty lines dropped).
pub fn read_lines(path: &Path) -> Vec<String> {
    let f = File::open(path).unwrap();
    BufReader::new(f)
        .lines()
        .map(|l| l.unwrap())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Header (first line) of a file.
pub fn header_of(path: &Path) -> String {
    read_lines(path).into_iter().next().unwrap_or_default()
}

/// Data rows of a file: every line after the header.
pub fn data_rows(path: &Path) -> Vec<String> {
    let mut lines = read_lines(path);
    if !lines.is_empty() {
        lines.remove(0);
    }
    lines
}

/// Sorted copy, for multiset comparisons.
pub fn sorted(mut rows: Vec<String>) -> Vec<String> {
    rows.sort();
    rows
}

/// Ten generic `id,val` data rows used by the split scenarios.
pub fn ten_rows() -> Vec<String> {
    (1..=10).map(|i| format!("{i},val{i}")).collect()
}

/// Quiet options writing into `dir`, for driving stage functions directly.
pub fn opts_in(dir: &Path) -> ChopOptions {
    ChopOptions::default()
        .with_output_dir(dir)
        .with_progress(false)
}
