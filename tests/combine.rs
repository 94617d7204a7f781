#[path = "common/mod.rs"]
mod common;

use common::*;
use chopper::{consolidate, expand_inputs, resolve_extension, COMBINED_NAME};
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

/// A single input file is used in place: no copy is made and the result keeps
/// the original-ownership tag, so no stage will ever delete it.
#[test]
fn single_file_is_used_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("only.csv");
    write_table(&input, "id,val", &["1,a"]);

    let file = consolidate(std::slice::from_ref(&input), &opts_in(dir.path())).unwrap();
    assert!(file.is_original);
    assert_eq!(file.path, input);
    assert!(!dir.path().join(COMBINED_NAME).exists());
}

/// Several inputs are stitched into `combined`: one header (the first file's),
/// then every file's data rows in order. The originals stay untouched and the
/// combined file is pipeline-owned.
#[test]
fn combine_skips_later_headers() {
    let dir = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.csv");
    let b = dir.path().join("b.csv");
    write_table(&a, "id,val", &["1,a", "2,b"]);
    write_table(&b, "id,val", &["3,c", "4,d", "5,e"]);

    let inputs = vec![a.clone(), b.clone()];
    let file = consolidate(&inputs, &opts_in(out.path())).unwrap();
    assert!(!file.is_original);
    assert_eq!(file.path, out.path().join(COMBINED_NAME));

    assert_eq!(header_of(&file.path), "id,val");
    assert_eq!(data_rows(&file.path), vec!["1,a", "2,b", "3,c", "4,d", "5,e"]);
    assert!(a.exists() && b.exists());
}

/// A source that ends without a trailing newline must not fuse its last row
/// with the first row of the next file.
#[test]
fn missing_trailing_newline_does_not_fuse_rows() {
    let dir = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.csv");
    let b = dir.path().join("b.csv");
    let mut f = File::create(&a).unwrap();
    write!(f, "id,val\n1,a\n2,b").unwrap(); // no final newline
    drop(f);
    write_table(&b, "id,val", &["3,c"]);

    let inputs = vec![a, b];
    let file = consolidate(&inputs, &opts_in(out.path())).unwrap();
    assert_eq!(data_rows(&file.path), vec!["1,a", "2,b", "3,c"]);
}

/// Directory inputs expand recursively, honor the extension filter, and come
/// back sorted so the combination order is deterministic.
#[test]
fn expand_inputs_recurses_and_filters() {
    let dir = tempfile::tempdir().unwrap();
    write_table(&dir.path().join("b.csv"), "h", &["1"]);
    write_table(&dir.path().join("sub/a.csv"), "h", &["2"]);
    write_table(&dir.path().join("sub/skip.txt"), "h", &["3"]);

    let expanded = expand_inputs(&[dir.path().to_path_buf()], Some("csv")).unwrap();
    assert_eq!(expanded.len(), 2);
    assert!(expanded[0].ends_with("b.csv"));
    assert!(expanded[1].ends_with("sub/a.csv"));
}

/// A missing input path is a configuration error, fatal before any I/O.
#[test]
fn missing_input_path_is_an_error() {
    let err = expand_inputs(&[PathBuf::from("/no/such/file.csv")], None).unwrap_err();
    assert!(err.to_string().contains("does not exist"));
}

/// A directory with no files matching the extension filter is fatal: there is
/// nothing to process and no extension to infer.
#[test]
fn empty_directory_match_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    write_table(&dir.path().join("data.csv"), "h", &["1"]);
    fs::create_dir_all(dir.path().join("empty")).unwrap();

    let err = expand_inputs(&[dir.path().to_path_buf()], Some("tsv")).unwrap_err();
    assert!(err.to_string().contains("tsv"));
}

/// The output extension is the first file's; mixed extensions are "first file
/// wins" by design.
#[test]
fn extension_comes_from_first_file() {
    assert_eq!(
        resolve_extension(&[PathBuf::from("x/a.csv"), PathBuf::from("x/b.tsv")]),
        ".csv"
    );
    assert_eq!(resolve_extension(&[PathBuf::from("noext")]), "");
}
