#[path = "common/mod.rs"]
mod common;

use common::*;
use chopper::{shuffle_file, ChopFile, ShuffleMode};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;

/// Three shuffles of a five-row file produce three `{stem}_shuffle{i}` files,
/// each carrying the source header and a permutation of the source rows. The
/// source keeps its data: it is a user-supplied original.
#[test]
fn shuffle_outputs_are_permutations() {
    let dir = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let input = dir.path().join("data.csv");
    let rows = ["1,a", "2,b", "3,c", "4,d", "5,e"];
    write_table(&input, "id,val", &rows);

    let opts = opts_in(out.path()).with_shuffle_mode(ShuffleMode::OffsetIndex);
    let mut rng = StdRng::seed_from_u64(42);
    let outputs = shuffle_file(&ChopFile::original(&input), 3, &opts, &mut rng).unwrap();

    assert_eq!(outputs.len(), 3);
    for (i, f) in outputs.iter().enumerate() {
        assert!(f.path.ends_with(format!("data_shuffle{}", i + 1)));
        assert_eq!(header_of(&f.path), "id,val");
        assert_eq!(
            sorted(data_rows(&f.path)),
            sorted(rows.iter().map(|r| r.to_string()).collect())
        );
    }
    assert!(input.exists(), "original inputs are never deleted");
}

/// A single shuffle drops the iteration suffix: the output takes the plain
/// `{stem}` name, and a pipeline-owned source is deleted after consumption.
#[test]
fn single_shuffle_takes_the_stem_name() {
    let out = tempfile::tempdir().unwrap();
    let input = out.path().join("part.csv");
    write_table(&input, "id,val", &["1,a", "2,b", "3,c"]);

    let opts = opts_in(out.path()).with_shuffle_mode(ShuffleMode::OffsetIndex);
    let mut rng = StdRng::seed_from_u64(9);
    let outputs = shuffle_file(&ChopFile::synthesized(&input), 1, &opts, &mut rng).unwrap();

    assert_eq!(outputs.len(), 1);
    assert_eq!(outputs[0].path, out.path().join("part"));
    assert!(!out.path().join("part_shuffle1").exists());
    assert!(!input.exists(), "synthesized source is consumed");
    assert_eq!(
        sorted(data_rows(&outputs[0].path)),
        vec!["1,a", "2,b", "3,c"]
    );
}

/// The offset-indexed rewrite and the in-memory fast path draw identical
/// permutations from identical RNG state: with the same seed their outputs
/// are byte-for-byte the same.
#[test]
fn strategies_agree_under_a_fixed_seed() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("data.csv");
    let rows: Vec<String> = (1..=20).map(|i| format!("{i},row{i}")).collect();
    let row_refs: Vec<&str> = rows.iter().map(|s| s.as_str()).collect();
    write_table(&input, "id,val", &row_refs);

    let out_a = tempfile::tempdir().unwrap();
    let out_b = tempfile::tempdir().unwrap();
    let opts_a = opts_in(out_a.path()).with_shuffle_mode(ShuffleMode::OffsetIndex);
    let opts_b = opts_in(out_b.path()).with_shuffle_mode(ShuffleMode::InMemory);

    let mut rng_a = StdRng::seed_from_u64(1234);
    let mut rng_b = StdRng::seed_from_u64(1234);
    let outs_a = shuffle_file(&ChopFile::original(&input), 2, &opts_a, &mut rng_a).unwrap();
    let outs_b = shuffle_file(&ChopFile::original(&input), 2, &opts_b, &mut rng_b).unwrap();

    for (a, b) in outs_a.iter().zip(&outs_b) {
        assert_eq!(fs::read(&a.path).unwrap(), fs::read(&b.path).unwrap());
    }
}

/// A fixed seed reproduces a run exactly.
#[test]
fn seeded_shuffles_are_reproducible() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("data.csv");
    write_table(&input, "id,val", &["1,a", "2,b", "3,c", "4,d"]);

    let runs: Vec<Vec<u8>> = (0..2)
        .map(|_| {
            let out = tempfile::tempdir().unwrap();
            let opts = opts_in(out.path()).with_shuffle_mode(ShuffleMode::OffsetIndex);
            let mut rng = StdRng::seed_from_u64(77);
            let outs = shuffle_file(&ChopFile::original(&input), 1, &opts, &mut rng).unwrap();
            fs::read(&outs[0].path).unwrap()
        })
        .collect();
    assert_eq!(runs[0], runs[1]);
}

/// Shuffling a header-only file degenerates to a header-only output.
#[test]
fn header_only_file_shuffles_to_header_only_output() {
    let dir = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let input = dir.path().join("empty.csv");
    write_table(&input, "id,val", &[]);

    let opts = opts_in(out.path()).with_shuffle_mode(ShuffleMode::OffsetIndex);
    let mut rng = StdRng::seed_from_u64(3);
    let outputs = shuffle_file(&ChopFile::original(&input), 1, &opts, &mut rng).unwrap();

    assert_eq!(read_lines(&outputs[0].path), vec!["id,val"]);
}

/// A source whose last row lacks a trailing newline still shuffles cleanly:
/// rows never fuse, whatever position the final record lands in.
#[test]
fn unterminated_last_row_does_not_fuse() {
    use std::io::Write;
    let dir = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let input = dir.path().join("data.csv");
    let mut f = fs::File::create(&input).unwrap();
    write!(f, "id,val\n1,a\n2,b\n3,c").unwrap(); // no final newline
    drop(f);

    let opts = opts_in(out.path()).with_shuffle_mode(ShuffleMode::OffsetIndex);
    let mut rng = StdRng::seed_from_u64(5);
    let outputs = shuffle_file(&ChopFile::original(&input), 4, &opts, &mut rng).unwrap();

    for f in &outputs {
        assert_eq!(sorted(data_rows(&f.path)), vec!["1,a", "2,b", "3,c"]);
    }
}
