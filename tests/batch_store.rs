//! Integration tests for incremental batch merging.

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::Path;

use tempfile::{TempDir, tempdir};

use catalog_batcher::{BatchStore, CatalogError, RecordKind, Violation};

const INDEX: &str = "0AuthorBatches0.txt";

fn store_in(dir: &TempDir, batch_size: usize) -> BatchStore {
    let store = BatchStore::new(dir.path(), "0", RecordKind::Author, INDEX)
        .with_batch_size(batch_size)
        .expect("batch size");
    store.init().expect("init");
    store
}

fn names(count: usize, prefix: &str) -> Vec<String> {
    (0..count).map(|i| format!("{prefix} {i:05}")).collect()
}

fn all_files(dir: &Path) -> BTreeSet<String> {
    fs::read_dir(dir)
        .expect("read dir")
        .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
        .collect()
}

fn snapshot(dir: &Path) -> Vec<(String, String)> {
    all_files(dir)
        .into_iter()
        .filter(|name| !name.ends_with(".lock"))
        .map(|name| {
            let body = fs::read_to_string(dir.join(&name)).expect("read");
            (name, body)
        })
        .collect()
}

#[test]
fn empty_store_gets_single_batch() {
    let dir = tempdir().expect("tmp");
    let store = store_in(&dir, 1000);

    let report = store.merge(["Alice", "Bob"]).expect("merge");
    assert!(report.bootstrapped);
    assert_eq!(report.delta, 2);
    assert_eq!(report.topped_off, 2);
    assert!(report.created_batches.is_empty());

    let batches = store.batch_names().expect("index");
    assert_eq!(batches.len(), 1);
    assert!(batches[0].starts_with("0Author_data_1_"), "got {}", batches[0]);
    let contents: HashSet<String> = store.load_batch(&batches[0]).expect("batch").into_iter().collect();
    assert_eq!(contents, HashSet::from(["Alice".to_string(), "Bob".to_string()]));

    let audit = report.audit_file.expect("audit file");
    assert!(audit.starts_with("inc_0Author_data_"));
    let audit_body = fs::read_to_string(dir.path().join(audit)).expect("audit");
    assert_eq!(audit_body, "Alice\nBob\n");
}

#[test]
fn full_batch_is_left_alone() {
    let dir = tempdir().expect("tmp");
    let store = store_in(&dir, 1000);
    store.merge(names(1000, "Author")).expect("seed");
    let first = store.batch_names().expect("index")[0].clone();
    let first_body = fs::read_to_string(dir.path().join(&first)).expect("first");

    let report = store.merge(["NewName"]).expect("merge");
    assert_eq!(report.delta, 1);
    assert_eq!(report.topped_off, 0);
    assert_eq!(report.created_batches.len(), 1);

    let batches = store.batch_names().expect("index");
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0], first);
    assert!(batches[1].starts_with("0Author_data_2_"));
    assert_eq!(store.load_batch(&batches[1]).expect("second"), vec!["NewName"]);
    assert_eq!(
        fs::read_to_string(dir.path().join(&first)).expect("first again"),
        first_body
    );
}

#[test]
fn partial_batch_is_topped_off_before_new_batch() {
    let dir = tempdir().expect("tmp");
    let store = store_in(&dir, 1000);
    store.merge(names(998, "Author")).expect("seed");

    let report = store.merge(["A", "B", "C"]).expect("merge");
    assert_eq!(report.delta, 3);
    assert_eq!(report.topped_off, 2);
    assert_eq!(report.created_batches.len(), 1);

    let batches = store.batch_names().expect("index");
    assert_eq!(batches.len(), 2);
    let first = store.load_batch(&batches[0]).expect("first");
    let second = store.load_batch(&batches[1]).expect("second");
    assert_eq!(first.len(), 1000);
    assert_eq!(second.len(), 1);

    let mut added: Vec<String> = first[998..].to_vec();
    added.extend(second);
    added.sort();
    assert_eq!(added, vec!["A", "B", "C"]);
}

#[test]
fn repeated_merge_writes_nothing() {
    let dir = tempdir().expect("tmp");
    let store = store_in(&dir, 7);
    let input = names(30, "Title");

    let first = store.merge(&input).expect("first merge");
    assert_eq!(first.delta, 30);
    let before = snapshot(dir.path());

    let second = store.merge(&input).expect("second merge");
    assert!(second.is_noop());
    assert_eq!(second.offered, 30);
    assert!(second.audit_file.is_none());
    assert!(second.created_batches.is_empty());
    assert_eq!(snapshot(dir.path()), before);
}

#[test]
fn invariants_hold_across_many_merges() {
    let dir = tempdir().expect("tmp");
    let store = store_in(&dir, 50);
    let mut rng = fastrand::Rng::with_seed(42);
    let mut expected = BTreeSet::new();

    for _ in 0..12 {
        let count = rng.usize(0..120);
        let input: Vec<String> = (0..count).map(|_| format!("name {}", rng.u32(0..400))).collect();
        expected.extend(input.iter().cloned());
        store.merge(&input).expect("merge");
    }

    let batches = store.batch_names().expect("index");
    let mut union = BTreeSet::new();
    for (position, batch) in batches.iter().enumerate() {
        let records = store.load_batch(batch).expect("batch");
        if position + 1 < batches.len() {
            assert_eq!(records.len(), 50, "batch {batch} is not full");
        } else {
            assert!(records.len() <= 50);
        }
        for record in records {
            assert!(union.insert(record.clone()), "{record} duplicated across batches");
        }
    }
    assert_eq!(union, expected);

    let report = store.verify().expect("verify");
    assert!(report.is_clean(), "violations: {:?}", report.violations);
    assert_eq!(report.stats.records, expected.len());
}

#[test]
fn empty_strings_are_never_persisted() {
    let dir = tempdir().expect("tmp");
    let store = store_in(&dir, 10);
    let report = store.merge(["", "Alice", ""]).expect("merge");
    assert_eq!(report.offered, 1);
    let stats = store.stats().expect("stats");
    assert_eq!(stats.records, 1);
    assert_eq!(stats.batches, 1);
    assert_eq!(stats.partial_batch_len, Some(1));
}

#[test]
fn empty_merge_on_fresh_store_only_bootstraps() {
    let dir = tempdir().expect("tmp");
    let store = store_in(&dir, 10);
    let report = store.merge(std::iter::empty::<&str>()).expect("merge");
    assert!(report.bootstrapped);
    assert!(report.is_noop());
    let batches = store.batch_names().expect("index");
    assert_eq!(batches.len(), 1);
    assert!(store.load_batch(&batches[0]).expect("batch").is_empty());
    assert!(
        !all_files(dir.path()).iter().any(|name| name.starts_with("inc_")),
        "no audit file expected"
    );

    // The bootstrapped batch is reused rather than a second one being created.
    store.merge(["Alice"]).expect("second merge");
    assert_eq!(store.batch_names().expect("index").len(), 1);
}

#[test]
fn missing_index_is_fatal() {
    let dir = tempdir().expect("tmp");
    let store = BatchStore::new(dir.path(), "1", RecordKind::Title, "1TitleBatches1.txt");
    let err = store.merge(["Dune"]).expect_err("missing index");
    match err {
        CatalogError::MissingFile { path } => {
            assert_eq!(path, dir.path().join("1TitleBatches1.txt"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn missing_batch_file_is_fatal() {
    let dir = tempdir().expect("tmp");
    let store = store_in(&dir, 10);
    store.merge(["Alice"]).expect("seed");
    let batch = store.batch_names().expect("index")[0].clone();
    fs::remove_file(dir.path().join(&batch)).expect("remove batch");

    let err = store.merge(["Bob"]).expect_err("missing batch");
    assert!(matches!(err, CatalogError::MissingFile { .. }), "unexpected: {err:?}");
}

#[test]
fn non_utf8_batch_is_fatal() {
    let dir = tempdir().expect("tmp");
    let store = store_in(&dir, 10);
    store.merge(["Alice"]).expect("seed");
    let batch = store.batch_names().expect("index")[0].clone();
    fs::write(dir.path().join(&batch), [0xFF, 0xFE, b'\n']).expect("corrupt");

    let err = store.merge(["Bob"]).expect_err("bad encoding");
    assert!(matches!(err, CatalogError::Encoding { .. }), "unexpected: {err:?}");
}

#[test]
fn orphan_batch_from_interrupted_run_is_ignored() {
    let dir = tempdir().expect("tmp");
    let store = store_in(&dir, 2);
    store.merge(["a", "b"]).expect("seed");

    // A batch written without its index entry, as left by a run that died mid-fill.
    fs::write(dir.path().join("0Author_data_2_orphan.txt"), "c\n").expect("orphan");

    let report = store.merge(["c"]).expect("merge");
    assert_eq!(report.delta, 1);
    let batches = store.batch_names().expect("index");
    assert_eq!(batches.len(), 2);
    assert_ne!(batches[1], "0Author_data_2_orphan.txt");
    assert_eq!(store.load_batch(&batches[1]).expect("batch"), vec!["c"]);
}

#[test]
fn verify_reports_duplicates_and_underfilled_batches() {
    let dir = tempdir().expect("tmp");
    fs::write(dir.path().join("b1.txt"), "a\nb\n").expect("b1");
    fs::write(dir.path().join("b2.txt"), "b\nc\nd\n").expect("b2");
    fs::write(dir.path().join("b3.txt"), "e\n").expect("b3");
    fs::write(dir.path().join(INDEX), "b1.txt\nb2.txt\nb3.txt\nmissing.txt\n").expect("index");

    let store = BatchStore::new(dir.path(), "0", RecordKind::Author, INDEX)
        .with_batch_size(3)
        .expect("batch size");
    let report = store.verify().expect("verify");

    assert!(report.violations.contains(&Violation::UnderfilledBatch {
        batch: "b1.txt".into(),
        len: 2
    }));
    assert!(report.violations.contains(&Violation::DuplicateRecord {
        record: "b".into(),
        first: "b1.txt".into(),
        second: "b2.txt".into(),
    }));
    assert!(report.violations.contains(&Violation::UnderfilledBatch {
        batch: "b3.txt".into(),
        len: 1
    }));
    assert!(report.violations.contains(&Violation::MissingBatch {
        batch: "missing.txt".into()
    }));
    assert_eq!(report.stats.records, 5);
}

#[test]
fn index_is_only_ever_appended() {
    let dir = tempdir().expect("tmp");
    let store = store_in(&dir, 3);
    store.merge(names(4, "x")).expect("first");
    let before = fs::read_to_string(store.index_path()).expect("index");

    store.merge(names(10, "y")).expect("second");
    let after = fs::read_to_string(store.index_path()).expect("index");
    assert!(after.starts_with(&before));
    assert_eq!(after.lines().count(), 5);
}

#[test]
fn records_that_span_lines_are_skipped() {
    let dir = tempdir().expect("tmp");
    let store = store_in(&dir, 1);
    let input = ["a\nb", "c\r\n", "\u{feff}d", "e"];

    let first = store.merge(input).expect("first merge");
    assert_eq!(first.rejected, 3);
    assert_eq!(first.offered, 1);
    assert_eq!(first.delta, 1);

    let second = store.merge(input).expect("second merge");
    assert!(second.is_noop());
    assert_eq!(second.rejected, 3);

    let report = store.verify().expect("verify");
    assert!(report.is_clean(), "violations: {:?}", report.violations);
    assert_eq!(report.stats.records, 1);
    let batches = store.batch_names().expect("index");
    assert_eq!(store.load_batch(&batches[0]).expect("batch"), vec!["e"]);
}

#[test]
fn failed_batch_write_aborts_before_the_index_grows() {
    let dir = tempdir().expect("tmp");
    fs::write(dir.path().join("b1.txt"), "a\n").expect("b1");
    fs::write(dir.path().join(INDEX), "b1.txt\n").expect("index");
    // Audit files for this genre land in `inc_nodir/`, new batches in `nodir/`, which is absent.
    fs::create_dir(dir.path().join("inc_nodir")).expect("audit dir");

    let store = BatchStore::new(dir.path(), "nodir/0", RecordKind::Author, INDEX)
        .with_batch_size(1)
        .expect("batch size");
    let err = store.merge(["b"]).expect_err("batch directory is missing");
    match err {
        CatalogError::Persistence { path, .. } => {
            assert!(path.starts_with(dir.path().join("nodir")), "unexpected path {path:?}");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(store.batch_names().expect("index"), vec!["b1.txt"]);
    assert_eq!(
        fs::read_dir(dir.path().join("inc_nodir")).expect("audit dir").count(),
        1,
        "audit file is written before batches"
    );
}
