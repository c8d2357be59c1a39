//! Outcome records returned by store operations and the pipeline.

use std::path::PathBuf;

use super::RecordKind;

/// What one `BatchStore::merge` call did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Batches named by the index before the merge (after bootstrapping an empty index).
    pub existing_batches: usize,
    /// Records already persisted before the merge.
    pub existing_records: usize,
    /// Records offered to the merge.
    pub offered: usize,
    /// Offered records that cannot be stored as a single line and were skipped.
    pub rejected: usize,
    /// Records not previously persisted.
    pub delta: usize,
    /// The index was empty and batch #1 was created for it.
    pub bootstrapped: bool,
    /// Records moved into the previously partial batch.
    pub topped_off: usize,
    /// Batch files created by this merge, in index order.
    pub created_batches: Vec<String>,
    pub audit_file: Option<String>,
}

impl MergeReport {
    /// True when the merge wrote nothing beyond an optional bootstrap batch.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.delta == 0
    }
}

/// Counts describing a store's persisted contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub batches: usize,
    pub records: usize,
    /// Size of the last batch when it is below capacity.
    pub partial_batch_len: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Index entry whose file does not exist.
    MissingBatch { batch: String },
    /// Batch holding more than `batch_size` records.
    OverCapacity { batch: String, len: usize },
    /// Batch other than the last holding fewer than `batch_size` records.
    UnderfilledBatch { batch: String, len: usize },
    /// Record present in more than one batch.
    DuplicateRecord {
        record: String,
        first: String,
        second: String,
    },
}

/// Result of checking a store's invariants without modifying it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationReport {
    pub index: PathBuf,
    pub stats: StoreStats,
    pub violations: Vec<Violation>,
}

impl VerificationReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Per-kind outcome inside one genre.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindReport {
    pub kind: RecordKind,
    pub raw: usize,
    pub filtered: usize,
    pub cleaned: usize,
    pub merge: MergeReport,
}

/// Per-genre outcome of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenreStatus {
    /// Data or blacklist file had no rows.
    Skipped,
    Completed(Vec<KindReport>),
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingBatch { batch } => write!(f, "batch file {batch} is missing"),
            Self::OverCapacity { batch, len } => {
                write!(f, "batch {batch} holds {len} records, above capacity")
            }
            Self::UnderfilledBatch { batch, len } => {
                write!(f, "batch {batch} holds {len} records but is not the last batch")
            }
            Self::DuplicateRecord {
                record,
                first,
                second,
            } => write!(f, "record {record:?} appears in both {first} and {second}"),
        }
    }
}
