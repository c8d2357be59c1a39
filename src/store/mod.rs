//! Capacity-bounded batch files with an append-only index.
//!
//! A store is identified by its base directory and index file. The index lists batch file names
//! in creation order, one per line. Every batch except possibly the last holds exactly
//! `batch_size` unique records; the last one is the only batch that is ever rewritten.
//!
//! `merge` folds a fresh set of records into the store:
//! - load the index (bootstrapping batch #1 when it is empty) and every batch it names;
//! - compute the records not persisted anywhere yet and write them to an audit file;
//! - top off the partial last batch, then allocate new batches for the remainder, appending each
//!   name to the index after its file is in place.

pub mod naming;

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

use chrono::{FixedOffset, Offset, Utc};

use crate::constants::{DEFAULT_BATCH_SIZE, DEFAULT_UTC_OFFSET_MINUTES};
use crate::error::{CatalogError, Result};
use crate::io::{append_lines, create_empty_if_absent, read_lines, write_lines_atomic};
use crate::lock::{FileLock, LockSettings};
use crate::types::{
    Config, GenreConfig, MergeReport, RecordKind, StoreStats, VerificationReport, Violation,
};

use naming::{audit_file_name, batch_file_name, lock_file_name, next_stamp};

/// Last batch of a store while it is below capacity.
#[derive(Debug)]
struct PartialBatch {
    name: String,
    records: Vec<String>,
}

/// Contents of a store as read at the start of a merge.
#[derive(Debug, Default)]
struct LoadedBatches {
    union: HashSet<String>,
    partial: Option<PartialBatch>,
}

#[derive(Debug, Clone)]
pub struct BatchStore {
    root: PathBuf,
    genre: String,
    kind: RecordKind,
    index_name: String,
    batch_size: usize,
    stamp_offset: FixedOffset,
    lock_settings: LockSettings,
}

impl BatchStore {
    /// Store rooted at `root` whose index is `root/index_name`.
    #[must_use]
    pub fn new(
        root: impl Into<PathBuf>,
        genre: impl Into<String>,
        kind: RecordKind,
        index_name: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            genre: genre.into(),
            kind,
            index_name: index_name.into(),
            batch_size: DEFAULT_BATCH_SIZE,
            stamp_offset: FixedOffset::east_opt(DEFAULT_UTC_OFFSET_MINUTES * 60)
                .unwrap_or_else(|| Utc.fix()),
            lock_settings: LockSettings::default(),
        }
    }

    /// Store for `genre`/`kind` as described by `config`.
    pub fn from_config(config: &Config, genre: &GenreConfig, kind: RecordKind) -> Result<Self> {
        Ok(Self::new(
            config.base_path.clone(),
            genre.id.clone(),
            kind,
            genre.index_file(kind),
        )
        .with_batch_size(config.batch_size)?
        .with_stamp_offset(config.stamp_offset()?)
        .with_lock_settings(config.lock.clone()))
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(CatalogError::Configuration {
                reason: "batch_size must be non-zero".into(),
            });
        }
        self.batch_size = batch_size;
        Ok(self)
    }

    #[must_use]
    pub fn with_stamp_offset(mut self, offset: FixedOffset) -> Self {
        self.stamp_offset = offset;
        self
    }

    #[must_use]
    pub fn with_lock_settings(mut self, settings: LockSettings) -> Self {
        self.lock_settings = settings;
        self
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn genre(&self) -> &str {
        &self.genre
    }

    #[must_use]
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    #[must_use]
    pub fn index_path(&self) -> PathBuf {
        self.root.join(&self.index_name)
    }

    fn lock(&self) -> Result<FileLock> {
        if !self.root.is_dir() {
            return Err(CatalogError::MissingFile {
                path: self.root.clone(),
            });
        }
        let path = self.root.join(lock_file_name(&self.index_name));
        FileLock::acquire(&path, &self.lock_settings)
    }

    /// Create an empty index unless one exists. Returns whether it was created.
    pub fn init(&self) -> Result<bool> {
        let _lock = self.lock()?;
        let created = create_empty_if_absent(&self.index_path())?;
        if created {
            tracing::info!(
                target = "catalog::store",
                index = %self.index_path().display(),
                "created empty batch index"
            );
        }
        Ok(created)
    }

    /// Batch file names in index order.
    pub fn batch_names(&self) -> Result<Vec<String>> {
        read_lines(&self.index_path())
    }

    /// Unique records of one batch file, in file order.
    pub fn load_batch(&self, name: &str) -> Result<Vec<String>> {
        let mut seen = HashSet::new();
        let records: Vec<String> = read_lines(&self.root.join(name))?
            .into_iter()
            .filter(|record| seen.insert(record.clone()))
            .collect();
        Ok(records)
    }

    fn load_batches(&self, names: &[String]) -> Result<LoadedBatches> {
        let mut loaded = LoadedBatches::default();
        for (position, name) in names.iter().enumerate() {
            let records = self.load_batch(name)?;
            if records.len() > self.batch_size {
                tracing::warn!(
                    target = "catalog::store",
                    batch = %name,
                    len = records.len(),
                    capacity = self.batch_size,
                    "batch exceeds capacity; treating it as full"
                );
            }
            if position + 1 == names.len() && records.len() < self.batch_size {
                loaded.partial = Some(PartialBatch {
                    name: name.clone(),
                    records: records.clone(),
                });
            }
            loaded.union.extend(records);
        }
        Ok(loaded)
    }

    /// Fold `records` into the store. Records already persisted in any batch are ignored, as are
    /// empty strings, so repeating a merge with the same input writes nothing.
    pub fn merge<I, S>(&self, records: I) -> Result<MergeReport>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let _lock = self.lock()?;
        let index_path = self.index_path();
        let stamp = next_stamp(self.stamp_offset);
        let mut report = MergeReport::default();

        let mut names = read_lines(&index_path)?;
        if names.is_empty() {
            let name = batch_file_name(&self.genre, self.kind, 1, &stamp);
            write_lines_atomic(&self.root.join(&name), std::iter::empty::<&str>())?;
            append_lines(&index_path, [&name])?;
            tracing::info!(
                target = "catalog::store",
                genre = %self.genre,
                kind = %self.kind,
                batch = %name,
                "bootstrapped empty batch index"
            );
            names.push(name);
            report.bootstrapped = true;
        }

        let loaded = self.load_batches(&names)?;
        report.existing_batches = names.len();
        report.existing_records = loaded.union.len();

        let mut offered = BTreeSet::new();
        for record in records {
            let record = record.as_ref();
            if record.is_empty() {
                continue;
            }
            if !is_storable(record) {
                tracing::warn!(
                    target = "catalog::store",
                    genre = %self.genre,
                    kind = %self.kind,
                    record = ?record,
                    "record cannot be stored as one line; skipping"
                );
                report.rejected += 1;
                continue;
            }
            offered.insert(record.to_string());
        }
        report.offered = offered.len();
        let delta: Vec<String> = offered
            .into_iter()
            .filter(|record| !loaded.union.contains(record))
            .collect();
        report.delta = delta.len();

        if delta.is_empty() {
            tracing::debug!(
                target = "catalog::store",
                genre = %self.genre,
                kind = %self.kind,
                offered = report.offered,
                "no new records"
            );
            return Ok(report);
        }

        let audit_name = audit_file_name(&self.genre, self.kind, &stamp);
        write_lines_atomic(&self.root.join(&audit_name), &delta)?;
        report.audit_file = Some(audit_name);

        let mut pending = delta.into_iter().peekable();

        if let Some(mut partial) = loaded.partial {
            let room = self.batch_size.saturating_sub(partial.records.len());
            let before = partial.records.len();
            partial.records.extend(pending.by_ref().take(room));
            report.topped_off = partial.records.len() - before;
            if report.topped_off > 0 {
                write_lines_atomic(&self.root.join(&partial.name), &partial.records)?;
                tracing::debug!(
                    target = "catalog::store",
                    batch = %partial.name,
                    added = report.topped_off,
                    len = partial.records.len(),
                    "topped off partial batch"
                );
            }
        }

        let mut sequence = names.len();
        while pending.peek().is_some() {
            sequence += 1;
            let chunk: Vec<String> = pending.by_ref().take(self.batch_size).collect();
            let name = batch_file_name(&self.genre, self.kind, sequence, &stamp);
            write_lines_atomic(&self.root.join(&name), &chunk)?;
            append_lines(&index_path, [&name])?;
            tracing::debug!(
                target = "catalog::store",
                batch = %name,
                len = chunk.len(),
                "created batch"
            );
            report.created_batches.push(name);
        }

        tracing::info!(
            target = "catalog::store",
            genre = %self.genre,
            kind = %self.kind,
            delta = report.delta,
            topped_off = report.topped_off,
            created = report.created_batches.len(),
            "merge complete"
        );
        Ok(report)
    }

    /// Counts of the persisted contents.
    pub fn stats(&self) -> Result<StoreStats> {
        let _lock = self.lock()?;
        let names = self.batch_names()?;
        let loaded = self.load_batches(&names)?;
        Ok(StoreStats {
            batches: names.len(),
            records: loaded.union.len(),
            partial_batch_len: loaded.partial.map(|partial| partial.records.len()),
        })
    }

    /// Check capacity and uniqueness invariants without writing anything.
    pub fn verify(&self) -> Result<VerificationReport> {
        let _lock = self.lock()?;
        let names = self.batch_names()?;
        let mut owners: HashMap<String, usize> = HashMap::new();
        let mut violations = Vec::new();
        let mut partial_batch_len = None;

        for (position, name) in names.iter().enumerate() {
            let records = match self.load_batch(name) {
                Ok(records) => records,
                Err(CatalogError::MissingFile { .. }) => {
                    violations.push(Violation::MissingBatch {
                        batch: name.clone(),
                    });
                    continue;
                }
                Err(err) => return Err(err),
            };

            let is_last = position + 1 == names.len();
            let len = records.len();
            if len > self.batch_size {
                violations.push(Violation::OverCapacity {
                    batch: name.clone(),
                    len,
                });
            } else if len < self.batch_size {
                if is_last {
                    partial_batch_len = Some(len);
                } else {
                    violations.push(Violation::UnderfilledBatch {
                        batch: name.clone(),
                        len,
                    });
                }
            }

            for record in records {
                if let Some(&first) = owners.get(&record) {
                    violations.push(Violation::DuplicateRecord {
                        record,
                        first: names[first].clone(),
                        second: name.clone(),
                    });
                } else {
                    owners.insert(record, position);
                }
            }
        }

        if !violations.is_empty() {
            tracing::warn!(
                target = "catalog::store",
                index = %self.index_path().display(),
                violations = violations.len(),
                "store verification found problems"
            );
        }

        Ok(VerificationReport {
            index: self.index_path(),
            stats: StoreStats {
                batches: names.len(),
                records: owners.len(),
                partial_batch_len,
            },
            violations,
        })
    }
}

/// A record survives a write/read cycle unchanged only if it has no line terminators and does not
/// start with a byte-order mark.
fn is_storable(record: &str) -> bool {
    !record.contains(['\n', '\r']) && !record.starts_with('\u{feff}')
}
