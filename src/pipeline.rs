//! Per-genre driver: read, filter, normalize, dedup, and merge into the batch stores.
//!
//! Genres are processed one after another and fail independently; a broken input for one genre
//! is recorded in the [`RunReport`] while the remaining genres still run.

use std::path::PathBuf;

use crate::error::{CatalogError, Result};
use crate::filter::{dedup, filter_blacklisted};
use crate::reader::CatalogTable;
use crate::store::BatchStore;
use crate::text::TextNormalizer;
use crate::types::{
    Config, GenreConfig, GenreStatus, KindReport, RecordKind, VerificationReport,
};

/// Result of processing one genre.
#[derive(Debug)]
pub struct GenreOutcome {
    pub genre: String,
    pub result: Result<GenreStatus>,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<GenreOutcome>,
}

impl RunReport {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|outcome| outcome.result.is_ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &CatalogError)> {
        self.outcomes.iter().filter_map(|outcome| {
            outcome
                .result
                .as_ref()
                .err()
                .map(|err| (outcome.genre.as_str(), err))
        })
    }
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    config: Config,
    normalizer: TextNormalizer,
}

impl Pipeline {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let normalizer = config.normalizer();
        Ok(Self { config, normalizer })
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self, genre: &GenreConfig, kind: RecordKind) -> Result<BatchStore> {
        BatchStore::from_config(&self.config, genre, kind)
    }

    /// Genres named in `ids`, or every configured genre when `ids` is empty.
    pub fn select_genres(&self, ids: &[String]) -> Result<Vec<&GenreConfig>> {
        if ids.is_empty() {
            return Ok(self.config.genres.iter().collect());
        }
        ids.iter()
            .map(|id| {
                self.config
                    .genre(id)
                    .ok_or_else(|| CatalogError::Configuration {
                        reason: format!("unknown genre {id:?}"),
                    })
            })
            .collect()
    }

    /// Process every configured genre.
    #[must_use]
    pub fn run(&self) -> RunReport {
        self.run_selected(self.config.genres.iter())
    }

    pub fn run_selected<'a, I>(&self, genres: I) -> RunReport
    where
        I: IntoIterator<Item = &'a GenreConfig>,
    {
        let mut report = RunReport::default();
        for genre in genres {
            let result = self.process_genre(genre);
            if let Err(err) = &result {
                tracing::error!(
                    target = "catalog::pipeline",
                    genre = %genre.id,
                    error = %err,
                    "genre failed"
                );
            }
            report.outcomes.push(GenreOutcome {
                genre: genre.id.clone(),
                result,
            });
        }
        report
    }

    pub fn process_genre(&self, genre: &GenreConfig) -> Result<GenreStatus> {
        let data = CatalogTable::read(&self.config.base_path.join(genre.data_file()))?;
        let blacklist = CatalogTable::read(&self.config.base_path.join(genre.blacklist_file()))?;
        if data.is_empty() || blacklist.is_empty() {
            tracing::info!(
                target = "catalog::pipeline",
                genre = %genre.id,
                data_rows = data.len(),
                blacklist_rows = blacklist.len(),
                "empty input; skipping genre"
            );
            return Ok(GenreStatus::Skipped);
        }

        let mut kinds = Vec::with_capacity(RecordKind::ALL.len());
        for kind in RecordKind::ALL {
            kinds.push(self.process_kind(genre, kind, &data, &blacklist)?);
        }
        Ok(GenreStatus::Completed(kinds))
    }

    pub fn process_kind(
        &self,
        genre: &GenreConfig,
        kind: RecordKind,
        data: &CatalogTable,
        blacklist: &CatalogTable,
    ) -> Result<KindReport> {
        let column = kind.column();
        let short_rows = data.short_rows(column);
        if short_rows > 0 {
            tracing::debug!(
                target = "catalog::pipeline",
                genre = %genre.id,
                kind = %kind,
                short_rows,
                "rows without this column ignored"
            );
        }

        let raw: Vec<&str> = data.column(column).collect();
        let filtered: Vec<&str> = filter_blacklisted(blacklist.column(column), raw.iter().copied())
            .collect();
        let cleaned = dedup(self.normalizer.normalize_all(filtered.iter().copied()));

        let store = self.store(genre, kind)?;
        let merge = store.merge(&cleaned)?;

        tracing::info!(
            target = "catalog::pipeline",
            genre = %genre.id,
            kind = %kind,
            raw = raw.len(),
            filtered = filtered.len(),
            cleaned = cleaned.len(),
            new = merge.delta,
            "kind processed"
        );

        Ok(KindReport {
            kind,
            raw: raw.len(),
            filtered: filtered.len(),
            cleaned: cleaned.len(),
            merge,
        })
    }

    /// Create missing index files for the given genres. Returns the paths created.
    pub fn init_stores(&self, genres: &[&GenreConfig]) -> Result<Vec<PathBuf>> {
        let mut created = Vec::new();
        for genre in genres {
            for kind in RecordKind::ALL {
                let store = self.store(genre, kind)?;
                if store.init()? {
                    created.push(store.index_path());
                }
            }
        }
        Ok(created)
    }

    /// Verify every store of `genre`.
    pub fn verify_genre(&self, genre: &GenreConfig) -> Result<Vec<VerificationReport>> {
        RecordKind::ALL
            .into_iter()
            .map(|kind| self.store(genre, kind)?.verify())
            .collect()
    }
}
