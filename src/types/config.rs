//! Run configuration loaded from TOML.
//!
//! Every field has a default so an empty file (or no file at all) describes the stock two-genre
//! setup. Nothing here is global: the pipeline hands the relevant pieces to each component.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::FixedOffset;
use serde::Deserialize;

use crate::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_MAX_LENGTH, DEFAULT_MAX_WORDS, DEFAULT_UTC_OFFSET_MINUTES,
    INDEX_FILE_INFIX, TEXT_FILE_EXTENSION,
};
use crate::error::{CatalogError, Result};
use crate::io::read_text;
use crate::lock::LockSettings;
use crate::text::TextNormalizer;
use crate::types::RecordKind;

fn default_base_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_max_length() -> usize {
    DEFAULT_MAX_LENGTH
}

fn default_max_words() -> usize {
    DEFAULT_MAX_WORDS
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_utc_offset_minutes() -> i32 {
    DEFAULT_UTC_OFFSET_MINUTES
}

fn default_genres() -> Vec<GenreConfig> {
    vec![GenreConfig::new("0"), GenreConfig::new("1")]
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Config {
    /// Directory holding inputs, batches, indexes, and audit files.
    #[serde(default = "default_base_path")]
    pub base_path: PathBuf,
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    #[serde(default = "default_max_words")]
    pub max_words: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Offset applied to file name stamps.
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,
    #[serde(default)]
    pub lock: LockSettings,
    #[serde(default = "default_genres")]
    pub genres: Vec<GenreConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
            max_length: DEFAULT_MAX_LENGTH,
            max_words: DEFAULT_MAX_WORDS,
            batch_size: DEFAULT_BATCH_SIZE,
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
            lock: LockSettings::default(),
            genres: default_genres(),
        }
    }
}

impl Config {
    /// Parse and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = read_text(path)?;
        let config: Self = toml::from_str(&text).map_err(|source| CatalogError::InvalidConfig {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_length == 0 {
            return Err(invalid("max_length must be non-zero"));
        }
        if self.max_words == 0 {
            return Err(invalid("max_words must be non-zero"));
        }
        if self.batch_size == 0 {
            return Err(invalid("batch_size must be non-zero"));
        }
        self.stamp_offset()?;

        let mut ids = HashSet::new();
        for genre in &self.genres {
            if genre.id.trim().is_empty() {
                return Err(invalid("genre id must not be empty"));
            }
            if !ids.insert(genre.id.as_str()) {
                return Err(invalid(format!("duplicate genre id {:?}", genre.id)));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn normalizer(&self) -> TextNormalizer {
        TextNormalizer::new(self.max_length, self.max_words)
    }

    pub fn stamp_offset(&self) -> Result<FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                invalid(format!(
                    "utc_offset_minutes {} is out of range",
                    self.utc_offset_minutes
                ))
            })
    }

    #[must_use]
    pub fn genre(&self, id: &str) -> Option<&GenreConfig> {
        self.genres.iter().find(|genre| genre.id == id)
    }
}

fn invalid(reason: impl Into<String>) -> CatalogError {
    CatalogError::Configuration {
        reason: reason.into(),
    }
}

/// Input files and index names for one genre. Paths are relative to `Config::base_path`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct GenreConfig {
    pub id: String,
    #[serde(default)]
    pub data_file: Option<PathBuf>,
    #[serde(default)]
    pub blacklist_file: Option<PathBuf>,
    /// Override for the author index name, e.g. `AuthorBatches0.txt`.
    #[serde(default)]
    pub author_index: Option<String>,
    #[serde(default)]
    pub title_index: Option<String>,
}

impl GenreConfig {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            data_file: None,
            blacklist_file: None,
            author_index: None,
            title_index: None,
        }
    }

    /// Defaults to `data<id>.txt`.
    #[must_use]
    pub fn data_file(&self) -> PathBuf {
        self.data_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("data{}{TEXT_FILE_EXTENSION}", self.id)))
    }

    /// Defaults to `<id>Blacklist.txt`.
    #[must_use]
    pub fn blacklist_file(&self) -> PathBuf {
        self.blacklist_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}Blacklist{TEXT_FILE_EXTENSION}", self.id)))
    }

    /// Defaults to `<id><Kind>Batches<id>.txt`.
    #[must_use]
    pub fn index_file(&self, kind: RecordKind) -> String {
        let configured = match kind {
            RecordKind::Author => self.author_index.as_ref(),
            RecordKind::Title => self.title_index.as_ref(),
        };
        configured.cloned().unwrap_or_else(|| {
            format!(
                "{id}{kind}{INDEX_FILE_INFIX}{id}{TEXT_FILE_EXTENSION}",
                id = self.id
            )
        })
    }
}
