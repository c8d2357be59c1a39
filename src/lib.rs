#![deny(clippy::all, clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![cfg_attr(test, allow(clippy::uninlined_format_args))]
#![allow(clippy::module_name_repetitions)]
//
// Documentation lints: internal helpers are self-describing; public entry points carry docs.
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
//
// Return value wrapping: store operations return Result even where a path cannot fail today.
#![allow(clippy::unnecessary_wraps)]

//! Turns tab-separated author/title catalogs into ad-platform keywords and persists them as
//! capacity-bounded batch files with an append-only index, one store per genre and record kind.
//!
//! ```no_run
//! use catalog_batcher::{BatchStore, RecordKind};
//!
//! let store = BatchStore::new("/srv/keywords", "0", RecordKind::Author, "0AuthorBatches0.txt");
//! store.init()?;
//! let report = store.merge(["Alice", "Bob"])?;
//! assert_eq!(report.delta, 2);
//! # Ok::<(), catalog_batcher::CatalogError>(())
//! ```

/// The crate version (matches `Cargo.toml`).
pub const CATALOG_BATCHER_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod constants;
pub mod error;
pub mod filter;
pub mod io;
mod lock;
pub mod pipeline;
pub mod reader;
pub mod store;
pub mod text;
pub mod types;

pub use error::{CatalogError, Result};
pub use filter::{dedup, filter_blacklisted};
pub use lock::{FileLock, LockSettings};
pub use pipeline::{GenreOutcome, Pipeline, RunReport};
pub use reader::CatalogTable;
pub use store::BatchStore;
pub use text::{TextNormalizer, shorten, transliterate, word_count};
pub use types::{
    Config, GenreConfig, GenreStatus, KindReport, MergeReport, RecordKind, StoreStats,
    VerificationReport, Violation,
};
