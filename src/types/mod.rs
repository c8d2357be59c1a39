//! Public types exposed by the `catalog-batcher` crate.

pub mod config;
pub mod kind;
pub mod report;

pub use config::{Config, GenreConfig};
pub use kind::RecordKind;
pub use report::{
    GenreStatus, KindReport, MergeReport, StoreStats, VerificationReport, Violation,
};
