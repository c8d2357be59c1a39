//! Readers for catalog input files.

mod tsv;

pub use tsv::CatalogTable;
