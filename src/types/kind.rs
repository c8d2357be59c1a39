//! Record kinds carried by a catalog row.

use std::fmt;

use crate::constants::{AUTHOR_COLUMN, TITLE_COLUMN};

/// Which column of a catalog row a store holds.
///
/// Renders as `Author` / `Title`, the form used inside batch, audit, and index file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKind {
    Author,
    Title,
}

impl RecordKind {
    pub const ALL: [Self; 2] = [Self::Author, Self::Title];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Author => "Author",
            Self::Title => "Title",
        }
    }

    /// Zero-based column in data and blacklist rows.
    #[must_use]
    pub fn column(self) -> usize {
        match self {
            Self::Author => AUTHOR_COLUMN,
            Self::Title => TITLE_COLUMN,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
