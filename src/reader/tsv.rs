use std::path::Path;

use crate::Result;
use crate::io::read_text;

/// Rows of a header-less, tab-separated catalog file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogTable {
    rows: Vec<Vec<String>>,
}

impl CatalogTable {
    /// Read `path` as UTF-8. A missing file or invalid encoding is an error; a file without rows
    /// is not.
    pub fn read(path: &Path) -> Result<Self> {
        let text = read_text(path)?;
        let table = Self::parse(&text);
        tracing::debug!(
            target = "catalog::reader",
            path = %path.display(),
            rows = table.len(),
            "catalog file loaded"
        );
        Ok(table)
    }

    /// Blank lines are skipped.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let rows = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.split('\t').map(str::to_string).collect())
            .collect();
        Self { rows }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Non-empty cells of column `index`. Rows too short to have it contribute nothing.
    pub fn column(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .filter_map(move |row| row.get(index))
            .map(String::as_str)
            .filter(|cell| !cell.is_empty())
    }

    /// Rows lacking column `index`.
    #[must_use]
    pub fn short_rows(&self, index: usize) -> usize {
        self.rows.iter().filter(|row| row.len() <= index).count()
    }
}
