//! Keyword normalization: transliteration, whitespace-bounded shortening, and word limits.

pub mod table;

use once_cell::sync::OnceCell;
use regex::Regex;

use crate::constants::{DEFAULT_MAX_LENGTH, DEFAULT_MAX_WORDS};

pub use table::{substitute, transliterate};

/// Collapse whitespace and keep as many leading words as fit in `width` characters.
///
/// Words are never split, so a first word longer than `width` yields an empty string.
#[must_use]
pub fn shorten(text: &str, width: usize) -> String {
    let mut out = String::new();
    let mut len = 0usize;
    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        let needed = if out.is_empty() {
            word_len
        } else {
            len + 1 + word_len
        };
        if needed > width {
            break;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
        len = needed;
    }
    out
}

/// Number of `\w+` runs in `text`.
#[must_use]
pub fn word_count(text: &str) -> usize {
    static WORD: OnceCell<std::result::Result<Regex, String>> = OnceCell::new();
    let regex = WORD.get_or_init(|| Regex::new(r"\w+").map_err(|err| err.to_string()));
    match regex {
        Ok(re) => re.find_iter(text).count(),
        Err(msg) => {
            tracing::error!(target = "catalog::text", error = %msg, "word regex init failed");
            0
        }
    }
}

/// Turns raw catalog strings into keywords that satisfy the length and word limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextNormalizer {
    max_length: usize,
    max_words: usize,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LENGTH, DEFAULT_MAX_WORDS)
    }
}

impl TextNormalizer {
    #[must_use]
    pub fn new(max_length: usize, max_words: usize) -> Self {
        Self {
            max_length,
            max_words,
        }
    }

    #[must_use]
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    #[must_use]
    pub fn max_words(&self) -> usize {
        self.max_words
    }

    /// Normalize one record. Returns `None` when nothing usable survives.
    ///
    /// Over-long keywords are shortened one character of budget at a time until the word count
    /// fits; only that first fitting truncation is returned.
    #[must_use]
    pub fn normalize(&self, record: &str) -> Option<String> {
        let cleaned = transliterate(record);
        let mut cut = shorten(&cleaned, self.max_length);

        let mut limit = self.max_length;
        while word_count(&cut) > self.max_words && limit > 0 {
            limit -= 1;
            cut = shorten(&cut, limit);
        }

        if cut.is_empty() { None } else { Some(cut) }
    }

    /// Normalize every record, dropping the ones that clean to nothing.
    pub fn normalize_all<'a, I>(&'a self, records: I) -> impl Iterator<Item = String> + 'a
    where
        I: IntoIterator + 'a,
        I::Item: AsRef<str>,
    {
        records
            .into_iter()
            .filter_map(move |record| self.normalize(record.as_ref()))
    }
}
