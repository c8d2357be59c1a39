//! Character substitution table applied before shortening.
//!
//! Each entry maps one code point to its replacement; an empty replacement deletes the character.
//! Characters without an entry pass through untouched.

use std::collections::HashMap;

use once_cell::sync::OnceCell;

/// Dashes and underscores become word breaks; accented letters fold to a plain ASCII letter.
pub const FOLDED: &[(char, &str)] = &[
    ('-', " "),
    ('_', " "),
    ('\u{2013}', " "), // en dash
    ('\u{2015}', " "), // horizontal bar
    ('`', " "),
    ('\u{2014}', " "), // em dash
    ('å', "a"),
    ('Á', "A"),
    ('é', "e"),
    ('ä', "a"),
    ('ñ', "n"),
    ('ć', "c"),
    ('ë', "e"),
    ('è', "e"),
    ('ó', "o"),
    ('ō', "o"),
    ('ø', "o"),
    ('á', "a"),
    ('Ñ', "N"),
    ('ã', "a"),
    ('ś', "s"),
    ('Ž', "Z"),
    ('Ø', "O"),
    ('æ', "a"),
    ('ě', "e"),
    ('š', "s"),
    ('ń', "n"),
    ('Ã', "A"),
    ('ò', "o"),
    ('ú', "u"),
    ('ö', "o"),
    ('ß', "b"),
    ('ç', "c"),
    ('ğ', "g"),
    ('Å', "A"),
    ('č', "c"),
    ('í', "i"),
    ('ž', "z"),
];

/// Punctuation and symbols the ad platform rejects.
pub const DELETED: &[char] = &[
    '.', ',', '<', '>', '(', ')', '{', '}', '[', ']', '\'', '"', '#', '@', '^', '!', '*', '?', ':',
    '/', '\\', '&', '\u{2019}', '™', ';', '~', '$', '♂', '|', '®', '+', '…', '´', '¡', '©', '%',
    '=', '′', '£', '“', '”', '·', '‘', '¿',
];

fn lookup() -> &'static HashMap<char, &'static str> {
    static TABLE: OnceCell<HashMap<char, &'static str>> = OnceCell::new();
    TABLE.get_or_init(|| {
        FOLDED
            .iter()
            .copied()
            .chain(DELETED.iter().map(|&ch| (ch, "")))
            .collect()
    })
}

/// Replacement for `ch`, or `None` when it passes through.
#[must_use]
pub fn substitute(ch: char) -> Option<&'static str> {
    lookup().get(&ch).copied()
}

/// Apply the table to every character of `input`.
#[must_use]
pub fn transliterate(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match substitute(ch) {
            Some(replacement) => out.push_str(replacement),
            None => out.push(ch),
        }
    }
    out
}
