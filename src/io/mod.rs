//! Line-oriented UTF-8 file access shared by the reader and the batch store.

pub mod lines;

pub use lines::{append_lines, create_empty_if_absent, read_lines, read_text, write_lines_atomic};
