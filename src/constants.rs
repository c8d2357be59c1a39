//! Default limits and file naming fragments.

/// Longest keyword the ad platform accepts, in characters.
pub const DEFAULT_MAX_LENGTH: usize = 80;
/// Most word tokens allowed in a single keyword.
pub const DEFAULT_MAX_WORDS: usize = 10;
/// Records per batch file.
pub const DEFAULT_BATCH_SIZE: usize = 1000;
/// UTC-08:00, US/Pacific standard time. Daylight saving time is not applied.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = -8 * 60;

pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_LOCK_POLL_MS: u64 = 25;

pub const BATCH_FILE_INFIX: &str = "_data_";
pub const AUDIT_FILE_PREFIX: &str = "inc_";
pub const INDEX_FILE_INFIX: &str = "Batches";
pub const TEXT_FILE_EXTENSION: &str = ".txt";
pub const LOCK_FILE_SUFFIX: &str = ".lock";

/// Column holding the author in both data and blacklist files.
pub const AUTHOR_COLUMN: usize = 1;
/// Column holding the title in both data and blacklist files.
pub const TITLE_COLUMN: usize = 2;
