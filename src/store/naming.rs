//! File names and generation stamps for batch, audit, and lock files.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, FixedOffset, Utc};

use crate::constants::{
    AUDIT_FILE_PREFIX, BATCH_FILE_INFIX, LOCK_FILE_SUFFIX, TEXT_FILE_EXTENSION,
};
use crate::types::RecordKind;

static LAST_STAMP_MICROS: AtomicI64 = AtomicI64::new(i64::MIN);

/// Microseconds since the epoch, strictly greater than any value previously returned in this
/// process.
fn next_micros() -> i64 {
    let now = Utc::now().timestamp_micros();
    let mut last = LAST_STAMP_MICROS.load(Ordering::SeqCst);
    loop {
        let next = now.max(last.saturating_add(1));
        match LAST_STAMP_MICROS.compare_exchange(last, next, Ordering::SeqCst, Ordering::SeqCst) {
            Ok(_) => return next,
            Err(observed) => last = observed,
        }
    }
}

/// A fresh generation stamp rendered in `offset`. Never repeats within a process.
#[must_use]
pub fn next_stamp(offset: FixedOffset) -> String {
    let instant = DateTime::from_timestamp_micros(next_micros()).unwrap_or_else(Utc::now);
    format_stamp(&instant.with_timezone(&offset))
}

/// `2024-03-01 09-15-02.000731-08-00`: ISO-like, with colons replaced so the stamp is safe in
/// file names.
#[must_use]
pub fn format_stamp(instant: &DateTime<FixedOffset>) -> String {
    instant
        .format("%Y-%m-%d %H:%M:%S%.6f%:z")
        .to_string()
        .replace(':', "-")
}

/// `<genre><Kind>_data_<sequence>_<stamp>.txt`
#[must_use]
pub fn batch_file_name(genre: &str, kind: RecordKind, sequence: usize, stamp: &str) -> String {
    format!("{genre}{kind}{BATCH_FILE_INFIX}{sequence}_{stamp}{TEXT_FILE_EXTENSION}")
}

/// `inc_<genre><Kind>_data_<stamp>.txt`
#[must_use]
pub fn audit_file_name(genre: &str, kind: RecordKind, stamp: &str) -> String {
    format!("{AUDIT_FILE_PREFIX}{genre}{kind}{BATCH_FILE_INFIX}{stamp}{TEXT_FILE_EXTENSION}")
}

#[must_use]
pub fn lock_file_name(index_name: &str) -> String {
    format!("{index_name}{LOCK_FILE_SUFFIX}")
}
