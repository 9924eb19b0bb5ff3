//! Centralized validation and helper functions.

use crate::error::MetadataError;

/// Maximum number of sample rows accepted from a single sample sheet (DOS protection)
pub const MAX_SAMPLE_ROWS: usize = 100_000;

/// Maximum number of read files collected from a single output tree
pub const MAX_READ_FILES: usize = 1_000_000;

/// Normalize a sample sheet column label so both sample sheet dialects agree.
///
/// Underscores are removed, so `Sample_ID` and `SampleID` share a key.
///
/// # Examples
///
/// ```
/// use seqrun_meta::utils::validation::normalize_column_key;
///
/// assert_eq!(normalize_column_key("Sample_Project"), "SampleProject");
/// assert_eq!(normalize_column_key("SampleProject"), "SampleProject");
/// ```
#[must_use]
pub fn normalize_column_key(label: &str) -> String {
    label.replace('_', "")
}

/// Check if adding another entry would exceed `limit`.
///
/// Call this with the current count BEFORE adding a new entry.
///
/// # Errors
///
/// Returns `MetadataError::TooManyEntries` if the limit would be exceeded.
pub fn check_entry_limit(count: usize, limit: usize, kind: &'static str) -> Result<(), MetadataError> {
    if count >= limit {
        Err(MetadataError::TooManyEntries { kind, limit })
    } else {
        Ok(())
    }
}

/// Split text into lines, keeping each line's original terminator.
///
/// `\r\n`, `\n` and a lone `\r` all end a line. A final line without a
/// terminator is returned as-is.
pub fn lines_with_terminators(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }

        let end = match rest.find(['\r', '\n']) {
            Some(i) if rest[i..].starts_with("\r\n") => i + 2,
            Some(i) => i + 1,
            None => rest.len(),
        };
        let (line, tail) = rest.split_at(end);
        rest = tail;
        Some(line)
    })
}

/// Strip a trailing `\n`, `\r\n` or lone `\r` from a line.
#[must_use]
pub fn strip_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}
