//! Summary statistics for gzip-compressed FASTQ read files.
//!
//! Files are streamed through a multi-member gzip decoder, so both plain
//! gzip and concatenated gzip members (as written by bcl2fastq) are read
//! to the end.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use tracing::debug;

use crate::error::MetadataError;

/// Lines per FASTQ record
const LINES_PER_RECORD: u64 = 4;

fn open_gzipped(path: &Path) -> Result<BufReader<MultiGzDecoder<File>>, MetadataError> {
    let file = File::open(path).map_err(|e| MetadataError::io(path, e))?;
    Ok(BufReader::new(MultiGzDecoder::new(file)))
}

/// Count the records of a gzip-compressed FASTQ file.
///
/// # Errors
///
/// Returns `MetadataError::NotFound` if the file is absent,
/// `MetadataError::Io` if it cannot be read or decompressed, or
/// `MetadataError::InvalidFormat` if the line count is not a multiple of four.
pub fn count_reads(path: &Path) -> Result<u64, MetadataError> {
    let mut reader = open_gzipped(path)?;
    let mut lines = 0u64;
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let n = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| MetadataError::io(path, e))?;
        if n == 0 {
            break;
        }
        lines += 1;
    }

    if lines % LINES_PER_RECORD != 0 {
        return Err(MetadataError::InvalidFormat(format!(
            "{}: {lines} lines is not a whole number of FASTQ records",
            path.display()
        )));
    }

    let reads = lines / LINES_PER_RECORD;
    debug!(path = %path.display(), reads, "Counted reads");
    Ok(reads)
}

/// Length of the first sequence in a gzip-compressed FASTQ file.
///
/// Returns `Ok(None)` for an empty file.
///
/// # Errors
///
/// Returns `MetadataError::NotFound` if the file is absent,
/// `MetadataError::Io` if it cannot be read or decompressed, or
/// `MetadataError::InvalidFormat` if the file does not start with a `@` header.
pub fn first_read_length(path: &Path) -> Result<Option<usize>, MetadataError> {
    let mut lines = open_gzipped(path)?.lines();

    let Some(header) = lines.next() else {
        return Ok(None);
    };
    let header = header.map_err(|e| MetadataError::io(path, e))?;
    if !header.starts_with('@') {
        return Err(MetadataError::InvalidFormat(format!(
            "{}: expected FASTQ header, found '{header}'",
            path.display()
        )));
    }

    match lines.next() {
        Some(sequence) => {
            let sequence = sequence.map_err(|e| MetadataError::io(path, e))?;
            Ok(Some(sequence.trim_end().len()))
        }
        None => Err(MetadataError::InvalidFormat(format!(
            "{}: truncated FASTQ record",
            path.display()
        ))),
    }
}
