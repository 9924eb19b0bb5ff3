//! Run-level metadata extraction.
//!
//! [`metadata::extract_run_metadata`] combines the run-level parsers, the
//! optional sample sheet and the demultiplexer identifier into one
//! [`metadata::RunMetadata`] record per run directory.

pub mod metadata;
