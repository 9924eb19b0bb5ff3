//! Core data types for run and sample metadata.
//!
//! This module provides the value objects every parser returns:
//!
//! - [`SampleRow`], [`SampleIndex`]: sample sheet rows and their keyed lookup
//! - [`ProjectMapping`]: read files grouped by project
//! - [`FilenameMatch`], [`SampleTag`]: identifiers recovered from read file names
//! - [`DemultiplexerInfo`], [`IdentificationTier`]: demultiplexing program detection
//! - [`SampleSheetDialect`]: the two sample sheet generations
//!
//! ## Sample sheet keys
//!
//! Column labels are normalized by removing underscores, so both dialects
//! expose the same keys:
//!
//! | IEM v4 (INI-style) | Legacy CSV | Normalized |
//! |--------------------|------------|------------|
//! | `Sample_ID`        | `SampleID` | `SampleID` |
//! | `Sample_Project`   | `SampleProject` | `SampleProject` |
//!
//! [`SampleRow`]: sample::SampleRow
//! [`SampleIndex`]: sample::SampleIndex
//! [`ProjectMapping`]: project::ProjectMapping
//! [`FilenameMatch`]: types::FilenameMatch
//! [`SampleTag`]: types::SampleTag
//! [`DemultiplexerInfo`]: types::DemultiplexerInfo
//! [`IdentificationTier`]: types::IdentificationTier
//! [`SampleSheetDialect`]: types::SampleSheetDialect

pub mod project;
pub mod sample;
pub mod types;
