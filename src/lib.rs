//! # seqrun-meta
//!
//! A library for extracting run and sample metadata from Illumina sequencing runs.
//!
//! An instrument run directory and the output of bcl2fastq hold the facts a
//! sequencing archive needs (run id, flowcell, read layout, chemistry, which
//! samples belong to which project, and how the reads were demultiplexed),
//! but spread over half a dozen files whose formats changed between
//! instrument software and bcl2fastq generations.
//!
//! `seqrun-meta` reads all of them and returns plain, serializable records.
//!
//! ## Features
//!
//! - **Sample sheets**: IEM v3 plain CSV and IEM v4 INI-style, detected automatically
//! - **Per-project excerpts**: byte-faithful sample sheet subsets for downstream tools
//! - **Read file names**: sample name, number or index, lane, read and set number
//! - **Output trees**: read files grouped by project, whichever layout bcl2fastq used
//! - **Run files**: `RunInfo.xml`, `RTAComplete.txt` and `Config/*Effective.cfg`
//! - **Demultiplexer**: identified from its config file, the installed binary, or
//!   (as a flagged guess) directory naming
//!
//! ## Example
//!
//! ```rust,no_run
//! use seqrun_meta::run::metadata::{extract_run_metadata, ExtractOptions};
//! use std::path::{Path, PathBuf};
//!
//! let options = ExtractOptions {
//!     demultiplexed_output: Some(PathBuf::from("/data/out")),
//!     ..ExtractOptions::default()
//! };
//! let run = extract_run_metadata(Path::new("/data/130613_SNL177_0029_AH0EPTADXX"), &options).unwrap();
//!
//! println!("{} on {}: {}", run.run_id, run.instrument_id, run.read_cycles);
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Core data types for sample rows, file name matches and project mappings
//! - [`parsing`]: Parsers for sample sheets, read file names and run-level files
//! - [`layout`]: Directory mapper for demultiplexed output trees
//! - [`demux`]: Demultiplexer identification
//! - [`run`]: Run-level metadata extraction
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod core;
pub mod demux;
pub mod error;
pub mod layout;
pub mod parsing;
pub mod run;
pub mod utils;

// Re-export commonly used types for convenience
pub use core::project::{ProjectMapping, UNDETERMINED_PROJECT};
pub use core::sample::{get_project_ids, SampleIndex, SampleRow};
pub use core::types::*;
pub use demux::identifier::{DemultiplexerIdentifier, Identified, IdentifierConfig};
pub use error::MetadataError;
pub use layout::mapper::{get_sample_project_mapping, MapperConfig};
pub use parsing::filename::FilenamePatterns;
pub use parsing::samplesheet::SampleSheet;
pub use run::metadata::{extract_run_metadata, ExtractOptions, RunMetadata};
