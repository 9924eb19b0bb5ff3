//! Command-line interface for seqrun-meta.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **run**: Extract run-level metadata from an instrument run directory
//! - **samplesheet**: Parse a sample sheet, or print one project's excerpt
//! - **projects**: Group the read files of a demultiplexed output tree by project
//! - **demux**: Identify the demultiplexer that produced an output tree
//! - **filename**: Parse sample name, lane and read from read file names
//!
//! ## Usage
//!
//! ```text
//! # Run metadata, including the demultiplexer of its output
//! seqrun-meta run /data/130613_SNL177_0029_AH0EPTADXX --output-dir /data/out
//!
//! # Sample sheet rows as JSON
//! seqrun-meta samplesheet SampleSheet.csv --format json
//!
//! # Sample sheet excerpt for one project
//! seqrun-meta samplesheet SampleSheet.csv --project ProjA > ProjA.csv
//!
//! # Read files per project
//! seqrun-meta projects /data/out --format tsv
//! ```

use std::time::Duration;

use clap::{Parser, Subcommand};

pub mod demux;
pub mod filename;
pub mod projects;
pub mod run;
pub mod samplesheet;

#[derive(Parser)]
#[command(name = "seqrun-meta")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Extract run and sample metadata from Illumina sequencing runs")]
#[command(
    long_about = "seqrun-meta reads the files an Illumina instrument and bcl2fastq leave behind and reports structured metadata:\n- Run id, flowcell, instrument, read cycles and RTA version\n- Sample sheet rows and chemistry (IEM v3 and v4)\n- Read files grouped by project\n- The demultiplexer version and command line"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract run-level metadata from a run directory
    Run(run::RunArgs),

    /// Parse a sample sheet
    Samplesheet(samplesheet::SamplesheetArgs),

    /// Group read files of a demultiplexed output tree by project
    Projects(projects::ProjectsArgs),

    /// Identify the demultiplexer of an output tree
    Demux(demux::DemuxArgs),

    /// Parse read file names
    Filename(filename::FilenameArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Options for the bcl2fastq version query, shared by `run` and `demux`
#[derive(clap::Args, Debug, Clone)]
pub struct ProbeArgs {
    /// bcl2fastq binary queried when the output has no DemultiplexConfig.xml
    #[arg(long, default_value = crate::demux::identifier::DEFAULT_BCL2FASTQ_PATH)]
    pub bcl2fastq: std::path::PathBuf,

    /// Seconds to wait for `bcl2fastq --version`
    #[arg(long, default_value = "10")]
    pub probe_timeout: u64,
}

impl ProbeArgs {
    #[must_use]
    pub fn identifier_config(&self) -> crate::demux::identifier::IdentifierConfig {
        crate::demux::identifier::IdentifierConfig {
            binary_path: self.bcl2fastq.clone(),
            probe_timeout: Duration::from_secs(self.probe_timeout),
        }
    }
}

/// Render an optional value for text and TSV output
pub(crate) fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}
