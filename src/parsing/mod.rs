//! Parsers for the files an Illumina run and its demultiplexed output leave on disk.
//!
//! This module provides parsers for:
//!
//! - **Sample sheets**: IEM v3 plain CSV and IEM v4 INI-style, plus per-project excerpts
//! - **Read file names**: the ordered bcl2fastq naming templates
//! - **RunInfo.xml**: run id, number, flowcell, instrument and read layout
//! - **RTAComplete.txt**: completion timestamp and RTA version (both formats)
//! - **Config/*Effective.cfg**: flattened instrument configuration
//! - **DemultiplexConfig.xml**: demultiplexer version and command line (bcl2fastq 1.x)
//! - **FASTQ**: read counts and first read length of gzipped read files
//!
//! ## Example
//!
//! ```rust,no_run
//! use seqrun_meta::parsing::run_info::parse_run_info;
//! use seqrun_meta::parsing::samplesheet::parse_samplesheet_file;
//! use std::path::Path;
//!
//! let run = Path::new("/data/130613_SNL177_0029_AH0EPTADXX");
//! let info = parse_run_info(run).unwrap();
//! let sheet = parse_samplesheet_file(&run.join("SampleSheet.csv")).unwrap();
//!
//! println!("{} ({}): {} samples", info.run_id, info.read_cycles(), sheet.rows.len());
//! ```
//!
//! ## Read file names
//!
//! Templates are tried in this order; the first full match wins:
//!
//! | Template | Example |
//! |----------|---------|
//! | Undetermined | `lane1_Undetermined_L001_R1_001.fastq.gz` |
//! | Sample number | `NA10831_S1_L001_R1_001.fastq.gz` |
//! | Index sequence | `NA10831_ATCACG_L002_R1_001.fastq.gz` |

pub mod demultiplex_config;
pub mod fastq;
pub mod filename;
pub mod instrument_config;
pub mod rta_complete;
pub mod run_info;
pub mod samplesheet;

mod xml;
