//! Run-level metadata assembled from the files of one run directory.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, warn};

use crate::demux::identifier::{DemultiplexerIdentifier, IdentifierConfig};
use crate::error::MetadataError;
use crate::parsing::instrument_config::parse_instrument_config;
use crate::parsing::rta_complete::parse_rta_complete;
use crate::parsing::run_info::{parse_run_info, FlowcellLayout};
use crate::parsing::samplesheet::parse_samplesheet_file;

/// Name of the sample sheet the instrument copies into the run directory
pub const SAMPLESHEET_FILE: &str = "SampleSheet.csv";

/// Metadata of one sequencing run. Built once, never modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunMetadata {
    pub run_id: String,
    pub run_number: u32,
    pub flowcell_id: String,
    pub instrument_id: String,
    pub instrument_model: Option<String>,

    /// Cycle counts per read, index reads in parentheses: `151, (8), 151`
    pub read_cycles: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub flowcell_layout: Option<FlowcellLayout>,

    /// Terminator chemistry from the sample sheet
    pub chemistry: Option<String>,

    pub rta_version: String,
    pub completed_at: NaiveDateTime,

    /// Demultiplexer name and version, when an output directory was given
    pub demultiplexing_program: Option<String>,
    pub demultiplexing_commandline_options: Option<String>,

    /// True when the demultiplexer was only guessed from directory names
    pub demultiplexing_is_guess: Option<bool>,
}

/// Optional inputs for [`extract_run_metadata`]
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Sample sheet to read; defaults to `<run>/SampleSheet.csv` when that exists
    pub samplesheet: Option<PathBuf>,

    /// Demultiplexed output tree used to identify the demultiplexer
    pub demultiplexed_output: Option<PathBuf>,

    pub identifier: IdentifierConfig,
}

/// Run identifier of a run directory: its final path component.
///
/// ```
/// use seqrun_meta::run::metadata::run_id_from_path;
/// use std::path::Path;
///
/// assert_eq!(
///     run_id_from_path(Path::new("/data/runs/130613_SNL177_0029_AH0EPTADXX/")),
///     "130613_SNL177_0029_AH0EPTADXX"
/// );
/// ```
#[must_use]
pub fn run_id_from_path(run_path: &Path) -> String {
    run_path
        .file_name()
        .map_or_else(|| run_path.to_string_lossy(), |name| name.to_string_lossy())
        .into_owned()
}

/// Extract run metadata from a run directory.
///
/// `RunInfo.xml`, `RTAComplete.txt` and `Config/*Effective.cfg` are required.
///
/// # Errors
///
/// Returns `MetadataError::NotFound` if the run directory, a required file,
/// an explicitly given sample sheet or the demultiplexed output directory is
/// missing, or the parse error of the first file that fails.
pub fn extract_run_metadata(
    run_path: &Path,
    options: &ExtractOptions,
) -> Result<RunMetadata, MetadataError> {
    if !run_path.is_dir() {
        return Err(MetadataError::NotFound(run_path.to_path_buf()));
    }

    let run_info = parse_run_info(run_path)?;
    let completion = parse_rta_complete(run_path)?;
    let config = parse_instrument_config(run_path)?;

    let directory_id = run_id_from_path(run_path);
    if directory_id != run_info.run_id {
        warn!(
            directory = %directory_id,
            run_id = %run_info.run_id,
            "Run directory name differs from RunInfo.xml run id"
        );
    }

    let samplesheet = options.samplesheet.clone().or_else(|| {
        let default = run_path.join(SAMPLESHEET_FILE);
        default.is_file().then_some(default)
    });
    let chemistry = match samplesheet {
        Some(path) => parse_samplesheet_file(&path)?.chemistry,
        None => {
            debug!(run = %run_path.display(), "No sample sheet, chemistry unknown");
            None
        }
    };

    let demultiplexer = options
        .demultiplexed_output
        .as_deref()
        .map(|output| DemultiplexerIdentifier::new(&options.identifier).identify(output))
        .transpose()?;

    let read_cycles = run_info.read_cycles();
    let (demultiplexing_program, demultiplexing_commandline_options, demultiplexing_is_guess) =
        match demultiplexer {
            Some(found) => {
                let is_guess = found.is_guess();
                (
                    Some(found.info.version),
                    found.info.commandline_options,
                    Some(is_guess),
                )
            }
            None => (None, None, None),
        };

    Ok(RunMetadata {
        run_id: run_info.run_id,
        run_number: run_info.run_number,
        flowcell_id: run_info.flowcell_id,
        instrument_id: run_info.instrument_id,
        instrument_model: config.instrument_model().map(str::to_string),
        read_cycles,
        flowcell_layout: run_info.flowcell_layout,
        chemistry,
        rta_version: completion.rta_version,
        completed_at: completion.completed_at,
        demultiplexing_program,
        demultiplexing_commandline_options,
        demultiplexing_is_guess,
    })
}
