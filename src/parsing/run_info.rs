//! Parser for the instrument's `RunInfo.xml`.
//!
//! ```xml
//! <RunInfo Version="2">
//!   <Run Id="130613_SNL177_0029_AH0EPTADXX" Number="29">
//!     <Flowcell>H0EPTADXX</Flowcell>
//!     <Instrument>SNL177</Instrument>
//!     <Date>130613</Date>
//!     <Reads>
//!       <Read Number="1" NumCycles="101" IsIndexedRead="N" />
//!       <Read Number="2" NumCycles="7" IsIndexedRead="Y" />
//!       <Read Number="3" NumCycles="101" IsIndexedRead="N" />
//!     </Reads>
//!     <FlowcellLayout LaneCount="2" SurfaceCount="2" SwathCount="2" TileCount="16" />
//!   </Run>
//! </RunInfo>
//! ```

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;
use std::path::Path;

use crate::error::{read_text, MetadataError};
use crate::parsing::xml::{get_attribute, parse_number, require_attribute};

pub const RUN_INFO_FILE: &str = "RunInfo.xml";

/// One read (biological or index) of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReadSpec {
    pub number: u32,
    pub num_cycles: u32,
    pub is_index: bool,
}

/// Physical layout of the flowcell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlowcellLayout {
    pub lane_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surface_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swath_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tile_count: Option<u32>,
}

/// Run-level fields from `RunInfo.xml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunInfo {
    pub run_id: String,
    pub run_number: u32,
    pub flowcell_id: String,
    pub instrument_id: String,

    /// Reads in document order
    pub reads: Vec<ReadSpec>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub flowcell_layout: Option<FlowcellLayout>,
}

impl RunInfo {
    /// Cycle counts of each read, index reads in parentheses: `151, (8), 151`
    #[must_use]
    pub fn read_cycles(&self) -> String {
        format_read_cycles(&self.reads)
    }
}

/// Format cycle counts of `reads` in order, wrapping index reads in parentheses
#[must_use]
pub fn format_read_cycles(reads: &[ReadSpec]) -> String {
    reads
        .iter()
        .map(|read| {
            if read.is_index {
                format!("({})", read.num_cycles)
            } else {
                read.num_cycles.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse `RunInfo.xml` in a run directory
///
/// # Errors
///
/// Returns `MetadataError::NotFound` if the file is absent, or the errors of
/// [`parse_run_info_file`].
pub fn parse_run_info(run_path: &Path) -> Result<RunInfo, MetadataError> {
    parse_run_info_file(&run_path.join(RUN_INFO_FILE))
}

/// Parse a `RunInfo.xml` file
///
/// # Errors
///
/// Returns `MetadataError::Xml` for malformed XML, `MetadataError::MissingField`
/// if the run id, number, flowcell or instrument is absent, or
/// `MetadataError::InvalidFormat` for non-numeric counts.
pub fn parse_run_info_file(path: &Path) -> Result<RunInfo, MetadataError> {
    let text = read_text(path)?;
    parse_run_info_xml(&text, path)
}

/// Parse `RunInfo.xml` content; `source` is only used in error messages
///
/// # Errors
///
/// See [`parse_run_info_file`].
pub fn parse_run_info_xml(xml: &str, source: &Path) -> Result<RunInfo, MetadataError> {
    #[derive(Clone, Copy)]
    enum TextField {
        Flowcell,
        Instrument,
    }

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut run_id = None;
    let mut run_number = None;
    let mut flowcell_id = None;
    let mut instrument_id = None;
    let mut reads = Vec::new();
    let mut flowcell_layout = None;
    let mut capture: Option<TextField> = None;

    loop {
        match reader
            .read_event()
            .map_err(|e| MetadataError::xml(source, e))?
        {
            Event::Start(ref e) => {
                capture = match e.name().as_ref() {
                    b"Flowcell" => Some(TextField::Flowcell),
                    b"Instrument" => Some(TextField::Instrument),
                    _ => None,
                };
                match e.name().as_ref() {
                    b"Run" => {
                        run_id = get_attribute(e, "Id", source)?;
                        run_number = get_attribute(e, "Number", source)?;
                    }
                    b"Read" => reads.push(parse_read(e, reads.len(), source)?),
                    b"FlowcellLayout" => flowcell_layout = Some(parse_layout(e, source)?),
                    _ => {}
                }
            }
            Event::Empty(ref e) => match e.name().as_ref() {
                b"Read" => reads.push(parse_read(e, reads.len(), source)?),
                b"FlowcellLayout" => flowcell_layout = Some(parse_layout(e, source)?),
                _ => {}
            },
            Event::Text(ref t) => {
                if let Some(field) = capture {
                    let value = t
                        .unescape()
                        .map_err(|e| MetadataError::xml(source, e))?
                        .into_owned();
                    match field {
                        TextField::Flowcell => flowcell_id = Some(value),
                        TextField::Instrument => instrument_id = Some(value),
                    }
                }
            }
            Event::End(_) => capture = None,
            Event::Eof => break,
            _ => {}
        }
    }

    let missing = |field: &str| MetadataError::missing_field(source.display().to_string(), field);

    let run_number = run_number.ok_or_else(|| missing("Run@Number"))?;

    Ok(RunInfo {
        run_id: run_id.ok_or_else(|| missing("Run@Id"))?,
        run_number: parse_number(&run_number, "Run@Number", source)?,
        flowcell_id: flowcell_id.ok_or_else(|| missing("Flowcell"))?,
        instrument_id: instrument_id.ok_or_else(|| missing("Instrument"))?,
        reads,
        flowcell_layout,
    })
}

fn parse_read(e: &BytesStart, position: usize, source: &Path) -> Result<ReadSpec, MetadataError> {
    let num_cycles = require_attribute(e, "Read", "NumCycles", source)?;
    let number = match get_attribute(e, "Number", source)? {
        Some(n) => parse_number(&n, "Read@Number", source)?,
        None => u32::try_from(position + 1).unwrap_or(u32::MAX),
    };

    Ok(ReadSpec {
        number,
        num_cycles: parse_number(&num_cycles, "Read@NumCycles", source)?,
        is_index: get_attribute(e, "IsIndexedRead", source)?.as_deref() == Some("Y"),
    })
}

fn parse_layout(e: &BytesStart, source: &Path) -> Result<FlowcellLayout, MetadataError> {
    let optional = |name: &str| -> Result<Option<u32>, MetadataError> {
        get_attribute(e, name, source)?
            .map(|v| parse_number(&v, &format!("FlowcellLayout@{name}"), source))
            .transpose()
    };

    let lane_count = require_attribute(e, "FlowcellLayout", "LaneCount", source)?;

    Ok(FlowcellLayout {
        lane_count: parse_number(&lane_count, "FlowcellLayout@LaneCount", source)?,
        surface_count: optional("SurfaceCount")?,
        swath_count: optional("SwathCount")?,
        tile_count: optional("TileCount")?,
    })
}
