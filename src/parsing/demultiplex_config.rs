//! Parser for `DemultiplexConfig.xml`, written by bcl2fastq 1.8.x.
//!
//! ```xml
//! <DemultiplexConfig>
//!   <Software Version="CASAVA-1.8.2"
//!             CmdAndArgs="configureBclToFastq.pl --input-dir ./BaseCalls --output-dir ./out" />
//! </DemultiplexConfig>
//! ```
//!
//! yields version `CASAVA 1.8.2`, version number `1.8.2` and command line
//! options `--input-dir ./BaseCalls --output-dir ./out`.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::path::Path;

use crate::core::types::DemultiplexerInfo;
use crate::error::{read_text, MetadataError};
use crate::parsing::xml::require_attribute;

pub const DEMULTIPLEX_CONFIG_FILE: &str = "DemultiplexConfig.xml";

/// Parse `DemultiplexConfig.xml` in a demultiplexed output directory.
///
/// Returns `Ok(None)` if the file does not exist.
///
/// # Errors
///
/// Returns `MetadataError::Io` if the file exists but cannot be read, or the
/// errors of [`parse_demultiplex_config_xml`].
pub fn parse_demultiplex_config(output_path: &Path) -> Result<Option<DemultiplexerInfo>, MetadataError> {
    let path = output_path.join(DEMULTIPLEX_CONFIG_FILE);
    match read_text(&path) {
        Ok(xml) => parse_demultiplex_config_xml(&xml, &path).map(Some),
        Err(MetadataError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Parse `DemultiplexConfig.xml` content; `source` is only used in error messages
///
/// # Errors
///
/// Returns `MetadataError::Xml` for malformed XML, or
/// `MetadataError::MissingField` if there is no `Software` element with
/// `Version` and `CmdAndArgs` attributes.
pub fn parse_demultiplex_config_xml(
    xml: &str,
    source: &Path,
) -> Result<DemultiplexerInfo, MetadataError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    loop {
        match reader
            .read_event()
            .map_err(|e| MetadataError::xml(source, e))?
        {
            Event::Start(ref e) | Event::Empty(ref e) if e.name().as_ref() == b"Software" => {
                let version = require_attribute(e, "Software", "Version", source)?;
                let cmdline = require_attribute(e, "Software", "CmdAndArgs", source)?;
                return Ok(demultiplexer_info(&version, &cmdline));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Err(MetadataError::missing_field(
        source.display().to_string(),
        "Software",
    ))
}

fn demultiplexer_info(raw_version: &str, cmd_and_args: &str) -> DemultiplexerInfo {
    // Drop the executable name
    let commandline_options = cmd_and_args
        .trim()
        .split_once(' ')
        .map(|(_, args)| args.trim().to_string())
        .filter(|args| !args.is_empty());

    DemultiplexerInfo::from_version(raw_version.replace('-', " "), commandline_options)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"<?xml version="1.0"?>
<DemultiplexConfig Version="1.0">
  <Software Version="bcl2fastq-1.8.4" CmdAndArgs="/usr/local/bin/configureBclToFastq.pl --input-dir ./Data/Intensities/BaseCalls --output-dir ./out --no-eamss" />
  <FlowcellInfo ID="H0EPTADXX" Operator="ops" Recipe="" SampleSheet="SampleSheet.csv" />
</DemultiplexConfig>
"#;

    fn source() -> &'static Path {
        Path::new(DEMULTIPLEX_CONFIG_FILE)
    }

    #[test]
    fn test_parse_demultiplex_config() {
        let info = parse_demultiplex_config_xml(CONFIG, source()).unwrap();

        assert_eq!(info.version, "bcl2fastq 1.8.4");
        assert_eq!(info.version_number, "1.8.4");
        assert_eq!(
            info.commandline_options.as_deref(),
            Some("--input-dir ./Data/Intensities/BaseCalls --output-dir ./out --no-eamss")
        );
    }

    #[test]
    fn test_command_without_arguments() {
        let xml = r#"<DemultiplexConfig><Software Version="CASAVA-1.8.2" CmdAndArgs="configureBclToFastq.pl"/></DemultiplexConfig>"#;
        let info = parse_demultiplex_config_xml(xml, source()).unwrap();
        assert_eq!(info.version, "CASAVA 1.8.2");
        assert!(info.commandline_options.is_none());
    }

    #[test]
    fn test_missing_software_element() {
        let xml = "<DemultiplexConfig><FlowcellInfo ID=\"x\"/></DemultiplexConfig>";
        assert!(matches!(
            parse_demultiplex_config_xml(xml, source()),
            Err(MetadataError::MissingField { .. })
        ));
    }

    #[test]
    fn test_absent_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(parse_demultiplex_config(dir.path()).unwrap().is_none());

        std::fs::write(dir.path().join(DEMULTIPLEX_CONFIG_FILE), CONFIG).unwrap();
        let info = parse_demultiplex_config(dir.path()).unwrap().unwrap();
        assert_eq!(info.version_number, "1.8.4");
    }
}
