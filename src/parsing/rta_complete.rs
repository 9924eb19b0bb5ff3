//! Parser for `RTAComplete.txt`, written when Real Time Analysis finishes.
//!
//! RTA 2.x writes `RTA 2.7.3 completed on 3/25/2016 3:31:22 AM`, RTA 1.x
//! writes `6/11/2014,20:00:49.935,Illumina RTA 1.17.20`.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::Path;

use crate::error::{read_text, MetadataError};

pub const RTA_COMPLETE_FILE: &str = "RTAComplete.txt";

/// Separator between version and timestamp in the RTA 2.x format
const COMPLETED_ON: &str = " completed on ";

/// Timestamp layouts seen in either format, tried in order
const TIMESTAMP_FORMATS: &[&str] = &[
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M:%S%.f %p",
];

/// When the run finished and which RTA version processed it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RtaCompletion {
    pub completed_at: NaiveDateTime,
    pub rta_version: String,
}

/// Parse `RTAComplete.txt` in a run directory
///
/// # Errors
///
/// Returns `MetadataError::NotFound` if the file is absent, or the errors of
/// [`parse_rta_complete_text`].
pub fn parse_rta_complete(run_path: &Path) -> Result<RtaCompletion, MetadataError> {
    let path = run_path.join(RTA_COMPLETE_FILE);
    let text = read_text(&path)?;
    parse_rta_complete_text(&text).map_err(|e| match e {
        MetadataError::InvalidFormat(msg) => {
            MetadataError::InvalidFormat(format!("{}: {msg}", path.display()))
        }
        other => other,
    })
}

/// Parse the first line of an `RTAComplete.txt`
///
/// # Errors
///
/// Returns `MetadataError::InvalidFormat` if the line matches neither format
/// or its timestamp cannot be parsed.
pub fn parse_rta_complete_text(text: &str) -> Result<RtaCompletion, MetadataError> {
    let line = text.lines().next().unwrap_or("").trim();
    let invalid = || MetadataError::InvalidFormat(format!("unrecognized completion line '{line}'"));

    let (day, time, version) = if line.starts_with("RTA") {
        let (version, when) = line.split_once(COMPLETED_ON).ok_or_else(invalid)?;
        let (day, time) = when.trim().split_once(' ').ok_or_else(invalid)?;
        (day, time, version)
    } else {
        let mut fields = line.splitn(3, ',');
        match (fields.next(), fields.next(), fields.next()) {
            (Some(day), Some(time), Some(version)) => (day, time, version),
            _ => return Err(invalid()),
        }
    };

    Ok(RtaCompletion {
        completed_at: parse_timestamp(day.trim(), time.trim())?,
        rta_version: version.trim().to_string(),
    })
}

fn parse_timestamp(day: &str, time: &str) -> Result<NaiveDateTime, MetadataError> {
    let stamp = format!("{day} {time}");
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&stamp, format).ok())
        .ok_or_else(|| MetadataError::InvalidFormat(format!("unrecognized timestamp '{stamp}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    #[test]
    fn test_parse_rta2_format() {
        let parsed = parse_rta_complete_text("RTA 2.7.3 completed on 3/25/2016 3:31:22 AM\n").unwrap();

        assert_eq!(parsed.rta_version, "RTA 2.7.3");
        assert_eq!(
            parsed.completed_at,
            NaiveDate::from_ymd_opt(2016, 3, 25)
                .unwrap()
                .and_hms_opt(3, 31, 22)
                .unwrap()
        );
    }

    #[test]
    fn test_parse_rta2_pm() {
        let parsed = parse_rta_complete_text("RTA 2.4.11 completed on 11/2/2017 10:05:01 PM").unwrap();
        assert_eq!(parsed.completed_at.hour(), 22);
    }

    #[test]
    fn test_parse_rta1_format() {
        let parsed = parse_rta_complete_text("6/11/2014,20:00:49.935,Illumina RTA 1.17.20\r\n").unwrap();

        assert_eq!(parsed.rta_version, "Illumina RTA 1.17.20");
        assert_eq!(
            parsed.completed_at.date(),
            NaiveDate::from_ymd_opt(2014, 6, 11).unwrap()
        );
        assert_eq!(parsed.completed_at.hour(), 20);
        assert_eq!(parsed.completed_at.second(), 49);
        assert_eq!(parsed.completed_at.nanosecond(), 935_000_000);
    }

    #[test]
    fn test_both_formats_yield_same_shape() {
        let a = parse_rta_complete_text("RTA 2.7.3 completed on 3/25/2016 3:31:22 AM").unwrap();
        let b = parse_rta_complete_text("3/25/2016,3:31:22,RTA 2.7.3").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unrecognized_line() {
        assert!(matches!(
            parse_rta_complete_text("all done"),
            Err(MetadataError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_rta_complete_text(""),
            Err(MetadataError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_rta_complete_text("RTA 2.7.3 completed on yesterday"),
            Err(MetadataError::InvalidFormat(_))
        ));
    }
}
