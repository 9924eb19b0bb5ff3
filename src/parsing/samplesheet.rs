//! Parser for Illumina Experiment Manager sample sheets.
//!
//! Two dialects exist. The plain CSV dialect (IEM v3 and older) is one flat
//! table whose final row is a comment carrying the chemistry:
//!
//! ```text
//! FCID,Lane,SampleID,SampleRef,Index,Description,Control,Recipe,Operator,SampleProject
//! H0EPTADXX,1,s1,hg19,ACGTAC,,N,,ops,ProjA
//! #_IEMVERSION_3_TruSeq LT,,,,,,,,,
//! ```
//!
//! The INI-style dialect (IEM v4) has bracketed sections, with the chemistry
//! in `[Header]` and the sample table after `[Data]`:
//!
//! ```text
//! [Header],,,,
//! IEMFileVersion,4,,,
//! Assay,TruSeq LT,,,
//! [Reads],,,,
//! 151,,,,
//! [Data],,,,
//! Lane,Sample_ID,Sample_Name,index,Sample_Project
//! 1,s1,s1,ACGTAC,ProjA
//! ```

use serde::Serialize;
use std::path::Path;
use tracing::debug;

use crate::core::sample::{SampleRow, SAMPLE_PROJECT_COLUMN};
use crate::core::types::SampleSheetDialect;
use crate::error::{read_text, MetadataError};
use crate::utils::validation::{
    check_entry_limit, lines_with_terminators, normalize_column_key, strip_terminator,
    MAX_SAMPLE_ROWS,
};

/// Marker on the first line of an IEM v4 sample sheet
pub const INI_HEADER_MARKER: &str = "[Header]";

/// Marker of the section holding the sample table
pub const DATA_SECTION_MARKER: &str = "[Data]";

/// A parsed sample sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleSheet {
    pub dialect: SampleSheetDialect,

    /// Data rows, in file order
    pub rows: Vec<SampleRow>,

    /// Terminator chemistry (e.g. `TruSeq LT`), if the sheet records it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chemistry: Option<String>,
}

/// Detect the dialect from the first line of a sample sheet
#[must_use]
pub fn detect_dialect(first_line: &str) -> SampleSheetDialect {
    if first_line.contains(INI_HEADER_MARKER) {
        SampleSheetDialect::IniStyleV4
    } else {
        SampleSheetDialect::LegacyCsv
    }
}

/// Parse a sample sheet file
///
/// # Errors
///
/// Returns `MetadataError::NotFound`/`MetadataError::Io` if the file cannot be
/// read, or other parse errors if the content is invalid. Table errors come
/// wrapped in `MetadataError::InFile` so they name the sheet.
pub fn parse_samplesheet_file(path: &Path) -> Result<SampleSheet, MetadataError> {
    let text = read_text(path)?;
    let sheet = parse_samplesheet_text(&text).map_err(|e| match e {
        MetadataError::InvalidFormat(msg) => {
            MetadataError::InvalidFormat(format!("{}: {msg}", path.display()))
        }
        other @ (MetadataError::Csv(_) | MetadataError::TooManyEntries { .. }) => {
            other.in_file(path)
        }
        other => other,
    })?;

    debug!(
        path = %path.display(),
        dialect = %sheet.dialect,
        samples = sheet.rows.len(),
        "Parsed sample sheet"
    );
    Ok(sheet)
}

/// Parse sample sheet text of either dialect
///
/// # Errors
///
/// Returns `MetadataError::InvalidFormat` if the text is empty or an INI-style
/// sheet has no `[Data]` section, `MetadataError::Csv` if the table is
/// malformed, or `MetadataError::TooManyEntries` if the row limit is exceeded.
pub fn parse_samplesheet_text(text: &str) -> Result<SampleSheet, MetadataError> {
    let first_line = lines_with_terminators(text)
        .next()
        .filter(|_| !text.trim().is_empty())
        .map(strip_terminator)
        .ok_or_else(|| MetadataError::InvalidFormat("sample sheet is empty".to_string()))?;

    match detect_dialect(first_line) {
        SampleSheetDialect::IniStyleV4 => parse_ini_style(text),
        SampleSheetDialect::LegacyCsv => parse_legacy(text),
    }
}

/// Name of a bracketed section header line, e.g. `Data` for `[Data],,,`
fn section_name(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('[')?;
    rest.split(']').next()
}

fn parse_ini_style(text: &str) -> Result<SampleSheet, MetadataError> {
    let mut section: Option<&str> = None;
    let mut chemistry: Option<String> = None;
    let mut offset = 0;
    let mut data_start = None;

    for line in lines_with_terminators(text) {
        offset += line.len();
        let content = strip_terminator(line);

        if let Some(name) = section_name(content) {
            section = Some(name);
        }

        // The first Assay line in [Header] wins
        if section == Some("Header") && chemistry.is_none() && content.starts_with("Assay,") {
            chemistry = content
                .split(',')
                .nth(1)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string);
        }

        if section == Some("Data") {
            data_start = Some(offset);
            break;
        }
    }

    let data_start = data_start.ok_or_else(|| {
        MetadataError::InvalidFormat(format!("no {DATA_SECTION_MARKER} section in sample sheet"))
    })?;

    let (_, rows) = read_table(&text[data_start..])?;

    Ok(SampleSheet {
        dialect: SampleSheetDialect::IniStyleV4,
        rows,
        chemistry,
    })
}

fn parse_legacy(text: &str) -> Result<SampleSheet, MetadataError> {
    let (columns, mut rows) = read_table(text)?;

    // The final row is the IEM version comment, e.g. `#_IEMVERSION_3_TruSeq LT`
    let chemistry = rows.pop().and_then(|sentinel| {
        let first = columns.first()?;
        sentinel
            .get(first)?
            .rsplit('_')
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    });

    Ok(SampleSheet {
        dialect: SampleSheetDialect::LegacyCsv,
        rows,
        chemistry,
    })
}

/// Read a header-labelled CSV table into rows with normalized keys.
///
/// Every row gets every column; short rows are padded with empty values.
/// Rows whose fields are all empty (trailing `,,,,` lines) are skipped.
fn read_table(text: &str) -> Result<(Vec<String>, Vec<SampleRow>), MetadataError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(normalize_column_key)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        check_entry_limit(rows.len(), MAX_SAMPLE_ROWS, "sample rows")?;

        let row: SampleRow = columns
            .iter()
            .enumerate()
            .map(|(i, column)| (column.clone(), record.get(i).unwrap_or("").to_string()))
            .collect();
        rows.push(row);
    }

    Ok((columns, rows))
}

/// Extract the lines of a sample sheet relevant to one project
///
/// # Errors
///
/// Returns `MetadataError::NotFound`/`MetadataError::Io` if the file cannot be
/// read, or the errors of [`filter_samplesheet_text`].
pub fn filter_samplesheet_by_project(
    path: &Path,
    project: &str,
    project_column: &str,
) -> Result<Vec<String>, MetadataError> {
    let text = read_text(path)?;
    filter_samplesheet_text(&text, project, project_column)
}

/// Extract the table header line, plus every data row whose project column
/// equals `project` and every comment line (`#...`).
///
/// Lines are returned verbatim, each with its original line terminator, so
/// the excerpt can be written out byte-for-byte. For INI-style sheets the
/// sections before `[Data]` are dropped. The project column is located with
/// underscores ignored, so `Sample_Project` matches `SampleProject`.
///
/// # Errors
///
/// Returns `MetadataError::InvalidFormat` if the text is empty or an INI-style
/// sheet has no table after `[Data]`, or `MetadataError::MissingColumn` if the
/// header has no project column.
pub fn filter_samplesheet_text(
    text: &str,
    project: &str,
    project_column: &str,
) -> Result<Vec<String>, MetadataError> {
    let empty = || MetadataError::InvalidFormat("sample sheet is empty".to_string());
    let no_data = || {
        MetadataError::InvalidFormat(format!(
            "no sample table after {DATA_SECTION_MARKER} in sample sheet"
        ))
    };

    let mut lines = lines_with_terminators(text);
    let mut header = lines.next().ok_or_else(empty)?;

    if header.contains(INI_HEADER_MARKER) {
        while !header.contains(DATA_SECTION_MARKER) {
            header = lines.next().ok_or_else(no_data)?;
        }
        header = lines.next().ok_or_else(no_data)?;
    }

    let wanted = normalize_column_key(project_column);
    let column = strip_terminator(header)
        .trim()
        .split(',')
        .map(normalize_column_key)
        .position(|label| label == wanted)
        .ok_or_else(|| MetadataError::MissingColumn(project_column.to_string()))?;

    let mut excerpt = vec![header.to_string()];
    for line in lines {
        let content = strip_terminator(line).trim();
        if content.starts_with('#') || content.split(',').nth(column) == Some(project) {
            excerpt.push(line.to_string());
        }
    }

    Ok(excerpt)
}

/// [`filter_samplesheet_by_project`] using the standard `SampleProject` column
///
/// # Errors
///
/// See [`filter_samplesheet_by_project`].
pub fn filter_samplesheet_by_default_project_column(
    path: &Path,
    project: &str,
) -> Result<Vec<String>, MetadataError> {
    filter_samplesheet_by_project(path, project, SAMPLE_PROJECT_COLUMN)
}

#[cfg(test)]
mod tests {
    use super::*;

    const IEM_V4: &str = "[Header],,,,\r\n\
IEMFileVersion,4,,,\r\n\
Investigator Name,Jo,,,\r\n\
Assay,TruSeq LT,,,\r\n\
[Reads],,,,\r\n\
151,,,,\r\n\
151,,,,\r\n\
[Settings],,,,\r\n\
[Data],,,,\r\n\
Lane,Sample_ID,Sample_Name,index,Sample_Project\r\n\
1,s1,s1,ACGTAC,ProjA\r\n\
1,s2,s2,TTAGGC,ProjB\r\n\
2,s3,s3,CGATGT,ProjA\r\n";

    const LEGACY: &str = "FCID,Lane,SampleID,SampleRef,Index,Description,Control,Recipe,Operator,SampleProject\r\n\
H0EPTADXX,1,s1,hg19,ACGTAC,,N,,ops,ProjA\r\n\
H0EPTADXX,1,s2,hg19,TTAGGC,,N,,ops,ProjB\r\n\
#_IEMVERSION_3_TruSeq LT,,,,,,,,,\r\n";

    #[test]
    fn test_detect_dialect() {
        assert_eq!(detect_dialect("[Header],,,,"), SampleSheetDialect::IniStyleV4);
        assert_eq!(detect_dialect("FCID,Lane"), SampleSheetDialect::LegacyCsv);
    }

    #[test]
    fn test_parse_iem_v4() {
        let sheet = parse_samplesheet_text(IEM_V4).unwrap();
        assert_eq!(sheet.dialect, SampleSheetDialect::IniStyleV4);
        assert_eq!(sheet.chemistry.as_deref(), Some("TruSeq LT"));
        assert_eq!(sheet.rows.len(), 3);

        let first = &sheet.rows[0];
        assert_eq!(first.sample_id(), Some("s1"));
        assert_eq!(first.project(), Some("ProjA"));
        assert_eq!(first.get("SampleName"), Some("s1"));
        assert!(first.get("Sample_ID").is_none());
    }

    #[test]
    fn test_iem_v4_rows_share_key_set() {
        let text = "[Header]\n[Data]\nLane,Sample_ID,Sample_Project,Description\n1,s1,P1\n1,s2,P1,desc,extra\n";
        let sheet = parse_samplesheet_text(text).unwrap();

        let keys: Vec<Vec<&str>> = sheet.rows.iter().map(|r| r.keys().collect()).collect();
        assert_eq!(keys[0], keys[1]);
        assert_eq!(sheet.rows[0].get("Description"), Some(""));
    }

    #[test]
    fn test_both_dialects_expose_same_keys() {
        let v4 = parse_samplesheet_text(IEM_V4).unwrap();
        let legacy = parse_samplesheet_text(LEGACY).unwrap();

        assert!(v4.rows[0].keys().any(|k| k == "SampleID"));
        assert!(legacy.rows[0].keys().any(|k| k == "SampleID"));
        assert!(v4.rows[0].keys().any(|k| k == "SampleProject"));
        assert!(legacy.rows[0].keys().any(|k| k == "SampleProject"));
    }

    #[test]
    fn test_first_assay_line_wins() {
        let text = "[Header]\nAssay,First\n[Header]\nAssay,Second\n[Data]\nSample_ID\ns1\n";
        let sheet = parse_samplesheet_text(text).unwrap();
        assert_eq!(sheet.chemistry.as_deref(), Some("First"));
    }

    #[test]
    fn test_assay_outside_header_ignored() {
        let text = "[Header]\nIEMFileVersion,4\n[Settings]\nAssay,Nope\n[Data]\nSample_ID\ns1\n";
        let sheet = parse_samplesheet_text(text).unwrap();
        assert!(sheet.chemistry.is_none());
    }

    #[test]
    fn test_iem_v4_without_data_section() {
        let text = "[Header],,\nAssay,TruSeq LT,,\n[Reads],,\n151,,\n";
        assert!(matches!(
            parse_samplesheet_text(text),
            Err(MetadataError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_empty_sample_sheet() {
        assert!(matches!(
            parse_samplesheet_text(""),
            Err(MetadataError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_samplesheet_text("\n\n"),
            Err(MetadataError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_parse_legacy() {
        let sheet = parse_samplesheet_text(LEGACY).unwrap();
        assert_eq!(sheet.dialect, SampleSheetDialect::LegacyCsv);
        assert_eq!(sheet.chemistry.as_deref(), Some("TruSeq LT"));
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[1].sample_id(), Some("s2"));
        assert_eq!(sheet.rows[1].get("FCID"), Some("H0EPTADXX"));
    }

    #[test]
    fn test_parse_legacy_skips_blank_trailing_rows() {
        let text = format!("{LEGACY},,,,,,,,,\r\n");
        let sheet = parse_samplesheet_text(&text).unwrap();
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.chemistry.as_deref(), Some("TruSeq LT"));
    }

    #[test]
    fn test_parse_is_idempotent() {
        assert_eq!(
            parse_samplesheet_text(IEM_V4).unwrap(),
            parse_samplesheet_text(IEM_V4).unwrap()
        );
    }

    #[test]
    fn test_filter_iem_v4_by_project() {
        let lines = filter_samplesheet_text(IEM_V4, "ProjA", "SampleProject").unwrap();
        assert_eq!(
            lines,
            vec![
                "Lane,Sample_ID,Sample_Name,index,Sample_Project\r\n",
                "1,s1,s1,ACGTAC,ProjA\r\n",
                "2,s3,s3,CGATGT,ProjA\r\n",
            ]
        );
    }

    #[test]
    fn test_filter_legacy_keeps_comment_lines() {
        let lines = filter_samplesheet_text(LEGACY, "ProjB", "SampleProject").unwrap();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("FCID,"));
        assert_eq!(lines[1], "H0EPTADXX,1,s2,hg19,TTAGGC,,N,,ops,ProjB\r\n");
        assert_eq!(lines[2], "#_IEMVERSION_3_TruSeq LT,,,,,,,,,\r\n");
    }

    #[test]
    fn test_filter_preserves_unix_line_endings() {
        let text = "SampleID,SampleProject\ns1,P1\ns2,P2\n";
        let lines = filter_samplesheet_text(text, "P2", "Sample_Project").unwrap();
        assert_eq!(lines, vec!["SampleID,SampleProject\n", "s2,P2\n"]);
    }

    #[test]
    fn test_parse_iem_v4_with_bare_carriage_returns() {
        let text = "[Header],,\rAssay,TruSeq LT,,\r[Data],,\rSample_ID,Sample_Project\rs1,P1\r";
        let sheet = parse_samplesheet_text(text).unwrap();
        assert_eq!(sheet.dialect, SampleSheetDialect::IniStyleV4);
        assert_eq!(sheet.chemistry.as_deref(), Some("TruSeq LT"));
        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(sheet.rows[0].sample_id(), Some("s1"));
        assert_eq!(sheet.rows[0].project(), Some("P1"));
    }

    #[test]
    fn test_parse_legacy_with_bare_carriage_returns() {
        let text = LEGACY.replace("\r\n", "\r");
        let sheet = parse_samplesheet_text(&text).unwrap();
        assert_eq!(sheet.dialect, SampleSheetDialect::LegacyCsv);
        assert_eq!(sheet.chemistry.as_deref(), Some("TruSeq LT"));
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[1].project(), Some("ProjB"));
    }

    #[test]
    fn test_filter_with_bare_carriage_returns() {
        let text = IEM_V4.replace("\r\n", "\r");
        let lines = filter_samplesheet_text(&text, "ProjB", "SampleProject").unwrap();
        assert_eq!(
            lines,
            vec![
                "Lane,Sample_ID,Sample_Name,index,Sample_Project\r",
                "1,s2,s2,TTAGGC,ProjB\r",
            ]
        );

        let text = LEGACY.replace("\r\n", "\r");
        let lines = filter_samplesheet_text(&text, "ProjA", "SampleProject").unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "H0EPTADXX,1,s1,hg19,ACGTAC,,N,,ops,ProjA\r");
        assert_eq!(lines[2], "#_IEMVERSION_3_TruSeq LT,,,,,,,,,\r");
    }

    #[test]
    fn test_table_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("SampleSheet.csv");
        let mut text = String::from("SampleID,SampleProject\n");
        for i in 0..=MAX_SAMPLE_ROWS {
            text.push_str(&format!("s{i},P\n"));
        }
        std::fs::write(&path, text).unwrap();

        let err = parse_samplesheet_file(&path).unwrap_err();
        assert!(matches!(
            &err,
            MetadataError::InFile { path: p, source }
                if p == &path && matches!(**source, MetadataError::TooManyEntries { .. })
        ));
        assert!(err.to_string().contains("SampleSheet.csv"));
    }

    #[test]
    fn test_filter_missing_project_column() {
        let text = "SampleID,Lane\ns1,1\n";
        assert!(matches!(
            filter_samplesheet_text(text, "P1", "SampleProject"),
            Err(MetadataError::MissingColumn(_))
        ));
    }
}
