//! Recover sample, lane, read and set identifiers from read file names.
//!
//! Illumina demultiplexers name read files
//! `<sample>_<tag>_L<lane>_R<read>_<set>.fastq.gz`, where `<tag>` is the
//! sample number (`S1`, bcl2fastq 2.x) or the index sequence (`ACGTAC`,
//! bcl2fastq 1.8.x). Undetermined reads have no tag.
//!
//! The templates are tried in a fixed order and the first one matching the
//! whole name wins:
//!
//! | # | Template | Example |
//! |---|----------|---------|
//! | 1 | `{sample_name}_Undetermined_{lane}_{read}_{set}` | `lane1_Undetermined_L001_R1_001.fastq.gz` |
//! | 2 | `{sample_name}_{sample_number}_{lane}_{read}_{set}` | `SampleA_S1_L001_R1_001.fastq.gz` |
//! | 3 | `{sample_name}_{index}_{lane}_{read}_{set}` | `NA10831_ATCACG_L002_R1_001.fastq.gz` |
//!
//! Order matters: the greedy sample name of templates 2 and 3 would also
//! swallow `_Undetermined`, and a tag can satisfy both 2 and 3, in which case
//! the newer tool's naming takes precedence.

use regex::{Captures, Regex};
use std::path::Path;
use tracing::debug;

use crate::core::types::{FilenameMatch, SampleTag};
use crate::error::MetadataError;

/// Default suffix of gzip-compressed FASTQ read files
pub const READ_FILE_SUFFIX: &str = ".fastq.gz";

const SEPARATOR: &str = "_";

const SAMPLE_NAME: &str = r"(?P<sample_name>.*)";
const UNDETERMINED_SAMPLE_NAME: &str = r"(?P<sample_name>.*_Undetermined)";
const INDEX: &str = r"(?P<index>[ATGC-]{6,33})";
const LANE: &str = r"L0{0,3}(?P<lane>\d+)";
const READ: &str = r"R(?P<read>\d)";
const SET_NUMBER: &str = r"(?P<set_number>\d+)";
const SAMPLE_NUMBER: &str = r"S(?P<sample_number>\d+)";

/// Naming scheme a template recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    /// `lane1_Undetermined_L001_R1_001`
    Undetermined,
    /// bcl2fastq 2.x: `SampleA_S1_L001_R1_001`
    SampleNumber,
    /// bcl2fastq 1.8.x: `SampleA_ACGTAC_L001_R1_001`
    IndexSequence,
}

impl TemplateKind {
    /// Named sub-patterns joined by `_`, in the order they appear in a name
    fn parts(self) -> &'static [&'static str] {
        match self {
            Self::Undetermined => &[UNDETERMINED_SAMPLE_NAME, LANE, READ, SET_NUMBER],
            Self::SampleNumber => &[SAMPLE_NAME, SAMPLE_NUMBER, LANE, READ, SET_NUMBER],
            Self::IndexSequence => &[SAMPLE_NAME, INDEX, LANE, READ, SET_NUMBER],
        }
    }
}

/// One compiled filename template
#[derive(Debug, Clone)]
pub struct FilenameTemplate {
    pub kind: TemplateKind,
    regex: Regex,
}

impl FilenameTemplate {
    fn compile(kind: TemplateKind, suffix: &str) -> Result<Self, MetadataError> {
        let pattern = format!(
            "^{}{}$",
            kind.parts().join(SEPARATOR),
            regex::escape(suffix)
        );
        Ok(Self {
            kind,
            regex: Regex::new(&pattern)?,
        })
    }

    /// Match a bare file name against this template
    ///
    /// # Errors
    ///
    /// Returns `MetadataError::MissingField` if the name matched but a field
    /// the template requires was not captured, or `MetadataError::InvalidFormat`
    /// if a numeric field does not fit in a `u32`.
    pub fn extract(&self, filename: &str) -> Result<Option<FilenameMatch>, MetadataError> {
        let Some(caps) = self.regex.captures(filename) else {
            return Ok(None);
        };

        let tag = match self.kind {
            TemplateKind::Undetermined => None,
            TemplateKind::SampleNumber => Some(SampleTag::Number(number(
                &caps,
                "sample_number",
                filename,
            )?)),
            TemplateKind::IndexSequence => Some(SampleTag::Index(
                field(&caps, "index", filename)?.to_string(),
            )),
        };

        Ok(Some(FilenameMatch {
            sample_name: field(&caps, "sample_name", filename)?.to_string(),
            tag,
            lane: number(&caps, "lane", filename)?,
            read: number(&caps, "read", filename)?,
            set_number: number(&caps, "set_number", filename)?,
        }))
    }
}

fn field<'t>(caps: &Captures<'t>, name: &str, filename: &str) -> Result<&'t str, MetadataError> {
    caps.name(name)
        .map(|m| m.as_str())
        .ok_or_else(|| MetadataError::missing_field(filename, name))
}

fn number(caps: &Captures<'_>, name: &str, filename: &str) -> Result<u32, MetadataError> {
    let raw = field(caps, name, filename)?;
    raw.parse().map_err(|_| {
        MetadataError::InvalidFormat(format!("{filename}: {name} '{raw}' is not a valid number"))
    })
}

/// The ordered template library for one read file suffix
#[derive(Debug, Clone)]
pub struct FilenamePatterns {
    suffix: String,
    templates: Vec<FilenameTemplate>,
}

impl FilenamePatterns {
    /// Templates matching names ending in `suffix`
    ///
    /// # Errors
    ///
    /// Returns `MetadataError::Pattern` if a template fails to compile.
    pub fn new(suffix: &str) -> Result<Self, MetadataError> {
        let templates = [
            TemplateKind::Undetermined,
            TemplateKind::SampleNumber,
            TemplateKind::IndexSequence,
        ]
        .into_iter()
        .map(|kind| FilenameTemplate::compile(kind, suffix))
        .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            suffix: suffix.to_string(),
            templates,
        })
    }

    /// Templates for `.fastq.gz` read files
    ///
    /// # Errors
    ///
    /// See [`FilenamePatterns::new`].
    pub fn fastq() -> Result<Self, MetadataError> {
        Self::new(READ_FILE_SUFFIX)
    }

    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn templates(&self) -> impl Iterator<Item = &FilenameTemplate> {
        self.templates.iter()
    }

    /// Match the file name of `path` against the templates in order.
    ///
    /// Returns `Ok(None)` if no template matches the whole name.
    ///
    /// # Errors
    ///
    /// See [`FilenameTemplate::extract`].
    pub fn parse(&self, path: impl AsRef<Path>) -> Result<Option<FilenameMatch>, MetadataError> {
        let filename = file_name(path.as_ref());

        for template in &self.templates {
            if let Some(found) = template.extract(&filename)? {
                debug!(filename = %filename, template = ?template.kind, "Matched read file name");
                return Ok(Some(found));
            }
        }

        Ok(None)
    }

    /// Sample identifier unique within a run: the file name without the suffix,
    /// e.g. `NA10831_ATCACG_L002_R1_001`
    #[must_use]
    pub fn sample_id(&self, path: impl AsRef<Path>) -> String {
        sample_id_from_filename(path, &self.suffix)
    }

    /// Short sample name of a read file, e.g. `NA10831`
    ///
    /// # Errors
    ///
    /// See [`FilenameTemplate::extract`].
    pub fn sample_name(&self, path: impl AsRef<Path>) -> Result<Option<String>, MetadataError> {
        Ok(self.parse(path)?.map(|m| m.sample_name))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.to_string_lossy(), |name| name.to_string_lossy())
        .into_owned()
}

/// Match a read file name using the `.fastq.gz` templates
///
/// # Errors
///
/// See [`FilenameTemplate::extract`].
pub fn parse_sample_info_from_filename(
    path: impl AsRef<Path>,
) -> Result<Option<FilenameMatch>, MetadataError> {
    FilenamePatterns::fastq()?.parse(path)
}

/// File name of `path` without `suffix`; unique within a run
#[must_use]
pub fn sample_id_from_filename(path: impl AsRef<Path>, suffix: &str) -> String {
    let filename = file_name(path.as_ref());
    match filename.split_once(suffix) {
        Some((stem, _)) => stem.to_string(),
        None => filename,
    }
}

/// Sample name of a read file named with `suffix`, if a template matches
///
/// # Errors
///
/// Returns `MetadataError::Pattern` if the templates fail to compile, or the
/// errors of [`FilenameTemplate::extract`].
pub fn sample_name_from_filename(
    path: impl AsRef<Path>,
    suffix: &str,
) -> Result<Option<String>, MetadataError> {
    FilenamePatterns::new(suffix)?.sample_name(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns() -> FilenamePatterns {
        FilenamePatterns::fastq().unwrap()
    }

    #[test]
    fn test_undetermined_template_wins() {
        let m = patterns()
            .parse("sample1_Undetermined_L001_R1_001.fastq.gz")
            .unwrap()
            .unwrap();

        assert_eq!(m.sample_name, "sample1_Undetermined");
        assert_eq!(m.tag, None);
        assert_eq!(m.lane, 1);
        assert_eq!(m.read, 1);
        assert_eq!(m.set_number, 1);
    }

    #[test]
    fn test_sample_number_template_before_index_template() {
        let m = patterns()
            .parse("SampleA_S1_L001_R1_001.fastq.gz")
            .unwrap()
            .unwrap();

        assert_eq!(m.sample_name, "SampleA");
        assert_eq!(m.sample_number(), Some(1));
        assert_eq!(m.index_sequence(), None);
    }

    #[test]
    fn test_index_sequence_template() {
        let m = patterns()
            .parse("15-02380-CE11-T13-L1_AACCAG_L002_R2_003.fastq.gz")
            .unwrap()
            .unwrap();

        assert_eq!(m.sample_name, "15-02380-CE11-T13-L1");
        assert_eq!(m.index_sequence(), Some("AACCAG"));
        assert_eq!(m.lane, 2);
        assert_eq!(m.read, 2);
        assert_eq!(m.set_number, 3);
    }

    #[test]
    fn test_dual_index_sequence() {
        let m = patterns()
            .parse("NA12878_ACGTAC-TTGGCA_L008_R1_001.fastq.gz")
            .unwrap()
            .unwrap();
        assert_eq!(m.index_sequence(), Some("ACGTAC-TTGGCA"));
        assert_eq!(m.lane, 8);
    }

    #[test]
    fn test_bcl2fastq2_undetermined_uses_sample_number_template() {
        let m = patterns()
            .parse("Undetermined_S0_L001_R1_001.fastq.gz")
            .unwrap()
            .unwrap();
        assert_eq!(m.sample_name, "Undetermined");
        assert_eq!(m.sample_number(), Some(0));
    }

    #[test]
    fn test_directory_components_ignored() {
        let m = patterns()
            .parse("ProjA/Sample_X/X_S2_L003_R2_001.fastq.gz")
            .unwrap()
            .unwrap();
        assert_eq!(m.sample_name, "X");
        assert_eq!(m.lane, 3);
    }

    #[test]
    fn test_no_template_matches() {
        assert!(patterns().parse("reads.fastq.gz").unwrap().is_none());
        assert!(patterns()
            .parse("SampleA_S1_L001_R1_001.fastq")
            .unwrap()
            .is_none());
        assert!(patterns()
            .parse("SampleA_S1_L001_R1_001.fastq.gz.md5")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_custom_suffix() {
        let patterns = FilenamePatterns::new(".fq").unwrap();
        let m = patterns.parse("A_S4_L001_R1_001.fq").unwrap().unwrap();
        assert_eq!(m.sample_number(), Some(4));
        assert!(patterns.parse("A_S4_L001_R1_001.fastq.gz").unwrap().is_none());
    }

    #[test]
    fn test_numeric_overflow_is_an_error() {
        let result = patterns().parse("A_S99999999999_L001_R1_001.fastq.gz");
        assert!(matches!(result, Err(MetadataError::InvalidFormat(_))));
    }

    #[test]
    fn test_sample_id_and_name() {
        let patterns = patterns();
        let path = "run/NA10831_ATCACG_L002_R1_001.fastq.gz";

        assert_eq!(patterns.sample_id(path), "NA10831_ATCACG_L002_R1_001");
        assert_eq!(
            patterns.sample_name(path).unwrap().as_deref(),
            Some("NA10831")
        );
        assert_eq!(patterns.sample_name("nope.txt").unwrap(), None);
    }

    #[test]
    fn test_template_order() {
        let kinds: Vec<TemplateKind> = patterns().templates().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TemplateKind::Undetermined,
                TemplateKind::SampleNumber,
                TemplateKind::IndexSequence,
            ]
        );
    }

    #[test]
    fn test_free_functions_take_suffix() {
        let path = "out/ProjA/15-02380-CE11-T13-L1_AACCAG_L001_R1_001.fastq.gz";
        assert_eq!(
            sample_id_from_filename(path, READ_FILE_SUFFIX),
            "15-02380-CE11-T13-L1_AACCAG_L001_R1_001"
        );
        assert_eq!(
            sample_name_from_filename(path, READ_FILE_SUFFIX).unwrap().as_deref(),
            Some("15-02380-CE11-T13-L1")
        );
        assert_eq!(sample_id_from_filename("s_L001_R1_001.fq", ".fastq.gz"), "s_L001_R1_001.fq");
    }
}
