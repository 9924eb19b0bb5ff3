use serde::{Deserialize, Serialize};

/// Sample sheet dialect, decided once per file from its first line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleSheetDialect {
    /// Plain CSV (IEM v3 and older): one flat table, chemistry in a trailing comment row
    LegacyCsv,
    /// INI-style CSV (IEM v4): `[Header]`, `[Reads]`, `[Settings]`, `[Data]` sections
    IniStyleV4,
}

impl std::fmt::Display for SampleSheetDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LegacyCsv => write!(f, "legacy CSV"),
            Self::IniStyleV4 => write!(f, "IEM v4 INI-style"),
        }
    }
}

/// The second identifier in a read file name: a sample number (`S1`) written by
/// bcl2fastq 2.x, or the index sequence (`ACGTAC`) written by bcl2fastq 1.8.x
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleTag {
    Number(u32),
    Index(String),
}

impl std::fmt::Display for SampleTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "S{n}"),
            Self::Index(seq) => write!(f, "{seq}"),
        }
    }
}

/// Identifiers recovered from a read file name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilenameMatch {
    pub sample_name: String,

    /// Absent for undetermined-read files, which carry neither
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<SampleTag>,

    pub lane: u32,
    pub read: u32,
    pub set_number: u32,
}

impl FilenameMatch {
    #[must_use]
    pub fn sample_number(&self) -> Option<u32> {
        match &self.tag {
            Some(SampleTag::Number(n)) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn index_sequence(&self) -> Option<&str> {
        match &self.tag {
            Some(SampleTag::Index(seq)) => Some(seq),
            _ => None,
        }
    }
}

/// Which demultiplexing program (and how) produced an output tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemultiplexerInfo {
    /// Program name and version, e.g. `bcl2fastq 1.8.4`
    pub version: String,

    /// Bare version, e.g. `1.8.4`
    pub version_number: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commandline_options: Option<String>,
}

impl DemultiplexerInfo {
    /// Build from a `program version` string; the version number is its
    /// second word without a leading `v` (empty if there is none)
    #[must_use]
    pub fn from_version(version: impl Into<String>, commandline_options: Option<String>) -> Self {
        let version = version.into();
        let version_number = version
            .split_whitespace()
            .nth(1)
            .map(|v| v.trim_start_matches('v').to_string())
            .unwrap_or_default();

        Self {
            version,
            version_number,
            commandline_options,
        }
    }
}

/// How a [`DemultiplexerInfo`] was determined, most to least reliable
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentificationTier {
    /// Read from `DemultiplexConfig.xml` in the output tree
    ConfigFile,
    /// Reported by the locally installed demultiplexer binary
    InstalledBinary,
    /// Guessed from top-level directory names; a guess, not a fact
    DirectoryNaming,
}

impl IdentificationTier {
    /// True for the directory-naming heuristic, whose result must be treated as low confidence
    #[must_use]
    pub fn is_guess(self) -> bool {
        matches!(self, Self::DirectoryNaming)
    }
}

impl std::fmt::Display for IdentificationTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConfigFile => write!(f, "config file"),
            Self::InstalledBinary => write!(f, "installed binary"),
            Self::DirectoryNaming => write!(f, "directory naming (guess)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_match_accessors() {
        let m = FilenameMatch {
            sample_name: "SampleA".to_string(),
            tag: Some(SampleTag::Number(3)),
            lane: 1,
            read: 2,
            set_number: 1,
        };
        assert_eq!(m.sample_number(), Some(3));
        assert_eq!(m.index_sequence(), None);

        let m = FilenameMatch {
            tag: Some(SampleTag::Index("ACGTAC".to_string())),
            ..m
        };
        assert_eq!(m.sample_number(), None);
        assert_eq!(m.index_sequence(), Some("ACGTAC"));
    }

    #[test]
    fn test_undetermined_match_omits_tag() {
        let m = FilenameMatch {
            sample_name: "lane1_Undetermined".to_string(),
            tag: None,
            lane: 1,
            read: 1,
            set_number: 1,
        };
        let json = serde_json::to_value(&m).unwrap();
        assert!(json.get("tag").is_none());
    }

    #[test]
    fn test_version_number_from_version() {
        let info = DemultiplexerInfo::from_version("bcl2fastq v2.20.0.422", None);
        assert_eq!(info.version_number, "2.20.0.422");

        let info = DemultiplexerInfo::from_version("bcl2fastq", None);
        assert_eq!(info.version_number, "");
    }

    #[test]
    fn test_tier_ordering() {
        assert!(IdentificationTier::ConfigFile < IdentificationTier::InstalledBinary);
        assert!(IdentificationTier::InstalledBinary < IdentificationTier::DirectoryNaming);
        assert!(IdentificationTier::DirectoryNaming.is_guess());
        assert!(!IdentificationTier::ConfigFile.is_guess());
    }
}
