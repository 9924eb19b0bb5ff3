//! Determine which demultiplexer produced an output tree.
//!
//! Sources are tried from most to least reliable and the first one that
//! yields a version wins:
//!
//! 1. `DemultiplexConfig.xml` in the output tree (bcl2fastq 1.x writes it)
//! 2. the version reported by the locally installed bcl2fastq binary
//! 3. top-level directory names: `Project_*` directories mean bcl2fastq 1.x,
//!    anything else means 2.x
//!
//! The order matters: bcl2fastq 2.x writes no config file, so the installed
//! binary is the next best evidence, and the directory naming only tells the
//! major version apart. A result from the last tier is a guess; callers should
//! check [`IdentificationTier::is_guess`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::core::types::{DemultiplexerInfo, IdentificationTier};
use crate::demux::probe::{Bcl2fastqBinary, VersionProbe};
use crate::error::MetadataError;
use crate::parsing::demultiplex_config::parse_demultiplex_config;

/// Default location of the bcl2fastq binary
pub const DEFAULT_BCL2FASTQ_PATH: &str = "/usr/local/bin/bcl2fastq";

/// Default time allowed for `bcl2fastq --version`
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Directory prefix bcl2fastq 1.x gives project directories
pub const LEGACY_PROJECT_PREFIX: &str = "Project_";

/// Tiers that can fail and fall through, in the order they are tried
const FALLIBLE_TIERS: [IdentificationTier; 2] = [
    IdentificationTier::ConfigFile,
    IdentificationTier::InstalledBinary,
];

/// Configuration for the demultiplexer identifier
#[derive(Debug, Clone)]
pub struct IdentifierConfig {
    /// bcl2fastq binary queried when the output tree has no config file
    pub binary_path: PathBuf,

    /// Upper bound on the binary's version query
    pub probe_timeout: Duration,
}

impl Default for IdentifierConfig {
    fn default() -> Self {
        Self {
            binary_path: PathBuf::from(DEFAULT_BCL2FASTQ_PATH),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }
}

/// An identified demultiplexer and the tier that identified it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identified {
    #[serde(flatten)]
    pub info: DemultiplexerInfo,
    pub tier: IdentificationTier,
}

impl Identified {
    #[must_use]
    pub fn is_guess(&self) -> bool {
        self.tier.is_guess()
    }
}

pub struct DemultiplexerIdentifier<P: VersionProbe = Bcl2fastqBinary> {
    probe: P,
}

impl DemultiplexerIdentifier<Bcl2fastqBinary> {
    #[must_use]
    pub fn new(config: &IdentifierConfig) -> Self {
        Self::with_probe(Bcl2fastqBinary::new(
            config.binary_path.clone(),
            config.probe_timeout,
        ))
    }
}

impl<P: VersionProbe> DemultiplexerIdentifier<P> {
    /// Use `probe` for the installed-binary tier
    pub fn with_probe(probe: P) -> Self {
        Self { probe }
    }

    /// Identify the demultiplexer of the output tree at `output_path`.
    ///
    /// A missing config file or binary never fails; the directory naming
    /// tier always produces an answer.
    ///
    /// # Errors
    ///
    /// Returns `MetadataError::NotFound` if `output_path` is not a directory,
    /// or `MetadataError::Io` if it cannot be listed.
    pub fn identify(&self, output_path: &Path) -> Result<Identified, MetadataError> {
        if !output_path.is_dir() {
            return Err(MetadataError::NotFound(output_path.to_path_buf()));
        }

        for tier in FALLIBLE_TIERS {
            if let Some(info) = self.try_tier(tier, output_path) {
                debug!(path = %output_path.display(), %tier, version = %info.version, "Identified demultiplexer");
                return Ok(Identified { info, tier });
            }
        }

        let info = guess_from_directory_names(output_path)?;
        warn!(
            path = %output_path.display(),
            version = %info.version,
            "Demultiplexer guessed from directory names"
        );
        Ok(Identified {
            info,
            tier: IdentificationTier::DirectoryNaming,
        })
    }

    fn try_tier(&self, tier: IdentificationTier, output_path: &Path) -> Option<DemultiplexerInfo> {
        let found = match tier {
            IdentificationTier::ConfigFile => match parse_demultiplex_config(output_path) {
                Ok(info) => info,
                Err(e) => {
                    warn!(error = %e, "Ignoring unreadable demultiplexer config");
                    None
                }
            },
            IdentificationTier::InstalledBinary => match self.probe.probe() {
                Ok(info) => Some(info),
                Err(e) => {
                    debug!(error = %e, "Demultiplexer binary gave no version");
                    None
                }
            },
            IdentificationTier::DirectoryNaming => None,
        };

        found.filter(|info| !info.version.is_empty())
    }
}

/// Guess the bcl2fastq major version from the top-level directories of an
/// output tree
///
/// # Errors
///
/// Returns `MetadataError::NotFound` or `MetadataError::Io` if the directory
/// cannot be listed.
pub fn guess_from_directory_names(output_path: &Path) -> Result<DemultiplexerInfo, MetadataError> {
    let entries = std::fs::read_dir(output_path).map_err(|e| MetadataError::io(output_path, e))?;

    let mut legacy = false;
    for entry in entries {
        let entry = entry.map_err(|e| MetadataError::io(output_path, e))?;
        if entry.path().is_dir()
            && entry
                .file_name()
                .to_string_lossy()
                .starts_with(LEGACY_PROJECT_PREFIX)
        {
            legacy = true;
            break;
        }
    }

    let version = if legacy {
        "bcl2fastq 1.0unknown"
    } else {
        "bcl2fastq 2.0unknown"
    };
    Ok(DemultiplexerInfo::from_version(version, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demux::probe::ProbeError;
    use crate::parsing::demultiplex_config::DEMULTIPLEX_CONFIG_FILE;
    use std::cell::Cell;
    use std::fs;

    /// Probe double returning a fixed answer and counting calls
    struct FixedProbe {
        version: Option<&'static str>,
        calls: Cell<usize>,
    }

    impl FixedProbe {
        fn answering(version: &'static str) -> Self {
            Self {
                version: Some(version),
                calls: Cell::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                version: None,
                calls: Cell::new(0),
            }
        }
    }

    impl VersionProbe for FixedProbe {
        fn probe(&self) -> Result<DemultiplexerInfo, ProbeError> {
            self.calls.set(self.calls.get() + 1);
            match self.version {
                Some(v) => Ok(DemultiplexerInfo::from_version(v, None)),
                None => Err(ProbeError::NoVersion {
                    path: PathBuf::from("bcl2fastq"),
                }),
            }
        }
    }

    const CONFIG: &str = r#"<DemultiplexConfig><Software Version="bcl2fastq-1.8.4" CmdAndArgs="configureBclToFastq.pl --no-eamss"/></DemultiplexConfig>"#;

    #[test]
    fn test_config_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(DEMULTIPLEX_CONFIG_FILE), CONFIG).unwrap();

        let identifier = DemultiplexerIdentifier::with_probe(FixedProbe::answering("bcl2fastq v2.20.0"));
        let found = identifier.identify(dir.path()).unwrap();

        assert_eq!(found.tier, IdentificationTier::ConfigFile);
        assert_eq!(found.info.version, "bcl2fastq 1.8.4");
        assert_eq!(found.info.commandline_options.as_deref(), Some("--no-eamss"));
        assert_eq!(identifier.probe.calls.get(), 0);
    }

    #[test]
    fn test_installed_binary_when_no_config() {
        let dir = tempfile::tempdir().unwrap();

        let identifier = DemultiplexerIdentifier::with_probe(FixedProbe::answering("bcl2fastq v2.20.0.422"));
        let found = identifier.identify(dir.path()).unwrap();

        assert_eq!(found.tier, IdentificationTier::InstalledBinary);
        assert_eq!(found.info.version_number, "2.20.0.422");
        assert!(found.info.commandline_options.is_none());
        assert!(!found.is_guess());
    }

    #[test]
    fn test_malformed_config_falls_through() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(DEMULTIPLEX_CONFIG_FILE), "<DemultiplexConfig>").unwrap();

        let identifier = DemultiplexerIdentifier::with_probe(FixedProbe::answering("bcl2fastq v2.20.0"));
        let found = identifier.identify(dir.path()).unwrap();

        assert_eq!(found.tier, IdentificationTier::InstalledBinary);
    }

    #[test]
    fn test_guess_legacy_from_project_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("Project_ABC")).unwrap();

        let found = DemultiplexerIdentifier::with_probe(FixedProbe::failing())
            .identify(dir.path())
            .unwrap();

        assert_eq!(found.info.version, "bcl2fastq 1.0unknown");
        assert_eq!(found.info.version_number, "1.0unknown");
        assert!(found.info.commandline_options.is_none());
        assert!(found.is_guess());
    }

    #[test]
    fn test_guess_current_without_project_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("ABC")).unwrap();
        fs::write(dir.path().join("Project_notes.txt"), "").unwrap();

        let found = DemultiplexerIdentifier::with_probe(FixedProbe::failing())
            .identify(dir.path())
            .unwrap();

        assert_eq!(found.info.version, "bcl2fastq 2.0unknown");
        assert_eq!(found.info.version_number, "2.0unknown");
        assert_eq!(found.tier, IdentificationTier::DirectoryNaming);
    }

    #[test]
    fn test_missing_binary_falls_through() {
        let dir = tempfile::tempdir().unwrap();
        let config = IdentifierConfig {
            binary_path: dir.path().join("no-such-bcl2fastq"),
            probe_timeout: Duration::from_secs(1),
        };

        let found = DemultiplexerIdentifier::new(&config)
            .identify(dir.path())
            .unwrap();
        assert_eq!(found.tier, IdentificationTier::DirectoryNaming);
    }

    #[test]
    fn test_missing_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = DemultiplexerIdentifier::with_probe(FixedProbe::answering("bcl2fastq v2.20.0"))
            .identify(&dir.path().join("absent"));

        assert!(matches!(result, Err(MetadataError::NotFound(_))));
    }
}
