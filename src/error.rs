//! Error type shared by every parser in the crate.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Required file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("{source_name}: required field '{field}' is missing")]
    MissingField { source_name: String, field: String },

    #[error("Missing required column '{0}'")]
    MissingColumn(String),

    #[error("Duplicate sample key '{0}'")]
    DuplicateKey(String),

    #[error("XML error in {}: {source}", path.display())]
    Xml {
        path: PathBuf,
        #[source]
        source: quick_xml::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid filename pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Too many {kind}: exceeds maximum allowed ({limit})")]
    TooManyEntries { kind: &'static str, limit: usize },

    #[error("{}: {source}", path.display())]
    InFile {
        path: PathBuf,
        #[source]
        source: Box<MetadataError>,
    },
}

impl MetadataError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(path.to_path_buf())
        } else {
            Self::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    pub(crate) fn xml(path: &Path, source: impl Into<quick_xml::Error>) -> Self {
        Self::Xml {
            path: path.to_path_buf(),
            source: source.into(),
        }
    }

    /// Attach the file or directory the error was raised for
    pub(crate) fn in_file(self, path: &Path) -> Self {
        Self::InFile {
            path: path.to_path_buf(),
            source: Box::new(self),
        }
    }

    pub(crate) fn missing_field(source_name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingField {
            source_name: source_name.into(),
            field: field.into(),
        }
    }
}

/// Read a whole text file, reporting a missing file as [`MetadataError::NotFound`].
///
/// # Errors
///
/// Returns `MetadataError::NotFound` if the file does not exist, or
/// `MetadataError::Io` if it cannot be read.
pub fn read_text(path: &Path) -> Result<String, MetadataError> {
    std::fs::read_to_string(path).map_err(|e| MetadataError::io(path, e))
}
