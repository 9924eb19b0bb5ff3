//! Parser for the instrument's `Config/*Effective.cfg` file.
//!
//! These look like Windows INI files but trip up generic INI parsers
//! (inconsistent spacing, trailing `;` comments), so they are read line by
//! line. Keys are stored as `section:key`:
//!
//! ```text
//! [system]
//! instrumenttype = HiSeq ; model name
//! ```
//!
//! yields `system:instrumenttype` → `HiSeq`.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{read_text, MetadataError};

pub const CONFIG_DIR: &str = "Config";

/// File name fragment identifying the effective configuration
pub const EFFECTIVE_CONFIG_MARKER: &str = "Effective.cfg";

const INSTRUMENT_TYPE_KEY: &str = "system:instrumenttype";

/// Flattened `section:key` → value pairs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct InstrumentConfig(pub BTreeMap<String, String>);

impl InstrumentConfig {
    #[must_use]
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.0.get(&format!("{section}:{key}")).map(String::as_str)
    }

    /// Instrument model, e.g. `HiSeq`
    #[must_use]
    pub fn instrument_model(&self) -> Option<&str> {
        self.0.get(INSTRUMENT_TYPE_KEY).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Locate the `*Effective.cfg` file under `<run>/Config`.
///
/// When several match, the lexicographically first is used.
///
/// # Errors
///
/// Returns `MetadataError::NotFound` if the directory or file is absent, or
/// `MetadataError::Io` if the directory cannot be listed.
pub fn find_effective_config(run_path: &Path) -> Result<PathBuf, MetadataError> {
    let config_dir = run_path.join(CONFIG_DIR);
    let entries = std::fs::read_dir(&config_dir).map_err(|e| MetadataError::io(&config_dir, e))?;

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| MetadataError::io(&config_dir, e))?;
        if entry.file_name().to_string_lossy().contains(EFFECTIVE_CONFIG_MARKER) {
            candidates.push(entry.path());
        }
    }
    candidates.sort();

    candidates
        .into_iter()
        .next()
        .ok_or_else(|| MetadataError::NotFound(config_dir.join(format!("*{EFFECTIVE_CONFIG_MARKER}"))))
}

/// Parse the effective instrument configuration of a run directory
///
/// # Errors
///
/// Returns `MetadataError::NotFound` if no `Config/*Effective.cfg` exists, or
/// `MetadataError::Io` if it cannot be read.
pub fn parse_instrument_config(run_path: &Path) -> Result<InstrumentConfig, MetadataError> {
    let path = find_effective_config(run_path)?;
    let config = parse_instrument_config_text(&read_text(&path)?);
    debug!(path = %path.display(), keys = config.len(), "Parsed instrument config");
    Ok(config)
}

/// Parse instrument configuration text
#[must_use]
pub fn parse_instrument_config_text(text: &str) -> InstrumentConfig {
    let mut values = BTreeMap::new();
    let mut section = "";

    for line in text.lines() {
        if line.starts_with(';') {
            continue;
        }

        if let Some(rest) = line.strip_prefix('[') {
            section = rest.split(']').next().unwrap_or("");
        }

        if let Some((key, value)) = line.split_once('=') {
            let value = value.split(';').next().unwrap_or(value);
            values.insert(
                format!("{section}:{}", key.trim()),
                value.trim().to_string(),
            );
        }
    }

    InstrumentConfig(values)
}
