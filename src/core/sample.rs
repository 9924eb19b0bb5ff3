use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::MetadataError;

/// Default key column for [`SampleIndex::build`]
pub const SAMPLE_ID_COLUMN: &str = "SampleID";

/// Column holding the project a sample belongs to
pub const SAMPLE_PROJECT_COLUMN: &str = "SampleProject";

/// One sample sheet data row, keyed by normalized column label.
///
/// All rows produced by one parse share the same key set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SampleRow(pub BTreeMap<String, String>);

impl SampleRow {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    #[must_use]
    pub fn sample_id(&self) -> Option<&str> {
        self.get(SAMPLE_ID_COLUMN)
    }

    #[must_use]
    pub fn project(&self) -> Option<&str> {
        self.get(SAMPLE_PROJECT_COLUMN)
    }
}

impl FromIterator<(String, String)> for SampleRow {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Sample rows keyed by a unique identifier column.
///
/// The key column is removed from each stored row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SampleIndex(BTreeMap<String, SampleRow>);

impl SampleIndex {
    /// Index `rows` by the value of the `key` column.
    ///
    /// # Errors
    ///
    /// Returns `MetadataError::MissingColumn` if a row lacks `key`, or
    /// `MetadataError::DuplicateKey` if two rows share a key value.
    pub fn build(rows: &[SampleRow], key: &str) -> Result<Self, MetadataError> {
        let mut index = BTreeMap::new();

        for row in rows {
            let mut row = row.clone();
            let id = row
                .0
                .remove(key)
                .ok_or_else(|| MetadataError::MissingColumn(key.to_string()))?;

            if index.contains_key(&id) {
                return Err(MetadataError::DuplicateKey(id));
            }
            index.insert(id, row);
        }

        Ok(Self(index))
    }

    /// Index rows by [`SAMPLE_ID_COLUMN`].
    ///
    /// # Errors
    ///
    /// See [`SampleIndex::build`].
    pub fn by_sample_id(rows: &[SampleRow]) -> Result<Self, MetadataError> {
        Self::build(rows, SAMPLE_ID_COLUMN)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&SampleRow> {
        self.0.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SampleRow)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
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

/// Distinct project identifiers across `rows`, sorted.
///
/// When `include_no_index_name` is given it is appended last, so the
/// undetermined-reads directory can be handled as a (special) project.
/// Rows without a project column are skipped.
#[must_use]
pub fn get_project_ids(rows: &[SampleRow], include_no_index_name: Option<&str>) -> Vec<String> {
    let projects: BTreeSet<&str> = rows.iter().filter_map(SampleRow::project).collect();

    let mut projects: Vec<String> = projects.into_iter().map(str::to_string).collect();
    if let Some(name) = include_no_index_name {
        projects.push(name.to_string());
    }
    projects
}
