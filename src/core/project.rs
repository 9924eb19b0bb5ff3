use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::path::PathBuf;

/// Project that collects reads not assigned to any real project
pub const UNDETERMINED_PROJECT: &str = "Undetermined_indices";

/// Read files grouped by project, in first-seen order.
///
/// Projects appear in the order their first file was inserted, and each
/// project's files keep insertion order. The directory mapper inserts in
/// lexicographic path order, which makes the mapping deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectMapping {
    entries: Vec<(String, Vec<PathBuf>)>,
}

impl ProjectMapping {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `path` to `project`, creating the project on first encounter
    pub fn push(&mut self, project: &str, path: impl Into<PathBuf>) {
        let path = path.into();
        if let Some((_, files)) = self.entries.iter_mut().find(|(p, _)| p == project) {
            files.push(path);
        } else {
            self.entries.push((project.to_string(), vec![path]));
        }
    }

    pub fn projects(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(p, _)| p.as_str())
    }

    #[must_use]
    pub fn files(&self, project: &str) -> Option<&[PathBuf]> {
        self.entries
            .iter()
            .find(|(p, _)| p == project)
            .map(|(_, files)| files.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PathBuf])> {
        self.entries
            .iter()
            .map(|(p, files)| (p.as_str(), files.as_slice()))
    }

    /// Total number of files across all projects
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.entries.iter().map(|(_, files)| files.len()).sum()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ProjectMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (project, files) in &self.entries {
            let files: Vec<std::borrow::Cow<'_, str>> =
                files.iter().map(|f| f.to_string_lossy()).collect();
            map.serialize_entry(project, &files)?;
        }
        map.end()
    }
}
