//! Map a demultiplexed output tree onto projects.
//!
//! Read files may sit one to three levels below the output root:
//!
//! ```text
//! out/lane1_Undetermined_L001_R1_001.fastq.gz      depth 1, no project
//! out/ProjA/s1_S1_L001_R1_001.fastq.gz             depth 2, project/file
//! out/ProjA/Sample_s1/s1_S1_L001_R1_001.fastq.gz   depth 3, project/sample/file
//! ```
//!
//! Paths are processed in lexicographic order of their relative path string,
//! so the project order and each project's file order do not depend on how
//! the filesystem happens to list entries.

use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use tracing::debug;
use walkdir::WalkDir;

use crate::core::project::{ProjectMapping, UNDETERMINED_PROJECT};
use crate::error::MetadataError;
use crate::parsing::filename::READ_FILE_SUFFIX;
use crate::utils::validation::{check_entry_limit, MAX_READ_FILES};

/// Marker in file names of reads not assigned to any sample
pub const UNDETERMINED_MARKER: &str = "Undetermined";

/// Prefix bcl2fastq 1.x puts on sample directories
pub const SAMPLE_DIR_PREFIX: &str = "Sample_";

/// Configuration for the directory mapper
#[derive(Debug, Clone)]
pub struct MapperConfig {
    /// Only files whose name ends with this suffix are mapped
    pub suffix: String,

    /// Store `root/relative` paths instead of paths relative to the root
    pub absolute_paths: bool,

    /// Force files named `*Undetermined*` into [`UNDETERMINED_PROJECT`]
    pub catch_undetermined: bool,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            suffix: READ_FILE_SUFFIX.to_string(),
            absolute_paths: false,
            catch_undetermined: true,
        }
    }
}

/// Group read files below `root` by project.
///
/// # Errors
///
/// Returns `MetadataError::NotFound` if `root` is not a directory,
/// `MetadataError::Io` if any entry below it cannot be read, or
/// `MetadataError::TooManyEntries` (wrapped in `MetadataError::InFile`) if
/// more than `MAX_READ_FILES` read files are found.
pub fn get_sample_project_mapping(
    root: &Path,
    config: &MapperConfig,
) -> Result<ProjectMapping, MetadataError> {
    if !root.is_dir() {
        return Err(MetadataError::NotFound(root.to_path_buf()));
    }

    let mut relative_paths = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| MetadataError::Io {
            path: e.path().unwrap_or(root).to_path_buf(),
            source: e.into(),
        })?;

        if !entry.file_type().is_file()
            || !entry.file_name().to_string_lossy().ends_with(&config.suffix)
        {
            continue;
        }

        if let Ok(relative) = entry.path().strip_prefix(root) {
            check_entry_limit(relative_paths.len(), MAX_READ_FILES, "read files")
                .map_err(|e| e.in_file(root))?;
            relative_paths.push(relative.to_path_buf());
        }
    }

    debug!(root = %root.display(), files = relative_paths.len(), "Collected read files");
    Ok(map_relative_paths(root, relative_paths, config))
}

/// Group already-collected relative read file paths by project.
///
/// The input order does not matter; paths are sorted before grouping.
#[must_use]
pub fn map_relative_paths(
    root: &Path,
    paths: impl IntoIterator<Item = PathBuf>,
    config: &MapperConfig,
) -> ProjectMapping {
    let mut paths: Vec<(String, PathBuf)> = paths
        .into_iter()
        .map(|p| (p.to_string_lossy().into_owned(), p))
        .collect();
    paths.sort_by(|a, b| a.0.cmp(&b.0));

    let mut mapping = ProjectMapping::new();
    for (_, relative) in paths {
        let segments: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        // depth 1 (and anything deeper than 3) has no project
        let mut project = match segments.len() {
            2 | 3 => segments[0].as_str(),
            _ => "",
        };

        let filename = segments.last().map_or("", String::as_str);
        if config.catch_undetermined && filename.contains(UNDETERMINED_MARKER) {
            project = UNDETERMINED_PROJECT;
        }

        let stored = if config.absolute_paths {
            root.join(&relative)
        } else {
            relative.clone()
        };
        mapping.push(project, stored);
    }

    mapping
}

/// A sample sub-directory of a project directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleDirectory {
    pub path: PathBuf,

    /// Directory name without the `Sample_` prefix
    pub sample_id: String,
}

/// Immediate sub-directories of `project_path` holding at least one read file,
/// sorted by path.
///
/// # Errors
///
/// Returns `MetadataError::NotFound` if `project_path` does not exist, or
/// `MetadataError::Io` if a directory cannot be listed.
pub fn sample_directories(project_path: &Path) -> Result<Vec<SampleDirectory>, MetadataError> {
    let entries = std::fs::read_dir(project_path).map_err(|e| MetadataError::io(project_path, e))?;

    let mut samples = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| MetadataError::io(project_path, e))?;
        let path = entry.path();
        if !path.is_dir() || fastq_read_files(&path)?.is_empty() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        let sample_id = name
            .strip_prefix(SAMPLE_DIR_PREFIX)
            .unwrap_or(&name)
            .to_string();
        samples.push(SampleDirectory { path, sample_id });
    }

    samples.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(samples)
}

/// Regular files directly inside `sample_path` ending in `.fastq.gz`, sorted.
///
/// # Errors
///
/// Returns `MetadataError::NotFound` if `sample_path` does not exist, or
/// `MetadataError::Io` if it cannot be listed.
pub fn fastq_read_files(sample_path: &Path) -> Result<Vec<PathBuf>, MetadataError> {
    let entries = std::fs::read_dir(sample_path).map_err(|e| MetadataError::io(sample_path, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| MetadataError::io(sample_path, e))?;
        let path = entry.path();
        if path.is_file() && entry.file_name().to_string_lossy().ends_with(READ_FILE_SUFFIX) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
