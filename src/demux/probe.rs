//! Version query against a locally installed demultiplexer binary.
//!
//! `bcl2fastq --version` prints a banner on stderr:
//!
//! ```text
//! BCL to FASTQ file converter
//! bcl2fastq v2.20.0.422
//! Copyright (c) 2007-2017 Illumina, Inc.
//! ```
//!
//! The query runs under an explicit timeout and the child is killed if it
//! does not answer in time.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;

use crate::core::types::DemultiplexerInfo;

/// Program name the version line must start with
pub const BCL2FASTQ_PROGRAM: &str = "bcl2fastq";

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Failed to run {}: {source}", path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} did not answer within {timeout:?}", path.display())]
    Timeout { path: PathBuf, timeout: Duration },

    #[error("{} exited with {status}", path.display())]
    ExitStatus { path: PathBuf, status: ExitStatus },

    #[error("No version line in the output of {}", path.display())]
    NoVersion { path: PathBuf },

    #[error("Failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Something that can report the version of an installed demultiplexer
pub trait VersionProbe {
    /// Query the version.
    ///
    /// # Errors
    ///
    /// Returns a `ProbeError` describing why no version could be obtained.
    fn probe(&self) -> Result<DemultiplexerInfo, ProbeError>;
}

/// Runs `<path> --version` for an installed bcl2fastq
#[derive(Debug, Clone)]
pub struct Bcl2fastqBinary {
    path: PathBuf,
    timeout: Duration,
}

impl Bcl2fastqBinary {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            path: path.into(),
            timeout,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn query(&self) -> Result<DemultiplexerInfo, ProbeError> {
        let child = Command::new(&self.path)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ProbeError::Spawn {
                path: self.path.clone(),
                source,
            })?;

        // Dropping the child on timeout kills it
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| ProbeError::Timeout {
                path: self.path.clone(),
                timeout: self.timeout,
            })?
            .map_err(|source| ProbeError::Spawn {
                path: self.path.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ProbeError::ExitStatus {
                path: self.path.clone(),
                status: output.status,
            });
        }

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        parse_version_output(&text).ok_or_else(|| ProbeError::NoVersion {
            path: self.path.clone(),
        })
    }

    fn probe_blocking(&self) -> Result<DemultiplexerInfo, ProbeError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ProbeError::Runtime)?;
        runtime.block_on(self.query())
    }
}

impl VersionProbe for Bcl2fastqBinary {
    fn probe(&self) -> Result<DemultiplexerInfo, ProbeError> {
        // A runtime cannot be blocked on from inside another one
        if tokio::runtime::Handle::try_current().is_ok() {
            std::thread::scope(|s| {
                s.spawn(|| self.probe_blocking())
                    .join()
                    .unwrap_or_else(|_| {
                        Err(ProbeError::Runtime(std::io::Error::other(
                            "version probe thread panicked",
                        )))
                    })
            })
        } else {
            self.probe_blocking()
        }
    }
}

/// Find the `bcl2fastq <version>` line in `--version` output
#[must_use]
pub fn parse_version_output(output: &str) -> Option<DemultiplexerInfo> {
    output
        .lines()
        .map(str::trim)
        .find(|line| {
            let mut words = line.split_whitespace();
            words.next() == Some(BCL2FASTQ_PROGRAM) && words.next().is_some()
        })
        .map(|line| DemultiplexerInfo::from_version(line, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BANNER: &str = "BCL to FASTQ file converter\n\
bcl2fastq v2.20.0.422\n\
Copyright (c) 2007-2017 Illumina, Inc.\n";

    #[test]
    fn test_parse_version_output() {
        let info = parse_version_output(BANNER).unwrap();

        assert_eq!(info.version, "bcl2fastq v2.20.0.422");
        assert_eq!(info.version_number, "2.20.0.422");
        assert!(info.commandline_options.is_none());
    }

    #[test]
    fn test_parse_version_output_without_version() {
        assert!(parse_version_output("bcl2fastq\nusage: bcl2fastq [options]\n").is_none());
        assert!(parse_version_output("").is_none());
    }

    #[test]
    fn test_missing_binary_is_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let binary = Bcl2fastqBinary::new(dir.path().join("bcl2fastq"), Duration::from_secs(5));

        assert!(matches!(binary.probe(), Err(ProbeError::Spawn { .. })));
    }

    #[tokio::test]
    async fn test_probe_inside_runtime() {
        let dir = tempfile::tempdir().unwrap();
        let binary = Bcl2fastqBinary::new(dir.path().join("bcl2fastq"), Duration::from_secs(5));

        assert!(matches!(binary.probe(), Err(ProbeError::Spawn { .. })));
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        fn script(dir: &Path, body: &str) -> PathBuf {
            let path = dir.join("bcl2fastq");
            std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[test]
        fn test_probe_reads_stderr_banner() {
            let dir = tempfile::tempdir().unwrap();
            let path = script(
                dir.path(),
                "echo 'BCL to FASTQ file converter' >&2\necho 'bcl2fastq v2.17.1.14' >&2",
            );

            let info = Bcl2fastqBinary::new(path, Duration::from_secs(5))
                .probe()
                .unwrap();
            assert_eq!(info.version_number, "2.17.1.14");
        }

        #[test]
        fn test_probe_non_zero_exit() {
            let dir = tempfile::tempdir().unwrap();
            let path = script(dir.path(), "echo 'bcl2fastq v2.17.1.14'\nexit 3");

            assert!(matches!(
                Bcl2fastqBinary::new(path, Duration::from_secs(5)).probe(),
                Err(ProbeError::ExitStatus { .. })
            ));
        }

        #[test]
        fn test_probe_times_out() {
            let dir = tempfile::tempdir().unwrap();
            let path = script(dir.path(), "sleep 30");

            assert!(matches!(
                Bcl2fastqBinary::new(path, Duration::from_millis(200)).probe(),
                Err(ProbeError::Timeout { .. })
            ));
        }
    }
}
