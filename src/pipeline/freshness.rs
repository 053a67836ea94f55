//! Freshness filter: decide which sources need (re)conversion.
//!
//! A source is skipped only when its PDF exists and was modified strictly
//! after the source. Equal timestamps reconvert. Timestamps are the only
//! signal; there is no content hashing, so a restored backup with an old
//! mtime is not detected as changed.

use crate::config::ARTIFACT_EXTENSION;
use crate::error::Md2PdfError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

/// Per-source decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// The artifact is newer than the source.
    Skip,
    /// The artifact is missing or not newer.
    Process,
}

/// Sources split by [`Freshness`], each half in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FreshnessReport {
    pub to_process: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

/// Path of the PDF produced for `source`: same directory and stem, `.pdf`
/// extension.
pub fn artifact_path(source: &Path) -> PathBuf {
    source.with_extension(ARTIFACT_EXTENSION)
}

/// Classify one source.
///
/// # Errors
/// [`Md2PdfError::Timestamp`] when a modification time cannot be read for any
/// reason other than the artifact being absent.
pub fn classify(source: &Path) -> Result<Freshness, Md2PdfError> {
    let artifact = artifact_path(source);

    let artifact_mtime = match modified(&artifact) {
        Ok(t) => t,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Freshness::Process),
        Err(e) => {
            return Err(Md2PdfError::Timestamp {
                path: artifact,
                source: e,
            })
        }
    };

    let source_mtime = modified(source).map_err(|e| Md2PdfError::Timestamp {
        path: source.to_path_buf(),
        source: e,
    })?;

    if artifact_mtime > source_mtime {
        Ok(Freshness::Skip)
    } else {
        Ok(Freshness::Process)
    }
}

/// Partition `sources` into files to convert and files already up to date.
/// Duplicates are classified independently.
pub fn partition_by_freshness<P: AsRef<Path>>(
    sources: &[P],
) -> Result<FreshnessReport, Md2PdfError> {
    let mut report = FreshnessReport::default();
    for source in sources {
        let source = source.as_ref();
        match classify(source)? {
            Freshness::Skip => {
                debug!("Up to date: {}", source.display());
                report.skipped.push(source.to_path_buf());
            }
            Freshness::Process => report.to_process.push(source.to_path_buf()),
        }
    }
    Ok(report)
}

fn modified(path: &Path) -> std::io::Result<SystemTime> {
    std::fs::metadata(path)?.modified()
}
