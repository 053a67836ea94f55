//! Error types for the md2pdf-batch library.
//!
//! Only programmer and environment errors are represented here:
//!
//! * **Input errors**: an empty request or a zero batch size, rejected
//!   before any converter process is spawned.
//! * **Environment errors**: the converter cannot be located at all.
//! * **I/O errors**: a timestamp could not be read, a folder could not be
//!   walked, a bundle could not be written.
//!
//! A batch whose converter exits non-zero, or cannot be launched, is *not* an
//! error. It is folded into [`crate::output::ConversionOutcome`] so one bad
//! batch never prevents the remaining batches from running.

use converter_locate::LocateError;
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the md2pdf-batch library.
#[derive(Debug, Error)]
pub enum Md2PdfError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// No source files were given.
    #[error("No Markdown files were given to convert")]
    EmptyRequest,

    /// Batch size must be at least one file.
    #[error("Batch size must be at least 1, got {0}")]
    InvalidBatchSize(usize),

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── File system errors ────────────────────────────────────────────────
    /// Reading a modification time failed for a reason other than the
    /// artifact being absent.
    #[error("Failed to read modification time of '{path}': {source}")]
    Timestamp {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The folder to scan does not exist or is not a directory.
    #[error("Folder not found: '{path}'")]
    DirectoryNotFound { path: PathBuf },

    /// Walking a folder failed part way.
    #[error("Failed to scan '{path}': {detail}")]
    Discovery { path: PathBuf, detail: String },

    // ── Environment errors ────────────────────────────────────────────────
    /// The converter could not be resolved from configuration, e.g. a
    /// `MD2PDF_CONVERTER` path that does not exist.
    #[error(transparent)]
    ConverterUnavailable(#[from] LocateError),

    // ── Bundle errors ─────────────────────────────────────────────────────
    /// None of the files passed to the bundler exist.
    #[error("No converted PDF files exist to bundle")]
    NothingToBundle,

    /// Could not create or write the zip archive.
    #[error("Failed to write archive '{path}': {source}")]
    BundleWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_batch_size_display() {
        let e = Md2PdfError::InvalidBatchSize(0);
        assert!(e.to_string().contains("got 0"), "got: {e}");
    }

    #[test]
    fn timestamp_display_names_path() {
        let e = Md2PdfError::Timestamp {
            path: PathBuf::from("/docs/a.md"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = e.to_string();
        assert!(msg.contains("/docs/a.md"), "got: {msg}");
        assert!(msg.contains("denied"), "got: {msg}");
    }

    #[test]
    fn locate_error_is_transparent() {
        let e: Md2PdfError = LocateError::NotFound {
            hint: "brew install node".into(),
        }
        .into();
        assert!(e.to_string().contains("brew install node"));
    }
}
