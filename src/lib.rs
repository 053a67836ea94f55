//! # md2pdf-batch
//!
//! Convert Markdown documents to PDF in bounded batches by driving the
//! [md-to-pdf](https://github.com/simonhaenisch/md-to-pdf) command-line tool.
//!
//! The crate does no Markdown parsing and no PDF rendering. It decides which
//! files need converting, runs the converter over them a few at a time, and
//! reports progress and a single aggregate outcome.
//!
//! ## Pipeline Overview
//!
//! ```text
//! sources
//!  │
//!  ├─ 1. Freshness  skip files whose PDF is newer than the Markdown
//!  ├─ 2. Plan       chunk the rest into batches of `batch_size`
//!  ├─ 3. Invoke     one md-to-pdf process per batch, sequentially
//!  └─ 4. Aggregate  AND of exit statuses + concatenated stdout/stderr
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use md2pdf_batch::{discover_markdown, run_conversion, ConversionConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sources = discover_markdown(Path::new("docs"), true)?;
//!     let config = ConversionConfig::builder().batch_size(5).build()?;
//!     let outcome = run_conversion(&sources, &config)?;
//!     eprintln!(
//!         "converted {}, up to date {}, ok={}",
//!         outcome.processed_count, outcome.skipped_count, outcome.overall_success
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `md2pdf` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! ## Requirements
//!
//! Node.js must be installed. A local `md-to-pdf` (project `node_modules` or
//! global) is used when present; otherwise `npx md-to-pdf` fetches it on
//! first use. Check beforehand with [`converter_locate::probe`].

// ── Modules ──────────────────────────────────────────────────────────────

pub mod bundle;
pub mod config;
pub mod convert;
pub mod discover;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use bundle::{bundle_artifacts, DEFAULT_BUNDLE_NAME};
pub use config::{
    default_batch_size, ConversionConfig, ConversionConfigBuilder, FileSelection,
    DEFAULT_BATCH_SIZE, HOSTED_BATCH_SIZE,
};
pub use convert::{plan_conversion, run_conversion, run_conversion_async, run_conversion_with};
pub use converter_locate::{self, ConverterLaunch, Platform};
pub use discover::{discover_markdown, expand_inputs};
pub use error::Md2PdfError;
pub use output::{ConversionOutcome, ConversionPlan, RunStatus};
pub use pipeline::freshness::{artifact_path, partition_by_freshness, Freshness, FreshnessReport};
pub use pipeline::invoke::{invoke_batch, BatchResult};
pub use pipeline::plan::plan_batches;
pub use progress::{NoopProgress, ProgressCallback, ProgressSink};
