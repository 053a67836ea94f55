//! Pipeline stages for a batch conversion run.
//!
//! Each submodule implements exactly one step, so each can be tested
//! without the others.
//!
//! ## Data Flow
//!
//! ```text
//! sources ──▶ freshness ──▶ plan ──▶ invoke (per batch)
//!             (mtime)       (chunk)  (md-to-pdf)
//! ```
//!
//! 1. [`freshness`] — split sources into "convert" and "already up to date"
//! 2. [`plan`]      — chunk the files to convert into bounded batches
//! 3. [`invoke`]    — run one converter process per batch and capture its
//!    exit status and output

pub mod freshness;
pub mod invoke;
pub mod plan;
