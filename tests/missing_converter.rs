//! A run on a machine with no converter installed.
//!
//! Lives in its own test binary because it rewrites `PATH` for the whole
//! process.

use md2pdf_batch::{converter_locate::CONVERTER_ENV, run_conversion_with, RunStatus};
use std::fs;

#[test]
fn missing_converter_is_recorded_per_batch() {
    let empty_path = tempfile::tempdir().unwrap();
    std::env::set_var("PATH", empty_path.path());
    std::env::remove_var(CONVERTER_ENV);

    let dir = tempfile::tempdir().unwrap();
    let sources: Vec<_> = ["a.md", "b.md", "c.md"]
        .iter()
        .map(|n| {
            let p = dir.path().join(n);
            fs::write(&p, "# doc\n").unwrap();
            p
        })
        .collect();

    let outcome = run_conversion_with(&sources, 2, None).expect("not an error");

    assert!(!outcome.overall_success);
    assert_eq!(outcome.status(), RunStatus::Failed);
    assert_eq!(outcome.processed_count, 3);
    assert_eq!(outcome.skipped_count, 0);
    assert_eq!(
        outcome.combined_stderr.matches("Failed to launch").count(),
        2,
        "one launch failure per batch: {}",
        outcome.combined_stderr
    );
    assert!(outcome.artifacts_for(&sources).is_empty());
}
