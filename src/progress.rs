//! Progress-sink trait for per-batch conversion events.
//!
//! Inject an [`Arc<dyn ProgressSink>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive an
//! update right before each batch is handed to the converter.
//!
//! Any `Fn(f64, &str) + Send + Sync` closure is a sink, so the common case
//! needs no new type:
//!
//! ```rust
//! use md2pdf_batch::{ConversionConfig, ProgressCallback};
//! use std::sync::Arc;
//!
//! let sink: ProgressCallback = Arc::new(|fraction: f64, message: &str| {
//!     eprintln!("{:>3.0}%  {message}", fraction * 100.0);
//! });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(sink)
//!     .build()
//!     .unwrap();
//! ```
//!
//! The last `on_progress` call is *not* guaranteed to carry `1.0`. The
//! returned [`crate::output::ConversionOutcome`] is the completion signal.

use std::sync::Arc;

/// Receives progress updates from [`crate::convert::run_conversion`].
///
/// Runs are sequential, so calls never overlap. `Send + Sync` is required
/// only so that a config can be moved into a blocking worker.
pub trait ProgressSink: Send + Sync {
    /// Called once before each batch starts.
    ///
    /// # Arguments
    /// * `fraction` — index of the batch's first file divided by the number
    ///   of files to convert, in `0.0..1.0`
    /// * `message`  — human-readable status line
    fn on_progress(&self, fraction: f64, message: &str);

    /// Called once after freshness filtering, before the first batch.
    fn on_run_start(&self, to_process: usize, skipped: usize) {
        let _ = (to_process, skipped);
    }

    /// Called after each batch's converter process has exited.
    ///
    /// # Arguments
    /// * `batch_index` — 0-indexed batch number
    /// * `batch_count` — total number of batches in this run
    /// * `success`     — whether the converter exited with status 0
    fn on_batch_complete(&self, batch_index: usize, batch_count: usize, success: bool) {
        let _ = (batch_index, batch_count, success);
    }
}

impl<F> ProgressSink for F
where
    F: Fn(f64, &str) + Send + Sync,
{
    fn on_progress(&self, fraction: f64, message: &str) {
        self(fraction, message)
    }
}

/// A no-op sink for callers that don't need progress events.
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn on_progress(&self, _fraction: f64, _message: &str) {}
}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ProgressSink>;

/// Fraction of work done before the batch whose first file sits at `start`.
pub fn batch_fraction(start: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    start as f64 / total as f64
}

/// Status line shown before a batch, e.g.
/// `Converting files 3-4 of 5 (batch 2/3)`.
pub fn batch_message(start: usize, len: usize, total: usize, index: usize, count: usize) -> String {
    let first = start + 1;
    let last = start + len;
    let files = if first == last {
        format!("file {first}")
    } else {
        format!("files {first}-{last}")
    };
    format!("Converting {files} of {total} (batch {}/{count})", index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct TrackingSink {
        updates: Mutex<Vec<f64>>,
        started: AtomicUsize,
        failed_batches: AtomicUsize,
    }

    impl ProgressSink for TrackingSink {
        fn on_progress(&self, fraction: f64, _message: &str) {
            self.updates.lock().unwrap().push(fraction);
        }

        fn on_run_start(&self, to_process: usize, _skipped: usize) {
            self.started.store(to_process, Ordering::SeqCst);
        }

        fn on_batch_complete(&self, _batch_index: usize, _batch_count: usize, success: bool) {
            if !success {
                self.failed_batches.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn noop_sink_does_not_panic() {
        let sink = NoopProgress;
        sink.on_run_start(3, 1);
        sink.on_progress(0.5, "half");
        sink.on_batch_complete(0, 2, false);
    }

    #[test]
    fn closures_are_sinks() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen2 = Arc::clone(&seen);
        let sink: ProgressCallback = Arc::new(move |f: f64, m: &str| {
            seen2.lock().unwrap().push((f, m.to_string()));
        });
        sink.on_progress(0.25, "quarter");
        sink.on_batch_complete(0, 4, true);
        assert_eq!(*seen.lock().unwrap(), vec![(0.25, "quarter".to_string())]);
    }

    #[test]
    fn tracking_sink_receives_events() {
        let sink = TrackingSink {
            updates: Mutex::new(Vec::new()),
            started: AtomicUsize::new(0),
            failed_batches: AtomicUsize::new(0),
        };
        sink.on_run_start(3, 0);
        sink.on_progress(0.0, "a");
        sink.on_batch_complete(0, 2, true);
        sink.on_progress(2.0 / 3.0, "b");
        sink.on_batch_complete(1, 2, false);

        assert_eq!(sink.started.load(Ordering::SeqCst), 3);
        assert_eq!(sink.updates.lock().unwrap().len(), 2);
        assert_eq!(sink.failed_batches.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn fraction_uses_first_file_index() {
        assert_eq!(batch_fraction(0, 3), 0.0);
        assert!((batch_fraction(2, 3) - 0.667).abs() < 1e-3);
        assert_eq!(batch_fraction(0, 0), 0.0);
    }

    #[test]
    fn message_formats() {
        assert_eq!(
            batch_message(0, 2, 3, 0, 2),
            "Converting files 1-2 of 3 (batch 1/2)"
        );
        assert_eq!(
            batch_message(2, 1, 3, 1, 2),
            "Converting file 3 of 3 (batch 2/2)"
        );
    }
}
