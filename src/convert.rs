//! Batch conversion entry points.
//!
//! [`run_conversion`] is synchronous and blocks the calling thread until every
//! batch has finished. Interactive front-ends should call
//! [`run_conversion_async`] (or run it on their own worker thread) instead.
//! Runs over overlapping files must not overlap in time: two converter
//! processes writing the same PDF race with each other.

use crate::config::ConversionConfig;
use crate::error::Md2PdfError;
use crate::output::{ConversionOutcome, ConversionPlan};
use crate::pipeline::freshness::partition_by_freshness;
use crate::pipeline::invoke::invoke_batch;
use crate::pipeline::plan::{batch_count, plan_batches};
use crate::progress::{batch_fraction, batch_message, ProgressCallback};
use converter_locate::{locate_converter, ConverterLaunch, LocateError, LAUNCHER_NAME};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Convert every stale source in `sources` to PDF.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `sources` — absolute paths to Markdown files
/// * `config`  — batch size, platform, converter override and progress sink
///
/// # Returns
/// `Ok(ConversionOutcome)` once every batch has been attempted, even if some
/// batches failed (check `outcome.overall_success`).
///
/// # Errors
/// Returns `Err` only before any converter process is spawned:
/// - empty `sources` or a zero batch size
/// - a modification time cannot be read
/// - `MD2PDF_CONVERTER` points at a missing file
///
/// A converter that is simply not installed is not an error here: every
/// batch fails to launch and says so in `combined_stderr`.
pub fn run_conversion(
    sources: &[PathBuf],
    config: &ConversionConfig,
) -> Result<ConversionOutcome, Md2PdfError> {
    let total_start = Instant::now();

    // ── Step 1: Validate input ───────────────────────────────────────────
    if sources.is_empty() {
        return Err(Md2PdfError::EmptyRequest);
    }
    config.validate()?;
    info!("Starting conversion of {} files", sources.len());

    // ── Step 2: Freshness filter ─────────────────────────────────────────
    let report = partition_by_freshness(sources)?;
    let to_process = report.to_process;
    let skipped_count = report.skipped.len();

    if to_process.is_empty() {
        info!("All {} files are up to date", skipped_count);
        return Ok(ConversionOutcome::nothing_to_do(skipped_count));
    }

    // ── Step 3: Resolve converter ────────────────────────────────────────
    let launch = resolve_converter(config)?;
    if launch.is_launcher() {
        debug!("Using on-demand launcher; the first batch may download md-to-pdf");
    }

    // ── Step 4: Run batches ──────────────────────────────────────────────
    let total = to_process.len();
    let count = batch_count(total, config.batch_size);
    if let Some(ref cb) = config.progress_callback {
        cb.on_run_start(total, skipped_count);
    }

    let mut outcome = ConversionOutcome {
        overall_success: true,
        processed_count: total,
        skipped_count,
        ..ConversionOutcome::default()
    };

    for (index, batch) in plan_batches(&to_process, config.batch_size)?.enumerate() {
        let start = index * config.batch_size;
        report_progress(config.progress_callback.as_ref(), start, batch.len(), total, index, count);

        let result = invoke_batch(batch, config.platform, &launch);
        if !result.success {
            warn!(
                "Batch {}/{} failed (exit code {:?})",
                index + 1,
                count,
                result.exit_code
            );
        }

        outcome.combined_stdout.push_str(&result.stdout);
        outcome.combined_stderr.push_str(&result.stderr);
        outcome.overall_success &= result.success;

        if let Some(ref cb) = config.progress_callback {
            cb.on_batch_complete(index, count, result.success);
        }
    }

    info!(
        "Conversion finished: {} attempted, {} skipped, success={}, {}ms",
        outcome.processed_count,
        outcome.skipped_count,
        outcome.overall_success,
        total_start.elapsed().as_millis()
    );

    Ok(outcome)
}

/// [`run_conversion`] with the three arguments most callers need.
pub fn run_conversion_with(
    sources: &[PathBuf],
    batch_size: usize,
    progress: Option<ProgressCallback>,
) -> Result<ConversionOutcome, Md2PdfError> {
    let mut config = ConversionConfig::builder().batch_size(batch_size).build()?;
    config.progress_callback = progress;
    run_conversion(sources, &config)
}

/// Run [`run_conversion`] on tokio's blocking pool so async callers stay
/// responsive.
pub async fn run_conversion_async(
    sources: Vec<PathBuf>,
    config: ConversionConfig,
) -> Result<ConversionOutcome, Md2PdfError> {
    tokio::task::spawn_blocking(move || run_conversion(&sources, &config))
        .await
        .map_err(|e| Md2PdfError::Internal(format!("conversion worker failed: {e}")))?
}

/// Report what [`run_conversion`] would do, without spawning anything.
pub fn plan_conversion(
    sources: &[PathBuf],
    batch_size: usize,
) -> Result<ConversionPlan, Md2PdfError> {
    if sources.is_empty() {
        return Err(Md2PdfError::EmptyRequest);
    }
    if batch_size == 0 {
        return Err(Md2PdfError::InvalidBatchSize(batch_size));
    }
    let report = partition_by_freshness(sources)?;
    let batches = plan_batches(&report.to_process, batch_size)?
        .map(<[PathBuf]>::to_vec)
        .collect();
    Ok(ConversionPlan {
        to_process: report.to_process,
        skipped: report.skipped,
        batches,
    })
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Use the configured converter if any, otherwise look one up.
fn resolve_converter(config: &ConversionConfig) -> Result<ConverterLaunch, Md2PdfError> {
    if let Some(ref launch) = config.converter {
        return Ok(launch.clone());
    }
    let launch = launch_or_fallback(locate_converter())?;
    info!("Using converter: {}", launch);
    Ok(launch)
}

/// Turn a lookup result into something to launch.
///
/// When nothing is installed the bare launcher name is used anyway: each
/// batch then fails to start and the failure lands in that batch's stderr.
/// A broken `MD2PDF_CONVERTER` is a configuration mistake and is returned.
fn launch_or_fallback(
    located: Result<ConverterLaunch, LocateError>,
) -> Result<ConverterLaunch, Md2PdfError> {
    match located {
        Ok(launch) => Ok(launch),
        Err(LocateError::NotFound { hint }) => {
            warn!("No converter found; batches will fail to launch. {}", hint);
            Ok(ConverterLaunch::Launcher(PathBuf::from(LAUNCHER_NAME)))
        }
        Err(e) => Err(e.into()),
    }
}

fn report_progress(
    sink: Option<&ProgressCallback>,
    start: usize,
    len: usize,
    total: usize,
    index: usize,
    count: usize,
) {
    let message = batch_message(start, len, total, index, count);
    debug!("{}", message);
    if let Some(cb) = sink {
        cb.on_progress(batch_fraction(start, total), &message);
    }
}
