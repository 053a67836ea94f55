//! CLI binary for md2pdf-batch.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig`, shows progress and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use md2pdf_batch::converter_locate::{install_hint, probe};
use md2pdf_batch::pipeline::invoke::command_line;
use md2pdf_batch::{
    bundle_artifacts, default_batch_size, expand_inputs, plan_conversion, run_conversion,
    ConversionConfig, ConversionOutcome, FileSelection, ProgressCallback, ProgressSink, RunStatus,
    DEFAULT_BUNDLE_NAME,
};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress sink using indicatif ────────────────────────────────────────

/// Terminal progress sink: one bar measured in files, advanced as each batch
/// finishes, plus a log line per batch.
struct CliProgress {
    bar: ProgressBar,
    batch_size: usize,
    total: AtomicUsize,
    batch_started: Mutex<Option<Instant>>,
}

impl CliProgress {
    fn new(batch_size: usize) -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);
        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Checking timestamps…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            batch_size,
            total: AtomicUsize::new(0),
            batch_started: Mutex::new(None),
        })
    }

    fn batch_len(&self, batch_index: usize) -> usize {
        let total = self.total.load(Ordering::SeqCst);
        let start = batch_index * self.batch_size;
        total.saturating_sub(start).min(self.batch_size)
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressSink for CliProgress {
    fn on_run_start(&self, to_process: usize, skipped: usize) {
        self.total.store(to_process, Ordering::SeqCst);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(to_process as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Converting");
        self.bar.println(format!(
            "{} {}  {}",
            cyan("◆"),
            bold(&format!("Converting {to_process} files…")),
            dim(&format!("{skipped} already up to date")),
        ));
    }

    fn on_progress(&self, _fraction: f64, message: &str) {
        if let Ok(mut started) = self.batch_started.lock() {
            *started = Some(Instant::now());
        }
        self.bar.set_message(message.to_string());
    }

    fn on_batch_complete(&self, batch_index: usize, batch_count: usize, success: bool) {
        let elapsed = self
            .batch_started
            .lock()
            .ok()
            .and_then(|mut s| s.take())
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        let mark = if success { green("✓") } else { red("✗") };
        self.bar.println(format!(
            "  {mark} Batch {:>2}/{:<2}  {}",
            batch_index + 1,
            batch_count,
            dim(&format!("{elapsed:.1}s")),
        ));
        self.bar.inc(self.batch_len(batch_index) as u64);
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert every .md file in the current folder
  md2pdf

  # Walk a folder tree, four files per converter run
  md2pdf --recursive --batch-size 4 ./docs

  # Show the numbered list, then convert entries 1, 3 and 4
  md2pdf --list ./notes
  md2pdf --select 1,3,4 ./notes

  # Preview what would run, without converting
  md2pdf --dry-run ./docs

  # Convert and collect all PDFs in one archive
  md2pdf ./docs --zip ./docs/converted_docs.zip

  # Check that Node.js / md-to-pdf are available
  md2pdf --check

ENVIRONMENT VARIABLES:
  MD2PDF_CONVERTER   Path to an md-to-pdf executable (skips the search)
  MD2PDF_HOSTED      1/0: force small or normal default batches
  MD2PDF_BATCH_SIZE  Files per converter run
  RUST_LOG           Log filter, e.g. md2pdf_batch=debug

NOTES:
  A file is skipped when its .pdf sibling is newer than the .md file.
  Touch the .md file (or delete the .pdf) to force reconversion.
  On Linux the headless browser runs with --no-sandbox.
"#;

/// Convert Markdown files to PDF in batches using md-to-pdf.
#[derive(Parser, Debug)]
#[command(
    name = "md2pdf",
    version,
    about = "Convert Markdown files to PDF in batches using md-to-pdf",
    long_about = "Convert Markdown files to PDF by running md-to-pdf over them a few at a time. \
Files whose PDF is already newer than the Markdown are skipped.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Markdown files or folders. Default: current folder.
    inputs: Vec<PathBuf>,

    /// Descend into subfolders when scanning folders.
    #[arg(short, long, env = "MD2PDF_RECURSIVE")]
    recursive: bool,

    /// Which listed files to convert: all, 3, 2-5, or 1,3,4.
    #[arg(short, long, env = "MD2PDF_SELECT", default_value = "all")]
    select: String,

    /// Print the numbered file list and exit.
    #[arg(long)]
    list: bool,

    /// Files per converter run. Default: 8, or 3 on hosted machines.
    #[arg(short, long, env = "MD2PDF_BATCH_SIZE",
          value_parser = clap::value_parser!(u64).range(1..))]
    batch_size: Option<u64>,

    /// Show the freshness split and batches without converting.
    #[arg(long)]
    dry_run: bool,

    /// Report whether the converter is available and exit.
    #[arg(long)]
    check: bool,

    /// Bundle the resulting PDFs into this zip archive.
    #[arg(long, value_name = "PATH", num_args = 0..=1,
          default_missing_value = DEFAULT_BUNDLE_NAME)]
    zip: Option<PathBuf>,

    /// Print the outcome (or plan) as JSON.
    #[arg(long, env = "MD2PDF_JSON")]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, env = "MD2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MD2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "MD2PDF_QUIET")]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Keep library INFO logs out of the way while the bar is drawn.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.dry_run;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Check-only mode ──────────────────────────────────────────────────
    if cli.check {
        return run_check(&cli);
    }

    // ── Collect sources ──────────────────────────────────────────────────
    let inputs = if cli.inputs.is_empty() {
        vec![std::env::current_dir().context("Failed to read current directory")?]
    } else {
        cli.inputs.clone()
    };
    let found = expand_inputs(&inputs, cli.recursive).context("Failed to collect Markdown files")?;
    if found.is_empty() {
        eprintln!("{} No Markdown (.md) files found", red("✘"));
        std::process::exit(1);
    }

    if cli.list {
        for (i, f) in found.iter().enumerate() {
            println!("{:>4}. {}", i + 1, f.display());
        }
        return Ok(());
    }

    let selection: FileSelection = cli.select.parse().context("Invalid --select value")?;
    let sources = selection.apply(&found);
    if sources.is_empty() {
        eprintln!("{} No files selected", red("✘"));
        std::process::exit(1);
    }

    let batch_size = match cli.batch_size {
        Some(n) => usize::try_from(n).context("--batch-size is too large")?,
        None => default_batch_size(),
    };

    // ── Dry run ──────────────────────────────────────────────────────────
    if cli.dry_run {
        return print_plan(&cli, &sources, batch_size);
    }

    // ── Run conversion ───────────────────────────────────────────────────
    let progress = show_progress.then(|| CliProgress::new(batch_size));
    let mut config = ConversionConfig::builder()
        .batch_size(batch_size)
        .build()
        .context("Invalid configuration")?;
    config.progress_callback = progress
        .as_ref()
        .map(|p| Arc::clone(p) as ProgressCallback);

    let started = Instant::now();
    let outcome = run_conversion(&sources, &config);
    if let Some(ref p) = progress {
        p.finish();
    }
    let outcome = outcome.context("Conversion failed")?;

    let produced = outcome.artifacts_for(&sources);
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcome).context("Failed to serialise outcome")?
        );
    } else if !cli.quiet {
        print_summary(&outcome, &produced, started.elapsed());
    }

    if let Some(ref zip_path) = cli.zip {
        let pdfs: Vec<PathBuf> = produced.iter().map(|(_, pdf)| pdf.clone()).collect();
        let n = bundle_artifacts(&pdfs, zip_path)
            .with_context(|| format!("Failed to bundle PDFs into {}", zip_path.display()))?;
        if !cli.quiet {
            eprintln!("{} {} PDFs  →  {}", green("✔"), n, bold(&zip_path.display().to_string()));
        }
    }

    if !outcome.overall_success {
        std::process::exit(1);
    }
    Ok(())
}

/// `--check`: print platform and converter, exit 1 when missing.
fn run_check(cli: &Cli) -> Result<()> {
    let p = probe();
    if cli.json {
        let json = serde_json::json!({
            "platform": p.platform.to_string(),
            "hosted": p.hosted,
            "converter": p.converter.as_ref().map(|c| c.to_string()),
            "ready": p.is_ready(),
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        println!("Platform:     {}", p.platform);
        println!("Hosted:       {}", p.hosted);
        match p.converter {
            Some(ref c) => println!("Converter:    {} {}", c, green("(ready)")),
            None => {
                println!("Converter:    {}", red("not found"));
                println!("{}", install_hint(p.platform));
            }
        }
        println!("Batch size:   {}", default_batch_size());
    }
    if !p.is_ready() {
        std::process::exit(1);
    }
    Ok(())
}

/// `--dry-run`: show which files would be converted and how they are batched.
fn print_plan(cli: &Cli, sources: &[PathBuf], batch_size: usize) -> Result<()> {
    let plan = plan_conversion(sources, batch_size).context("Failed to plan conversion")?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    let p = probe();
    for f in &plan.skipped {
        println!("  {} {}", dim("="), dim(&f.display().to_string()));
    }
    for (i, batch) in plan.batches.iter().enumerate() {
        println!("{} batch {}/{}", cyan("◆"), i + 1, plan.batches.len());
        match p.converter {
            Some(ref launch) => println!("    {}", dim(&command_line(batch, p.platform, launch))),
            None => {
                for f in batch {
                    println!("    {}", f.display());
                }
            }
        }
    }
    println!(
        "{} to convert, {} up to date, {} batches of up to {}",
        bold(&plan.to_process.len().to_string()),
        plan.skipped.len(),
        plan.batches.len(),
        batch_size
    );
    Ok(())
}

fn print_summary(outcome: &ConversionOutcome, produced: &[(PathBuf, PathBuf)], elapsed: Duration) {
    match outcome.status() {
        RunStatus::NothingToDo => {
            eprintln!(
                "{} Nothing to do: all {} files are up to date",
                green("✔"),
                bold(&outcome.skipped_count.to_string())
            );
        }
        RunStatus::Succeeded => {
            eprintln!(
                "{} Converted {} files ({} cached) in {:.1}s",
                green("✔"),
                bold(&outcome.processed_count.to_string()),
                outcome.skipped_count,
                elapsed.as_secs_f64()
            );
        }
        RunStatus::Failed => {
            eprintln!(
                "{} Conversion failed for at least one batch ({} attempted, {} cached)",
                red("✘"),
                outcome.processed_count,
                outcome.skipped_count
            );
            let stderr = outcome.combined_stderr.trim();
            if !stderr.is_empty() {
                eprintln!("{}", red(stderr));
            }
            eprintln!(
                "{}",
                dim("If npx failed, try installing the tool globally: npm i -g md-to-pdf")
            );
        }
    }

    for (_, pdf) in produced {
        println!("{}", pdf.display());
    }
}
