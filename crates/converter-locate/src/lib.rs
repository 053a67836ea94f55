//! # converter-locate
//!
//! Find the [md-to-pdf](https://github.com/simonhaenisch/md-to-pdf) converter
//! on the host and identify the platform it runs on, so that callers never
//! have to build the command line themselves.
//!
//! ## How it works
//!
//! [`locate_converter`] walks an ordered list of candidates and stops at the
//! first hit:
//!
//! 1. `MD2PDF_CONVERTER` pointing at an existing file.
//! 2. A project-local install at `./node_modules/.bin/md-to-pdf`.
//! 3. A global `md-to-pdf` on `PATH`.
//! 4. The `npx` launcher on `PATH`, which fetches md-to-pdf on demand.
//!
//! A local executable starts faster and needs no package resolution, so it
//! always wins over the launcher.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use converter_locate::{probe, install_hint};
//!
//! let p = probe();
//! if !p.is_ready() {
//!     eprintln!("{}", install_hint(p.platform));
//! }
//! ```
//!
//! ## Environment variable overrides
//!
//! - `MD2PDF_CONVERTER` — path to an md-to-pdf executable; skips the search.
//! - `MD2PDF_HOSTED` — force hosted-environment detection on (`1`/`true`) or
//!   off (`0`/`false`).

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

// ── Public constants ─────────────────────────────────────────────────────────

/// Name of the converter executable and npm package.
pub const CONVERTER_NAME: &str = "md-to-pdf";

/// Name of the on-demand package launcher.
pub const LAUNCHER_NAME: &str = "npx";

/// Environment variable holding an explicit converter path.
pub const CONVERTER_ENV: &str = "MD2PDF_CONVERTER";

/// Environment variable forcing hosted-environment detection.
pub const HOSTED_ENV: &str = "MD2PDF_HOSTED";

/// Variables set by common hosting platforms (container orchestrators, PaaS
/// dynos, notebook and app-sharing services).
const HOSTED_MARKERS: &[&str] = &[
    "KUBERNETES_SERVICE_HOST",
    "DYNO",
    "STREAMLIT_SHARING_MODE",
    "SPACE_ID",
];

// ── Error type ───────────────────────────────────────────────────────────────

/// Errors returned by converter lookup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocateError {
    /// Neither md-to-pdf nor npx could be found.
    #[error("Neither '{CONVERTER_NAME}' nor '{LAUNCHER_NAME}' was found on PATH.\n{hint}")]
    NotFound { hint: String },

    /// `MD2PDF_CONVERTER` is set but does not point at a file.
    #[error("{CONVERTER_ENV} points to '{path}', which does not exist")]
    OverrideMissing { path: PathBuf },
}

// ── Platform ─────────────────────────────────────────────────────────────────

/// Operating system family, as far as converter invocation cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
    Other,
}

impl Platform {
    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Map a `std::env::consts::OS` value to a platform.
    pub fn from_os(os: &str) -> Self {
        match os {
            "linux" => Platform::Linux,
            "macos" => Platform::MacOs,
            "windows" => Platform::Windows,
            _ => Platform::Other,
        }
    }

    /// Whether the headless browser behind md-to-pdf must run with its
    /// sandbox disabled. Only Linux needs it; containers and CI runners there
    /// usually lack the user namespaces Chromium's sandbox requires.
    pub fn needs_sandbox_flag(self) -> bool {
        matches!(self, Platform::Linux)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Linux => "Linux",
            Platform::MacOs => "macOS",
            Platform::Windows => "Windows",
            Platform::Other => "Other",
        };
        f.write_str(name)
    }
}

/// OS-specific instructions for installing Node.js (which provides `npx`).
pub fn install_hint(platform: Platform) -> &'static str {
    match platform {
        Platform::Windows => {
            "Install Node.js from https://nodejs.org/en/download/ (Windows Installer), \
             or run: winget install OpenJS.NodeJS"
        }
        Platform::MacOs => "Install Node.js with: brew install node",
        Platform::Linux => "Install Node.js with: sudo apt install nodejs npm",
        Platform::Other => "Install Node.js from https://nodejs.org/en/download/",
    }
}

/// Returns `true` when running on a shared or hosted machine where memory is
/// tight and batches should be kept small.
pub fn is_hosted_environment() -> bool {
    hosted_from(|key| std::env::var_os(key))
}

/// Environment-free core of [`is_hosted_environment`]. `var` looks up one
/// variable. `MD2PDF_HOSTED`, when set, decides on its own.
pub fn hosted_from<F>(var: F) -> bool
where
    F: Fn(&str) -> Option<OsString>,
{
    if let Some(v) = var(HOSTED_ENV) {
        return matches!(
            v.to_string_lossy().trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes"
        );
    }
    HOSTED_MARKERS
        .iter()
        .any(|&k| var(k).is_some_and(|v| !v.is_empty()))
}

// ── Converter launch description ─────────────────────────────────────────────

/// How to start the converter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConverterLaunch {
    /// A directly runnable md-to-pdf executable.
    Local(PathBuf),
    /// The npx launcher; md-to-pdf is passed as its first argument.
    Launcher(PathBuf),
    /// Any other program with leading arguments, placed before the
    /// converter flags and source paths.
    Custom { program: PathBuf, args: Vec<OsString> },
}

impl ConverterLaunch {
    /// Executable to spawn.
    pub fn program(&self) -> &Path {
        match self {
            ConverterLaunch::Local(p) | ConverterLaunch::Launcher(p) => p,
            ConverterLaunch::Custom { program, .. } => program,
        }
    }

    /// Arguments that go before any converter flag.
    pub fn leading_args(&self) -> Vec<OsString> {
        match self {
            ConverterLaunch::Local(_) => Vec::new(),
            ConverterLaunch::Launcher(_) => vec![OsString::from(CONVERTER_NAME)],
            ConverterLaunch::Custom { args, .. } => args.clone(),
        }
    }

    /// `true` for the on-demand launcher, which may hit the network.
    pub fn is_launcher(&self) -> bool {
        matches!(self, ConverterLaunch::Launcher(_))
    }
}

impl fmt::Display for ConverterLaunch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program().display())?;
        for arg in self.leading_args() {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

// ── Lookup ───────────────────────────────────────────────────────────────────

/// Locate the converter using the process environment and working directory.
pub fn locate_converter() -> Result<ConverterLaunch, LocateError> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let path_var = std::env::var_os("PATH").unwrap_or_default();
    let override_path = std::env::var_os(CONVERTER_ENV).filter(|v| !v.is_empty());
    locate_in(&cwd, &path_var, override_path.as_deref(), Platform::current())
}

/// Environment-free core of [`locate_converter`].
pub fn locate_in(
    cwd: &Path,
    path_var: &OsStr,
    override_path: Option<&OsStr>,
    platform: Platform,
) -> Result<ConverterLaunch, LocateError> {
    // 1. Explicit override.
    if let Some(p) = override_path {
        let p = PathBuf::from(p);
        if p.is_file() {
            debug!("Using converter from {}: {}", CONVERTER_ENV, p.display());
            return Ok(ConverterLaunch::Local(p));
        }
        return Err(LocateError::OverrideMissing { path: p });
    }

    // 2. Project-local install.
    let local_bin = cwd.join("node_modules").join(".bin");
    if let Some(p) = find_in_dir(&local_bin, CONVERTER_NAME) {
        debug!("Using project-local converter: {}", p.display());
        return Ok(ConverterLaunch::Local(p));
    }

    // 3. Global install.
    if let Some(p) = find_in_path(CONVERTER_NAME, path_var) {
        debug!("Using converter from PATH: {}", p.display());
        return Ok(ConverterLaunch::Local(p));
    }

    // 4. On-demand launcher.
    if let Some(p) = find_in_path(LAUNCHER_NAME, path_var) {
        debug!("Falling back to launcher: {}", p.display());
        return Ok(ConverterLaunch::Launcher(p));
    }

    Err(LocateError::NotFound {
        hint: install_hint(platform).to_string(),
    })
}

/// Search every directory of a `PATH`-style variable for `name`.
pub fn find_in_path(name: &str, path_var: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(path_var).find_map(|dir| find_in_dir(&dir, name))
}

fn find_in_dir(dir: &Path, name: &str) -> Option<PathBuf> {
    candidate_names(name)
        .into_iter()
        .map(|n| dir.join(n))
        .find(|p| is_executable(p))
}

/// File names an executable called `name` may have on this OS.
fn candidate_names(name: &str) -> Vec<String> {
    if cfg!(windows) {
        ["cmd", "exe", "bat"]
            .iter()
            .map(|ext| format!("{name}.{ext}"))
            .chain(std::iter::once(name.to_string()))
            .collect()
    } else {
        vec![name.to_string()]
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

// ── Probe ────────────────────────────────────────────────────────────────────

/// Snapshot of what a conversion run would use.
#[derive(Debug, Clone)]
pub struct Probe {
    pub platform: Platform,
    pub converter: Option<ConverterLaunch>,
    pub hosted: bool,
}

impl Probe {
    /// `true` when a converter or launcher was found.
    pub fn is_ready(&self) -> bool {
        self.converter.is_some()
    }
}

/// Check the environment once, before any run is attempted.
pub fn probe() -> Probe {
    Probe {
        platform: Platform::current(),
        converter: locate_converter().ok(),
        hosted: is_hosted_environment(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
