//! Converter invoker: run md-to-pdf once for one batch.
//!
//! Arguments are passed straight to the process with
//! [`std::process::Command::arg`]; no shell sits in between. Every source
//! path therefore reaches the converter as exactly one argument, whatever
//! spaces, quotes or `$` it contains.
//!
//! The invoker never fails. A non-zero exit and a failure to launch both come
//! back as a [`BatchResult`] with `success == false`, so the caller can move
//! on to the next batch.

use converter_locate::{ConverterLaunch, Platform};
use serde_json::json;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Instant;
use tracing::{debug, warn};

/// Flag md-to-pdf uses to forward options to its headless browser.
pub const LAUNCH_OPTIONS_FLAG: &str = "--launch-options";

/// Outcome of one converter process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    /// Exit code, or `None` when the process could not be started or was
    /// killed by a signal.
    pub exit_code: Option<i32>,
    /// `true` iff the process ran and exited with status 0.
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl BatchResult {
    fn launch_failed(message: String) -> Self {
        Self {
            exit_code: None,
            success: false,
            stdout: String::new(),
            stderr: message,
        }
    }
}

/// JSON value for `--launch-options` that disables the browser sandbox.
pub fn no_sandbox_launch_options() -> String {
    json!({ "args": ["--no-sandbox"] }).to_string()
}

/// Full argument list (after the program) for one batch.
pub fn batch_args(batch: &[PathBuf], platform: Platform, launch: &ConverterLaunch) -> Vec<OsString> {
    let mut args = launch.leading_args();
    if platform.needs_sandbox_flag() {
        args.push(OsString::from(LAUNCH_OPTIONS_FLAG));
        args.push(OsString::from(no_sandbox_launch_options()));
    }
    args.extend(batch.iter().map(|p| p.as_os_str().to_os_string()));
    args
}

/// Shell-quoted rendering of the invocation, for logs and `--dry-run`. Never
/// executed.
pub fn command_line(batch: &[PathBuf], platform: Platform, launch: &ConverterLaunch) -> String {
    std::iter::once(launch.program().as_os_str().to_os_string())
        .chain(batch_args(batch, platform, launch))
        .map(|a| shell_quote(&a.to_string_lossy()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:@%+,".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// Run the converter on exactly the files in `batch` and wait for it.
pub fn invoke_batch(batch: &[PathBuf], platform: Platform, launch: &ConverterLaunch) -> BatchResult {
    debug_assert!(!batch.is_empty(), "invoke_batch called with an empty batch");
    debug!("Running: {}", command_line(batch, platform, launch));

    let start = Instant::now();
    let output = Command::new(launch.program())
        .args(batch_args(batch, platform, launch))
        .stdin(Stdio::null())
        .output();

    match output {
        Ok(out) => {
            let result = BatchResult {
                exit_code: out.status.code(),
                success: out.status.success(),
                stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
            };
            debug!(
                "Converter exited with {:?} after {}ms",
                result.exit_code,
                start.elapsed().as_millis()
            );
            result
        }
        Err(e) => {
            warn!("Failed to launch {}: {}", launch.program().display(), e);
            BatchResult::launch_failed(format!(
                "Failed to launch '{}': {}\n",
                launch.program().display(),
                e
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn launcher() -> ConverterLaunch {
        ConverterLaunch::Launcher(PathBuf::from("/usr/bin/npx"))
    }

    #[test]
    fn launch_options_json() {
        assert_eq!(no_sandbox_launch_options(), r#"{"args":["--no-sandbox"]}"#);
    }

    #[test]
    fn linux_gets_sandbox_flag_before_paths() {
        let batch = vec![PathBuf::from("/d/a b.md"), PathBuf::from("/d/c.md")];
        let args = batch_args(&batch, Platform::Linux, &launcher());
        assert_eq!(
            args,
            vec![
                OsString::from("md-to-pdf"),
                OsString::from("--launch-options"),
                OsString::from(r#"{"args":["--no-sandbox"]}"#),
                OsString::from("/d/a b.md"),
                OsString::from("/d/c.md"),
            ]
        );
    }

    #[test]
    fn other_platforms_get_no_flag() {
        let batch = vec![PathBuf::from("/d/a.md")];
        for platform in [Platform::MacOs, Platform::Windows, Platform::Other] {
            let args = batch_args(&batch, platform, &ConverterLaunch::Local("/bin/md-to-pdf".into()));
            assert_eq!(args, vec![OsString::from("/d/a.md")], "{platform}");
        }
    }

    #[test]
    fn command_line_quotes_awkward_paths() {
        let batch = vec![PathBuf::from("/d/it's here.md"), PathBuf::from("/d/plain.md")];
        let line = command_line(&batch, Platform::MacOs, &launcher());
        assert_eq!(line, r#"/usr/bin/npx md-to-pdf '/d/it'\''s here.md' /d/plain.md"#);
    }

    #[test]
    fn missing_program_is_captured_not_raised() {
        let launch = ConverterLaunch::Local(PathBuf::from("/definitely/not/md-to-pdf"));
        let result = invoke_batch(&[PathBuf::from("/tmp/a.md")], Platform::MacOs, &launch);
        assert!(!result.success);
        assert_eq!(result.exit_code, None);
        assert!(result.stderr.contains("Failed to launch"), "got: {}", result.stderr);
    }

    #[cfg(unix)]
    fn sh(script: &str) -> ConverterLaunch {
        ConverterLaunch::Custom {
            program: PathBuf::from("sh"),
            args: vec!["-c".into(), script.into(), "sh".into()],
        }
    }

    #[cfg(unix)]
    #[test]
    fn each_path_arrives_as_one_argument() {
        let launch = sh(r#"for a in "$@"; do printf '<%s>\n' "$a"; done"#);
        let batch = vec![
            PathBuf::from("/d/with space.md"),
            PathBuf::from("/d/$(rm -rf x);.md"),
            PathBuf::from("/d/\"quoted\".md"),
        ];
        let result = invoke_batch(&batch, Platform::MacOs, &launch);
        assert!(result.success, "stderr: {}", result.stderr);
        assert_eq!(
            result.stdout,
            "</d/with space.md>\n</d/$(rm -rf x);.md>\n</d/\"quoted\".md>\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_data() {
        let launch = sh("echo partial; echo broken >&2; exit 3");
        let result = invoke_batch(&[PathBuf::from("/d/a.md")], Platform::MacOs, &launch);
        assert!(!result.success);
        assert_eq!(result.exit_code, Some(3));
        assert_eq!(result.stdout, "partial\n");
        assert_eq!(result.stderr, "broken\n");
    }

    #[cfg(unix)]
    #[test]
    fn linux_flag_reaches_the_process() {
        let launch = sh(r#"printf '%s|' "$@""#);
        let result = invoke_batch(&[PathBuf::from("/d/a.md")], Platform::Linux, &launch);
        assert_eq!(
            result.stdout,
            r#"--launch-options|{"args":["--no-sandbox"]}|/d/a.md|"#
        );
    }
}
