//! Configuration types for batch Markdown-to-PDF conversion.
//!
//! All run behaviour is controlled through [`ConversionConfig`], built via its
//! [`ConversionConfigBuilder`]. The config is cheap to clone and can be moved
//! into a blocking worker as a whole.

use crate::error::Md2PdfError;
use crate::progress::ProgressCallback;
use converter_locate::{is_hosted_environment, ConverterLaunch, Platform};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Files per converter invocation on a workstation.
pub const DEFAULT_BATCH_SIZE: usize = 8;

/// Files per converter invocation on hosted or memory-constrained machines.
pub const HOSTED_BATCH_SIZE: usize = 3;

/// Extension of the produced artifact.
pub const ARTIFACT_EXTENSION: &str = "pdf";

/// Default batch size for the current environment.
pub fn default_batch_size() -> usize {
    if is_hosted_environment() {
        HOSTED_BATCH_SIZE
    } else {
        DEFAULT_BATCH_SIZE
    }
}

/// Configuration for one conversion run.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use md2pdf_batch::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .batch_size(4)
///     .build()
///     .unwrap();
/// assert_eq!(config.batch_size, 4);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Maximum number of files handed to one converter process. Default:
    /// [`DEFAULT_BATCH_SIZE`], or [`HOSTED_BATCH_SIZE`] when a hosted
    /// environment is detected.
    ///
    /// Every md-to-pdf process starts its own headless browser, and memory
    /// grows with the number of documents it holds open. Capping the batch
    /// caps peak memory regardless of how many files were requested.
    pub batch_size: usize,

    /// Platform whose invocation rules apply. Default: [`Platform::current()`].
    pub platform: Platform,

    /// Explicit converter command. If None, the converter is located at run
    /// time (local md-to-pdf first, then npx).
    pub converter: Option<ConverterLaunch>,

    /// Receives an update before each batch.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            platform: Platform::current(),
            converter: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("batch_size", &self.batch_size)
            .field("platform", &self.platform)
            .field("converter", &self.converter)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ProgressSink>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Check constraints that the builder enforces, for configs whose public
    /// fields were set directly.
    pub fn validate(&self) -> Result<(), Md2PdfError> {
        if self.batch_size == 0 {
            return Err(Md2PdfError::InvalidBatchSize(self.batch_size));
        }
        if let Some(ConverterLaunch::Custom { program, .. }) = &self.converter {
            if program.as_os_str().is_empty() {
                return Err(Md2PdfError::InvalidConfig(
                    "custom converter program is empty".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn batch_size(mut self, n: usize) -> Self {
        self.config.batch_size = n;
        self
    }

    pub fn platform(mut self, platform: Platform) -> Self {
        self.config.platform = platform;
        self
    }

    pub fn converter(mut self, launch: ConverterLaunch) -> Self {
        self.config.converter = Some(launch);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Md2PdfError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

// ── File selection ───────────────────────────────────────────────────────

/// Which entries of a numbered file list to convert.
///
/// Parsed from the text a user types at the prompt or passes to `--select`:
/// `all`, `3`, `2-5`, or `1,3,4`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileSelection {
    /// Every listed file (default).
    #[default]
    All,
    /// A single file (1-indexed).
    Single(usize),
    /// A contiguous range (1-indexed, inclusive).
    Range(usize, usize),
    /// Specific files (1-indexed).
    Set(Vec<usize>),
}

impl FileSelection {
    /// Expand into a sorted, deduplicated list of 0-indexed positions.
    /// Numbers outside `1..=total` are dropped.
    pub fn to_indices(&self, total: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = match self {
            FileSelection::All => (0..total).collect(),
            FileSelection::Single(n) => {
                if *n >= 1 && *n <= total {
                    vec![n - 1]
                } else {
                    vec![]
                }
            }
            FileSelection::Range(start, end) => {
                let s = (*start).max(1) - 1;
                let e = (*end).min(total);
                (s..e).collect()
            }
            FileSelection::Set(items) => items
                .iter()
                .filter(|&&n| n >= 1 && n <= total)
                .map(|n| n - 1)
                .collect(),
        };
        indices.sort_unstable();
        indices.dedup();
        indices
    }

    /// Pick the selected items out of `files`, keeping list order.
    pub fn apply<T: Clone>(&self, files: &[T]) -> Vec<T> {
        self.to_indices(files.len())
            .into_iter()
            .map(|i| files[i].clone())
            .collect()
    }
}

impl FromStr for FileSelection {
    type Err = Md2PdfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();

        if s == "all" || s == "*" {
            return Ok(FileSelection::All);
        }

        // Set: "1,3,4". Blank and non-numeric entries are ignored.
        if s.contains(',') {
            let items: Vec<usize> = s
                .split(',')
                .filter_map(|p| p.trim().parse::<usize>().ok())
                .collect();
            if items.is_empty() {
                return Err(Md2PdfError::InvalidConfig(format!(
                    "no file numbers in selection '{s}'"
                )));
            }
            return Ok(FileSelection::Set(items));
        }

        // Range: "2-5"
        if let Some((start, end)) = s.split_once('-') {
            let parse = |v: &str| {
                v.trim().parse::<usize>().map_err(|_| {
                    Md2PdfError::InvalidConfig(format!("invalid range '{s}'"))
                })
            };
            let (start, end) = (parse(start)?, parse(end)?);
            if start < 1 || start > end {
                return Err(Md2PdfError::InvalidConfig(format!(
                    "invalid range '{start}-{end}': start must be >= 1 and <= end"
                )));
            }
            return Ok(FileSelection::Range(start, end));
        }

        let n: usize = s
            .parse()
            .map_err(|_| Md2PdfError::InvalidConfig(format!("invalid selection '{s}'")))?;
        Ok(FileSelection::Single(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn builder_rejects_zero_batch_size() {
        let err = ConversionConfig::builder().batch_size(0).build().unwrap_err();
        assert!(matches!(err, Md2PdfError::InvalidBatchSize(0)));
    }

    #[test]
    fn builder_sets_fields() {
        let config = ConversionConfig::builder()
            .batch_size(2)
            .platform(Platform::Windows)
            .converter(ConverterLaunch::Local(PathBuf::from("/opt/md-to-pdf")))
            .build()
            .unwrap();
        assert_eq!(config.batch_size, 2);
        assert_eq!(config.platform, Platform::Windows);
        assert!(config.converter.is_some());
        assert!(config.progress_callback.is_none());
    }

    #[test]
    fn empty_custom_program_is_invalid() {
        let err = ConversionConfig::builder()
            .converter(ConverterLaunch::Custom {
                program: PathBuf::new(),
                args: vec![],
            })
            .build()
            .unwrap_err();
        assert!(matches!(err, Md2PdfError::InvalidConfig(_)));
    }

    #[test]
    fn default_batch_size_is_in_recommended_range() {
        let n = default_batch_size();
        assert!(n == DEFAULT_BATCH_SIZE || n == HOSTED_BATCH_SIZE);
        assert!(HOSTED_BATCH_SIZE < DEFAULT_BATCH_SIZE);
    }

    #[test]
    fn debug_hides_callback() {
        let cb: ProgressCallback = std::sync::Arc::new(|_: f64, _: &str| {});
        let config = ConversionConfig::builder()
            .progress_callback(cb)
            .build()
            .unwrap();
        assert!(format!("{config:?}").contains("<dyn ProgressSink>"));
    }

    #[test]
    fn parse_selections() {
        assert_eq!("all".parse::<FileSelection>().unwrap(), FileSelection::All);
        assert_eq!(" ALL ".parse::<FileSelection>().unwrap(), FileSelection::All);
        assert_eq!("3".parse::<FileSelection>().unwrap(), FileSelection::Single(3));
        assert_eq!(
            "2-5".parse::<FileSelection>().unwrap(),
            FileSelection::Range(2, 5)
        );
        assert_eq!(
            "1, 3,x,4".parse::<FileSelection>().unwrap(),
            FileSelection::Set(vec![1, 3, 4])
        );
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("".parse::<FileSelection>().is_err());
        assert!("abc".parse::<FileSelection>().is_err());
        assert!("5-2".parse::<FileSelection>().is_err());
        assert!(",,".parse::<FileSelection>().is_err());
    }

    #[test]
    fn selection_to_indices() {
        assert_eq!(FileSelection::All.to_indices(3), vec![0, 1, 2]);
        assert_eq!(FileSelection::Single(4).to_indices(3), Vec::<usize>::new());
        assert_eq!(FileSelection::Range(2, 10).to_indices(4), vec![1, 2, 3]);
        assert_eq!(
            FileSelection::Set(vec![3, 1, 3, 9]).to_indices(4),
            vec![0, 2]
        );
    }

    #[test]
    fn apply_keeps_list_order() {
        let files = ["a.md", "b.md", "c.md"];
        assert_eq!(
            FileSelection::Set(vec![3, 1]).apply(&files),
            vec!["a.md", "c.md"]
        );
    }
}
