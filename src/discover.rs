//! Find Markdown sources in folders.

use crate::error::Md2PdfError;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Is `path` named like a Markdown file (`.md`, any case)?
pub fn is_markdown(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
}

/// List Markdown files in `dir`, descending into subfolders when `recursive`.
///
/// Paths are absolute and sorted, so numbering shown to the user is stable
/// between runs.
pub fn discover_markdown(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>, Md2PdfError> {
    if !dir.is_dir() {
        return Err(Md2PdfError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }
    let root = absolute(dir)?;
    let max_depth = if recursive { usize::MAX } else { 1 };

    let mut found = Vec::new();
    for entry in WalkDir::new(&root).min_depth(1).max_depth(max_depth) {
        let entry = entry.map_err(|e| Md2PdfError::Discovery {
            path: root.clone(),
            detail: e.to_string(),
        })?;
        if entry.file_type().is_file() && is_markdown(entry.path()) {
            found.push(entry.into_path());
        }
    }
    found.sort();
    debug!("Found {} Markdown files under {}", found.len(), root.display());
    Ok(found)
}

/// Turn command-line inputs into source paths: folders are scanned with
/// [`discover_markdown`], files are kept in the order given.
pub fn expand_inputs<P: AsRef<Path>>(
    inputs: &[P],
    recursive: bool,
) -> Result<Vec<PathBuf>, Md2PdfError> {
    let mut sources = Vec::new();
    for input in inputs {
        let input = input.as_ref();
        if input.is_dir() {
            sources.extend(discover_markdown(input, recursive)?);
        } else {
            sources.push(absolute(input)?);
        }
    }
    Ok(sources)
}

fn absolute(path: &Path) -> Result<PathBuf, Md2PdfError> {
    std::path::absolute(path).map_err(|e| Md2PdfError::Discovery {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.md"), "").unwrap();
        fs::write(dir.path().join("a.MD"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("c.md"), "").unwrap();
        fs::create_dir(dir.path().join("folder.md")).unwrap();
        dir
    }

    #[test]
    fn markdown_extension_is_case_insensitive() {
        assert!(is_markdown(Path::new("x.md")));
        assert!(is_markdown(Path::new("x.Md")));
        assert!(!is_markdown(Path::new("x.markdown.txt")));
        assert!(!is_markdown(Path::new("md")));
    }

    #[test]
    fn flat_scan_ignores_subfolders() {
        let dir = tree();
        let found = discover_markdown(dir.path(), false).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.MD", "b.md"]);
        assert!(found.iter().all(|p| p.is_absolute()));
    }

    #[test]
    fn recursive_scan_includes_subfolders() {
        let dir = tree();
        let found = discover_markdown(dir.path(), true).unwrap();
        assert_eq!(found.len(), 3);
        assert!(found.contains(&dir.path().join("sub").join("c.md")));
    }

    #[test]
    fn missing_folder_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover_markdown(&dir.path().join("nope"), false).unwrap_err();
        assert!(matches!(err, Md2PdfError::DirectoryNotFound { .. }));
    }

    #[test]
    fn expand_mixes_files_and_folders() {
        let dir = tree();
        let extra = dir.path().join("sub").join("c.md");
        let sources = expand_inputs(&[extra.clone(), dir.path().to_path_buf()], false).unwrap();
        assert_eq!(sources.len(), 3);
        assert_eq!(sources[0], extra);
    }
}
