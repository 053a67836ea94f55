//! Zip converted PDFs into one download.

use crate::error::Md2PdfError;
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::{info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Archive name used when the caller does not choose one.
pub const DEFAULT_BUNDLE_NAME: &str = "converted_docs.zip";

/// Write every existing file in `files` into a deflated zip at `zip_path`,
/// each under its base name. Missing files are skipped.
///
/// Returns the number of entries written.
pub fn bundle_artifacts<P: AsRef<Path>>(files: &[P], zip_path: &Path) -> Result<usize, Md2PdfError> {
    let existing: Vec<&Path> = files
        .iter()
        .map(AsRef::as_ref)
        .filter(|p| {
            let ok = p.is_file();
            if !ok {
                warn!("Skipping missing file: {}", p.display());
            }
            ok
        })
        .collect();

    if existing.is_empty() {
        return Err(Md2PdfError::NothingToBundle);
    }

    let write_err = |source: io::Error| Md2PdfError::BundleWrite {
        path: zip_path.to_path_buf(),
        source,
    };

    let out = File::create(zip_path).map_err(write_err)?;
    let mut zip = ZipWriter::new(out);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in &existing {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Md2PdfError::Internal(format!("no file name in {}", path.display())))?;
        zip.start_file(name, options)
            .map_err(|e| write_err(io::Error::other(e)))?;
        let mut input = File::open(path).map_err(write_err)?;
        io::copy(&mut input, &mut zip).map_err(write_err)?;
    }

    zip.finish().map_err(|e| write_err(io::Error::other(e)))?;
    info!("Wrote {} files to {}", existing.len(), zip_path.display());
    Ok(existing.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Read;

    #[test]
    fn bundles_existing_files_by_base_name() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let a = dir.path().join("a.pdf");
        let b = dir.path().join("sub").join("b.pdf");
        fs::write(&a, "%PDF-a").unwrap();
        fs::write(&b, "%PDF-b").unwrap();
        let missing = dir.path().join("gone.pdf");
        let zip_path = dir.path().join(DEFAULT_BUNDLE_NAME);

        let n = bundle_artifacts(&[a, missing, b], &zip_path).unwrap();
        assert_eq!(n, 2);

        let mut archive = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
        assert_eq!(archive.len(), 2);
        let mut content = String::new();
        archive
            .by_name("b.pdf")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "%PDF-b");
    }

    #[test]
    fn nothing_to_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let err = bundle_artifacts(&[dir.path().join("x.pdf")], &dir.path().join("out.zip"))
            .unwrap_err();
        assert!(matches!(err, Md2PdfError::NothingToBundle));
        assert!(!dir.path().join("out.zip").exists());
    }
}
