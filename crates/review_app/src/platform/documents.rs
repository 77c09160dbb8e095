//! Plain text of the documents under review, used by the locator.

use std::fs;
use std::path::{Path, PathBuf};

use review_logging::{review_info, review_warn};

/// Text file expected for `filename`: `<text_dir>/<stem>.txt`.
pub(crate) fn text_path(text_dir: &Path, filename: &str) -> PathBuf {
    let stem = Path::new(filename)
        .file_stem()
        .map_or_else(|| filename.into(), |stem| stem.to_os_string());
    text_dir.join(stem).with_extension("txt")
}

/// Reads the text of `filename`. Missing or unreadable files yield `None`;
/// locating then finds nothing.
pub(crate) fn load_document_text(text_dir: &Path, filename: &str) -> Option<String> {
    let path = text_path(text_dir, filename);
    match fs::read_to_string(&path) {
        Ok(text) => {
            review_info!("loaded document text from {:?}", path);
            Some(text)
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            review_warn!("no document text at {:?}", path);
            None
        }
        Err(err) => {
            review_warn!("failed to read document text {:?}: {}", path, err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_file_is_named_after_stem() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("case1.txt"), "Areal: 198 m2").unwrap();

        assert_eq!(
            load_document_text(dir.path(), "case1.pdf").as_deref(),
            Some("Areal: 198 m2")
        );
        assert_eq!(load_document_text(dir.path(), "case2.pdf"), None);
    }
}
