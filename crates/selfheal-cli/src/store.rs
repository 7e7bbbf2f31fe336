//! Slug store backed by a plain text file.

use std::path::{Path, PathBuf};

use selfheal_core::{SlugStore, StoreError};
use tracing::trace;

/// One slug per line; blank lines and `#` comments are skipped.
///
/// The file is re-read on every query, so edits show up on the next
/// resolution without restarting anything.
#[derive(Debug, Clone)]
pub struct FileStore {
    name: String,
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: path.display().to_string(),
            path,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SlugStore for FileStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn slugs(&self) -> Result<Vec<String>, StoreError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            StoreError::with_source(format!("failed to read {}", self.path.display()), e)
        })?;
        let slugs = parse_slugs(&contents);
        trace!(path = %self.path.display(), slugs = slugs.len(), "read slug file");
        Ok(slugs)
    }
}

pub fn parse_slugs(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn skips_blank_lines_and_comments() {
        let slugs = parse_slugs("# products\ncool-product\n\n  super-phone  \n#retired\n");
        assert_eq!(slugs, ["cool-product", "super-phone"]);
    }

    #[test]
    fn rereads_the_file_on_every_query() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "first-slug").unwrap();
        let store = FileStore::new(file.path());
        assert_eq!(store.slugs().unwrap(), ["first-slug"]);

        writeln!(file, "second-slug").unwrap();
        file.flush().unwrap();
        assert_eq!(store.slugs().unwrap(), ["first-slug", "second-slug"]);
        assert_eq!(
            store.matching("second").unwrap(),
            ["first-slug", "second-slug"]
        );
        assert_eq!(store.find("second-slug").unwrap(), None);
    }

    #[test]
    fn missing_file_is_a_store_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("absent.txt"));
        let error = store.slugs().unwrap_err();
        assert!(error.message().starts_with("failed to read"));
        assert!(std::error::Error::source(&error).is_some());
    }
}
