//! File sets
//!
//! A file set is not a list of files but a list of glob patterns resolved against a
//! base directory whenever the files are needed. Patterns starting with `!` exclude
//! matches of the other patterns.

use crate::error::{FileSetError, FileSetResult};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Glob patterns identifying a set of files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSet {
    patterns: Vec<String>,
    base_dir: PathBuf,
}

impl FileSet {
    pub fn new<I, S>(patterns: I, base_dir: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FileSet {
            patterns: patterns.into_iter().map(Into::into).collect(),
            base_dir: base_dir.into(),
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// A new file set with the given patterns appended to this one's
    pub fn expand<I, S>(&self, patterns: I) -> FileSet
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut expanded = self.clone();
        expanded
            .patterns
            .extend(patterns.into_iter().map(Into::into));
        expanded
    }

    /// Find every existing path matching the set, sorted
    pub fn find(&self) -> FileSetResult<Vec<PathBuf>> {
        let excludes = self.excludes()?;
        let mut found = BTreeSet::new();

        for pattern in self.patterns.iter().filter(|p| !p.starts_with('!')) {
            let full = self.base_dir.join(pattern);
            let full = full.to_string_lossy();
            let paths = glob::glob(&full).map_err(|e| FileSetError::Pattern {
                pattern: pattern.clone(),
                error: e.to_string(),
            })?;

            for entry in paths {
                let path = entry.map_err(|e| FileSetError::Walk {
                    path: e.path().to_path_buf(),
                    error: e.into_error(),
                })?;
                let relative = path.strip_prefix(&self.base_dir).unwrap_or(&path);
                if !excludes.is_match(relative) {
                    found.insert(path);
                }
            }
        }

        debug!(patterns = ?self.patterns, count = found.len(), "resolved file set");
        Ok(found.into_iter().collect())
    }

    /// Delete every path matching the set and return what was removed.
    ///
    /// Directories are removed with their contents; paths already removed along with a
    /// parent directory are skipped.
    pub fn delete(&self) -> FileSetResult<Vec<PathBuf>> {
        let mut deleted = Vec::new();

        for path in self.find()? {
            if deleted.iter().any(|parent: &PathBuf| path.starts_with(parent)) {
                continue;
            }

            let removed = if path.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            removed.map_err(|error| FileSetError::Delete {
                path: path.clone(),
                error,
            })?;
            deleted.push(path);
        }

        debug!(count = deleted.len(), "deleted file set");
        Ok(deleted)
    }

    fn excludes(&self) -> FileSetResult<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in self.patterns.iter().filter_map(|p| p.strip_prefix('!')) {
            let glob = Glob::new(pattern).map_err(|e| FileSetError::Pattern {
                pattern: pattern.to_string(),
                error: e.to_string(),
            })?;
            builder.add(glob);
        }
        builder.build().map_err(|e| FileSetError::Pattern {
            pattern: self.patterns.join(", "),
            error: e.to_string(),
        })
    }
}
