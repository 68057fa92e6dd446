use glob::Pattern;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use tracing::{error, warn};
use walkdir::{DirEntry, WalkDir};

/// Recursive directory traversal shared by every file search.
///
/// Order is deterministic: a directory's own files, sorted by name, come
/// before its subdirectories, which are visited in name order. Directories
/// matching an ignore glob are pruned. Unreadable entries are logged and
/// skipped.
#[derive(Debug, Clone, Default)]
pub struct SearchWalker {
    ignore_patterns: Vec<Pattern>,
}

impl SearchWalker {
    pub fn new(ignore_globs: &[String]) -> Self {
        let ignore_patterns = ignore_globs
            .iter()
            .filter_map(|glob| match Pattern::new(glob) {
                Ok(p) => Some(p),
                Err(e) => {
                    error!("Invalid glob pattern '{}': {}", glob, e);
                    None
                }
            })
            .collect();
        Self { ignore_patterns }
    }

    fn is_ignored(&self, path: &Path) -> bool {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        self.ignore_patterns
            .iter()
            .any(|pattern| pattern.matches_path(path) || pattern.matches(&file_name))
    }

    /// Only directories below the root are pruned; files always pass.
    fn is_pruned(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0 && entry.file_type().is_dir() && self.is_ignored(entry.path())
    }

    /// Every file under `root`, lazily, in traversal order.
    pub fn files<'a>(&'a self, root: &Path) -> impl Iterator<Item = PathBuf> + 'a {
        WalkDir::new(root)
            .follow_links(false)
            .sort_by(files_before_dirs)
            .into_iter()
            .filter_entry(move |entry| !self.is_pruned(entry))
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!("Skipping unreadable entry: {}", err);
                    None
                }
            })
            .filter(is_file)
            .map(DirEntry::into_path)
    }
}

fn files_before_dirs(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}

fn is_file(entry: &DirEntry) -> bool {
    entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
}
