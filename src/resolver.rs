//! Locating replacement files for missing records.
//!
//! Every search is a walk through [`SearchWalker`], so results follow its
//! deterministic order. When several files could satisfy a record, the first
//! one encountered wins; there is no ranking between candidates.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

use crate::config::{non_overlapping_directories, AppConfig};
use crate::error::Error;
use crate::progress::ProgressReporter;
use crate::scanner::SearchWalker;
use crate::udim::UdimPattern;

const PROGRESS_EVERY: usize = 256;

/// Walk `folder` once and return the first file matching `basename`.
///
/// A basename carrying the UDIM token matches any concrete tile; the returned
/// path keeps the token so it can be stored as-is.
pub fn find_in_folder(
    basename: &str,
    folder: &Path,
    walker: &SearchWalker,
    reporter: &dyn ProgressReporter,
) -> Option<PathBuf> {
    if basename.is_empty() {
        return None;
    }
    let pattern = UdimPattern::new(basename);
    let start = Instant::now();
    let root = folder.to_string_lossy();
    reporter.on_search_start(&root);

    let mut seen = 0usize;
    let mut found = None;
    for file in walker.files(folder) {
        seen += 1;
        if seen % PROGRESS_EVERY == 0 {
            reporter.on_search_progress(seen, &file.to_string_lossy());
        }
        let Some(name) = file.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if pattern.matches(name) {
            found = Some(file.with_file_name(pattern.stored_name(name)));
            break;
        }
    }

    reporter.on_search_complete(seen, start.elapsed().as_secs_f64());
    debug!("Search for '{}' under {}: {:?}", basename, root, found);
    found
}

/// Walk `folder` once and resolve as many targets as possible.
///
/// `targets` pairs a caller-chosen key (a record index) with the basename to
/// look for. The result maps each resolved key to its file.
pub fn find_all_in_folder(
    targets: &[(usize, &str)],
    folder: &Path,
    walker: &SearchWalker,
    reporter: &dyn ProgressReporter,
) -> BTreeMap<usize, PathBuf> {
    let mut pending: Vec<(usize, UdimPattern)> = targets
        .iter()
        .filter(|(_, name)| !name.is_empty())
        .map(|(key, name)| (*key, UdimPattern::new(name)))
        .collect();
    let mut resolved = BTreeMap::new();
    if pending.is_empty() {
        return resolved;
    }

    let start = Instant::now();
    reporter.on_search_start(&folder.to_string_lossy());
    let mut seen = 0usize;
    for file in walker.files(folder) {
        seen += 1;
        if seen % PROGRESS_EVERY == 0 {
            reporter.on_search_progress(seen, &file.to_string_lossy());
        }
        let Some(name) = file.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        pending.retain(|(key, pattern)| {
            if pattern.matches(name) {
                resolved.insert(*key, file.with_file_name(pattern.stored_name(name)));
                false
            } else {
                true
            }
        });
        if pending.is_empty() {
            break;
        }
    }
    reporter.on_search_complete(seen, start.elapsed().as_secs_f64());

    info!(
        "Resolved {} of {} missing files under {}",
        resolved.len(),
        targets.len(),
        folder.display()
    );
    resolved
}

/// Where auto-search looks: the scene directory, then the configured
/// conventional subfolders that exist. Locations already covered by an
/// earlier, recursive walk are dropped.
pub fn auto_search_locations(base_dir: &Path, config: &AppConfig) -> Vec<PathBuf> {
    let mut locations = vec![base_dir.to_path_buf()];
    locations.extend(
        config
            .search_subfolders
            .iter()
            .map(|sub| base_dir.join(sub))
            .filter(|dir| dir.is_dir()),
    );
    non_overlapping_directories(locations)
}

/// Search the conventional locations around the scene for `basename`.
pub fn auto_search(
    basename: &str,
    base_dir: Option<&Path>,
    config: &AppConfig,
    walker: &SearchWalker,
    reporter: &dyn ProgressReporter,
) -> Result<PathBuf, Error> {
    let base_dir = base_dir.ok_or(Error::SaveLocationUnknown)?;
    if basename.is_empty() {
        return Err(Error::NotFound("Cannot extract filename from path".to_string()));
    }

    for location in auto_search_locations(base_dir, config) {
        if let Some(found) = find_in_folder(basename, &location, walker, reporter) {
            return Ok(found);
        }
    }

    Err(Error::NotFound(format!(
        "Could not find '{}' in common locations",
        basename
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::SilentReporter;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_find_nested_two_levels_deep() {
        let tmp = tempdir().unwrap();
        let nested = tmp.path().join("assets").join("wood");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("oak.png"), b"png").unwrap();

        let found = find_in_folder("oak.png", tmp.path(), &SearchWalker::default(), &SilentReporter);
        assert_eq!(found, Some(nested.join("oak.png")));
    }

    #[test]
    fn test_find_prefers_shallower_file_over_earlier_subdirectory() {
        let tmp = tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("a")).unwrap();
        fs::write(tmp.path().join("a").join("oak.png"), b"1").unwrap();
        fs::write(tmp.path().join("oak.png"), b"2").unwrap();

        let found = find_in_folder("oak.png", tmp.path(), &SearchWalker::default(), &SilentReporter);
        assert_eq!(found, Some(tmp.path().join("oak.png")));
    }

    #[test]
    fn test_find_udim_keeps_token() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().join("tiles");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("skin.1003.exr"), b"exr").unwrap();

        let found = find_in_folder(
            "skin.<UDIM>.exr",
            tmp.path(),
            &SearchWalker::default(),
            &SilentReporter,
        );
        assert_eq!(found, Some(dir.join("skin.<UDIM>.exr")));
    }

    #[test]
    fn test_find_all_single_walk() {
        let tmp = tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("x")).unwrap();
        fs::create_dir_all(tmp.path().join("y")).unwrap();
        fs::write(tmp.path().join("x").join("a.png"), b"a").unwrap();
        fs::write(tmp.path().join("y").join("b.png"), b"b").unwrap();

        let targets = [(0, "a.png"), (4, "b.png"), (7, "c.png")];
        let resolved =
            find_all_in_folder(&targets, tmp.path(), &SearchWalker::default(), &SilentReporter);
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[&0], tmp.path().join("x").join("a.png"));
        assert_eq!(resolved[&4], tmp.path().join("y").join("b.png"));
        assert!(!resolved.contains_key(&7));
    }

    #[test]
    fn test_auto_search_without_save_location() {
        let err = auto_search(
            "a.png",
            None,
            &AppConfig::default(),
            &SearchWalker::default(),
            &SilentReporter,
        )
        .unwrap_err();
        assert!(matches!(err, Error::SaveLocationUnknown));
    }

    #[test]
    fn test_auto_search_finds_in_textures_subfolder() {
        let tmp = tempdir().unwrap();
        let textures = tmp.path().join("textures");
        fs::create_dir_all(&textures).unwrap();
        fs::write(textures.join("a.png"), b"a").unwrap();

        let found = auto_search(
            "a.png",
            Some(tmp.path()),
            &AppConfig::default(),
            &SearchWalker::default(),
            &SilentReporter,
        )
        .unwrap();
        assert_eq!(found.file_name().unwrap(), "a.png");
        assert!(found.ends_with("textures/a.png"));
    }

    #[test]
    fn test_auto_search_not_found() {
        let tmp = tempdir().unwrap();
        let err = auto_search(
            "a.png",
            Some(tmp.path()),
            &AppConfig::default(),
            &SearchWalker::default(),
            &SilentReporter,
        )
        .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
