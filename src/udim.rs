//! Existence checks for stored reference paths, including UDIM tile sets.
//!
//! A UDIM reference stores one logical path with a `<UDIM>` placeholder where
//! the 4-digit tile number goes (`wood.<UDIM>.png` stands for `wood.1001.png`,
//! `wood.1002.png`, ...). Such a reference exists when at least one tile does.

use glob::Pattern;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::utils::path::abspath;

pub const UDIM_TOKEN: &str = "<UDIM>";

const TILE_GLOB: &str = "[0-9][0-9][0-9][0-9]";

pub fn has_udim_token(path: &str) -> bool {
    path.contains(UDIM_TOKEN)
}

/// Escape everything except the token, which becomes a 4-digit class.
fn tile_glob(path: &str) -> String {
    path.split(UDIM_TOKEN)
        .map(Pattern::escape)
        .collect::<Vec<_>>()
        .join(TILE_GLOB)
}

/// Whether the file behind a stored reference is present on disk.
pub fn path_exists(path: &str, base_dir: Option<&Path>) -> bool {
    let resolved = abspath(path, base_dir);
    let resolved = resolved.to_string_lossy();
    if !has_udim_token(&resolved) {
        return Path::new(resolved.as_ref()).exists();
    }
    first_tile(&resolved).is_some()
}

/// First concrete tile on disk for a resolved path carrying the token.
pub fn first_tile(resolved: &str) -> Option<PathBuf> {
    match glob::glob(&tile_glob(resolved)) {
        Ok(paths) => paths.filter_map(Result::ok).next(),
        Err(err) => {
            debug!("Invalid UDIM pattern for '{}': {}", resolved, err);
            None
        }
    }
}

/// Matches directory entries against the basename a record expects.
#[derive(Debug, Clone)]
pub enum UdimPattern {
    Literal(String),
    Tiled { basename: String, pattern: Pattern },
}

impl UdimPattern {
    pub fn new(basename: &str) -> Self {
        if has_udim_token(basename) {
            match Pattern::new(&tile_glob(basename)) {
                Ok(pattern) => {
                    return UdimPattern::Tiled {
                        basename: basename.to_string(),
                        pattern,
                    }
                }
                Err(err) => debug!("Invalid UDIM pattern for '{}': {}", basename, err),
            }
        }
        UdimPattern::Literal(basename.to_string())
    }

    pub fn matches(&self, file_name: &str) -> bool {
        match self {
            UdimPattern::Literal(name) => name == file_name,
            UdimPattern::Tiled { pattern, .. } => pattern.matches(file_name),
        }
    }

    /// The name to store for a match: tiled patterns keep the token.
    pub fn stored_name<'a>(&'a self, file_name: &'a str) -> &'a str {
        match self {
            UdimPattern::Literal(_) => file_name,
            UdimPattern::Tiled { basename, .. } => basename,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_udim_exists_with_single_tile() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("tile.1001.png"), b"png").unwrap();
        let path = tmp.path().join("tile.<UDIM>.png");
        assert!(path_exists(&path.to_string_lossy(), None));
    }

    #[test]
    fn test_udim_missing_in_empty_folder() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("tile.<UDIM>.png");
        assert!(!path_exists(&path.to_string_lossy(), None));
    }

    #[test]
    fn test_udim_ignores_non_numeric_tiles() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("tile.abcd.png"), b"png").unwrap();
        fs::write(tmp.path().join("tile.101.png"), b"png").unwrap();
        let path = tmp.path().join("tile.<UDIM>.png");
        assert!(!path_exists(&path.to_string_lossy(), None));
    }

    #[test]
    fn test_literal_path_exists() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("wood.png"), b"png").unwrap();
        assert!(path_exists(&tmp.path().join("wood.png").to_string_lossy(), None));
        assert!(!path_exists(&tmp.path().join("metal.png").to_string_lossy(), None));
    }

    #[test]
    fn test_host_relative_path_uses_base_dir() {
        let tmp = tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("textures")).unwrap();
        fs::write(tmp.path().join("textures").join("wood.png"), b"png").unwrap();
        assert!(path_exists("//textures/wood.png", Some(tmp.path())));
        assert!(!path_exists("//textures/metal.png", Some(tmp.path())));
    }

    #[test]
    fn test_glob_metacharacters_in_directory_are_literal() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().join("set[1]");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("tile.1002.exr"), b"exr").unwrap();
        let path = dir.join("tile.<UDIM>.exr");
        assert!(path_exists(&path.to_string_lossy(), None));
    }

    #[test]
    fn test_pattern_matching() {
        let literal = UdimPattern::new("wood.png");
        assert!(literal.matches("wood.png"));
        assert!(!literal.matches("Wood.png"));

        let tiled = UdimPattern::new("wood.<UDIM>.png");
        assert!(tiled.matches("wood.1001.png"));
        assert!(tiled.matches("wood.1042.png"));
        assert!(!tiled.matches("wood.png"));
        assert_eq!(tiled.stored_name("wood.1001.png"), "wood.<UDIM>.png");
        assert_eq!(literal.stored_name("wood.png"), "wood.png");
    }
}
