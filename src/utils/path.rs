use std::path::{Component, Path, PathBuf};

/// Prefix marking a path as relative to the scene document's directory.
pub const HOST_RELATIVE_PREFIX: &str = "//";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParts {
    pub parent_dir: String,
    pub base_filename: String,
    pub stem: String,
    pub extension: String,
}

/// Split a stored reference path without touching the filesystem.
/// Both `/` and `\` count as separators, since scenes travel between platforms.
pub fn extract_path_components(path: &str) -> PathParts {
    let base_filename = basename(path).to_string();
    let parent_dir = path[..path.len() - base_filename.len()]
        .trim_end_matches(['/', '\\'])
        .to_string();
    let (stem, extension) = split_ext(&base_filename);

    PathParts {
        stem: stem.to_string(),
        extension: extension.to_string(),
        parent_dir,
        base_filename: base_filename.clone(),
    }
}

pub fn basename(path: &str) -> &str {
    match path.rfind(['/', '\\']) {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// `("name", ".ext")`; leading dots belong to the stem.
pub fn split_ext(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if name[..idx].chars().any(|c| c != '.') => (&name[..idx], &name[idx..]),
        _ => (name, ""),
    }
}

/// Resolve a stored reference to a filesystem path.
pub fn abspath(path: &str, base_dir: Option<&Path>) -> PathBuf {
    match path.strip_prefix(HOST_RELATIVE_PREFIX) {
        Some(rest) => {
            let rest = if cfg!(windows) {
                rest.to_string()
            } else {
                rest.replace('\\', "/")
            };
            match base_dir {
                Some(base) => base.join(rest),
                None => PathBuf::from(rest),
            }
        }
        None => PathBuf::from(path),
    }
}

/// Anchor a relative path at the working directory. The path is returned
/// unchanged when that is not possible.
pub fn absolutize(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Inverse of [`abspath`]: host-relative when `path` lies under `base_dir`.
/// Only absolute paths are compared.
pub fn relpath(path: &Path, base_dir: Option<&Path>) -> String {
    let rel = base_dir
        .filter(|base| base.is_absolute() && path.is_absolute())
        .and_then(|base| path.strip_prefix(base).ok());
    if let Some(rel) = rel {
        let parts: Vec<String> = rel
            .components()
            .filter(|c| matches!(c, Component::Normal(_) | Component::ParentDir))
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        return format!("{}{}", HOST_RELATIVE_PREFIX, parts.join("/"));
    }
    path.to_string_lossy().into_owned()
}
