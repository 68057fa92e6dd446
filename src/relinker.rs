//! Applying a replacement path to every reference of a missing file.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::confirm::{ConfirmPrompt, ConfirmRequest, PathMismatch};
use crate::error::Error;
use crate::loader::AssetLoader;
use crate::progress::ProgressReporter;
use crate::resolver::{find_all_in_folder, find_in_folder};
use crate::scanner::SearchWalker;
use crate::scene::{FileReference, Library, SceneGraph};
use crate::session::MissingFileRecord;
use crate::udim::{first_tile, has_udim_token, path_exists, UdimPattern};
use crate::utils::path::{abspath, absolutize, basename, relpath};

/// Per-path result of [`apply_path`].
#[derive(Debug, Default)]
pub struct ApplyTally {
    pub updated: usize,
    pub skipped_linked: usize,
    pub issues: Vec<Error>,
}

impl ApplyTally {
    fn absorb(&mut self, other: ApplyTally) {
        self.updated += other.updated;
        self.skipped_linked += other.skipped_linked;
        self.issues.extend(other.issues);
    }
}

#[derive(Debug)]
pub struct RelinkOutcome {
    /// Path written into the scene, host-relative when possible.
    pub stored_path: String,
    pub relinked: usize,
    pub auto_relinked: usize,
    pub skipped_linked: usize,
    pub issues: Vec<Error>,
}

#[derive(Debug, Default)]
pub struct BulkOutcome {
    pub relinked: usize,
    pub skipped_linked: usize,
    pub unresolved: usize,
    pub issues: Vec<Error>,
}

fn library_label(libraries: &[Library], library: &str) -> String {
    libraries
        .iter()
        .find(|lib| lib.name == library)
        .map(|lib| lib.filepath.clone())
        .unwrap_or_else(|| library.to_string())
}

fn relink_blocks<T: FileReference>(
    blocks: &mut [T],
    old: &str,
    new: &str,
    libraries: &[Library],
    tally: &mut ApplyTally,
    mut after_update: impl FnMut(&mut T) -> Result<(), Error>,
) {
    for block in blocks.iter_mut().filter(|b| b.filepath() == old) {
        if let Some(library) = block.library() {
            tally.skipped_linked += 1;
            tally.issues.push(Error::LinkedReadOnly {
                name: block.name().to_string(),
                library: library_label(libraries, library),
            });
            continue;
        }
        block.set_filepath(new.to_string());
        tally.updated += 1;
        if let Err(err) = after_update(block) {
            warn!("{}", err);
            tally.issues.push(err);
        }
    }
}

/// Point every reference stored as `old` at `new`.
///
/// References owned by a linked library are left untouched and reported.
/// A failed reload keeps the new path and does not stop the remaining updates.
pub fn apply_path(
    graph: &mut SceneGraph,
    old: &str,
    new: &str,
    loader: &dyn AssetLoader,
) -> ApplyTally {
    let base_dir = graph.base_dir();
    let base_dir = base_dir.as_deref();
    let SceneGraph {
        libraries,
        images,
        movie_clips,
        sounds,
        objects,
        ..
    } = graph;
    let libraries: &[Library] = libraries;
    let mut tally = ApplyTally::default();

    relink_blocks(images, old, new, libraries, &mut tally, |image| {
        loader.reload_image(image, base_dir)
    });
    relink_blocks(movie_clips, old, new, libraries, &mut tally, |_| Ok(()));
    relink_blocks(sounds, old, new, libraries, &mut tally, |_| Ok(()));

    for object in objects.iter_mut() {
        let linked = object.library.as_deref();
        for modifier in object.modifiers.iter_mut() {
            if modifier.filepath.as_deref() != Some(old) {
                continue;
            }
            match linked {
                Some(library) => {
                    tally.skipped_linked += 1;
                    tally.issues.push(Error::LinkedReadOnly {
                        name: format!("{} ({})", object.name, modifier.name),
                        library: library_label(libraries, library),
                    });
                }
                None => {
                    modifier.filepath = Some(new.to_string());
                    tally.updated += 1;
                }
            }
        }
    }

    debug!(
        "{} -> {}: {} updated, {} linked skipped",
        old, new, tally.updated, tally.skipped_linked
    );
    tally
}

/// Turn the user's candidate into a concrete file plus the root for the
/// follow-up search of other missing files.
fn resolve_candidate(
    record: &MissingFileRecord,
    candidate: &str,
    base_dir: Option<&Path>,
    walker: &SearchWalker,
    reporter: &dyn ProgressReporter,
) -> Result<(PathBuf, PathBuf), Error> {
    if candidate.trim().is_empty() {
        return Err(Error::NoPathSpecified);
    }
    let path = absolutize(&abspath(candidate, base_dir));

    if path.is_dir() {
        let found = find_in_folder(record.basename(), &path, walker, reporter).ok_or_else(|| {
            Error::NotFound(format!(
                "'{}' not found under {}",
                record.basename(),
                path.display()
            ))
        })?;
        return Ok((found, path));
    }

    let resolved = if path.is_file() {
        let pattern = UdimPattern::new(record.basename());
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if matches!(pattern, UdimPattern::Tiled { .. }) && pattern.matches(&name) {
            path.with_file_name(pattern.stored_name(&name))
        } else {
            path
        }
    } else if has_udim_token(candidate) && first_tile(&path.to_string_lossy()).is_some() {
        path
    } else {
        return Err(Error::NotFound(format!("{}", path.display())));
    };

    let root = resolved
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    Ok((resolved, root))
}

/// Relink the record at `index` to `candidate`, then opportunistically
/// relink other missing records found under the same search root.
///
/// Fails before touching the scene when the candidate is empty, cannot be
/// found, or is a declined mismatch.
#[allow(clippy::too_many_arguments)]
pub fn relink(
    graph: &mut SceneGraph,
    records: &[MissingFileRecord],
    index: usize,
    candidate: &str,
    walker: &SearchWalker,
    reporter: &dyn ProgressReporter,
    loader: &dyn AssetLoader,
    prompt: &dyn ConfirmPrompt,
) -> Result<RelinkOutcome, Error> {
    let record = records.get(index).ok_or(Error::IndexOutOfRange(index))?;
    let base_dir = graph.base_dir();
    let base_dir = base_dir.as_deref();

    let (resolved, search_root) = resolve_candidate(record, candidate, base_dir, walker, reporter)?;

    let new_name = resolved
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mismatch = PathMismatch::new(record.basename(), &new_name);
    if mismatch.needs_confirmation() && !prompt.confirm(&ConfirmRequest::Mismatch(mismatch)) {
        info!("Relink of '{}' cancelled", record.display_name);
        return Err(Error::Cancelled);
    }

    let stored_path = relpath(&resolved, base_dir);
    let primary = apply_path(graph, &record.original_path, &stored_path, loader);

    let mut secondary = ApplyTally::default();
    let targets: Vec<(usize, &str)> = records
        .iter()
        .enumerate()
        .filter(|(i, other)| {
            *i != index
                && !other.is_linked
                && other.original_path != record.original_path
                && !path_exists(&other.original_path, base_dir)
        })
        .map(|(i, other)| (i, other.basename()))
        .collect();
    for (i, found) in find_all_in_folder(&targets, &search_root, walker, reporter) {
        let path = relpath(&found, base_dir);
        secondary.absorb(apply_path(graph, &records[i].original_path, &path, loader));
    }

    info!(
        "Relinked {} reference(s) of '{}' to {} (+{} auto-relinked, {} linked skipped)",
        primary.updated, record.display_name, stored_path, secondary.updated, primary.skipped_linked
    );

    let mut issues = primary.issues;
    issues.extend(secondary.issues);
    Ok(RelinkOutcome {
        stored_path,
        relinked: primary.updated,
        auto_relinked: secondary.updated,
        skipped_linked: primary.skipped_linked + secondary.skipped_linked,
        issues,
    })
}

/// Resolve every non-linked missing record against one walk of `folder`.
pub fn relink_folder(
    graph: &mut SceneGraph,
    records: &[MissingFileRecord],
    folder: &Path,
    walker: &SearchWalker,
    reporter: &dyn ProgressReporter,
    loader: &dyn AssetLoader,
) -> Result<BulkOutcome, Error> {
    let folder = absolutize(folder);
    if !folder.is_dir() {
        return Err(Error::NotFound(format!("{}", folder.display())));
    }
    let base_dir = graph.base_dir();
    let base_dir = base_dir.as_deref();

    let targets: Vec<(usize, &str)> = records
        .iter()
        .enumerate()
        .filter(|(_, record)| !record.is_linked)
        .map(|(i, record)| (i, basename(&record.original_path)))
        .collect();
    let resolved = find_all_in_folder(&targets, &folder, walker, reporter);

    let mut outcome = BulkOutcome {
        unresolved: targets.len() - resolved.len(),
        ..Default::default()
    };
    for (i, found) in resolved {
        let path = relpath(&found, base_dir);
        let tally = apply_path(graph, &records[i].original_path, &path, loader);
        if tally.updated > 0 {
            outcome.relinked += 1;
        }
        outcome.skipped_linked += tally.skipped_linked;
        outcome.issues.extend(tally.issues);
    }

    info!(
        "Bulk relink under {}: {} relinked, {} unresolved",
        folder.display(),
        outcome.relinked,
        outcome.unresolved
    );
    Ok(outcome)
}
