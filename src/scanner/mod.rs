pub mod walk;

pub use walk::SearchWalker;

use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

use crate::scene::{Datablock, FileReference, Image, ImageSource, SceneGraph, SceneIndex};
use crate::session::{FileType, MissingFileRecord};
use crate::udim::path_exists;
use crate::utils::path::basename;

/// Records keyed by original path, kept in discovery order.
#[derive(Default)]
struct RecordCollector {
    records: Vec<MissingFileRecord>,
    by_path: HashMap<String, usize>,
}

impl RecordCollector {
    fn entry(
        &mut self,
        path: &str,
        create: impl FnOnce() -> MissingFileRecord,
    ) -> &mut MissingFileRecord {
        let idx = match self.by_path.get(path) {
            Some(&idx) => idx,
            None => {
                self.records.push(create());
                self.by_path.insert(path.to_string(), self.records.len() - 1);
                self.records.len() - 1
            }
        };
        &mut self.records[idx]
    }
}

fn is_missing<F: FileReference>(block: &F, base_dir: Option<&Path>) -> bool {
    // Packed data lives inside the scene file and can never be missing.
    !block.is_packed() && !block.filepath().is_empty() && !path_exists(block.filepath(), base_dir)
}

fn image_type(image: &Image) -> FileType {
    match image.source {
        ImageSource::Movie => FileType::Movie,
        _ => FileType::Image,
    }
}

fn new_record(
    graph: &SceneGraph,
    path: &str,
    display_name: &str,
    file_type: FileType,
    library: Option<&str>,
) -> MissingFileRecord {
    let mut record = MissingFileRecord::new(path, display_name, file_type);
    if let Some(library) = library {
        record.file_type = FileType::Linked;
        record.is_linked = true;
        record.library_path = match graph.library_path(library) {
            Some(lib_path) => lib_path.to_string(),
            None => {
                warn!("Unknown library '{}' for '{}'", library, display_name);
                library.to_string()
            }
        };
    }
    record
}

/// Build the complete, deduplicated set of missing-file records for a scene.
///
/// The scene is not modified. A dangling reference inside one datablock is
/// logged and skipped without affecting the rest of the scan.
pub fn scan_missing(graph: &SceneGraph) -> Vec<MissingFileRecord> {
    let base_dir = graph.base_dir();
    let base_dir = base_dir.as_deref();
    let index = SceneIndex::build(graph);
    let mut collector = RecordCollector::default();

    for material in graph.materials.iter().filter(|m| m.use_nodes) {
        for node in &material.nodes {
            let Some(image_name) = node.image() else {
                continue;
            };
            let Some(image) = graph.image(image_name) else {
                warn!(
                    "Material '{}' node '{}' references unknown image '{}'",
                    material.name, node.name, image_name
                );
                continue;
            };
            if !is_missing(image, base_dir) {
                continue;
            }

            let record = collector.entry(&image.filepath, || {
                new_record(graph, &image.filepath, &image.name, image_type(image), image.library())
            });
            record.referencing_materials.insert(material.name.clone());
            record.referencing_nodes.insert(node.name.clone());
            record
                .referencing_objects
                .extend(index.objects_using_material(&material.name).map(String::from));
        }
    }

    // Images no node reaches are still reported, as unused.
    for image in graph.images.iter().filter(|i| is_missing(*i, base_dir)) {
        collector.entry(&image.filepath, || {
            new_record(graph, &image.filepath, &image.name, image_type(image), image.library())
        });
    }

    for clip in graph.movie_clips.iter().filter(|c| is_missing(*c, base_dir)) {
        collector.entry(&clip.filepath, || {
            new_record(graph, &clip.filepath, &clip.name, FileType::MovieClip, clip.library())
        });
    }

    for sound in graph.sounds.iter().filter(|s| is_missing(*s, base_dir)) {
        collector.entry(&sound.filepath, || {
            new_record(graph, &sound.filepath, &sound.name, FileType::Sound, sound.library())
        });
    }

    for object in &graph.objects {
        for modifier in &object.modifiers {
            let Some(path) = modifier.filepath.as_deref() else {
                continue;
            };
            if path.is_empty() || path_exists(path, base_dir) {
                continue;
            }
            let record = collector.entry(path, || {
                new_record(graph, path, basename(path), FileType::Cache, object.library())
            });
            record.referencing_objects.insert(object.name.clone());
        }
    }

    debug!("Scan found {} missing paths", collector.records.len());
    collector.records
}
