use std::collections::HashSet;
use tracing::{debug, info};

use crate::scene::{Datablock, NodeKind, ObjectKind, SceneGraph, SceneIndex};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PurgeOutcome {
    pub objects_removed: usize,
    pub datablocks_removed: usize,
}

impl PurgeOutcome {
    pub fn total(&self) -> usize {
        self.objects_removed + self.datablocks_removed
    }
}

fn orphan_names<T: Datablock>(blocks: &[T], users: impl Fn(&str) -> usize) -> HashSet<String> {
    blocks
        .iter()
        .filter(|block| users(block.name()) == 0)
        .map(|block| block.name().to_string())
        .collect()
}

fn remove_named<T: Datablock>(blocks: &mut Vec<T>, names: &HashSet<String>) -> usize {
    let before = blocks.len();
    blocks.retain(|block| !names.contains(block.name()));
    before - blocks.len()
}

/// One pass over every datablock kind. Returns the number removed.
fn purge_zero_users(graph: &mut SceneGraph) -> usize {
    let (meshes, materials, images, sounds, clips) = {
        let index = SceneIndex::build(graph);
        (
            orphan_names(&graph.meshes, |n| index.mesh_users(n)),
            orphan_names(&graph.materials, |n| index.material_users(n)),
            orphan_names(&graph.images, |n| index.image_users(n)),
            orphan_names(&graph.sounds, |n| index.sound_users(n)),
            orphan_names(&graph.movie_clips, |n| index.clip_users(n)),
        )
    };

    remove_named(&mut graph.meshes, &meshes)
        + remove_named(&mut graph.materials, &materials)
        + remove_named(&mut graph.images, &images)
        + remove_named(&mut graph.sounds, &sounds)
        + remove_named(&mut graph.movie_clips, &clips)
}

/// Remove objects outside every scene, then datablocks without users until
/// nothing changes. Removing a mesh can orphan its materials, and a material
/// its images, hence the repeat. Fake users keep a datablock alive.
pub fn purge_orphans(graph: &mut SceneGraph) -> PurgeOutcome {
    let stray: HashSet<String> = {
        let index = SceneIndex::build(graph);
        graph
            .objects
            .iter()
            .filter(|o| !o.fake_user && !index.is_in_any_scene(&o.name))
            .map(|o| o.name.clone())
            .collect()
    };
    let objects_removed = remove_named(&mut graph.objects, &stray);

    let mut datablocks_removed = 0;
    loop {
        let removed = purge_zero_users(graph);
        if removed == 0 {
            break;
        }
        debug!("Purge pass removed {} datablocks", removed);
        datablocks_removed += removed;
    }

    let outcome = PurgeOutcome {
        objects_removed,
        datablocks_removed,
    };
    info!(
        "Purged {} objects not in any scene and {} orphaned datablocks",
        outcome.objects_removed, outcome.datablocks_removed
    );
    outcome
}

/// Remove every image, movie clip and sound stored at `path`, clearing the
/// references that pointed at them. Returns the number of datablocks removed.
pub fn remove_file(graph: &mut SceneGraph, path: &str) -> usize {
    let images: HashSet<String> = graph
        .images
        .iter()
        .filter(|i| i.filepath == path)
        .map(|i| i.name.clone())
        .collect();
    let clips: HashSet<String> = graph
        .movie_clips
        .iter()
        .filter(|c| c.filepath == path)
        .map(|c| c.name.clone())
        .collect();
    let sounds: HashSet<String> = graph
        .sounds
        .iter()
        .filter(|s| s.filepath == path)
        .map(|s| s.name.clone())
        .collect();

    let removed = remove_named(&mut graph.images, &images)
        + remove_named(&mut graph.movie_clips, &clips)
        + remove_named(&mut graph.sounds, &sounds);

    for node in graph.materials.iter_mut().flat_map(|m| m.nodes.iter_mut()) {
        if let NodeKind::ImageTexture { image } = &mut node.kind {
            if image.as_ref().is_some_and(|name| images.contains(name)) {
                *image = None;
            }
        }
    }
    for scene in &mut graph.scenes {
        scene.sounds.retain(|s| !sounds.contains(s));
        scene.movie_clips.retain(|c| !clips.contains(c));
    }
    for speaker in graph
        .objects
        .iter_mut()
        .filter(|o| o.kind == ObjectKind::Speaker)
    {
        if speaker.data.as_ref().is_some_and(|s| sounds.contains(s)) {
            speaker.data = None;
        }
    }

    info!("Removed {} file datablock(s) stored at {}", removed, path);
    removed
}
