use std::collections::{BTreeSet, HashMap, HashSet};

use super::{Datablock, ObjectKind, SceneGraph};

/// Back-references derived from a [`SceneGraph`]: who uses what.
///
/// Built on demand and never stored, so it cannot drift from the graph.
/// User counts include the fake user.
#[derive(Debug, Default)]
pub struct SceneIndex<'a> {
    material_objects: HashMap<&'a str, BTreeSet<&'a str>>,
    image_users: HashMap<&'a str, usize>,
    material_users: HashMap<&'a str, usize>,
    mesh_users: HashMap<&'a str, usize>,
    sound_users: HashMap<&'a str, usize>,
    clip_users: HashMap<&'a str, usize>,
    objects_in_scenes: HashSet<&'a str>,
}

fn bump<'a>(map: &mut HashMap<&'a str, usize>, key: &'a str) {
    *map.entry(key).or_default() += 1;
}

impl<'a> SceneIndex<'a> {
    pub fn build(graph: &'a SceneGraph) -> Self {
        let mut index = SceneIndex::default();

        for material in &graph.materials {
            for node in &material.nodes {
                if let Some(image) = node.image() {
                    bump(&mut index.image_users, image);
                }
            }
        }

        for mesh in &graph.meshes {
            for material in mesh.material_names() {
                bump(&mut index.material_users, material);
            }
        }

        for object in &graph.objects {
            let Some(data) = object.data.as_deref() else {
                continue;
            };
            match object.kind {
                ObjectKind::Mesh => {
                    bump(&mut index.mesh_users, data);
                    if let Some(mesh) = graph.mesh(data) {
                        for material in mesh.material_names() {
                            index
                                .material_objects
                                .entry(material)
                                .or_default()
                                .insert(object.name.as_str());
                        }
                    }
                }
                ObjectKind::Speaker => bump(&mut index.sound_users, data),
                ObjectKind::Empty | ObjectKind::Other => {}
            }
        }

        for scene in &graph.scenes {
            index
                .objects_in_scenes
                .extend(scene.objects.iter().map(String::as_str));
            for sound in &scene.sounds {
                bump(&mut index.sound_users, sound);
            }
            for clip in &scene.movie_clips {
                bump(&mut index.clip_users, clip);
            }
        }

        for image in graph.images.iter().filter(|d| d.fake_user()) {
            bump(&mut index.image_users, image.name());
        }
        for material in graph.materials.iter().filter(|d| d.fake_user()) {
            bump(&mut index.material_users, material.name());
        }
        for mesh in graph.meshes.iter().filter(|d| d.fake_user()) {
            bump(&mut index.mesh_users, mesh.name());
        }
        for sound in graph.sounds.iter().filter(|d| d.fake_user()) {
            bump(&mut index.sound_users, sound.name());
        }
        for clip in graph.movie_clips.iter().filter(|d| d.fake_user()) {
            bump(&mut index.clip_users, clip.name());
        }

        index
    }

    /// Mesh objects whose mesh has `material` in one of its slots.
    pub fn objects_using_material(&self, material: &str) -> impl Iterator<Item = &'a str> + '_ {
        self.material_objects
            .get(material)
            .into_iter()
            .flat_map(|objects| objects.iter().copied())
    }

    pub fn image_users(&self, image: &str) -> usize {
        self.image_users.get(image).copied().unwrap_or(0)
    }

    pub fn material_users(&self, material: &str) -> usize {
        self.material_users.get(material).copied().unwrap_or(0)
    }

    pub fn mesh_users(&self, mesh: &str) -> usize {
        self.mesh_users.get(mesh).copied().unwrap_or(0)
    }

    pub fn sound_users(&self, sound: &str) -> usize {
        self.sound_users.get(sound).copied().unwrap_or(0)
    }

    pub fn clip_users(&self, clip: &str) -> usize {
        self.clip_users.get(clip).copied().unwrap_or(0)
    }

    pub fn is_in_any_scene(&self, object: &str) -> bool {
        self.objects_in_scenes.contains(object)
    }
}
