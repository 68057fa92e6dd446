//! Host-agnostic model of a scene graph and the file datablocks it references.
//!
//! Entities refer to each other by name, never by pointer. Back-references
//! (which objects use a material, how many users an image has) are derived on
//! demand by [`index::SceneIndex`].

pub mod index;
pub mod io;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::utils::path::absolutize;

pub use index::SceneIndex;

/// Common surface of every named datablock.
pub trait Datablock {
    fn name(&self) -> &str;
    /// Name of the external library that owns this datablock, if linked.
    fn library(&self) -> Option<&str>;
    fn fake_user(&self) -> bool;

    fn is_linked(&self) -> bool {
        self.library().is_some()
    }
}

/// A datablock backed by an external file.
pub trait FileReference: Datablock {
    fn filepath(&self) -> &str;
    fn set_filepath(&mut self, path: String);
    fn is_packed(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneGraph {
    /// Where the scene document lives; host-relative paths resolve against it.
    #[serde(skip)]
    pub file_path: Option<PathBuf>,
    #[serde(default)]
    pub libraries: Vec<Library>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub movie_clips: Vec<MovieClip>,
    #[serde(default)]
    pub sounds: Vec<Sound>,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub meshes: Vec<Mesh>,
    #[serde(default)]
    pub objects: Vec<Object>,
    #[serde(default)]
    pub scenes: Vec<Scene>,
}

impl SceneGraph {
    /// Directory that host-relative paths resolve against. A relative
    /// document path is anchored at the working directory.
    pub fn base_dir(&self) -> Option<PathBuf> {
        let file_path = absolutize(self.file_path.as_deref()?);
        file_path.parent().map(Path::to_path_buf)
    }

    pub fn library_path(&self, library: &str) -> Option<&str> {
        self.libraries
            .iter()
            .find(|lib| lib.name == library)
            .map(|lib| lib.filepath.as_str())
    }

    pub fn image(&self, name: &str) -> Option<&Image> {
        self.images.iter().find(|image| image.name == name)
    }

    pub fn mesh(&self, name: &str) -> Option<&Mesh> {
        self.meshes.iter().find(|mesh| mesh.name == name)
    }
}

impl Mesh {
    /// Materials assigned to filled slots, in slot order.
    pub fn material_names(&self) -> impl Iterator<Item = &str> {
        self.materials.iter().filter_map(|slot| slot.material.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Library {
    pub name: String,
    pub filepath: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    #[default]
    Still,
    Sequence,
    Movie,
    Tiled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub name: String,
    #[serde(default)]
    pub filepath: String,
    #[serde(default)]
    pub source: ImageSource,
    #[serde(default)]
    pub packed: bool,
    /// Pixel data is currently cached in memory.
    #[serde(default)]
    pub loaded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library: Option<String>,
    #[serde(default)]
    pub fake_user: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieClip {
    pub name: String,
    #[serde(default)]
    pub filepath: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library: Option<String>,
    #[serde(default)]
    pub fake_user: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sound {
    pub name: String,
    #[serde(default)]
    pub filepath: String,
    #[serde(default)]
    pub packed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library: Option<String>,
    #[serde(default)]
    pub fake_user: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    #[serde(default = "default_true")]
    pub use_nodes: bool,
    #[serde(default)]
    pub nodes: Vec<ShaderNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library: Option<String>,
    #[serde(default)]
    pub fake_user: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShaderNode {
    pub name: String,
    #[serde(flatten)]
    pub kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    ImageTexture {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image: Option<String>,
    },
    Other {
        #[serde(default)]
        type_name: String,
    },
}

impl ShaderNode {
    /// Image referenced by an image-texture node.
    pub fn image(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::ImageTexture { image } => image.as_deref(),
            NodeKind::Other { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub name: String,
    #[serde(default)]
    pub materials: Vec<MaterialSlot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library: Option<String>,
    #[serde(default)]
    pub fake_user: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialSlot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
}

impl MaterialSlot {
    pub fn new(material: &str) -> Self {
        Self {
            material: Some(material.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Mesh,
    Speaker,
    #[default]
    Empty,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Object {
    pub name: String,
    #[serde(default)]
    pub kind: ObjectKind,
    /// Mesh name for mesh objects, sound name for speakers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library: Option<String>,
    #[serde(default)]
    pub fake_user: bool,
}

/// A modifier with a file path produces or reads a cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    pub name: String,
    #[serde(default)]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filepath: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub name: String,
    #[serde(default)]
    pub objects: Vec<String>,
    /// Sequencer sound strips.
    #[serde(default)]
    pub sounds: Vec<String>,
    /// Active clip and movie strips.
    #[serde(default)]
    pub movie_clips: Vec<String>,
}

macro_rules! impl_datablock {
    ($($ty:ty),*) => {
        $(
            impl Datablock for $ty {
                fn name(&self) -> &str {
                    &self.name
                }

                fn library(&self) -> Option<&str> {
                    self.library.as_deref()
                }

                fn fake_user(&self) -> bool {
                    self.fake_user
                }
            }
        )*
    };
}

impl_datablock!(Image, MovieClip, Sound, Material, Mesh, Object);

impl FileReference for Image {
    fn filepath(&self) -> &str {
        &self.filepath
    }

    fn set_filepath(&mut self, path: String) {
        self.filepath = path;
        self.loaded = false;
    }

    fn is_packed(&self) -> bool {
        self.packed
    }
}

impl FileReference for MovieClip {
    fn filepath(&self) -> &str {
        &self.filepath
    }

    fn set_filepath(&mut self, path: String) {
        self.filepath = path;
    }
}

impl FileReference for Sound {
    fn filepath(&self) -> &str {
        &self.filepath
    }

    fn set_filepath(&mut self, path: String) {
        self.filepath = path;
    }

    fn is_packed(&self) -> bool {
        self.packed
    }
}

impl Image {
    pub fn new(name: &str, filepath: &str) -> Self {
        Self {
            name: name.to_string(),
            filepath: filepath.to_string(),
            source: ImageSource::Still,
            packed: false,
            loaded: false,
            library: None,
            fake_user: false,
        }
    }
}

impl MovieClip {
    pub fn new(name: &str, filepath: &str) -> Self {
        Self {
            name: name.to_string(),
            filepath: filepath.to_string(),
            library: None,
            fake_user: false,
        }
    }
}

impl Sound {
    pub fn new(name: &str, filepath: &str) -> Self {
        Self {
            name: name.to_string(),
            filepath: filepath.to_string(),
            packed: false,
            library: None,
            fake_user: false,
        }
    }
}

impl Material {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            use_nodes: true,
            nodes: Vec::new(),
            library: None,
            fake_user: false,
        }
    }

    pub fn with_image_node(mut self, node: &str, image: &str) -> Self {
        self.nodes.push(ShaderNode {
            name: node.to_string(),
            kind: NodeKind::ImageTexture {
                image: Some(image.to_string()),
            },
        });
        self
    }
}

impl Mesh {
    pub fn new(name: &str, materials: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            materials: materials.iter().map(|m| MaterialSlot::new(m)).collect(),
            library: None,
            fake_user: false,
        }
    }
}

impl Object {
    pub fn new(name: &str, kind: ObjectKind, data: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            kind,
            data: data.map(str::to_string),
            modifiers: Vec::new(),
            library: None,
            fake_user: false,
        }
    }
}

impl Scene {
    pub fn new(name: &str, objects: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            objects: objects.iter().map(|o| o.to_string()).collect(),
            ..Default::default()
        }
    }
}
