use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use crate::error::Error;
use crate::utils::path::basename;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum FileType {
    Image,
    Movie,
    MovieClip,
    Sound,
    Cache,
    Linked,
}

impl FileType {
    pub const ALL: [FileType; 6] = [
        FileType::Image,
        FileType::Movie,
        FileType::MovieClip,
        FileType::Sound,
        FileType::Cache,
        FileType::Linked,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FileType::Image => "IMAGE",
            FileType::Movie => "MOVIE",
            FileType::MovieClip => "MOVIE CLIP",
            FileType::Sound => "SOUND",
            FileType::Cache => "CACHE",
            FileType::Linked => "LINKED",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One distinct missing path and everything that points at it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingFileRecord {
    /// Path exactly as stored in the scene; unique within a session.
    pub original_path: String,
    pub display_name: String,
    pub file_type: FileType,
    pub referencing_materials: BTreeSet<String>,
    pub referencing_objects: BTreeSet<String>,
    pub referencing_nodes: BTreeSet<String>,
    pub is_linked: bool,
    /// Library file path; empty unless linked.
    pub library_path: String,
    /// Replacement chosen by the user or found by a search.
    pub candidate_new_path: String,
}

impl MissingFileRecord {
    pub fn new(original_path: &str, display_name: &str, file_type: FileType) -> Self {
        Self {
            original_path: original_path.to_string(),
            display_name: display_name.to_string(),
            file_type,
            referencing_materials: BTreeSet::new(),
            referencing_objects: BTreeSet::new(),
            referencing_nodes: BTreeSet::new(),
            is_linked: false,
            library_path: String::new(),
            candidate_new_path: String::new(),
        }
    }

    pub fn is_used(&self) -> bool {
        !self.referencing_objects.is_empty()
    }

    pub fn basename(&self) -> &str {
        basename(&self.original_path)
    }

    pub fn materials_label(&self) -> String {
        join_or(&self.referencing_materials, "(none)")
    }

    pub fn objects_label(&self) -> String {
        join_or(&self.referencing_objects, "(unused)")
    }

    pub fn nodes_label(&self) -> String {
        join_or(&self.referencing_nodes, "(none)")
    }
}

fn join_or(names: &BTreeSet<String>, empty: &str) -> String {
    if names.is_empty() {
        empty.to_string()
    } else {
        names.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
    }
}

/// Visibility toggles for presenting records. Toggles are independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSettings {
    pub show_used: bool,
    pub show_unused: bool,
    pub show_images: bool,
    pub show_movies: bool,
    pub show_sounds: bool,
    pub show_caches: bool,
    pub show_linked: bool,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            show_used: true,
            show_unused: true,
            show_images: true,
            show_movies: true,
            show_sounds: true,
            show_caches: true,
            show_linked: true,
        }
    }
}

impl FilterSettings {
    pub fn shows_usage(&self, record: &MissingFileRecord) -> bool {
        if record.is_used() {
            self.show_used
        } else {
            self.show_unused
        }
    }
}

/// The records of the latest scan. Replaced wholesale by every scan.
#[derive(Debug, Default)]
pub struct ScanSession {
    records: Vec<MissingFileRecord>,
    pub filter: FilterSettings,
}

impl ScanSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[MissingFileRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&MissingFileRecord, Error> {
        self.records.get(index).ok_or(Error::IndexOutOfRange(index))
    }

    pub fn set_candidate(&mut self, index: usize, path: &str) -> Result<(), Error> {
        let record = self
            .records
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange(index))?;
        record.candidate_new_path = path.to_string();
        Ok(())
    }

    pub(crate) fn replace(&mut self, records: Vec<MissingFileRecord>) {
        self.records = records;
    }
}
