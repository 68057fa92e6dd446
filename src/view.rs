//! Presentation-neutral grouping of records for listing.

use crate::session::{FileType, FilterSettings, MissingFileRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    Images,
    Movies,
    Sounds,
    Caches,
    Linked,
}

impl GroupKind {
    pub const ALL: [GroupKind; 5] = [
        GroupKind::Images,
        GroupKind::Movies,
        GroupKind::Sounds,
        GroupKind::Caches,
        GroupKind::Linked,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            GroupKind::Images => "Images",
            GroupKind::Movies => "Movies",
            GroupKind::Sounds => "Sounds",
            GroupKind::Caches => "Caches",
            GroupKind::Linked => "Linked Files",
        }
    }

    fn contains(&self, file_type: FileType) -> bool {
        match self {
            GroupKind::Images => file_type == FileType::Image,
            GroupKind::Movies => matches!(file_type, FileType::Movie | FileType::MovieClip),
            GroupKind::Sounds => file_type == FileType::Sound,
            GroupKind::Caches => file_type == FileType::Cache,
            GroupKind::Linked => file_type == FileType::Linked,
        }
    }

    fn expanded(&self, filter: &FilterSettings) -> bool {
        match self {
            GroupKind::Images => filter.show_images,
            GroupKind::Movies => filter.show_movies,
            GroupKind::Sounds => filter.show_sounds,
            GroupKind::Caches => filter.show_caches,
            GroupKind::Linked => filter.show_linked,
        }
    }
}

#[derive(Debug)]
pub struct RecordGroup<'a> {
    pub kind: GroupKind,
    /// Collapsed groups show only their header.
    pub expanded: bool,
    /// Entries pair the record's session index with the record.
    pub entries: Vec<(usize, &'a MissingFileRecord)>,
}

impl RecordGroup<'_> {
    pub fn label(&self) -> String {
        format!("{}: {}", self.kind.label(), self.entries.len())
    }
}

/// Non-empty groups in display order. The usage toggles drop records; the
/// per-type toggles only collapse their group.
pub fn group_records<'a>(
    records: &'a [MissingFileRecord],
    filter: &FilterSettings,
) -> Vec<RecordGroup<'a>> {
    GroupKind::ALL
        .iter()
        .map(|&kind| RecordGroup {
            kind,
            expanded: kind.expanded(filter),
            entries: records
                .iter()
                .enumerate()
                .filter(|(_, r)| kind.contains(r.file_type) && filter.shows_usage(r))
                .collect(),
        })
        .filter(|group| !group.entries.is_empty())
        .collect()
}

/// Keep the last three components behind an ellipsis.
pub fn shorten_path(path: &str) -> String {
    let parts: Vec<&str> = path.split(['/', '\\']).filter(|p| !p.is_empty()).collect();
    if parts.len() <= 3 {
        return path.to_string();
    }
    format!(".../{}", parts[parts.len() - 3..].join("/"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordAction {
    Relink,
    AutoFind,
    Delete,
    Remove,
}

impl RecordAction {
    pub fn label(&self) -> &'static str {
        match self {
            RecordAction::Relink => "relink",
            RecordAction::AutoFind => "auto-find",
            RecordAction::Delete => "delete",
            RecordAction::Remove => "remove",
        }
    }
}

/// Linked records are read-only; unused ones can only be removed.
pub fn available_actions(record: &MissingFileRecord) -> &'static [RecordAction] {
    if record.is_linked {
        &[]
    } else if record.is_used() {
        &[RecordAction::Relink, RecordAction::AutoFind, RecordAction::Delete]
    } else {
        &[RecordAction::Remove]
    }
}
