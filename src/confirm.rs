/// What the user is being asked to approve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmRequest {
    /// The chosen replacement looks like a different asset.
    Mismatch(PathMismatch),
    /// Removing datablocks that are still used in the scene.
    RemoveUsed { name: String },
    /// Purging every orphan; irreversible.
    Purge,
}

/// Differences between the original file name and a replacement candidate.
/// Comparisons are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMismatch {
    pub original_stem: String,
    pub original_ext: String,
    pub new_stem: String,
    pub new_ext: String,
}

impl PathMismatch {
    pub fn new(original_name: &str, new_name: &str) -> Self {
        let (original_stem, original_ext) = crate::utils::path::split_ext(original_name);
        let (new_stem, new_ext) = crate::utils::path::split_ext(new_name);
        Self {
            original_stem: original_stem.to_string(),
            original_ext: original_ext.to_string(),
            new_stem: new_stem.to_string(),
            new_ext: new_ext.to_string(),
        }
    }

    pub fn name_differs(&self) -> bool {
        self.original_stem.to_lowercase() != self.new_stem.to_lowercase()
    }

    pub fn ext_differs(&self) -> bool {
        self.original_ext.to_lowercase() != self.new_ext.to_lowercase()
    }

    /// Adding an extension to an otherwise identical name is not a mismatch.
    pub fn needs_confirmation(&self) -> bool {
        self.name_differs() || (self.ext_differs() && !self.original_ext.is_empty())
    }
}

/// Seam for interactive confirmation of risky actions.
pub trait ConfirmPrompt {
    fn confirm(&self, request: &ConfirmRequest) -> bool;
}

/// Approves everything, for `--yes` and tests.
pub struct AssumeYes;

impl ConfirmPrompt for AssumeYes {
    fn confirm(&self, _request: &ConfirmRequest) -> bool {
        true
    }
}

/// Declines everything.
pub struct AssumeNo;

impl ConfirmPrompt for AssumeNo {
    fn confirm(&self, _request: &ConfirmRequest) -> bool {
        false
    }
}
