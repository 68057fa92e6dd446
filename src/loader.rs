use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::Error;
use crate::scene::Image;
use crate::udim::{first_tile, has_udim_token};
use crate::utils::path::abspath;

/// Seam for refreshing in-memory content after a path changes.
pub trait AssetLoader {
    fn reload_image(&self, image: &mut Image, base_dir: Option<&Path>) -> Result<(), Error>;
}

/// Reads the head of the file (one tile for UDIM sets) and marks the image loaded.
pub struct FsLoader;

impl AssetLoader for FsLoader {
    fn reload_image(&self, image: &mut Image, base_dir: Option<&Path>) -> Result<(), Error> {
        let reload_failed = |reason: String| Error::ReloadFailed {
            name: image.name.clone(),
            reason,
        };

        let resolved = abspath(&image.filepath, base_dir);
        let target = if has_udim_token(&image.filepath) {
            first_tile(&resolved.to_string_lossy())
                .ok_or_else(|| reload_failed("no UDIM tile on disk".to_string()))?
        } else {
            resolved
        };

        let mut header = [0u8; 64];
        File::open(&target)
            .and_then(|mut file| file.read(&mut header))
            .map_err(|err| reload_failed(format!("{}: {}", target.display(), err)))?;

        image.loaded = true;
        Ok(())
    }
}
