use std::fs;
use std::path::Path;
use tracing::{debug, info};

use super::SceneGraph;
use crate::error::Error;
use crate::utils::path::absolutize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentFormat {
    Json,
    Toml,
}

fn document_format(path: &Path) -> Result<DocumentFormat, Error> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "json" => Ok(DocumentFormat::Json),
        "toml" => Ok(DocumentFormat::Toml),
        _ => Err(Error::SceneFormat(format!(
            "unsupported scene document '{}' (expected .json or .toml)",
            path.display()
        ))),
    }
}

impl SceneGraph {
    /// Load a scene document. The document's location becomes the save
    /// location that host-relative paths resolve against.
    pub fn load(path: &Path) -> Result<SceneGraph, Error> {
        let format = document_format(path)?;
        let text = fs::read_to_string(path)?;
        let mut graph: SceneGraph = match format {
            DocumentFormat::Json => serde_json::from_str(&text)?,
            DocumentFormat::Toml => toml::from_str(&text)?,
        };
        graph.file_path = Some(absolutize(path));
        debug!(
            "Loaded scene {}: {} images, {} materials, {} objects",
            path.display(),
            graph.images.len(),
            graph.materials.len(),
            graph.objects.len()
        );
        Ok(graph)
    }

    /// Write the scene back in the format its extension names.
    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let text = match document_format(path)? {
            DocumentFormat::Json => serde_json::to_string_pretty(self)?,
            DocumentFormat::Toml => toml::to_string_pretty(self)?,
        };
        fs::write(path, text).map_err(|source| Error::WriteFailed {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Saved scene to {}", path.display());
        Ok(())
    }
}
