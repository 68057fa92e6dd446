use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;
use std::path::PathBuf;

/// Subfolders of the scene directory that auto-search looks into.
pub const DEFAULT_SEARCH_SUBFOLDERS: &[&str] =
    &["textures", "Textures", "tex", "images", "Images", "maps", "Maps"];

pub const DEFAULT_REPORT_FILE_NAME: &str = "missing_files_report.txt";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub search_subfolders: Vec<String>,
    pub ignore_patterns: Vec<String>,
    pub report_file_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            search_subfolders: DEFAULT_SEARCH_SUBFOLDERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            ignore_patterns: Vec::new(),
            report_file_name: DEFAULT_REPORT_FILE_NAME.to_string(),
        }
    }
}

/// Layered configuration: built-in defaults, then `MissingLink.toml` in the
/// working directory, then `MISSING_LINK_*` environment variables.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .set_default("search_subfolders", DEFAULT_SEARCH_SUBFOLDERS.to_vec())?
        .set_default("ignore_patterns", Vec::<String>::new())?
        .set_default("report_file_name", DEFAULT_REPORT_FILE_NAME)?
        .add_source(ConfigFile::with_name("MissingLink").required(false))
        .add_source(
            Environment::with_prefix("MISSING_LINK")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("search_subfolders")
                .with_list_parse_key("ignore_patterns"),
        )
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

/// Remove directories that are subdirectories of other directories in the list.
/// The first occurrence keeps its position, so search order is preserved.
pub fn non_overlapping_directories(dirs: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();

    for dir in dirs {
        if result.iter().any(|kept| dir.starts_with(kept)) {
            continue;
        }
        result.retain(|kept| !kept.starts_with(&dir));
        result.push(dir);
    }

    result
}
