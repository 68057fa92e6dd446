use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Please specify a new file path")]
    NoPathSpecified,

    #[error("'{name}' is linked from {library} and is read-only")]
    LinkedReadOnly { name: String, library: String },

    #[error("Failed to reload '{name}': {reason}")]
    ReloadFailed { name: String, reason: String },

    #[error("Failed to write {}: {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Scene has no save location; save the scene document first")]
    SaveLocationUnknown,

    #[error("No missing file at index {0}")]
    IndexOutOfRange(usize),

    #[error("Cancelled")]
    Cancelled,

    #[error("Scene format error: {0}")]
    SceneFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SceneFormat(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::SceneFormat(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::SceneFormat(err.to_string())
    }
}
