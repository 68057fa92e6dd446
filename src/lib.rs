//! Find, relink and report missing external files referenced by a scene graph.

pub mod config;
pub mod confirm;
pub mod engine;
pub mod error;
pub mod loader;
pub mod progress;
pub mod purge;
pub mod relinker;
pub mod report;
pub mod resolver;
pub mod scanner;
pub mod scene;
pub mod session;
pub mod udim;
pub mod utils;
pub mod view;

pub use config::AppConfig;
pub use confirm::{AssumeNo, AssumeYes, ConfirmPrompt, ConfirmRequest, PathMismatch};
pub use engine::Engine;
pub use error::Error;
pub use loader::{AssetLoader, FsLoader};
pub use progress::{ProgressReporter, SilentReporter};
pub use purge::PurgeOutcome;
pub use relinker::{BulkOutcome, RelinkOutcome};
pub use report::ReportFormat;
pub use scene::SceneGraph;
pub use session::{FileType, FilterSettings, MissingFileRecord, ScanSession};
