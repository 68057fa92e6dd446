use clap::{Args, Parser, Subcommand, ValueEnum};
use missing_link::{FilterSettings, ReportFormat};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "missing-link")]
#[command(about = "Find, relink and report missing files referenced by a scene", long_about = None)]
pub struct Cli {
    /// Scene document to work on (.json or .toml)
    #[arg(long, short, global = true, env = "MISSING_LINK_SCENE")]
    pub scene: Option<PathBuf>,

    /// Answer yes to every confirmation
    #[arg(long, short, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan the scene and print a summary of missing files
    Scan,
    /// List missing files grouped by type
    List(ListArgs),
    /// Relink a missing file to a file or to a folder to search
    Relink { index: usize, path: String },
    /// Search a folder recursively for a missing file and remember the match
    Find { index: usize, folder: PathBuf },
    /// Relink every missing file found under a folder
    RelinkFolder { folder: PathBuf },
    /// Search the scene directory and common texture folders for a missing file
    AutoFind { index: usize },
    /// Remove the datablocks behind a missing file
    Remove { index: usize },
    /// Remove objects outside every scene and all data without users
    Purge,
    /// Write a missing files report
    Report {
        /// Destination; defaults to the configured name next to the scene
        #[arg(long, short)]
        output: Option<PathBuf>,
        #[arg(long, short, value_enum, default_value_t = FormatArg::Text)]
        format: FormatArg,
    },
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Hide files used by objects
    #[arg(long)]
    pub no_used: bool,
    /// Hide files no object uses
    #[arg(long)]
    pub no_unused: bool,
    /// Collapse the images group
    #[arg(long)]
    pub no_images: bool,
    /// Collapse the movies group
    #[arg(long)]
    pub no_movies: bool,
    /// Collapse the sounds group
    #[arg(long)]
    pub no_sounds: bool,
    /// Collapse the caches group
    #[arg(long)]
    pub no_caches: bool,
    /// Collapse the linked files group
    #[arg(long)]
    pub no_linked: bool,
}

impl From<&ListArgs> for FilterSettings {
    fn from(args: &ListArgs) -> Self {
        FilterSettings {
            show_used: !args.no_used,
            show_unused: !args.no_unused,
            show_images: !args.no_images,
            show_movies: !args.no_movies,
            show_sounds: !args.no_sounds,
            show_caches: !args.no_caches,
            show_linked: !args.no_linked,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Text,
    Csv,
}

impl From<FormatArg> for ReportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => ReportFormat::Text,
            FormatArg::Csv => ReportFormat::Csv,
        }
    }
}

impl Commands {
    /// Whether the command can change the scene document.
    pub fn mutates(&self) -> bool {
        matches!(
            self,
            Commands::Relink { .. }
                | Commands::RelinkFolder { .. }
                | Commands::Remove { .. }
                | Commands::Purge
        )
    }
}
