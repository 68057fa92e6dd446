use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

use crate::config::AppConfig;
use crate::confirm::{ConfirmPrompt, ConfirmRequest};
use crate::error::Error;
use crate::loader::{AssetLoader, FsLoader};
use crate::progress::{ProgressReporter, SilentReporter};
use crate::purge::{self, PurgeOutcome};
use crate::relinker::{self, BulkOutcome, RelinkOutcome};
use crate::report::{self, ReportFormat};
use crate::resolver;
use crate::scanner::{scan_missing, SearchWalker};
use crate::scene::SceneGraph;
use crate::session::ScanSession;
use crate::utils::path::{absolutize, relpath};

/// The action boundary. Every action runs to completion against one scene,
/// and every action that changes the scene finishes with a full rescan so
/// the session never holds stale records.
pub struct Engine<'a> {
    config: AppConfig,
    walker: SearchWalker,
    reporter: &'a dyn ProgressReporter,
    loader: &'a dyn AssetLoader,
}

impl Engine<'static> {
    pub fn new(config: AppConfig) -> Self {
        let walker = SearchWalker::new(&config.ignore_patterns);
        Self {
            config,
            walker,
            reporter: &SilentReporter,
            loader: &FsLoader,
        }
    }
}

impl<'a> Engine<'a> {
    pub fn with_reporter<'b>(self, reporter: &'b dyn ProgressReporter) -> Engine<'b>
    where
        'a: 'b,
    {
        Engine {
            config: self.config,
            walker: self.walker,
            reporter,
            loader: self.loader,
        }
    }

    pub fn with_loader<'b>(self, loader: &'b dyn AssetLoader) -> Engine<'b>
    where
        'a: 'b,
    {
        Engine {
            config: self.config,
            walker: self.walker,
            reporter: self.reporter,
            loader,
        }
    }

    /// Replace the session's records with a fresh scan. Returns the number
    /// of distinct missing paths.
    pub fn scan(&self, graph: &SceneGraph, session: &mut ScanSession) -> usize {
        self.reporter.on_scan_start();
        let start = Instant::now();

        let records = scan_missing(graph);
        let count = records.len();
        session.replace(records);

        self.reporter
            .on_scan_complete(count, start.elapsed().as_secs_f64());
        info!("Found {} missing files", count);
        count
    }

    /// Relink the record at `index` to its candidate path.
    pub fn relink(
        &self,
        graph: &mut SceneGraph,
        session: &mut ScanSession,
        index: usize,
        prompt: &dyn ConfirmPrompt,
    ) -> Result<RelinkOutcome, Error> {
        let candidate = session.get(index)?.candidate_new_path.clone();
        let outcome = relinker::relink(
            graph,
            session.records(),
            index,
            &candidate,
            &self.walker,
            self.reporter,
            self.loader,
            prompt,
        )?;
        self.scan(graph, session);
        Ok(outcome)
    }

    /// Search `folder` for the record's file and store it as the candidate.
    pub fn find_in_folder(
        &self,
        graph: &SceneGraph,
        session: &mut ScanSession,
        index: usize,
        folder: &Path,
    ) -> Result<String, Error> {
        let record = session.get(index)?;
        let folder = absolutize(folder);
        let found = resolver::find_in_folder(record.basename(), &folder, &self.walker, self.reporter)
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "File '{}' not found in {} or subfolders",
                    record.basename(),
                    folder.display()
                ))
            })?;

        let stored = relpath(&found, graph.base_dir().as_deref());
        session.set_candidate(index, &stored)?;
        info!("Found file: {}", stored);
        Ok(stored)
    }

    /// Relink every missing record found under `folder`.
    pub fn relink_folder(
        &self,
        graph: &mut SceneGraph,
        session: &mut ScanSession,
        folder: &Path,
    ) -> Result<BulkOutcome, Error> {
        let outcome = relinker::relink_folder(
            graph,
            session.records(),
            folder,
            &self.walker,
            self.reporter,
            self.loader,
        )?;
        self.scan(graph, session);
        Ok(outcome)
    }

    /// Look around the scene document for the record's file and store it as
    /// the candidate.
    pub fn auto_search(
        &self,
        graph: &SceneGraph,
        session: &mut ScanSession,
        index: usize,
    ) -> Result<String, Error> {
        let record = session.get(index)?;
        let base_dir = graph.base_dir();
        let found = resolver::auto_search(
            record.basename(),
            base_dir.as_deref(),
            &self.config,
            &self.walker,
            self.reporter,
        )?;

        let stored = relpath(&found, base_dir.as_deref());
        session.set_candidate(index, &stored)?;
        info!("Found: {}", stored);
        Ok(stored)
    }

    /// Remove the datablocks behind the record at `index`. Used records need
    /// confirmation.
    pub fn remove_file(
        &self,
        graph: &mut SceneGraph,
        session: &mut ScanSession,
        index: usize,
        prompt: &dyn ConfirmPrompt,
    ) -> Result<usize, Error> {
        let record = session.get(index)?;
        if record.is_used()
            && !prompt.confirm(&ConfirmRequest::RemoveUsed {
                name: record.display_name.clone(),
            })
        {
            return Err(Error::Cancelled);
        }

        let path = record.original_path.clone();
        let removed = purge::remove_file(graph, &path);
        self.scan(graph, session);
        Ok(removed)
    }

    pub fn purge(
        &self,
        graph: &mut SceneGraph,
        session: &mut ScanSession,
        prompt: &dyn ConfirmPrompt,
    ) -> Result<PurgeOutcome, Error> {
        if !prompt.confirm(&ConfirmRequest::Purge) {
            return Err(Error::Cancelled);
        }
        let outcome = purge::purge_orphans(graph);
        self.scan(graph, session);
        Ok(outcome)
    }

    pub fn export_report(
        &self,
        graph: &SceneGraph,
        session: &ScanSession,
        destination: Option<&Path>,
        format: ReportFormat,
    ) -> Result<PathBuf, Error> {
        report::write_report(
            session.records(),
            graph.file_path.as_deref(),
            destination,
            &self.config.report_file_name,
            format,
        )
    }
}
