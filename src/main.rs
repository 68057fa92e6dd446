mod cli;
mod logging;

use std::path::Path;
use std::process;

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser};
use cli::{Cli, CliReporter, Commands, TerminalPrompt};
use colored::*;
use dotenv::dotenv;
use missing_link::config::load_configuration;
use missing_link::view::{available_actions, group_records, shorten_path};
use missing_link::{
    AssumeYes, ConfirmPrompt, Engine, Error, FilterSettings, ScanSession, SceneGraph,
};
use tracing::{error, info, warn};

fn main() {
    dotenv().ok();

    let _guard = logging::init_logger();

    let args = Cli::parse();

    if let Err(err) = run(args) {
        error!("Error: {:#}", err);
        process::exit(1);
    }
}

fn run(args: Cli) -> Result<()> {
    let config = load_configuration().context("Error loading configuration")?;

    let Some(command) = args.command else {
        Cli::command().print_long_help()?;
        return Ok(());
    };
    if let Commands::PrintConfig = command {
        println!("Configuration: {:#?}", config);
        return Ok(());
    }

    let scene_path = args
        .scene
        .ok_or_else(|| anyhow!("No scene document given; pass --scene or set MISSING_LINK_SCENE"))?;
    let mut graph = SceneGraph::load(&scene_path)
        .with_context(|| format!("Error loading scene {}", scene_path.display()))?;

    let reporter = CliReporter::new();
    let engine = Engine::new(config).with_reporter(&reporter);
    let prompt: &dyn ConfirmPrompt = if args.yes { &AssumeYes } else { &TerminalPrompt };

    let mut session = ScanSession::new();
    engine.scan(&graph, &mut session);

    let mutates = command.mutates();
    match command {
        Commands::Scan => print_summary(&session),
        Commands::List(list_args) => {
            session.filter = FilterSettings::from(&list_args);
            print_list(&session);
        }
        Commands::Relink { index, path } => {
            session.set_candidate(index, &path)?;
            let outcome = cancel_ok(engine.relink(&mut graph, &mut session, index, prompt))?;
            if let Some(outcome) = outcome {
                let mut message = format!("Relinked {} file(s)", outcome.relinked);
                if outcome.auto_relinked > 0 {
                    message += &format!(" + auto-relinked {} other file(s)", outcome.auto_relinked);
                }
                info!("{} -> {}", message.green(), outcome.stored_path);
                if outcome.skipped_linked > 0 {
                    warn!(
                        "{} linked file(s) skipped - they're read-only",
                        outcome.skipped_linked
                    );
                }
                log_issues(&outcome.issues);
            }
        }
        Commands::Find { index, folder } => {
            let stored = engine.find_in_folder(&graph, &mut session, index, &folder)?;
            println!("Found file: {}", stored.cyan());
            println!("Run `relink {} {}` to apply it", index, stored);
        }
        Commands::RelinkFolder { folder } => {
            let outcome = engine.relink_folder(&mut graph, &mut session, &folder)?;
            info!(
                "Relinked {} file(s), {} still unresolved",
                format!("{}", outcome.relinked).green(),
                format!("{}", outcome.unresolved).red()
            );
            if outcome.skipped_linked > 0 {
                warn!("{} linked reference(s) skipped", outcome.skipped_linked);
            }
            log_issues(&outcome.issues);
        }
        Commands::AutoFind { index } => {
            let stored = engine.auto_search(&graph, &mut session, index)?;
            println!("Found: {}", stored.cyan());
            println!("Run `relink {} {}` to apply it", index, stored);
        }
        Commands::Remove { index } => {
            if let Some(removed) =
                cancel_ok(engine.remove_file(&mut graph, &mut session, index, prompt))?
            {
                info!("Removed {} file datablock(s)", removed);
            }
        }
        Commands::Purge => {
            if let Some(outcome) = cancel_ok(engine.purge(&mut graph, &mut session, prompt))? {
                if outcome.total() > 0 {
                    info!(
                        "Purged {} orphaned datablock(s) + removed {} object(s) not in any scene",
                        outcome.datablocks_removed, outcome.objects_removed
                    );
                } else {
                    info!("Purged all orphaned data (file is clean)");
                }
            }
        }
        Commands::Report { output, format } => {
            let path =
                engine.export_report(&graph, &session, output.as_deref(), format.into())?;
            println!("Report exported to: {}", path.display());
        }
        Commands::PrintConfig => {}
    }

    if mutates {
        save_scene(&graph, &scene_path)?;
    }
    Ok(())
}

/// A declined confirmation is not a failure.
fn cancel_ok<T>(result: Result<T, Error>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(Error::Cancelled) => {
            info!("Cancelled");
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

fn log_issues(issues: &[Error]) {
    for issue in issues {
        warn!("{}", issue);
    }
}

fn save_scene(graph: &SceneGraph, path: &Path) -> Result<()> {
    graph
        .save(path)
        .with_context(|| format!("Error saving scene {}", path.display()))
}

fn print_summary(session: &ScanSession) {
    if session.is_empty() {
        println!("{}", "No missing files found".green());
        return;
    }
    println!("Found {} missing files", session.len().to_string().red());
    for group in group_records(session.records(), &session.filter) {
        println!("  {}", group.label());
    }
}

fn print_list(session: &ScanSession) {
    if session.is_empty() {
        println!("{}", "No missing files found".green());
        return;
    }

    let groups = group_records(session.records(), &session.filter);
    let showing: usize = groups.iter().map(|g| g.entries.len()).sum();
    println!(
        "Missing Files: {} (Showing: {})",
        session.len().to_string().red(),
        showing
    );

    for group in groups {
        let marker = if group.expanded { "▼" } else { "▶" };
        println!();
        println!("{} {}", marker, group.label().bold());
        if !group.expanded {
            continue;
        }
        for (index, record) in group.entries {
            let status = if record.is_used() {
                "USED IN SCENE".green()
            } else {
                "UNUSED".yellow()
            };
            println!("  #{} {} [{}]", index, record.display_name.bold(), status);
            if record.is_linked && !record.library_path.is_empty() {
                println!("     Linked from: {}", shorten_path(&record.library_path));
                println!("     (Read-only - fix in original file)");
            }
            println!("     Original Path: {}", shorten_path(&record.original_path));
            println!("     Materials: {}", record.materials_label());
            println!("     Objects: {}", record.objects_label());
            let actions: Vec<&str> = available_actions(record)
                .iter()
                .map(|a| a.label())
                .collect();
            if !actions.is_empty() {
                println!("     Actions: {}", actions.join(", "));
            }
        }
    }
}
