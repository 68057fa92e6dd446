use colored::*;
use missing_link::{ConfirmPrompt, ConfirmRequest};
use std::io::{self, Write};
use tracing::error;

/// Asks on the terminal; anything but an explicit yes declines.
pub struct TerminalPrompt;

impl ConfirmPrompt for TerminalPrompt {
    fn confirm(&self, request: &ConfirmRequest) -> bool {
        let question = match request {
            ConfirmRequest::Mismatch(mismatch) => {
                println!("{}", "Filename mismatch detected!".yellow().bold());
                println!(
                    "  Original: {}{}",
                    mismatch.original_stem, mismatch.original_ext
                );
                println!("  New:      {}{}", mismatch.new_stem, mismatch.new_ext);
                if mismatch.name_differs() {
                    println!("  {} Filename differs", "⚠".yellow());
                }
                if mismatch.ext_differs() {
                    println!("  {} Extension differs", "⚠".yellow());
                }
                "Relink anyway?"
            }
            ConfirmRequest::RemoveUsed { name } => {
                println!("{} '{}' is used in the scene!", "Warning:".red().bold(), name);
                "Are you sure you want to remove it?"
            }
            ConfirmRequest::Purge => {
                println!("This will remove objects not in any scene and all data without users.");
                "Purge all orphans? This cannot be undone"
            }
        };

        match prompt_confirm(question, Some(false)) {
            Ok(answer) => answer,
            Err(err) => {
                error!("Failed to read answer: {}", err);
                false
            }
        }
    }
}

pub fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(default.unwrap_or(false));
        }

        match input.trim().to_uppercase().as_str() {
            "Y" | "YES" => return Ok(true),
            "N" | "NO" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}
