//! Create a new agent project

use colored::*;
use eyre::Result;
use std::path::PathBuf;

use crate::agent::ABI_FILE_NAME;
use crate::scaffold::{self, AGENT_FILE_NAME};

pub fn run(name: &str, path: Option<PathBuf>) -> Result<()> {
    println!("{} Creating agent {}", "→".blue(), name.cyan());

    let dir = scaffold::create_agent_project(name, path.as_deref())?;

    println!("  {} Created {}/", "✓".green(), dir.display());
    println!("  {} Wrote {}", "✓".green(), ABI_FILE_NAME);
    println!("  {} Wrote {}", "✓".green(), AGENT_FILE_NAME);

    let agent_path = dir.join(AGENT_FILE_NAME);
    println!();
    println!("{} Agent {} is ready!", "✓".green().bold(), name);
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to teach your ant new tricks", agent_path.display().to_string().cyan());
    println!(
        "  2. Run {} to watch it forage",
        format!("gtm run {}", agent_path.display()).cyan()
    );
    println!("  3. Keep {} next to it, the host loads agents through it", ABI_FILE_NAME);

    Ok(())
}
