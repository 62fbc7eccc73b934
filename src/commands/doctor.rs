//! Diagnose toolchain and configuration issues

use colored::*;
use eyre::Result;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::agent::abi::{ABI_VERSION, DECLARATION_SYMBOL};
use crate::config::Config;

pub fn run(config: &Config, config_path: Option<&PathBuf>) -> Result<()> {
    println!("{}", "gtm Doctor".bold());
    println!("{}", "═".repeat(50));
    println!();

    let mut issues = 0;

    // Config source
    match Config::source(config_path) {
        Some(path) => println!("{} Config file: {}", "✓".green(), path.display()),
        None => println!("{} No config file, using defaults", "⚠".yellow()),
    }

    println!();
    println!("{}", "Toolchain:".bold());

    let program = &config.toolchain.program;
    match which::which(program) {
        Ok(path) => {
            let version = get_command_version(&path).unwrap_or_else(|| "unknown version".to_string());
            println!("  {} {} ({})", "✓".green(), path.display(), version.dimmed());
        }
        Err(_) => {
            println!("  {} {} not found on PATH", "✗".red(), program);
            println!("    Install Rust from {}", "https://rustup.rs".cyan());
            issues += 1;
        }
    }
    println!("  Edition: {}", config.toolchain.edition);
    if !config.toolchain.args.is_empty() {
        println!("  Extra args: {}", config.toolchain.args.join(" "));
    }

    println!();
    println!("{}", "Build:".bold());

    let artifact_dir = config.artifact_dir();
    if is_writable_dir(&artifact_dir) {
        println!("  {} Artifact directory: {}", "✓".green(), artifact_dir.display());
    } else {
        println!(
            "  {} Artifact directory not writable: {}",
            "✗".red(),
            artifact_dir.display()
        );
        issues += 1;
    }
    match config.build.timeout_secs {
        Some(secs) => println!("  Compiler timeout: {}s", secs),
        None => println!("  Compiler timeout: none"),
    }

    println!();
    println!("{}", "Plugin ABI:".bold());
    println!("  Version: {}", ABI_VERSION);
    println!("  Entry point: {}", DECLARATION_SYMBOL);

    println!();

    // Summary
    println!("{}", "═".repeat(50));
    if issues == 0 {
        println!("{} All checks passed!", "✓".green().bold());
    } else {
        println!("{} {} issue(s) found", "⚠".yellow().bold(), issues);
    }

    Ok(())
}

/// Whether a file can be created in `dir`.
fn is_writable_dir(dir: &Path) -> bool {
    dir.is_dir() && tempfile::tempfile_in(dir).is_ok()
}

fn get_command_version(cmd: &Path) -> Option<String> {
    let output = Command::new(cmd).arg("--version").output().ok()?;

    if output.status.success() {
        let version_str = String::from_utf8_lossy(&output.stdout);
        let version = version_str
            .lines()
            .next()
            .unwrap_or("")
            .chars()
            .take(60)
            .collect::<String>();
        Some(version.trim().to_string())
    } else {
        // Command exists but --version failed, just say it's available
        Some("available".to_string())
    }
}
