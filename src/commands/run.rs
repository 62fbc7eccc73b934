//! Compile an agent and run it in the simulation

use colored::*;
use eyre::Result;

use crate::config::Config;
use crate::host::ConsoleHost;
use crate::pipeline::{PipelineError, RunFlags, RunPipeline};

pub fn run(source: &str, flags: &RunFlags, config: &Config) -> Result<()> {
    let pipeline = RunPipeline::from_config(config);

    println!("{} Compiling {}", "→".blue(), source.cyan());
    let agent = match pipeline.prepare(source) {
        Ok(agent) => agent,
        Err(err) => fail(err),
    };
    log::debug!("Agent module loaded from {}", agent.artifact_path().display());

    println!(
        "{} Agent successfully compiled. Starting the simulation...",
        "✓".green()
    );

    let mut host = ConsoleHost::new(config.host.clone());
    if let Err(err) = pipeline.launch(agent, flags, &mut host) {
        fail(err);
    }

    if let Some(report) = host.last_report() {
        log::info!("Run report: {}", serde_json::to_string(report)?);
    }

    Ok(())
}

/// Report a pipeline failure and exit. Artifact guards are already dropped here.
fn fail(err: PipelineError) -> ! {
    log::error!("{}: {}", err.stage(), err);
    eprintln!("{} {}: {}", "✗".red(), err.stage(), err);
    std::process::exit(1);
}
