use colored::*;
use eyre::Result;

use crate::cli::{ConfigAction, OutputFormat};
use crate::config::Config;

pub fn run(action: ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Show { format } => show(OutputFormat::resolve(format), config),
    }
}

fn show(format: OutputFormat, config: &Config) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(config)?);
        }
        OutputFormat::Text => {
            println!("{}", "gtm Configuration".bold());
            println!();

            println!("log_level: {}", config.log_level.as_filter());
            println!();

            println!("{}:", "toolchain".cyan());
            println!("  program: {}", config.toolchain.program);
            println!("  edition: {}", config.toolchain.edition);
            println!("  args: {}", config.toolchain.args.join(" "));
            println!();

            println!("{}:", "build".cyan());
            println!("  artifact_dir: {}", config.artifact_dir().display());
            match config.build.timeout_secs {
                Some(secs) => println!("  timeout_secs: {}", secs),
                None => println!("  timeout_secs: none"),
            }
            println!();

            println!("{}:", "host".cyan());
            println!("  ticks: {}", config.host.ticks);
            println!("  colony_size: {}", config.host.colony_size);
            println!("  default_sugar: {}", config.host.default_sugar);
            println!("  sugar_per_pile: {}", config.host.sugar_per_pile);
            println!("  trace_every: {}", config.host.trace_every);
        }
    }

    Ok(())
}
