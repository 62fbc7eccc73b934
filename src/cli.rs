use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::pipeline::RunFlags;

/// Output format for commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl OutputFormat {
    /// Resolve the effective output format.
    /// If user specified a format, use it.
    /// Otherwise: TTY → Text, non-TTY (pipe) → Json
    pub fn resolve(user_choice: Option<OutputFormat>) -> OutputFormat {
        match user_choice {
            Some(fmt) => fmt,
            None => {
                if std::io::stdout().is_terminal() {
                    OutputFormat::Text
                } else {
                    OutputFormat::Json
                }
            }
        }
    }
}

#[derive(Parser)]
#[command(
    name = "gtm",
    about = "Scaffold, compile and run ant agents for the gtm simulation",
    version = env!("GIT_DESCRIBE"),
    after_help = "Logs are written to: ~/.local/share/gtm/logs/gtm.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to gtm.yaml config file")]
    pub config: Option<PathBuf>,

    /// Log at debug level regardless of config
    #[arg(short, long, global = true, help = "Enable verbose (debug) logging")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new agent project
    Init {
        /// Agent type name (e.g. MyAnt)
        #[arg(long)]
        name: String,

        /// Directory to create (defaults to ./<name>)
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Compile an agent source file and run it in the simulation
    #[command(
        long_about = "Compiles the given Rust source file into a dynamically loadable module, loads it, \
                      checks its GTM_NEW_AGENT declaration and starts the simulation with it.\n\n\
                      Example:\n  gtm run ./MyAnt/agent.rs --headless --sugar 5"
    )]
    Run {
        /// Path to the agent source file
        source: String,

        /// Start the simulation right after the agent has been compiled
        #[arg(short = 'i', long = "startImmediately")]
        start_immediately: bool,

        /// Run the simulation without a display
        #[arg(long)]
        headless: bool,

        /// Desired number of sugar piles (0 or less lets the host decide)
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        sugar: i64,
    },

    /// Diagnose toolchain and configuration issues
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },
}

impl Commands {
    /// Flags of a `run` invocation, if this is one.
    pub fn run_flags(&self) -> Option<RunFlags> {
        match self {
            Commands::Run {
                start_immediately,
                headless,
                sugar,
                ..
            } => Some(RunFlags {
                start_immediately: *start_immediately,
                headless: *headless,
                sugar: *sugar,
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_defaults() {
        let cli = Cli::try_parse_from(["gtm", "run", "agent.rs"]).unwrap();
        let flags = cli.command.run_flags().unwrap();
        assert_eq!(flags, RunFlags::default());
    }

    #[test]
    fn test_run_flags_parse() {
        let cli = Cli::try_parse_from(["gtm", "run", "agent.rs", "-i", "--headless", "--sugar", "5"]).unwrap();
        let flags = cli.command.run_flags().unwrap();
        assert!(flags.start_immediately);
        assert!(flags.headless);
        assert_eq!(flags.sugar, 5);
    }

    #[test]
    fn test_run_long_start_flag_and_negative_sugar() {
        let cli = Cli::try_parse_from(["gtm", "run", "agent.rs", "--startImmediately", "--sugar", "-2"]).unwrap();
        let flags = cli.command.run_flags().unwrap();
        assert!(flags.start_immediately);
        assert_eq!(flags.sugar, -2);
    }

    #[test]
    fn test_run_requires_source() {
        assert!(Cli::try_parse_from(["gtm", "run"]).is_err());
    }

    #[test]
    fn test_init_requires_name() {
        assert!(Cli::try_parse_from(["gtm", "init"]).is_err());
        let cli = Cli::try_parse_from(["gtm", "init", "--name", "MyAnt"]).unwrap();
        assert!(cli.command.run_flags().is_none());
    }
}
