//! Host runtime boundary
//!
//! The simulation engine consumes a list of [`RuntimeOption`] directives and
//! owns the rest of the run. [`console::ConsoleHost`] is the built-in host the
//! binary uses; tests plug in their own.

use thiserror::Error;

use crate::pipeline::{AgentConstructor, RuntimeOption};

pub mod capability;
pub mod console;

pub use console::ConsoleHost;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("no agent constructor was supplied")]
    MissingConstructor,

    #[error("cannot place {requested} sugar piles, at most {max} are supported")]
    TooManyPiles { requested: u32, max: u32 },

    #[error("console I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Entry point of a simulation engine.
pub trait HostRuntime {
    /// Take over the run with the given directives.
    fn run(&mut self, options: Vec<RuntimeOption>) -> Result<(), HostError>;
}

/// Settings after applying every directive. Applying one twice is a no-op.
#[derive(Debug, Clone, Default)]
pub struct HostSettings {
    pub constructor: Option<AgentConstructor>,
    pub start_immediately: bool,
    pub headless: bool,
    pub desired_sugar: Option<u32>,
}

impl HostSettings {
    pub fn from_options(options: impl IntoIterator<Item = RuntimeOption>) -> Self {
        let mut settings = Self::default();
        for option in options {
            settings.apply(option);
        }
        settings
    }

    pub fn apply(&mut self, option: RuntimeOption) {
        match option {
            RuntimeOption::WithAgentConstructor(constructor) => self.constructor = Some(constructor),
            RuntimeOption::StartImmediately => self.start_immediately = true,
            RuntimeOption::Headless => self.headless = true,
            RuntimeOption::WithDesiredResourceCount(count) => self.desired_sugar = Some(count),
        }
    }
}
