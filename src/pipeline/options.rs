//! Runtime option composer: CLI toggles -> host directives.

use super::entry::AgentConstructor;

/// Directives understood by a [`crate::host::HostRuntime`].
#[derive(Debug, Clone, Copy)]
pub enum RuntimeOption {
    WithAgentConstructor(AgentConstructor),
    StartImmediately,
    Headless,
    /// Number of sugar piles the host should place.
    WithDesiredResourceCount(u32),
}

/// Toggles collected from `gtm run`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunFlags {
    pub start_immediately: bool,
    pub headless: bool,
    /// Desired sugar piles; zero or less means "let the host decide".
    pub sugar: i64,
}

impl Default for RunFlags {
    fn default() -> Self {
        Self {
            start_immediately: false,
            headless: false,
            sugar: 1,
        }
    }
}

/// Build the option list handed to the host. The constructor always comes first.
pub fn compose(constructor: AgentConstructor, flags: &RunFlags) -> Vec<RuntimeOption> {
    let mut options = vec![RuntimeOption::WithAgentConstructor(constructor)];

    if flags.start_immediately {
        options.push(RuntimeOption::StartImmediately);
    }
    if flags.headless {
        options.push(RuntimeOption::Headless);
    }
    if flags.sugar > 0 {
        let count = u32::try_from(flags.sugar).unwrap_or(u32::MAX);
        options.push(RuntimeOption::WithDesiredResourceCount(count));
    }

    options
}
