//! Error taxonomy for the build-and-load pipeline.
//!
//! Every variant is terminal for the current run; nothing here is retried.

use std::path::PathBuf;
use thiserror::Error;

use crate::host::HostError;

/// How the compiler subprocess failed.
#[derive(Debug, Error)]
pub enum CompileFailure {
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to wait for '{program}': {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' exited with {}", describe_exit(.exit_code))]
    Exit { program: String, exit_code: Option<i32> },

    #[error("'{program}' did not finish within {seconds}s and was killed")]
    TimedOut { program: String, seconds: u64 },
}

fn describe_exit(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("code {}", code),
        None => "a signal".to_string(),
    }
}

/// A fatal failure in one stage of the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("cannot resolve '{input}': {reason}")]
    PathResolution { input: String, reason: String },

    #[error("cannot allocate a build artifact in {}: {source}", .dir.display())]
    ArtifactAllocation {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("compiling {} failed: {failure}", .source_path.display())]
    Compilation {
        source_path: PathBuf,
        #[source]
        failure: CompileFailure,
    },

    #[error("cannot load {} as an agent module: {source}", .path.display())]
    ModuleLoad {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("module does not export '{symbol}'; did the agent declare its constructor?")]
    SymbolNotFound {
        symbol: String,
        #[source]
        source: libloading::Error,
    },

    #[error("'{symbol}' has the wrong shape: expected {expected}, found {found}")]
    SignatureMismatch {
        symbol: String,
        expected: String,
        found: String,
    },

    #[error("host runtime failed: {0}")]
    HostRuntime(#[from] HostError),
}

impl PipelineError {
    /// Name of the stage that failed, for console reporting.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::PathResolution { .. } => "resolve source",
            PipelineError::ArtifactAllocation { .. } => "allocate artifact",
            PipelineError::Compilation { .. } => "compile",
            PipelineError::ModuleLoad { .. } => "load module",
            PipelineError::SymbolNotFound { .. } => "resolve entry point",
            PipelineError::SignatureMismatch { .. } => "check entry point",
            PipelineError::HostRuntime(_) => "host runtime",
        }
    }
}
