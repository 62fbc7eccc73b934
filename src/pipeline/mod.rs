//! Build-and-load pipeline behind `gtm run`
//!
//! Stages, in order:
//! - resolve the agent source to an absolute path
//! - reserve a temporary artifact path
//! - compile the source into a `cdylib` with the configured toolchain
//! - load the module and resolve `GTM_NEW_AGENT`
//! - check the declaration against the expected constructor signature
//! - compose the host directives and hand over to the host runtime
//!
//! Any failure stops the pipeline at that stage. The artifact is unlinked as
//! soon as the module is mapped, and its guard removes it on every earlier
//! exit path.

use std::path::PathBuf;
use std::time::Duration;

pub mod artifact;
pub mod compiler;
pub mod entry;
pub mod error;
pub mod loader;
pub mod options;
pub mod source;

pub use artifact::BuildArtifact;
pub use compiler::Compiler;
pub use entry::AgentConstructor;
pub use error::PipelineError;
pub use loader::LoadedModule;
pub use options::{RunFlags, RuntimeOption};
pub use source::SourcePath;

use crate::config::{Config, ToolchainConfig};
use crate::host::HostRuntime;

/// A compiled, loaded and validated agent.
///
/// Holds the artifact guard in case the early unlink after loading failed.
#[derive(Debug)]
pub struct PreparedAgent {
    pub source: SourcePath,
    pub constructor: AgentConstructor,
    artifact: BuildArtifact,
}

impl PreparedAgent {
    pub fn artifact_path(&self) -> &std::path::Path {
        self.artifact.path()
    }
}

pub struct RunPipeline<'a> {
    toolchain: &'a ToolchainConfig,
    artifact_dir: PathBuf,
    timeout: Option<Duration>,
}

impl<'a> RunPipeline<'a> {
    pub fn new(toolchain: &'a ToolchainConfig, artifact_dir: PathBuf, timeout: Option<Duration>) -> Self {
        Self {
            toolchain,
            artifact_dir,
            timeout,
        }
    }

    pub fn from_config(config: &'a Config) -> Self {
        Self::new(&config.toolchain, config.artifact_dir(), config.build.timeout())
    }

    /// Compile, load and validate the agent at `source`.
    pub fn prepare(&self, source: &str) -> Result<PreparedAgent, PipelineError> {
        let source = SourcePath::resolve(source)?;
        let artifact = BuildArtifact::allocate(&self.artifact_dir)?;

        Compiler::new(self.toolchain, self.timeout).compile(&source, &artifact)?;

        let module = LoadedModule::open(artifact.path())?;
        // The mapping outlives the directory entry, so an agent that aborts
        // the process cannot leave the module behind.
        if let Err(e) = artifact.unlink() {
            log::warn!("Could not unlink {} after loading: {}", artifact.path().display(), e);
        }
        let constructor = entry::resolve_constructor(module.declaration_symbol()?)?;

        Ok(PreparedAgent {
            source,
            constructor,
            artifact,
        })
    }

    /// Hand a prepared agent to the host. The artifact is released when this returns.
    pub fn launch(
        &self,
        agent: PreparedAgent,
        flags: &RunFlags,
        host: &mut dyn HostRuntime,
    ) -> Result<(), PipelineError> {
        let options = options::compose(agent.constructor, flags);
        log::info!(
            "Starting host runtime for {} ({}) with {} directive(s)",
            agent.source.as_path().display(),
            agent.constructor.symbol(),
            options.len()
        );
        host.run(options)?;
        Ok(())
    }
}
