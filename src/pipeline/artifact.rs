//! Ephemeral build artifacts
//!
//! The compiled module is written to a uniquely named temp file. The open
//! handle is closed right away so the compiler can write to the path, and the
//! file is removed when the [`BuildArtifact`] is dropped, on every exit path.
//! Once the module is mapped the file is unlinked early with
//! [`BuildArtifact::unlink`], so even an aborting agent leaves nothing behind.

use std::fs;
use std::io;
use std::path::Path;
use tempfile::TempPath;

use super::error::PipelineError;

const ARTIFACT_PREFIX: &str = "gtm-agent-";

/// Reserved output path for one compiled agent module.
#[derive(Debug)]
pub struct BuildArtifact {
    path: TempPath,
}

impl BuildArtifact {
    /// Reserve a collision-free path inside `dir`.
    pub fn allocate(dir: &Path) -> Result<Self, PipelineError> {
        let file = tempfile::Builder::new()
            .prefix(ARTIFACT_PREFIX)
            .suffix(std::env::consts::DLL_SUFFIX)
            .tempfile_in(dir)
            .map_err(|source| PipelineError::ArtifactAllocation {
                dir: dir.to_path_buf(),
                source,
            })?;

        let path = file.into_temp_path();
        log::debug!("Allocated build artifact {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the file now. The guard stays armed, so a failed unlink is
    /// retried on drop.
    pub fn unlink(&self) -> io::Result<()> {
        fs::remove_file(&self.path)?;
        log::debug!("Unlinked build artifact {}", self.path.display());
        Ok(())
    }
}

impl Drop for BuildArtifact {
    fn drop(&mut self) {
        log::debug!("Removing build artifact {}", self.path.display());
    }
}
