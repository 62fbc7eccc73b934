//! Source locator: turn a user-supplied path into an absolute one.

use std::path::{Path, PathBuf};

use super::error::PipelineError;

/// Absolute path to the agent source file.
///
/// Existence is not checked here; a missing file shows up as a compiler error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePath(PathBuf);

impl SourcePath {
    /// Expand `~` and environment variables, then make the path absolute.
    pub fn resolve(input: &str) -> Result<Self, PipelineError> {
        let fail = |reason: String| PipelineError::PathResolution {
            input: input.to_string(),
            reason,
        };

        if input.trim().is_empty() {
            return Err(fail("path is empty".to_string()));
        }

        let expanded = shellexpand::full(input).map_err(|e| fail(e.to_string()))?;
        let absolute = std::path::absolute(expanded.as_ref()).map_err(|e| fail(e.to_string()))?;

        log::debug!("Resolved agent source {} -> {}", input, absolute.display());
        Ok(Self(absolute))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Directory the compiler runs in.
    pub fn parent_dir(&self) -> &Path {
        self.0.parent().unwrap_or_else(|| Path::new("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_path_is_absolute() {
        let source = SourcePath::resolve("agents/my_ant.rs").unwrap();
        assert!(source.as_path().is_absolute());
        assert!(source.as_path().ends_with("agents/my_ant.rs"));
    }

    #[test]
    fn test_resolve_keeps_absolute_path() {
        let source = SourcePath::resolve("/tmp/ants/agent.rs").unwrap();
        assert_eq!(source.as_path(), Path::new("/tmp/ants/agent.rs"));
        assert_eq!(source.parent_dir(), Path::new("/tmp/ants"));
    }

    #[test]
    fn test_resolve_does_not_require_existence() {
        let source = SourcePath::resolve("/definitely/not/here.rs").unwrap();
        assert!(!source.as_path().exists());
    }

    #[test]
    fn test_resolve_expands_tilde() {
        let source = SourcePath::resolve("~/agent.rs").unwrap();
        assert!(!source.as_path().to_string_lossy().contains('~'));
    }

    #[test]
    fn test_resolve_empty_path_fails() {
        let err = SourcePath::resolve("  ").unwrap_err();
        assert!(matches!(err, PipelineError::PathResolution { .. }));
    }

    #[test]
    fn test_resolve_unknown_env_var_fails() {
        let err = SourcePath::resolve("$GTM_SURELY_UNSET_VARIABLE/agent.rs").unwrap_err();
        assert!(matches!(err, PipelineError::PathResolution { .. }));
    }
}
