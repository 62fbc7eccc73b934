//! Agent project scaffolding behind `gtm init`

use eyre::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};

use crate::agent::{ABI_FILE_NAME, ABI_SOURCE};

pub mod template;
pub mod validate;

pub use template::{AGENT_FILE_NAME, render_agent};
pub use validate::validate_agent_name;

/// Create a new agent project for `name` in `path` (default `./<name>`).
///
/// Returns the directory that was created.
pub fn create_agent_project(name: &str, path: Option<&Path>) -> Result<PathBuf> {
    validate_agent_name(name).context(format!("Invalid agent name '{}'", name))?;

    let dir = match path {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(name),
    };
    if dir.exists() {
        bail!("Directory {} already exists", dir.display());
    }

    let agent_source = render_agent(name)?;

    fs::create_dir_all(&dir).context(format!("Failed to create {}", dir.display()))?;
    fs::write(dir.join(ABI_FILE_NAME), ABI_SOURCE).context(format!("Failed to write {}", ABI_FILE_NAME))?;
    fs::write(dir.join(AGENT_FILE_NAME), agent_source).context(format!("Failed to write {}", AGENT_FILE_NAME))?;

    log::info!("Created agent project '{}' in {}", name, dir.display());
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_create_agent_project() {
        let temp = tempdir().unwrap();
        let dir = temp.path().join("Scout");

        let created = create_agent_project("Scout", Some(&dir)).unwrap();
        assert_eq!(created, dir);

        let abi = fs::read_to_string(dir.join("gtm_abi.rs")).unwrap();
        assert_eq!(abi, ABI_SOURCE);

        let agent = fs::read_to_string(dir.join("agent.rs")).unwrap();
        assert!(agent.contains("pub struct Scout {"));
    }

    #[test]
    fn test_existing_directory_is_left_alone() {
        let temp = tempdir().unwrap();
        let dir = temp.path().join("Scout");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("agent.rs"), "// mine").unwrap();

        let err = create_agent_project("Scout", Some(&dir)).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(fs::read_to_string(dir.join("agent.rs")).unwrap(), "// mine");
        assert!(!dir.join("gtm_abi.rs").exists());
    }

    #[test]
    fn test_invalid_name_creates_nothing() {
        let temp = tempdir().unwrap();
        let dir = temp.path().join("scout");

        let err = create_agent_project("scout", Some(&dir)).unwrap_err();
        assert!(format!("{:?}", err).contains("uppercase"));
        assert!(!dir.exists());
    }
}
