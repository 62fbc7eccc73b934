//! Out-of-process compiler invocation
//!
//! Runs the configured toolchain (rustc by default) to turn the agent source
//! into a `cdylib`. Diagnostics go straight to the user's terminal.

use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use super::artifact::BuildArtifact;
use super::error::{CompileFailure, PipelineError};
use super::source::SourcePath;
use crate::config::ToolchainConfig;

/// Crate name given to every compiled agent, independent of its file name.
pub const AGENT_CRATE_NAME: &str = "gtm_agent";

pub struct Compiler<'a> {
    toolchain: &'a ToolchainConfig,
    timeout: Option<Duration>,
}

impl<'a> Compiler<'a> {
    pub fn new(toolchain: &'a ToolchainConfig, timeout: Option<Duration>) -> Self {
        Self { toolchain, timeout }
    }

    /// Build the toolchain command without running it.
    pub fn command(&self, source: &SourcePath, artifact: &BuildArtifact) -> Command {
        let mut command = Command::new(&self.toolchain.program);
        command
            .args(&self.toolchain.args)
            .args(["--crate-type", "cdylib", "--crate-name", AGENT_CRATE_NAME])
            .args(["--edition", &self.toolchain.edition])
            .arg("-o")
            .arg(artifact.path())
            .arg(source.as_path())
            .current_dir(source.parent_dir())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        command
    }

    /// Compile `source` into `artifact`, blocking until the toolchain exits.
    pub fn compile(&self, source: &SourcePath, artifact: &BuildArtifact) -> Result<(), PipelineError> {
        let program = self.toolchain.program.clone();
        let fail = |failure: CompileFailure| PipelineError::Compilation {
            source_path: source.as_path().to_path_buf(),
            failure,
        };

        let mut command = self.command(source, artifact);
        log::info!("Compiling {} with {:?}", source.as_path().display(), command);

        let start = Instant::now();
        let mut child = command.spawn().map_err(|source| {
            fail(CompileFailure::Spawn {
                program: program.clone(),
                source,
            })
        })?;

        let status = match self.timeout {
            Some(timeout) => match wait_with_timeout(&mut child, timeout) {
                Ok(Some(status)) => status,
                Ok(None) => {
                    return Err(fail(CompileFailure::TimedOut {
                        program,
                        seconds: timeout.as_secs(),
                    }));
                }
                Err(source) => return Err(fail(CompileFailure::Wait { program, source })),
            },
            None => child
                .wait()
                .map_err(|source| fail(CompileFailure::Wait { program: program.clone(), source }))?,
        };

        log::info!("Compiler finished in {:?} with {}", start.elapsed(), status);

        if status.success() {
            Ok(())
        } else {
            Err(fail(CompileFailure::Exit {
                program,
                exit_code: status.code(),
            }))
        }
    }
}

/// Wait for a child process, killing it once `timeout` has passed.
///
/// Returns `None` if the process was killed.
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> std::io::Result<Option<ExitStatus>> {
    let start = Instant::now();
    let poll_interval = Duration::from_millis(50);

    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if start.elapsed() >= timeout {
            log::warn!("Compiler exceeded {:?}, killing pid {}", timeout, child.id());
            // On Unix this is SIGKILL; on Windows it is TerminateProcess.
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        std::thread::sleep(poll_interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;
    use tempfile::tempdir;

    fn toolchain(program: &str, args: &[&str]) -> ToolchainConfig {
        ToolchainConfig {
            program: program.to_string(),
            edition: "2021".to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[test]
    fn test_command_shape() {
        let temp = tempdir().unwrap();
        let source = SourcePath::resolve(temp.path().join("agent.rs").to_str().unwrap()).unwrap();
        let artifact = BuildArtifact::allocate(temp.path()).unwrap();
        let tc = toolchain("rustc", &["-C", "opt-level=2"]);

        let command = Compiler::new(&tc, None).command(&source, &artifact);
        let args: Vec<&OsStr> = command.get_args().collect();

        assert_eq!(command.get_program(), "rustc");
        assert_eq!(command.get_current_dir(), Some(temp.path()));
        assert_eq!(&args[..2], ["-C", "opt-level=2"]);
        assert!(args.contains(&OsStr::new("cdylib")));
        assert!(args.contains(&OsStr::new(AGENT_CRATE_NAME)));
        assert_eq!(args[args.len() - 3], "-o");
        assert_eq!(args[args.len() - 2], artifact.path().as_os_str());
        assert_eq!(args[args.len() - 1], source.as_path().as_os_str());
    }

    #[cfg(unix)]
    #[test]
    fn test_compile_success_on_zero_exit() {
        let temp = tempdir().unwrap();
        let source = SourcePath::resolve(temp.path().join("agent.rs").to_str().unwrap()).unwrap();
        let artifact = BuildArtifact::allocate(temp.path()).unwrap();
        let tc = toolchain("true", &[]);

        Compiler::new(&tc, None).compile(&source, &artifact).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_compile_nonzero_exit_is_compilation_error() {
        let temp = tempdir().unwrap();
        let source = SourcePath::resolve(temp.path().join("agent.rs").to_str().unwrap()).unwrap();
        let artifact = BuildArtifact::allocate(temp.path()).unwrap();
        let tc = toolchain("false", &[]);

        let err = Compiler::new(&tc, None).compile(&source, &artifact).unwrap_err();
        match err {
            PipelineError::Compilation {
                failure: CompileFailure::Exit { exit_code, .. },
                ..
            } => assert_eq!(exit_code, Some(1)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_compile_missing_program_is_spawn_error() {
        let temp = tempdir().unwrap();
        let source = SourcePath::resolve(temp.path().join("agent.rs").to_str().unwrap()).unwrap();
        let artifact = BuildArtifact::allocate(temp.path()).unwrap();
        let tc = toolchain("gtm-no-such-compiler", &[]);

        let err = Compiler::new(&tc, None).compile(&source, &artifact).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Compilation {
                failure: CompileFailure::Spawn { .. },
                ..
            }
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_compile_timeout_kills_child() {
        let temp = tempdir().unwrap();
        let source = SourcePath::resolve(temp.path().join("agent.rs").to_str().unwrap()).unwrap();
        let artifact = BuildArtifact::allocate(temp.path()).unwrap();
        // Trailing compiler arguments land in sh's positional parameters.
        let tc = toolchain("sh", &["-c", "exec sleep 10"]);

        let start = Instant::now();
        let err = Compiler::new(&tc, Some(Duration::from_millis(200)))
            .compile(&source, &artifact)
            .unwrap_err();

        assert!(start.elapsed() < Duration::from_secs(5));
        assert!(matches!(
            err,
            PipelineError::Compilation {
                failure: CompileFailure::TimedOut { .. },
                ..
            }
        ));
    }
}
