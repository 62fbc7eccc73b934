//! Integration tests for the gtm binary
//!
//! These drive the real binary end to end:
//! - Scaffolding agent projects
//! - Compiling and running agents headless
//! - Failing cleanly on broken sources
//! - Showing configuration

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

/// Helper to get the gtm binary path
fn gtm_binary() -> PathBuf {
    // When running tests, the binary is in target/debug/gtm
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // Remove test binary name
    path.pop(); // Remove deps
    path.push("gtm");
    path
}

/// An isolated gtm home with its own config and artifact directory
struct TestEnv {
    root: TempDir,
}

impl TestEnv {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("config")).unwrap();
        fs::create_dir_all(root.path().join("artifacts")).unwrap();
        fs::create_dir_all(root.path().join("work")).unwrap();

        let config = format!(
            r#"log_level: debug
build:
  artifact_dir: {}
  timeout_secs: 300
host:
  ticks: 30
  colony_size: 2
  sugar_per_pile: 4
"#,
            root.path().join("artifacts").display()
        );
        fs::write(root.path().join("config").join("gtm.yaml"), config).unwrap();

        Self { root }
    }

    fn work_dir(&self) -> PathBuf {
        self.root.path().join("work")
    }

    fn artifact_count(&self) -> usize {
        fs::read_dir(self.root.path().join("artifacts")).unwrap().count()
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(gtm_binary())
            .current_dir(self.work_dir())
            .env("GTM_DIR", self.root.path().join("config"))
            .env_remove("GTM_CONFIG")
            .env_remove("RUST_LOG")
            .env("XDG_DATA_HOME", self.root.path().join("data"))
            .env("NO_COLOR", "1")
            .stdin(Stdio::null())
            .args(args)
            .output()
            .expect("Failed to execute gtm")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn write_source(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_init_creates_agent_project() {
    let env = TestEnv::new();

    let output = env.run(&["init", "--name", "Scout"]);
    assert!(output.status.success(), "init failed: {}", stderr(&output));
    assert!(stdout(&output).contains("Next steps"));

    let project = env.work_dir().join("Scout");
    assert!(project.join("gtm_abi.rs").exists());
    let agent = fs::read_to_string(project.join("agent.rs")).unwrap();
    assert!(agent.contains("pub struct Scout {"));
    assert!(agent.contains("GTM_NEW_AGENT"));
}

#[test]
fn test_init_with_custom_path() {
    let env = TestEnv::new();
    let target = env.work_dir().join("nested").join("scout");

    let output = env.run(&["init", "--name", "Scout", "--path", target.to_str().unwrap()]);
    assert!(output.status.success(), "init failed: {}", stderr(&output));
    assert!(target.join("agent.rs").exists());
}

#[test]
fn test_init_rejects_invalid_name() {
    let env = TestEnv::new();

    let output = env.run(&["init", "--name", "scout"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("uppercase"));
    assert!(!env.work_dir().join("scout").exists());
}

#[test]
fn test_init_refuses_existing_directory() {
    let env = TestEnv::new();
    fs::create_dir(env.work_dir().join("Scout")).unwrap();

    let output = env.run(&["init", "--name", "Scout"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("already exists"));
    assert!(!env.work_dir().join("Scout").join("agent.rs").exists());
}

#[test]
fn test_run_scaffolded_agent_headless() {
    let env = TestEnv::new();
    let output = env.run(&["init", "--name", "Scout"]);
    assert!(output.status.success(), "init failed: {}", stderr(&output));

    let output = env.run(&["run", "Scout/agent.rs", "-i", "--headless", "--sugar", "2"]);
    let out = stdout(&output);
    assert!(output.status.success(), "run failed: {}\n{}", out, stderr(&output));
    assert!(out.contains("Agent successfully compiled. Starting the simulation..."));
    assert!(out.contains("Simulation finished after 30 ticks"));
    assert!(out.contains("Ants:            2"));
    assert_eq!(env.artifact_count(), 0);
}

#[test]
fn test_run_with_syntax_error_never_starts_host() {
    let env = TestEnv::new();
    write_source(&env.work_dir(), "broken.rs", "fn main( {\n");

    let output = env.run(&["run", "broken.rs", "-i", "--headless"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("✗ compile:"));
    assert!(!stdout(&output).contains("Agent successfully compiled"));
    assert!(!stdout(&output).contains("Simulation finished"));
    assert_eq!(env.artifact_count(), 0);
}

#[test]
fn test_run_without_entry_point_fails_at_resolution() {
    let env = TestEnv::new();
    write_source(
        &env.work_dir(),
        "empty.rs",
        "#[unsafe(no_mangle)]\npub extern \"C\" fn unrelated() -> i32 { 1 }\n",
    );

    let output = env.run(&["run", "empty.rs", "-i", "--headless"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("✗ resolve entry point:"));
    assert!(stderr(&output).contains("GTM_NEW_AGENT"));
    assert_eq!(env.artifact_count(), 0);
}

#[test]
fn test_aborting_agent_leaves_no_artifact() {
    let env = TestEnv::new();
    let output = env.run(&["init", "--name", "Clumsy"]);
    assert!(output.status.success(), "init failed: {}", stderr(&output));

    // A panic inside a callback cannot unwind into the host, so the process aborts.
    write_source(
        &env.work_dir().join("Clumsy"),
        "agent.rs",
        r#"mod gtm_abi;

use gtm_abi::{AgentDeclaration, AgentHandle, Ant, AntOs};

struct Clumsy;

impl Ant for Clumsy {
    fn tick(&mut self) {
        let nothing: Option<u8> = None;
        nothing.unwrap();
    }
}

extern "C" fn new_ant(_os: AntOs) -> AgentHandle {
    AgentHandle::new(Clumsy)
}

#[unsafe(no_mangle)]
pub static GTM_NEW_AGENT: AgentDeclaration = AgentDeclaration::new(new_ant);
"#,
    );

    let output = env.run(&["run", "Clumsy/agent.rs", "-i", "--headless"]);
    assert!(!output.status.success());
    assert!(stdout(&output).contains("Agent successfully compiled"));
    assert_eq!(env.artifact_count(), 0);
}

#[test]
fn test_run_with_huge_sugar_piles() {
    let env = TestEnv::new();
    fs::write(
        env.root.path().join("config").join("gtm.yaml"),
        format!(
            "build:\n  artifact_dir: {}\nhost:\n  ticks: 10\n  sugar_per_pile: 4294967295\n",
            env.root.path().join("artifacts").display()
        ),
    )
    .unwrap();
    let output = env.run(&["init", "--name", "Scout"]);
    assert!(output.status.success(), "init failed: {}", stderr(&output));

    let output = env.run(&["run", "Scout/agent.rs", "-i", "--headless", "--sugar", "2"]);
    assert!(output.status.success(), "run failed: {}", stderr(&output));
    assert!(stdout(&output).contains("Simulation finished after 10 ticks"));
    assert_eq!(env.artifact_count(), 0);
}

#[test]
fn test_run_with_too_many_sugar_piles_fails_in_host() {
    let env = TestEnv::new();
    let output = env.run(&["init", "--name", "Scout"]);
    assert!(output.status.success(), "init failed: {}", stderr(&output));

    let output = env.run(&["run", "Scout/agent.rs", "-i", "--headless", "--sugar", "5000000000"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("✗ host runtime:"));
    assert_eq!(env.artifact_count(), 0);
}

#[test]
fn test_config_show_json() {
    let env = TestEnv::new();

    let output = env.run(&["config", "show", "-o", "json"]);
    assert!(output.status.success(), "config show failed: {}", stderr(&output));

    let config: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(config["log_level"], "debug");
    assert_eq!(config["host"]["ticks"], 30);
    assert_eq!(config["toolchain"]["program"], "rustc");
}

#[test]
fn test_completions_bash() {
    let env = TestEnv::new();

    let output = env.run(&["completions", "bash"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("gtm"));
}
