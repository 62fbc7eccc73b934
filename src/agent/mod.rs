//! Agent plugin interface
//!
//! The ABI lives in a single self-contained file so the exact same source can
//! be compiled into the host and copied next to every scaffolded agent.

pub mod abi;

/// Source text of [`abi`], written next to new agents as `gtm_abi.rs`.
pub const ABI_SOURCE: &str = include_str!("abi.rs");

/// File name the scaffolded agent uses for its copy of the ABI.
pub const ABI_FILE_NAME: &str = "gtm_abi.rs";
