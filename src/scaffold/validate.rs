//! Agent name validation

use lazy_regex::regex_is_match;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("agent name cannot be empty")]
    Empty,

    #[error("agent name must start with an uppercase ASCII letter")]
    NotCapitalized,

    #[error("agent name must contain only letters, digits, or underscores")]
    InvalidCharacter,

    #[error("agent name cannot be a Rust keyword")]
    Keyword,

    #[error("agent name '{0}' clashes with a type from the plugin ABI")]
    AbiClash(String),
}

/// Types the generated agent imports from `gtm_abi`.
pub const ABI_IMPORTS: &[&str] = &["AgentDeclaration", "AgentHandle", "Ant", "AntOs", "Mark", "Sugar"];

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum", "extern", "false", "fn", "for",
    "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return", "self", "Self", "static",
    "struct", "super", "trait", "true", "type", "unsafe", "use", "where", "while", "abstract", "become", "box", "do",
    "final", "gen", "macro", "override", "priv", "try", "typeof", "unsized", "virtual", "yield",
];

fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

/// Check that `name` can be used as the agent's type name.
pub fn validate_agent_name(name: &str) -> Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::Empty);
    }
    if !regex_is_match!(r"^[A-Z]", name) {
        return Err(NameError::NotCapitalized);
    }
    if !regex_is_match!(r"^[A-Za-z0-9_]+$", name) {
        return Err(NameError::InvalidCharacter);
    }
    if is_keyword(name) {
        return Err(NameError::Keyword);
    }
    if ABI_IMPORTS.contains(&name) {
        return Err(NameError::AbiClash(name.to_string()));
    }
    Ok(())
}
