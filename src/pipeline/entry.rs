//! Typed entry-point adapter
//!
//! Rust symbols carry no type information, so an agent module exports an
//! [`AgentDeclaration`] describing its constructor. The adapter checks that
//! description field by field and only then hands out a callable constructor.

use std::ffi::CStr;
use std::fmt;

use super::error::PipelineError;
use super::loader::RawSymbol;
use crate::agent::abi::{
    ABI_VERSION, AgentConstructorFn, AgentDeclaration, AgentHandle, AntOs, CONSTRUCTOR_SIGNATURE, DECLARATION_MAGIC,
};

/// A validated agent constructor.
#[derive(Clone, Copy)]
pub struct AgentConstructor {
    func: AgentConstructorFn,
    symbol: &'static str,
}

impl AgentConstructor {
    pub(crate) fn from_fn(func: AgentConstructorFn, symbol: &'static str) -> Self {
        Self { func, symbol }
    }

    /// Create one agent bound to the given capability object.
    pub fn construct(&self, os: AntOs) -> AgentHandle {
        (self.func)(os)
    }

    pub fn symbol(&self) -> &'static str {
        self.symbol
    }
}

impl fmt::Debug for AgentConstructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentConstructor")
            .field("symbol", &self.symbol)
            .field("address", &(self.func as *const ()))
            .finish()
    }
}

/// The contract every declaration must match, for error messages.
pub fn expected_signature() -> String {
    format!("{} (abi v{})", CONSTRUCTOR_SIGNATURE.to_string_lossy(), ABI_VERSION)
}

/// Validate a resolved symbol as an agent declaration.
///
/// Fails closed: nothing past a failed check is read, and the constructor is
/// never called here.
pub fn resolve_constructor(symbol: RawSymbol) -> Result<AgentConstructor, PipelineError> {
    let mismatch = |found: String| PipelineError::SignatureMismatch {
        symbol: symbol.name.to_string(),
        expected: expected_signature(),
        found,
    };

    if symbol.address.is_null() {
        return Err(mismatch("a null symbol".to_string()));
    }

    // SAFETY: the symbol lives in a module that is never unloaded. Only the
    // leading tag is read before the address is trusted as a declaration.
    let magic = unsafe { std::ptr::read_unaligned(symbol.address.cast::<u64>()) };
    if magic != DECLARATION_MAGIC {
        return Err(mismatch(format!("a symbol that is not an agent declaration (tag {:#018x})", magic)));
    }

    // SAFETY: the magic tag identifies an `AgentDeclaration` built by the ABI module.
    let declaration = unsafe { &*symbol.address.cast::<AgentDeclaration>() };

    if declaration.abi_version != ABI_VERSION {
        return Err(mismatch(format!("a declaration for abi v{}", declaration.abi_version)));
    }

    if declaration.signature.is_null() {
        return Err(mismatch("a declaration without a signature".to_string()));
    }

    // SAFETY: non-null and produced from a C string literal by `AgentDeclaration::new`.
    let signature = unsafe { CStr::from_ptr(declaration.signature) };
    if signature != CONSTRUCTOR_SIGNATURE {
        return Err(mismatch(format!(
            "{} (abi v{})",
            signature.to_string_lossy(),
            declaration.abi_version
        )));
    }

    log::debug!("Validated {} as {}", symbol.name, expected_signature());
    Ok(AgentConstructor::from_fn(declaration.constructor, symbol.name))
}
