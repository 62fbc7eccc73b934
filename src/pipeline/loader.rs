//! Dynamic module loader
//!
//! Opens a compiled agent with libloading and resolves its declaration symbol.
//! Loaded modules are never unloaded: the library handle is leaked so every
//! pointer taken from it stays valid for the rest of the process.

use libloading::Library;
use std::path::Path;

use super::error::PipelineError;
use crate::agent::abi::DECLARATION_SYMBOL;

/// A module that stays mapped until the process exits.
#[derive(Debug, Clone, Copy)]
pub struct LoadedModule {
    library: &'static Library,
}

/// Raw address of an exported symbol, not yet validated.
#[derive(Debug, Clone, Copy)]
pub struct RawSymbol {
    pub name: &'static str,
    pub address: *const u8,
}

impl LoadedModule {
    /// Open `path` as a dynamic library in this process.
    pub fn open(path: &Path) -> Result<Self, PipelineError> {
        // SAFETY: loading runs the module's initialisers. The module was just
        // built from the user's own source, which is the point of `gtm run`.
        let library = unsafe { Library::new(path) }.map_err(|source| PipelineError::ModuleLoad {
            path: path.to_path_buf(),
            source,
        })?;

        log::info!("Loaded agent module {}", path.display());
        Ok(Self {
            library: Box::leak(Box::new(library)),
        })
    }

    /// Resolve the agent declaration symbol.
    pub fn declaration_symbol(&self) -> Result<RawSymbol, PipelineError> {
        self.symbol(DECLARATION_SYMBOL)
    }

    /// Resolve any exported symbol by name.
    pub fn symbol(&self, name: &'static str) -> Result<RawSymbol, PipelineError> {
        // SAFETY: the symbol is read as an untyped address; nothing is called
        // or dereferenced here.
        let symbol = unsafe { self.library.get::<*const u8>(name.as_bytes()) }.map_err(|source| {
            PipelineError::SymbolNotFound {
                symbol: name.to_string(),
                source,
            }
        })?;

        let address = *symbol;
        log::debug!("Resolved symbol {} at {:p}", name, address);
        Ok(RawSymbol { name, address })
    }
}
