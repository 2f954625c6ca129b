//! # Module Registry
//!
//! The set of modules loaded in the debuggee, keyed by load address.
//!
//! Each entry owns the module's symbol handle (if any) and a shared reference
//! to the binary module. Entries registered while the symbol host was down
//! remember that, so their queries keep failing with `HostUnavailable`.
//!
//! One mutex guards the whole map; symbol queries run while it is held, so
//! neither visitors nor providers may call back into the registry.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let registry = ModuleRegistry::new();
//! registry.register(base, size, Some(symbols), module)?;
//!
//! let hit = registry.resolve_any_module("Program.cs", 12)?;
//! println!("{} at IL {:#x}", hit.location.method, hit.location.il_offset);
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use super::{file_name, module_path};
use crate::debuggee::BinaryModule;
use crate::error::{IlmapError, IlmapResult};
use crate::symbols::{checked_line_for_offset, ModuleSymbols};
use crate::types::{Address, ResolvedLocation};

struct RegistryEntry
{
    size: u32,
    symbols: Option<Box<dyn ModuleSymbols>>,
    host_error: Option<String>,
    module: Arc<dyn BinaryModule>,
}

impl RegistryEntry
{
    fn symbols(&self, address: Address) -> IlmapResult<&dyn ModuleSymbols>
    {
        if let Some(symbols) = self.symbols.as_deref() {
            return Ok(symbols);
        }
        match &self.host_error {
            Some(reason) => Err(IlmapError::HostUnavailable(reason.clone())),
            None => Err(IlmapError::NoSymbols(format!("module at {address}"))),
        }
    }
}

/// Snapshot of a registry entry.
#[derive(Clone)]
pub struct ModuleEntry
{
    /// Load address (the registry key).
    pub address: Address,
    /// Image size in bytes.
    pub size: u32,
    /// Whether a symbol handle is attached.
    pub has_symbols: bool,
    /// The module itself.
    pub module: Arc<dyn BinaryModule>,
}

impl fmt::Debug for ModuleEntry
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("ModuleEntry")
            .field("address", &self.address)
            .field("size", &self.size)
            .field("has_symbols", &self.has_symbols)
            .finish_non_exhaustive()
    }
}

/// A source position resolved in some registered module.
#[derive(Clone)]
pub struct ModuleLocation
{
    /// Method, IL offset and full document path.
    pub location: ResolvedLocation,
    /// The module the position was found in.
    pub module: Arc<dyn BinaryModule>,
}

impl fmt::Debug for ModuleLocation
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("ModuleLocation")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

/// Thread-safe map of loaded modules.
#[derive(Default)]
pub struct ModuleRegistry
{
    entries: Mutex<IndexMap<Address, RegistryEntry>>,
}

impl fmt::Debug for ModuleRegistry
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("ModuleRegistry").field("len", &self.len()).finish()
    }
}

/// Map `path:line` to a location through one module's symbols.
///
/// The second query recovers the full document path, which the caller may
/// only have given as a file name.
fn resolve_with(symbols: &dyn ModuleSymbols, path: &str, line: u32) -> IlmapResult<ResolvedLocation>
{
    let (method, il_offset) = symbols.resolve_sequence_point(path, line)?;
    let info = checked_line_for_offset(symbols, method, il_offset)?;
    Ok(ResolvedLocation {
        method,
        il_offset,
        document: info.document,
    })
}

impl ModuleRegistry
{
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    // Entries carry no cross-entry invariant, so a panic in a visitor leaves
    // the map usable.
    fn lock(&self) -> MutexGuard<'_, IndexMap<Address, RegistryEntry>>
    {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a module loaded at `address`.
    ///
    /// ## Errors
    ///
    /// `InvalidArgument` when `address` is already registered; the existing
    /// entry is kept.
    pub fn register(
        &self,
        address: Address,
        size: u32,
        symbols: Option<Box<dyn ModuleSymbols>>,
        module: Arc<dyn BinaryModule>,
    ) -> IlmapResult<()>
    {
        self.insert(
            address,
            RegistryEntry {
                size,
                symbols,
                host_error: None,
                module,
            },
        )
    }

    /// Insert a module whose symbols could not be loaded because the symbol
    /// host is unavailable. Symbol queries against it fail with
    /// `HostUnavailable` carrying `reason`.
    ///
    /// ## Errors
    ///
    /// `InvalidArgument` when `address` is already registered.
    pub fn register_host_unavailable(
        &self,
        address: Address,
        size: u32,
        reason: String,
        module: Arc<dyn BinaryModule>,
    ) -> IlmapResult<()>
    {
        self.insert(
            address,
            RegistryEntry {
                size,
                symbols: None,
                host_error: Some(reason),
                module,
            },
        )
    }

    fn insert(&self, address: Address, entry: RegistryEntry) -> IlmapResult<()>
    {
        let mut entries = self.lock();
        if entries.contains_key(&address) {
            warn!(%address, "module already registered at this address");
            return Err(IlmapError::InvalidArgument(format!("a module is already registered at {address}")));
        }

        let size = entry.size;
        let has_symbols = entry.symbols.is_some();
        let host_unavailable = entry.host_error.is_some();
        entries.insert(address, entry);
        debug!(%address, size, has_symbols, host_unavailable, modules = entries.len(), "module registered");
        Ok(())
    }

    /// Entry registered at exactly `address`.
    ///
    /// ## Errors
    ///
    /// `NotFound` when nothing is registered there.
    pub fn find_by_address(&self, address: Address) -> IlmapResult<ModuleEntry>
    {
        let entries = self.lock();
        entries
            .get(&address)
            .map(|entry| ModuleEntry {
                address,
                size: entry.size,
                has_symbols: entry.symbols.is_some(),
                module: Arc::clone(&entry.module),
            })
            .ok_or_else(|| IlmapError::NotFound(format!("no module registered at {address}")))
    }

    /// First module whose display name equals `name`.
    ///
    /// ## Errors
    ///
    /// `NotFound` when no module matches.
    pub fn find_by_name(&self, name: &str) -> IlmapResult<Arc<dyn BinaryModule>>
    {
        let entries = self.lock();
        entries
            .values()
            .find(|entry| module_path(entry.module.as_ref()).is_ok_and(|path| file_name(&path) == name))
            .map(|entry| Arc::clone(&entry.module))
            .ok_or_else(|| IlmapError::NotFound(format!("no module named {name}")))
    }

    /// Resolve `path:line` in the first module that can.
    ///
    /// Modules without symbols, and modules whose provider fails, are skipped.
    ///
    /// ## Errors
    ///
    /// `HostUnavailable` when no module resolves the position and some module
    /// was registered while the symbol host was down, `NotFound` otherwise.
    pub fn resolve_any_module(&self, path: &str, line: u32) -> IlmapResult<ModuleLocation>
    {
        let entries = self.lock();
        let mut host_error = None;
        for (address, entry) in entries.iter() {
            let Some(symbols) = entry.symbols.as_deref() else {
                host_error = host_error.or(entry.host_error.as_ref());
                continue;
            };
            match resolve_with(symbols, path, line) {
                Ok(location) => {
                    trace!(%address, path, line, method = %location.method, "location resolved");
                    return Ok(ModuleLocation {
                        location,
                        module: Arc::clone(&entry.module),
                    });
                }
                Err(err) => trace!(%address, path, line, error = %err, "module cannot resolve location"),
            }
        }

        match host_error {
            Some(reason) => Err(IlmapError::HostUnavailable(reason.clone())),
            None => Err(IlmapError::NotFound(format!("no loaded module has code at {path}:{line}"))),
        }
    }

    /// Resolve `path:line` in the module registered at `address`.
    ///
    /// ## Errors
    ///
    /// `NotFound` if nothing is registered at `address` or the provider finds
    /// no code there, `NoSymbols` if the module has no debug data,
    /// `HostUnavailable` if it was registered while the host was down.
    pub fn resolve_in_module(&self, address: Address, path: &str, line: u32) -> IlmapResult<ResolvedLocation>
    {
        self.with_symbols(address, |symbols| resolve_with(symbols, path, line))
    }

    /// Run `query` on the symbols of the module at `address`, under the lock.
    ///
    /// `query` must not touch the registry.
    ///
    /// ## Errors
    ///
    /// `NotFound` for an unknown address, `NoSymbols` for a symbol-less
    /// module, `HostUnavailable` for a module registered while the host was
    /// down, otherwise whatever `query` returns.
    pub fn with_symbols<T, F>(&self, address: Address, query: F) -> IlmapResult<T>
    where
        F: FnOnce(&dyn ModuleSymbols) -> IlmapResult<T>,
    {
        let entries = self.lock();
        let entry = entries
            .get(&address)
            .ok_or_else(|| IlmapError::NotFound(format!("no module registered at {address}")))?;
        query(entry.symbols(address)?)
    }

    /// Visit every registered module under the lock.
    ///
    /// ## Errors
    ///
    /// The first visitor error stops the scan and is returned.
    pub fn for_each<F>(&self, mut visitor: F) -> IlmapResult<()>
    where
        F: FnMut(&Arc<dyn BinaryModule>) -> IlmapResult<()>,
    {
        let entries = self.lock();
        entries.values().try_for_each(|entry| visitor(&entry.module))
    }

    /// Drop every entry together with its symbols and module reference.
    pub fn clear(&self)
    {
        let mut entries = self.lock();
        let dropped = entries.len();
        entries.clear();
        debug!(dropped, "module registry cleared");
    }

    /// Number of registered modules.
    #[must_use]
    pub fn len(&self) -> usize
    {
        self.lock().len()
    }

    /// Whether no module is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool
    {
        self.lock().is_empty()
    }
}
