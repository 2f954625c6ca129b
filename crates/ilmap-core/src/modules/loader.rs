//! # Debug-Info Loader
//!
//! Turns a module the runtime just reported into a registry entry: decides
//! whether symbols are wanted, asks the symbol host for them, configures
//! Just-My-Code and derives the module's identity.

use std::path::PathBuf;
use std::sync::Arc;

use ilmap_utils::SymbolSettings;
use tracing::{debug, info, warn};

use super::policy::{PrefixPolicy, SymbolLoadPolicy};
use super::registry::ModuleRegistry;
use super::{file_name, module_path, ModuleDescriptor, SymbolStatus};
use crate::debuggee::{BinaryModule, MemoryReader};
use crate::error::{IlmapError, IlmapResult};
use crate::symbols::{ImageLayout, ImageSource, ModuleSymbols, SymbolHost};
use crate::types::{AddressRange, ModuleId};

/// Outcome of asking the host for a module's debug data.
enum SymbolLoad
{
    Loaded(Box<dyn ModuleSymbols>),
    Missing,
    HostUnavailable(String),
}

/// Loads debug data for modules and registers them.
///
/// Safe to share between threads; concurrent loads of distinct modules only
/// meet at the registry lock.
#[derive(Clone)]
pub struct DebugInfoLoader
{
    host: Arc<dyn SymbolHost>,
    policy: Arc<dyn SymbolLoadPolicy>,
    memory: Option<Arc<dyn MemoryReader>>,
    just_my_code: bool,
}

impl DebugInfoLoader
{
    /// Loader with Just-My-Code enabled and no memory reader.
    pub fn new(host: Arc<dyn SymbolHost>, policy: Arc<dyn SymbolLoadPolicy>) -> Self
    {
        Self {
            host,
            policy,
            memory: None,
            just_my_code: true,
        }
    }

    /// Loader configured from [`SymbolSettings`]: prefix skip list and JMC flag.
    pub fn from_settings(host: Arc<dyn SymbolHost>, settings: &SymbolSettings) -> Self
    {
        Self::new(host, Arc::new(PrefixPolicy::from_settings(settings))).with_just_my_code(settings.just_my_code)
    }

    /// Reader handed to the host for modules that only exist in memory.
    #[must_use]
    pub fn with_memory_reader(mut self, reader: Arc<dyn MemoryReader>) -> Self
    {
        self.memory = Some(reader);
        self
    }

    /// Enable or disable Just-My-Code configuration.
    #[must_use]
    pub fn with_just_my_code(mut self, enabled: bool) -> Self
    {
        self.just_my_code = enabled;
        self
    }

    /// The symbol host.
    pub fn host(&self) -> &Arc<dyn SymbolHost>
    {
        &self.host
    }

    /// Whether Just-My-Code is configured on loaded modules.
    #[must_use]
    pub fn just_my_code(&self) -> bool
    {
        self.just_my_code
    }

    /// Load symbols for `module` and register it.
    ///
    /// A module whose symbols cannot be loaded is still registered, with
    /// status `NotFound`. When that is because the symbol host is
    /// unavailable, later symbol queries on the module fail with
    /// `HostUnavailable`.
    ///
    /// ## Errors
    ///
    /// - `MalformedMetadata` when the module identity cannot be read; the
    ///   module is not registered
    /// - `InvalidArgument` when another module is registered at the same base
    ///   address
    /// - Errors reading basic module properties (name, base address, size)
    pub fn load(&self, module: Arc<dyn BinaryModule>, registry: &ModuleRegistry) -> IlmapResult<ModuleDescriptor>
    {
        let path = module_path(module.as_ref())?;
        let name = file_name(&path).to_string();

        let (load, symbol_status) = if self.policy.should_load_symbols(&path) {
            match self.load_symbols(module.as_ref(), &path)? {
                load @ SymbolLoad::Loaded(_) => (load, SymbolStatus::Loaded),
                load => (load, SymbolStatus::NotFound),
            }
        } else {
            debug!(module = %name, "symbol loading skipped by policy");
            (SymbolLoad::Missing, SymbolStatus::Skipped)
        };

        let symbols = match &load {
            SymbolLoad::Loaded(symbols) => Some(&**symbols),
            _ => None,
        };
        self.configure_jmc(module.as_ref(), &name, symbols);

        let mvid = module
            .module_version_id()
            .map_err(|err| IlmapError::MalformedMetadata(format!("{path}: {err}")))?;
        let id = ModuleId::from_mvid_bytes(mvid);

        let base_address = module.base_address()?;
        let size = module.size()?;

        match load {
            SymbolLoad::Loaded(symbols) => registry.register(base_address, size, Some(symbols), Arc::clone(&module))?,
            SymbolLoad::Missing => registry.register(base_address, size, None, Arc::clone(&module))?,
            SymbolLoad::HostUnavailable(reason) => {
                registry.register_host_unavailable(base_address, size, reason, Arc::clone(&module))?;
            }
        }

        info!(
            module = %name,
            %id,
            %base_address,
            size,
            status = ?symbol_status,
            "module loaded"
        );

        Ok(ModuleDescriptor {
            id,
            name,
            path,
            symbol_status,
            base_address,
            size,
        })
    }

    fn load_symbols(&self, module: &dyn BinaryModule, path: &str) -> IlmapResult<SymbolLoad>
    {
        if module.is_dynamic()? {
            debug!(module = %path, "dynamic module has no image to read symbols from");
            return Ok(SymbolLoad::Missing);
        }

        // in-memory modules come from a byte stream, so the image keeps its file layout
        let source = if module.is_in_memory()? {
            ImageSource::InMemory {
                image: AddressRange::new(module.base_address()?, u64::from(module.size()?)),
                layout: ImageLayout::File,
                reader: self.memory.clone(),
            }
        } else {
            ImageSource::File {
                path: PathBuf::from(path),
            }
        };

        match self.host.load_module_symbols(&source) {
            Ok(symbols) => Ok(SymbolLoad::Loaded(symbols)),
            Err(IlmapError::HostUnavailable(reason)) => {
                debug!(module = %path, %reason, "symbol host unavailable");
                Ok(SymbolLoad::HostUnavailable(reason))
            }
            Err(err) => {
                warn!(module = %path, error = %err, "could not load symbols");
                Ok(SymbolLoad::Missing)
            }
        }
    }

    /// JMC failures leave the module debuggable, so they are only logged.
    fn configure_jmc(&self, module: &dyn BinaryModule, name: &str, symbols: Option<&dyn ModuleSymbols>)
    {
        let symbols = symbols.filter(|_| self.just_my_code);

        if let Err(err) = module.set_jmc_status(symbols.is_some()) {
            warn!(module = %name, error = %err, "could not set module JMC status");
            return;
        }

        let Some(symbols) = symbols else {
            return;
        };

        let methods = match symbols.non_user_code_methods() {
            Ok(methods) => methods,
            Err(err) => {
                warn!(module = %name, error = %err, "could not list non-user code methods");
                return;
            }
        };

        for method in &methods {
            if let Err(err) = module.set_method_jmc_status(*method, false) {
                warn!(module = %name, %method, error = %err, "could not mark method as non-user code");
            }
        }

        debug!(module = %name, non_user_methods = methods.len(), "JMC configured");
    }
}
