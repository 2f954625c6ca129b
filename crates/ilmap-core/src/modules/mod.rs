//! # Modules
//!
//! Tracking of the modules loaded in the debuggee and of their debug data.
//!
//! - [`registry`]: the thread-safe set of loaded modules keyed by load address
//! - [`loader`]: turns a freshly loaded module into a registry entry
//! - [`policy`]: decides which modules get symbols at all
//! - [`manager`]: the operations offered to the rest of the debugger

pub mod loader;
pub mod manager;
pub mod policy;
pub mod registry;

pub use loader::DebugInfoLoader;
pub use manager::{FrameSequencePoint, ModuleManager};
pub use policy::{LoadAll, PrefixPolicy, SymbolLoadPolicy};
pub use registry::{ModuleEntry, ModuleLocation, ModuleRegistry};

use crate::debuggee::BinaryModule;
use crate::error::IlmapResult;
use crate::types::{Address, ModuleId, ProcessId};

const PROC_SELF: &str = "/proc/self/";

/// Outcome of symbol loading for one module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolStatus
{
    /// Debug data is available.
    Loaded,
    /// Loading was attempted (or impossible) and produced nothing.
    NotFound,
    /// The load policy excluded the module.
    Skipped,
}

impl SymbolStatus
{
    /// Whether the module has a provider handle.
    #[must_use]
    pub fn is_loaded(self) -> bool
    {
        self == Self::Loaded
    }
}

/// What the loader reports for a module it registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptor
{
    /// Identity derived from the module's MVID.
    pub id: ModuleId,
    /// File name component of `path`.
    pub name: String,
    /// Full path with `/proc/self/` rewritten to the debuggee's pid.
    pub path: String,
    /// Symbol loading outcome.
    pub symbol_status: SymbolStatus,
    /// Load address.
    pub base_address: Address,
    /// Image size in bytes.
    pub size: u32,
}

/// Rewrite `/proc/self/<rest>` to `/proc/<pid>/<rest>`.
///
/// A debuggee reporting its own `/proc/self` view would otherwise point the
/// debugger at its own process. Other paths are returned unchanged.
///
/// ```rust
/// use ilmap_core::modules::rewrite_proc_self;
/// use ilmap_core::types::ProcessId;
///
/// assert_eq!(rewrite_proc_self("/proc/self/fd/3", ProcessId(1234)), "/proc/1234/fd/3");
/// assert_eq!(rewrite_proc_self("/usr/lib/App.dll", ProcessId(1234)), "/usr/lib/App.dll");
/// ```
#[must_use]
pub fn rewrite_proc_self(path: &str, pid: ProcessId) -> String
{
    match path.strip_prefix(PROC_SELF) {
        Some(rest) => format!("/proc/{pid}/{rest}"),
        None => path.to_string(),
    }
}

/// File name component of a path, accepting both `/` and `\` separators.
#[must_use]
pub fn file_name(path: &str) -> &str
{
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Full path of `module` as the debugger process should see it.
///
/// ## Errors
///
/// Propagates failures reading the module name or the process id.
pub fn module_path(module: &dyn BinaryModule) -> IlmapResult<String>
{
    let name = module.name()?;
    if !name.starts_with(PROC_SELF) {
        return Ok(name);
    }
    Ok(rewrite_proc_self(&name, module.process_id()?))
}
