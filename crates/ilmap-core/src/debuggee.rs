//! # Debuggee Collaborators
//!
//! Traits for the runtime objects this crate consumes but does not own: the
//! loaded binary module, IL frames, threads, and raw memory access.
//!
//! A debugger backend implements these on top of its runtime debugging
//! interface. Modules are shared as `Arc<dyn BinaryModule>`; the registry
//! keeps one clone per entry for its own lifetime and drops it on `clear`.

use std::sync::Arc;

use crate::error::IlmapResult;
use crate::types::{Address, MethodToken, ProcessId, ValueHandle};

/// A binary module loaded in the debuggee
///
/// Treated as read-only except for the Just-My-Code flags, which the loader
/// configures once symbols are known.
pub trait BinaryModule: Send + Sync
{
    /// Load address of the module image.
    fn base_address(&self) -> IlmapResult<Address>;

    /// Image size in bytes.
    fn size(&self) -> IlmapResult<u32>;

    /// PID of the process the module is loaded in.
    fn process_id(&self) -> IlmapResult<ProcessId>;

    /// Whether the module was emitted at runtime (no image to read symbols from).
    fn is_dynamic(&self) -> IlmapResult<bool>;

    /// Whether the module was loaded from a byte stream rather than a file.
    fn is_in_memory(&self) -> IlmapResult<bool>;

    /// The 16 MVID bytes from the module's metadata scope.
    ///
    /// ## Errors
    ///
    /// `MalformedMetadata` when the metadata cannot be read.
    fn module_version_id(&self) -> IlmapResult<[u8; 16]>;

    /// Module path as reported by the runtime (may be a `/proc/self/...` view).
    fn name(&self) -> IlmapResult<String>;

    /// Enable or disable Just-My-Code for the whole module.
    fn set_jmc_status(&self, is_user_code: bool) -> IlmapResult<()>;

    /// Enable or disable Just-My-Code for a single method.
    fn set_method_jmc_status(&self, method: MethodToken, is_user_code: bool) -> IlmapResult<()>;
}

/// A managed stack frame with an IL mapping
pub trait ILFrame
{
    /// Token of the executing method.
    fn function_token(&self) -> IlmapResult<MethodToken>;

    /// Module the executing method belongs to.
    fn module(&self) -> IlmapResult<Arc<dyn BinaryModule>>;

    /// Current IL offset of the instruction pointer.
    fn il_offset(&self) -> IlmapResult<u32>;

    /// Size of the method's IL body in bytes.
    fn il_code_size(&self) -> IlmapResult<u32>;

    /// Value held by local slot `slot`, `None` if the slot is unavailable.
    fn local_variable(&self, slot: u32) -> IlmapResult<Option<ValueHandle>>;
}

/// A debuggee thread
pub trait DebuggeeThread
{
    /// The innermost frame, `None` when the thread has no managed frame.
    fn active_frame(&self) -> IlmapResult<Option<Arc<dyn ILFrame>>>;
}

/// Raw reads from debuggee memory
///
/// Handed to symbol hosts so they can pull in-memory images and debug data
/// lazily instead of receiving a full copy up front.
pub trait MemoryReader: Send + Sync
{
    /// Read up to `buffer.len()` bytes at `address`, returning how many bytes
    /// were read (`0` on failure).
    fn read_memory(&self, address: Address, buffer: &mut [u8]) -> usize;
}
