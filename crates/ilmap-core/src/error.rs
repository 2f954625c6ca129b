//! # Error Types
//!
//! Error handling for module tracking and symbol resolution.
//!
//! Every failure crosses the module/provider boundary as a value. We use
//! `thiserror` to derive the `Error` implementation and messages.

use thiserror::Error;

/// Main error type for ilmap operations
///
/// ## Error Categories
///
/// 1. **Lookup misses**: NotFound (recoverable, caller picks a fallback)
/// 2. **Missing debug data**: NoSymbols (module is known but symbol-less)
/// 3. **Fatal per module**: MalformedMetadata (module is never registered)
/// 4. **Fatal per process**: HostUnavailable (latched after the first failure)
/// 5. **Allocation**: OutOfMemory
/// 6. **Caller mistakes**: InvalidArgument
/// 7. **Provider failures**: Provider (text reported by the symbol provider)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IlmapError
{
    /// A lookup by address, name, or file and line had no match
    ///
    /// Always recoverable: `resolve_any_module` for instance moves on to the
    /// next module when one of them answers with this.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The module is registered but has no usable debug data
    ///
    /// Kept apart from `NotFound` so front-ends can report "no symbols loaded
    /// for module X" instead of silently skipping the module.
    #[error("No symbols loaded for {0}")]
    NoSymbols(String),

    /// The module's metadata could not be read at all
    ///
    /// A module without readable metadata cannot be debugged, so it is not
    /// inserted into the registry.
    #[error("Malformed metadata: {0}")]
    MalformedMetadata(String),

    /// The symbol host could not be prepared
    ///
    /// Latched: once preparation failed, every later request fails with this
    /// until the debugger restarts.
    #[error("Symbol host unavailable: {0}")]
    HostUnavailable(String),

    /// A buffer for a returned name or path could not be allocated
    #[error("Out of memory while copying symbol data")]
    OutOfMemory,

    /// Invalid argument passed to a registry or loader operation
    ///
    /// Examples:
    /// - Registering a second module at an address that is already taken
    /// - A frame without an IL mapping
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The symbol provider rejected a request and explained why
    ///
    /// Used for expression parsing and evaluation errors, where the provider
    /// hands back a message meant for the user.
    #[error("Symbol provider error: {0}")]
    Provider(String),
}

impl IlmapError
{
    /// Whether a caller can reasonably fall back (try another module, report
    /// "location not found") instead of giving up.
    #[must_use]
    pub fn is_recoverable(&self) -> bool
    {
        matches!(self, Self::NotFound(_) | Self::NoSymbols(_) | Self::Provider(_))
    }
}

/// Convenience type alias for `Result<T, IlmapError>`
///
/// ```rust
/// use ilmap_core::error::IlmapResult;
/// fn foo() -> IlmapResult<()>
/// {
///     Ok(())
/// }
/// ```
pub type IlmapResult<T> = std::result::Result<T, IlmapError>;
