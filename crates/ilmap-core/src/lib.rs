//! # ilmap-core
//!
//! Module tracking and symbol resolution for a managed-runtime debugger.
//!
//! This crate sits between the runtime's debugging interface and the
//! debugger front-end:
//! - Tracks every module loaded in the debuggee, keyed by load address
//! - Loads each module's debug data through a pluggable symbol host
//! - Maps source positions to IL offsets and back
//! - Computes step ranges and resolves local variables for live frames
//!
//! ## Layout
//!
//! - [`debuggee`]: traits for the runtime objects consumed here
//! - [`symbols`]: the symbol provider boundary
//! - [`modules`]: registry, loader and the [`ModuleManager`] façade
//! - [`types`]: addresses, tokens, sequence points and friends

pub mod debuggee;
pub mod error;
pub mod modules;
pub mod prelude;
pub mod symbols;
pub mod types;

// Re-export commonly used types
pub use error::{IlmapError, IlmapResult};
pub use modules::{DebugInfoLoader, ModuleDescriptor, ModuleManager, ModuleRegistry, SymbolStatus};
pub use symbols::{HostLatch, LatchedHost, ModuleSymbols, SymbolHost};
pub use types::{Address, MethodToken, ModuleId, SequencePoint, StepRange};
