//! # Types
//!
//! Plain values shared by the registry, the loader and symbol providers.
//!
//! Two coordinate systems meet here: source coordinates (document, line,
//! column) and binary coordinates (method token, IL offset). The types keep
//! them apart so a line number is never handed over where an offset belongs.

pub mod address;
pub mod module_id;
pub mod process;
pub mod symbols;
pub mod token;

// Re-export all public types
pub use address::{Address, AddressRange};
pub use module_id::ModuleId;
pub use process::ProcessId;
pub use symbols::{
    LineInfo, LocalScope, LocalVariable, ResolvedLocation, SequencePoint, StepRange, ValueHandle, HIDDEN_LINE,
};
pub use token::MethodToken;
