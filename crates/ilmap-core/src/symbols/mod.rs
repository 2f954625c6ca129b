//! # Symbols
//!
//! The symbol-provider boundary and everything that works on its outputs.
//!
//! - [`provider`]: the [`SymbolHost`] and [`ModuleSymbols`] capability traits
//! - [`latch`]: one-shot host preparation shared by all requests
//! - [`sequence`]: IL offset to nearest sequence point
//! - [`eval`]: expression results and the child-lookup callback
//! - [`table`]: an in-process provider over pre-extracted debug data

pub mod eval;
pub mod latch;
pub mod provider;
pub mod sequence;
pub mod table;

pub use eval::{evaluate_member_path, parse_literal, ChildVisitor, EvalOutcome, EvalValue, ParsedValue, TypeClass};
pub use latch::{HostLatch, LatchedHost};
pub use provider::{checked_line_for_offset, ImageLayout, ImageSource, ModuleSymbols, SymbolHost};
pub use sequence::nearest_sequence_point;
pub use table::{MethodTable, TableHost, TableSymbols};
