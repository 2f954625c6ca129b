//! Common module for library exports

pub use crate::debuggee::{BinaryModule, DebuggeeThread, ILFrame, MemoryReader};
pub use crate::error::{IlmapError, IlmapResult};
pub use crate::modules::{
    DebugInfoLoader, FrameSequencePoint, LoadAll, ModuleDescriptor, ModuleLocation, ModuleManager, ModuleRegistry,
    PrefixPolicy, SymbolLoadPolicy, SymbolStatus,
};
pub use crate::symbols::{
    ChildVisitor, EvalOutcome, EvalValue, HostLatch, ImageLayout, ImageSource, LatchedHost, ModuleSymbols, ParsedValue,
    SymbolHost, TypeClass,
};
pub use crate::types::{
    Address, AddressRange, LineInfo, LocalScope, LocalVariable, MethodToken, ModuleId, ProcessId, ResolvedLocation,
    SequencePoint, StepRange, ValueHandle, HIDDEN_LINE,
};
