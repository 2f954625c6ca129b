//! # Module Manager
//!
//! The module and symbol operations the rest of the debugger calls:
//! breakpoint binding, stack-frame mapping, stepping, local variable lookup
//! and expression evaluation.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use ilmap_core::modules::{LoadAll, ModuleManager};
//! use ilmap_core::symbols::{LatchedHost, TableHost};
//!
//! let host = Arc::new(LatchedHost::new(TableHost::new()));
//! let manager = ModuleManager::new(host, Arc::new(LoadAll));
//!
//! assert!(manager.resolve_location("Program.cs", 10).is_err());
//! ```

use std::sync::Arc;

use ilmap_utils::SymbolSettings;
use tracing::{debug, trace};

use super::loader::DebugInfoLoader;
use super::policy::SymbolLoadPolicy;
use super::registry::{ModuleLocation, ModuleRegistry};
use super::ModuleDescriptor;
use crate::debuggee::{BinaryModule, DebuggeeThread, ILFrame};
use crate::error::{IlmapError, IlmapResult};
use crate::symbols::{
    checked_line_for_offset, nearest_sequence_point, ChildVisitor, EvalOutcome, ParsedValue, SymbolHost,
};
use crate::types::{LocalVariable, ResolvedLocation, SequencePoint, StepRange};

/// Where a frame's instruction pointer sits in source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSequencePoint
{
    /// Current IL offset of the frame.
    pub il_offset: u32,
    /// The sequence point covering it, with the full document path.
    pub point: SequencePoint,
}

/// Registry plus loader behind one handle.
pub struct ModuleManager
{
    registry: ModuleRegistry,
    loader: DebugInfoLoader,
}

impl ModuleManager
{
    /// Manager over `host` with the given load policy.
    pub fn new(host: Arc<dyn SymbolHost>, policy: Arc<dyn SymbolLoadPolicy>) -> Self
    {
        Self::with_loader(DebugInfoLoader::new(host, policy))
    }

    /// Manager configured from [`SymbolSettings`].
    pub fn from_settings(host: Arc<dyn SymbolHost>, settings: &SymbolSettings) -> Self
    {
        Self::with_loader(DebugInfoLoader::from_settings(host, settings))
    }

    /// Manager around a preconfigured loader.
    pub fn with_loader(loader: DebugInfoLoader) -> Self
    {
        Self {
            registry: ModuleRegistry::new(),
            loader,
        }
    }

    /// The module registry.
    pub fn registry(&self) -> &ModuleRegistry
    {
        &self.registry
    }

    /// The debug-info loader.
    pub fn loader(&self) -> &DebugInfoLoader
    {
        &self.loader
    }

    /// Load symbols for a newly reported module and register it.
    ///
    /// ## Errors
    ///
    /// See [`DebugInfoLoader::load`].
    pub fn load_module(&self, module: Arc<dyn BinaryModule>) -> IlmapResult<ModuleDescriptor>
    {
        self.loader.load(module, &self.registry)
    }

    /// Find code for `file:line` in any loaded module.
    ///
    /// `file` may be a full path or a bare file name.
    ///
    /// ## Errors
    ///
    /// `NotFound` when no module has code there, `HostUnavailable` when
    /// nothing resolved and some module was loaded while the symbol host was
    /// down.
    pub fn resolve_location(&self, file: &str, line: u32) -> IlmapResult<ModuleLocation>
    {
        self.registry.resolve_any_module(file, line)
    }

    /// Find code for `file:line` in one specific module.
    ///
    /// ## Errors
    ///
    /// `NotFound` for an unregistered module or no code at the position,
    /// `NoSymbols` when the module has no debug data, `HostUnavailable` when
    /// it was loaded while the symbol host was down.
    pub fn resolve_location_in_module(&self, module: &dyn BinaryModule, file: &str, line: u32) -> IlmapResult<ResolvedLocation>
    {
        let address = module.base_address()?;
        self.registry.resolve_in_module(address, file, line)
    }

    /// Map a frame's instruction pointer to its sequence point.
    ///
    /// The point's document is the full path the provider reports for the
    /// exact IL offset.
    ///
    /// ## Errors
    ///
    /// - `NotFound` when the module is unregistered, the offset has no source
    ///   line, or the method has no sequence points
    /// - `NoSymbols` when the module has no debug data
    /// - `HostUnavailable` when it was loaded while the symbol host was down
    pub fn frame_to_sequence_point(&self, frame: &dyn ILFrame) -> IlmapResult<FrameSequencePoint>
    {
        let method = frame.function_token()?;
        let il_offset = frame.il_offset()?;
        let address = frame.module()?.base_address()?;

        let (line, points) = self.registry.with_symbols(address, |symbols| {
            let line = checked_line_for_offset(symbols, method, il_offset)?;
            let points = symbols.sequence_points(method)?;
            Ok((line, points))
        })?;

        let mut point = nearest_sequence_point(&points, il_offset)?.clone();
        point.document = line.document;
        trace!(%method, il_offset, line = point.start_line, "frame mapped to sequence point");

        Ok(FrameSequencePoint { il_offset, point })
    }

    /// IL range of the statement the thread is stopped in.
    ///
    /// An empty range from the provider is widened to the end of the method
    /// body.
    ///
    /// ## Errors
    ///
    /// `NotFound` when the thread has no active frame or the module is
    /// unregistered, `NoSymbols` when it has no debug data.
    pub fn step_range(&self, thread: &dyn DebuggeeThread) -> IlmapResult<StepRange>
    {
        let frame = thread
            .active_frame()?
            .ok_or_else(|| IlmapError::NotFound("thread has no active frame".to_string()))?;

        let method = frame.function_token()?;
        let il_offset = frame.il_offset()?;
        let address = frame.module()?.base_address()?;

        let range = self
            .registry
            .with_symbols(address, |symbols| symbols.step_range_for_offset(il_offset, method))?;

        if !range.is_empty() {
            return Ok(range);
        }

        let widened = range.widen_to(frame.il_code_size()?);
        debug!(%method, il_offset, range = %widened, "step range widened to method end");
        Ok(widened)
    }

    /// First loaded module whose display name is `name`.
    ///
    /// ## Errors
    ///
    /// `NotFound` when no module matches.
    pub fn module_by_name(&self, name: &str) -> IlmapResult<Arc<dyn BinaryModule>>
    {
        self.registry.find_by_name(name)
    }

    /// Visit every loaded module; stops at the first visitor error.
    ///
    /// ## Errors
    ///
    /// The visitor's first error.
    pub fn for_each_module<F>(&self, visitor: F) -> IlmapResult<()>
    where
        F: FnMut(&Arc<dyn BinaryModule>) -> IlmapResult<()>,
    {
        self.registry.for_each(visitor)
    }

    /// Name, scope and current value of local slot `slot` in `frame`.
    ///
    /// ## Errors
    ///
    /// `NotFound` when the debug data has no such local or the frame cannot
    /// produce its value, `NoSymbols` when the module has no debug data.
    pub fn local_variable(&self, frame: &dyn ILFrame, slot: u32) -> IlmapResult<LocalVariable>
    {
        let method = frame.function_token()?;
        let address = frame.module()?.base_address()?;

        let scope = self
            .registry
            .with_symbols(address, |symbols| symbols.local_variable_scope(method, slot))?;

        let value = frame
            .local_variable(slot)?
            .ok_or_else(|| IlmapError::NotFound(format!("local '{}' has no value in this frame", scope.name)))?;

        Ok(LocalVariable {
            name: scope.name,
            il_start: scope.il_start,
            il_end: scope.il_end,
            value,
        })
    }

    /// Parse `expression` as a literal of `type_name`.
    ///
    /// ## Errors
    ///
    /// `Provider` with the host's message, `HostUnavailable` when the host is
    /// latched off.
    pub fn parse_expression(&self, expression: &str, type_name: &str) -> IlmapResult<ParsedValue>
    {
        self.loader.host().parse_expression(expression, type_name)
    }

    /// Evaluate `expression`, resolving members through `children`.
    ///
    /// ## Errors
    ///
    /// `Provider` with the host's message, `HostUnavailable` when the host is
    /// latched off.
    pub fn evaluate_expression(&self, expression: &str, children: &mut dyn ChildVisitor) -> IlmapResult<EvalOutcome>
    {
        self.loader.host().evaluate_expression(expression, children)
    }

    /// Forget every module; called when the debuggee exits.
    pub fn cleanup(&self)
    {
        self.registry.clear();
    }
}
