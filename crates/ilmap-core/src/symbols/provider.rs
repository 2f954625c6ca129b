//! Symbol provider capability traits.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use super::eval::{ChildVisitor, EvalOutcome, ParsedValue};
use crate::debuggee::MemoryReader;
use crate::error::{IlmapError, IlmapResult};
use crate::types::{AddressRange, LineInfo, LocalScope, MethodToken, SequencePoint, StepRange, HIDDEN_LINE};

/// How an in-memory image is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageLayout
{
    /// Raw file bytes, as when the runtime loaded the module from a byte
    /// stream. Section data is found at file offsets.
    File,
    /// Sections mapped at their virtual addresses by the loader.
    Mapped,
}

/// Where a module's image (and its debug data) can be read from.
#[derive(Clone)]
pub enum ImageSource
{
    /// Image on disk; debug data is embedded or lives next to it.
    File
    {
        /// Path the debugger process can open.
        path: PathBuf,
    },
    /// Image held in debuggee memory with no usable path.
    ///
    /// Embedded debug data has to be located inside the image through
    /// `reader`; without a reader the host can only fail.
    InMemory
    {
        /// Address range of the image.
        image: AddressRange,
        /// Whether offsets inside `image` are file or virtual offsets.
        layout: ImageLayout,
        /// Reader used to pull bytes from the debuggee.
        reader: Option<Arc<dyn MemoryReader>>,
    },
}

impl fmt::Debug for ImageSource
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            Self::File { path } => f.debug_struct("File").field("path", path).finish(),
            Self::InMemory { image, layout, reader } => f
                .debug_struct("InMemory")
                .field("image", image)
                .field("layout", layout)
                .field("reader", &reader.is_some())
                .finish(),
        }
    }
}

/// Loaded debug data for one module
///
/// Each registered module owns exactly one handle. Queries run while the
/// registry lock is held, so implementations must not call back into the
/// registry.
pub trait ModuleSymbols: Send
{
    /// Map a source position to the method and IL offset of its sequence point.
    ///
    /// `path` may be a full path or only a file name.
    fn resolve_sequence_point(&self, path: &str, line: u32) -> IlmapResult<(MethodToken, u32)>;

    /// Source line and full document path for an IL offset.
    ///
    /// Callers go through [`checked_line_for_offset`], which also rejects
    /// line `0` and [`HIDDEN_LINE`].
    fn line_for_offset(&self, method: MethodToken, il_offset: u32) -> IlmapResult<LineInfo>;

    /// IL range of the statement containing `il_offset`. An empty range means
    /// the provider knows nothing about the statement.
    fn step_range_for_offset(&self, il_offset: u32, method: MethodToken) -> IlmapResult<StepRange>;

    /// The method's sequence points in ascending offset order; empty if none.
    fn sequence_points(&self, method: MethodToken) -> IlmapResult<Vec<SequencePoint>>;

    /// Name and valid IL range of local slot `slot`.
    fn local_variable_scope(&self, method: MethodToken, slot: u32) -> IlmapResult<LocalScope>;

    /// Methods the debug data marks as non-user code (debugger-hidden,
    /// non-user-code or step-through attributes).
    fn non_user_code_methods(&self) -> IlmapResult<Vec<MethodToken>>
    {
        Ok(Vec::new())
    }
}

/// The component that turns module images into [`ModuleSymbols`] handles
///
/// Whatever hosts the symbol reader (an embedded managed runtime, an
/// out-of-process service, a native library) lives behind this trait.
pub trait SymbolHost: Send + Sync
{
    /// One-time preparation of the hosting machinery.
    ///
    /// Called through a [`HostLatch`](super::HostLatch) by
    /// [`LatchedHost`](super::LatchedHost), never directly by the registry.
    fn prepare(&self) -> IlmapResult<()>
    {
        Ok(())
    }

    /// Load debug data for a module.
    ///
    /// ## Errors
    ///
    /// Any error means the module has no usable symbols.
    fn load_module_symbols(&self, source: &ImageSource) -> IlmapResult<Box<dyn ModuleSymbols>>;

    /// Parse `expression` as a literal of `type_name`.
    ///
    /// `System.String` yields text; other types yield their raw bytes.
    fn parse_expression(&self, expression: &str, type_name: &str) -> IlmapResult<ParsedValue>
    {
        let _ = (expression, type_name);
        Err(IlmapError::Provider("expression parsing is not supported by this host".to_string()))
    }

    /// Evaluate `expression`, resolving member names through `children`.
    ///
    /// `children` is only called synchronously, before this returns.
    fn evaluate_expression(&self, expression: &str, children: &mut dyn ChildVisitor) -> IlmapResult<EvalOutcome>
    {
        let _ = (expression, children);
        Err(IlmapError::Provider("expression evaluation is not supported by this host".to_string()))
    }
}

/// [`ModuleSymbols::line_for_offset`] plus the core's own hidden-line check.
///
/// Providers are expected to filter hidden lines but are not trusted to do so
/// exhaustively: line `0` and [`HIDDEN_LINE`] both count as "no source line".
///
/// ## Errors
///
/// `NotFound` when the provider has no usable line.
pub fn checked_line_for_offset(symbols: &dyn ModuleSymbols, method: MethodToken, il_offset: u32) -> IlmapResult<LineInfo>
{
    let info = symbols.line_for_offset(method, il_offset)?;
    if info.line == 0 || info.line == HIDDEN_LINE {
        return Err(IlmapError::NotFound(format!(
            "no source line for {method} at IL offset {il_offset:#x}"
        )));
    }
    Ok(info)
}
