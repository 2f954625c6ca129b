//! # Table Symbols
//!
//! An in-process symbol provider over pre-extracted debug data: per-method
//! sequence points, local scopes, body sizes and non-user-code markers.
//!
//! This is what a host that already decoded a module's debug data (or a test)
//! plugs in behind [`ModuleSymbols`]. [`TableHost`] maps module images to
//! their tables.
//!
//! ## Usage
//!
//! ```rust
//! use ilmap_core::symbols::{MethodTable, ModuleSymbols, TableSymbols};
//! use ilmap_core::types::{MethodToken, SequencePoint};
//!
//! let main = MethodToken::method_def(1);
//! let table = TableSymbols::new().with_method(
//!     main,
//!     MethodTable::new(0x20).point(SequencePoint {
//!         offset: 0,
//!         start_line: 7,
//!         end_line: 7,
//!         start_column: 9,
//!         end_column: 40,
//!         document: "/app/Program.cs".to_string(),
//!     }),
//! );
//!
//! assert_eq!(table.resolve_sequence_point("Program.cs", 7).unwrap(), (main, 0));
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use tracing::trace;

use super::eval::{evaluate_member_path, parse_literal, ChildVisitor, EvalOutcome, ParsedValue};
use super::provider::{ImageSource, ModuleSymbols, SymbolHost};
use crate::error::{IlmapError, IlmapResult};
use crate::types::{Address, LineInfo, LocalScope, MethodToken, SequencePoint, StepRange};

/// Debug data of one method.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodTable
{
    points: Vec<SequencePoint>,
    locals: BTreeMap<u32, LocalScope>,
    body_size: u32,
    non_user_code: bool,
}

impl MethodTable
{
    /// Empty table for a method whose IL body is `body_size` bytes.
    #[must_use]
    pub fn new(body_size: u32) -> Self
    {
        Self {
            body_size,
            ..Self::default()
        }
    }

    /// Add a sequence point; points are kept sorted by offset.
    #[must_use]
    pub fn point(mut self, point: SequencePoint) -> Self
    {
        let index = self.points.partition_point(|p| p.offset <= point.offset);
        self.points.insert(index, point);
        self
    }

    /// Describe local slot `slot`.
    #[must_use]
    pub fn local(mut self, slot: u32, name: impl Into<String>, il_start: u32, il_end: u32) -> Self
    {
        self.locals.insert(
            slot,
            LocalScope {
                name: name.into(),
                il_start,
                il_end,
            },
        );
        self
    }

    /// Mark the method as non-user code.
    #[must_use]
    pub fn non_user_code(mut self) -> Self
    {
        self.non_user_code = true;
        self
    }

    /// IL body size.
    #[must_use]
    pub fn body_size(&self) -> u32
    {
        self.body_size
    }

    /// Sequence points in ascending offset order.
    #[must_use]
    pub fn points(&self) -> &[SequencePoint]
    {
        &self.points
    }

    /// Index of the last point at or before `il_offset`.
    fn covering_index(&self, il_offset: u32) -> Option<usize>
    {
        self.points.partition_point(|p| p.offset <= il_offset).checked_sub(1)
    }
}

/// Debug data of one module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSymbols
{
    methods: BTreeMap<MethodToken, MethodTable>,
}

impl TableSymbols
{
    /// Module without methods.
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Add or replace the table for `method`.
    #[must_use]
    pub fn with_method(mut self, method: MethodToken, table: MethodTable) -> Self
    {
        self.methods.insert(method, table);
        self
    }

    /// Table for `method`, if known.
    #[must_use]
    pub fn method(&self, method: MethodToken) -> Option<&MethodTable>
    {
        self.methods.get(&method)
    }

    fn require(&self, method: MethodToken) -> IlmapResult<&MethodTable>
    {
        self.methods
            .get(&method)
            .ok_or_else(|| IlmapError::NotFound(format!("no debug information for method {method}")))
    }
}

/// Whether a recorded document matches what the user asked for: the full path,
/// or just its file name when the request carries no directory.
fn document_matches(document: &str, requested: &str) -> bool
{
    if document == requested {
        return true;
    }
    let has_directory = requested.contains(['/', '\\']);
    !has_directory && crate::modules::file_name(document) == requested
}

impl ModuleSymbols for TableSymbols
{
    /// Picks the non-hidden point in a matching document whose start line is
    /// the first at or after `line`; ties go to the lowest method token, then
    /// the lowest offset.
    fn resolve_sequence_point(&self, path: &str, line: u32) -> IlmapResult<(MethodToken, u32)>
    {
        let mut best: Option<(u32, MethodToken, u32)> = None;

        for (token, table) in &self.methods {
            for point in &table.points {
                if point.is_hidden() || point.start_line < line || !document_matches(&point.document, path) {
                    continue;
                }
                if best.is_none_or(|(best_line, _, _)| point.start_line < best_line) {
                    best = Some((point.start_line, *token, point.offset));
                }
            }
        }

        let (matched_line, method, offset) =
            best.ok_or_else(|| IlmapError::NotFound(format!("no code at {path}:{line}")))?;
        trace!(path, line, matched_line, %method, offset, "resolved sequence point");
        Ok((method, offset))
    }

    fn line_for_offset(&self, method: MethodToken, il_offset: u32) -> IlmapResult<LineInfo>
    {
        let table = self.require(method)?;
        let point = table
            .covering_index(il_offset)
            .map(|index| &table.points[index])
            .filter(|point| !point.is_hidden())
            .ok_or_else(|| IlmapError::NotFound(format!("no source line for {method} at IL offset {il_offset:#x}")))?;

        Ok(LineInfo {
            line: point.start_line,
            document: point.document.clone(),
        })
    }

    /// `[offset of covering point, offset of next point)`, or an empty range
    /// at the covering point when it is the method's last.
    fn step_range_for_offset(&self, il_offset: u32, method: MethodToken) -> IlmapResult<StepRange>
    {
        let table = self.require(method)?;
        let Some(index) = table.covering_index(il_offset) else {
            return Ok(StepRange::new(il_offset, il_offset));
        };

        let start = table.points[index].offset;
        let end = table.points.get(index + 1).map_or(start, |next| next.offset);
        Ok(StepRange::new(start, end))
    }

    fn sequence_points(&self, method: MethodToken) -> IlmapResult<Vec<SequencePoint>>
    {
        Ok(self.methods.get(&method).map(|table| table.points.clone()).unwrap_or_default())
    }

    fn local_variable_scope(&self, method: MethodToken, slot: u32) -> IlmapResult<LocalScope>
    {
        self.require(method)?
            .locals
            .get(&slot)
            .cloned()
            .ok_or_else(|| IlmapError::NotFound(format!("no local in slot {slot} of {method}")))
    }

    fn non_user_code_methods(&self) -> IlmapResult<Vec<MethodToken>>
    {
        Ok(self
            .methods
            .iter()
            .filter(|(_, table)| table.non_user_code)
            .map(|(token, _)| *token)
            .collect())
    }
}

/// A [`SymbolHost`] serving [`TableSymbols`] registered per image.
///
/// Files are matched by path, in-memory images by base address. Evaluation
/// supports member paths and literal parsing.
#[derive(Debug, Clone, Default)]
pub struct TableHost
{
    by_path: HashMap<PathBuf, TableSymbols>,
    by_address: HashMap<Address, TableSymbols>,
}

impl TableHost
{
    /// Host without any tables.
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Serve `symbols` for the image at `path`.
    #[must_use]
    pub fn with_file(mut self, path: impl AsRef<Path>, symbols: TableSymbols) -> Self
    {
        self.by_path.insert(path.as_ref().to_path_buf(), symbols);
        self
    }

    /// Serve `symbols` for the in-memory image based at `base`.
    #[must_use]
    pub fn with_in_memory(mut self, base: Address, symbols: TableSymbols) -> Self
    {
        self.by_address.insert(base, symbols);
        self
    }
}

impl SymbolHost for TableHost
{
    fn load_module_symbols(&self, source: &ImageSource) -> IlmapResult<Box<dyn ModuleSymbols>>
    {
        let table = match source {
            ImageSource::File { path } => self.by_path.get(path),
            ImageSource::InMemory { image, .. } => self.by_address.get(&image.start),
        };

        table
            .cloned()
            .map(|table| Box::new(table) as Box<dyn ModuleSymbols>)
            .ok_or_else(|| IlmapError::NotFound(format!("no debug data for {source:?}")))
    }

    fn parse_expression(&self, expression: &str, type_name: &str) -> IlmapResult<ParsedValue>
    {
        parse_literal(expression, type_name)
    }

    fn evaluate_expression(&self, expression: &str, children: &mut dyn ChildVisitor) -> IlmapResult<EvalOutcome>
    {
        evaluate_member_path(expression, children)
    }
}
