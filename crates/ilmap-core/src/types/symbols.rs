//! Sequence points, source lines and the other values symbol queries return.

use std::fmt;

use super::token::MethodToken;

/// Line number marking a hidden sequence point (compiler-generated code).
pub const HIDDEN_LINE: u32 = 0x00FE_EFEE;

/// One mapping unit inside a method's IL.
///
/// Within a method, points are ordered by ascending `offset`; offsets are not
/// necessarily contiguous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencePoint
{
    /// IL byte offset the point starts at.
    pub offset: u32,
    /// First source line.
    pub start_line: u32,
    /// Last source line.
    pub end_line: u32,
    /// First column on `start_line`.
    pub start_column: u32,
    /// Column after the span on `end_line`.
    pub end_column: u32,
    /// Source document path.
    pub document: String,
}

impl SequencePoint
{
    /// Whether the point covers generated code rather than a source line.
    #[must_use]
    pub fn is_hidden(&self) -> bool
    {
        self.start_line == HIDDEN_LINE
    }
}

/// Source line for an IL offset, as reported by a symbol provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineInfo
{
    /// Line number.
    pub line: u32,
    /// Full path of the document as recorded in the debug data.
    pub document: String,
}

/// A source position resolved to binary coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocation
{
    /// Method containing the position.
    pub method: MethodToken,
    /// IL offset of the matching sequence point.
    pub il_offset: u32,
    /// Full document path, which may differ from the (possibly
    /// file-name-only) path the caller asked for.
    pub document: String,
}

/// IL span treated as one step: `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepRange
{
    /// First IL offset of the statement.
    pub start: u32,
    /// IL offset one past the statement.
    pub end: u32,
}

impl StepRange
{
    /// Build a range.
    #[must_use]
    pub const fn new(start: u32, end: u32) -> Self
    {
        Self { start, end }
    }

    /// Providers report `start == end` when they know nothing about the
    /// statement.
    #[must_use]
    pub const fn is_empty(&self) -> bool
    {
        self.start == self.end
    }

    /// Replace an empty range with `[start, body_size)` so stepping runs to
    /// the end of the method. Non-empty ranges are returned unchanged.
    #[must_use]
    pub const fn widen_to(self, body_size: u32) -> Self
    {
        if self.is_empty() {
            Self::new(self.start, body_size)
        } else {
            self
        }
    }
}

impl fmt::Display for StepRange
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "[{:#x}, {:#x})", self.start, self.end)
    }
}

/// Name and IL lifetime of a local variable slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalScope
{
    /// Variable name from the debug data.
    pub name: String,
    /// First IL offset where the slot holds this variable.
    pub il_start: u32,
    /// IL offset where the variable goes out of scope.
    pub il_end: u32,
}

/// Opaque handle to a value living in the debuggee.
///
/// Minted by the runtime collaborator; this crate only passes it around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueHandle(pub u64);

/// A named local resolved against a live frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVariable
{
    /// Variable name.
    pub name: String,
    /// First IL offset where the variable is valid.
    pub il_start: u32,
    /// IL offset where the variable goes out of scope.
    pub il_end: u32,
    /// Current value in the frame.
    pub value: ValueHandle,
}
