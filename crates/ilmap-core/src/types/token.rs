//! Metadata tokens.

use std::fmt;

/// Metadata token of a method definition (`mdMethodDef`)
///
/// The high byte names the metadata table (`0x06` for `MethodDef`), the low
/// three bytes the 1-based row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MethodToken(u32);

impl MethodToken
{
    /// Table id of `MethodDef` rows.
    pub const METHOD_DEF_TABLE: u8 = 0x06;

    /// Wrap a raw token as read from metadata or a frame.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self
    {
        Self(raw)
    }

    /// Build the token for a `MethodDef` row.
    #[must_use]
    pub const fn method_def(row: u32) -> Self
    {
        Self(((Self::METHOD_DEF_TABLE as u32) << 24) | (row & 0x00FF_FFFF))
    }

    /// Raw 32-bit token.
    #[must_use]
    pub const fn raw(self) -> u32
    {
        self.0
    }

    /// Metadata table id.
    #[must_use]
    pub const fn table(self) -> u8
    {
        (self.0 >> 24) as u8
    }

    /// Row within the table.
    #[must_use]
    pub const fn row(self) -> u32
    {
        self.0 & 0x00FF_FFFF
    }
}

impl From<u32> for MethodToken
{
    fn from(raw: u32) -> Self
    {
        Self(raw)
    }
}

impl fmt::Display for MethodToken
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "0x{:08x}", self.0)
    }
}
