//! Load address type.

use std::fmt;

/// Base address of a loaded module in the debuggee
///
/// Module load addresses are unique among the modules loaded at any instant,
/// which makes them the registry key. The newtype keeps them from being mixed
/// up with sizes and IL offsets, which are plain integers throughout.
///
/// ## Example
///
/// ```rust
/// use ilmap_core::types::Address;
///
/// let base = Address::from(0x7f00_1000_0000);
/// assert_eq!(base.to_string(), "0x00007f0010000000");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(u64);

impl Address
{
    /// The null address, never a valid module base.
    pub const ZERO: Self = Address(0);

    /// Create an address in const contexts.
    #[must_use]
    pub const fn new(value: u64) -> Self
    {
        Address(value)
    }

    /// Raw `u64` value.
    #[must_use]
    pub const fn value(self) -> u64
    {
        self.0
    }

    /// Add a byte offset, returning `None` on overflow.
    #[must_use]
    pub fn checked_add(self, offset: u64) -> Option<Self>
    {
        self.0.checked_add(offset).map(Address)
    }
}

impl From<u64> for Address
{
    fn from(value: u64) -> Self
    {
        Address(value)
    }
}

impl From<Address> for u64
{
    fn from(address: Address) -> Self
    {
        address.0
    }
}

impl fmt::Display for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "0x{:016x}", self.0)
    }
}

/// Half-open address range `[start, start + size)` occupied by a module image
/// or an in-memory debug-data blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddressRange
{
    /// First byte of the range.
    pub start: Address,
    /// Length in bytes.
    pub size: u64,
}

impl AddressRange
{
    /// Build a range from its start and length.
    #[must_use]
    pub const fn new(start: Address, size: u64) -> Self
    {
        Self { start, size }
    }

    /// One past the last byte, saturating at the top of the address space.
    #[must_use]
    pub fn end(&self) -> Address
    {
        Address(self.start.0.saturating_add(self.size))
    }

    /// Whether `address` falls inside the range.
    #[must_use]
    pub fn contains(&self, address: Address) -> bool
    {
        address >= self.start && address < self.end()
    }
}
