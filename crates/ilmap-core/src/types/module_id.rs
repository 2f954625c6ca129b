//! Content-derived module identity.

use std::fmt;

use uguid::Guid;

/// Stable identity of a module, taken from the module version id (MVID)
/// stored in its metadata scope.
///
/// The path is deliberately not part of the identity: the same module can be
/// loaded from a stream or through a virtual path. The text form is the
/// canonical lower-case GUID, with the first three fields read little-endian
/// from the metadata bytes:
///
/// ```rust
/// use ilmap_core::types::ModuleId;
///
/// let id = ModuleId::from_mvid_bytes([
///     0x8e, 0x90, 0x37, 0xd4, 0xe6, 0x65, 0x7c, 0x48, 0x97, 0x35, 0x7b, 0xdf, 0xf6, 0x99, 0xbe, 0xa5,
/// ]);
/// assert_eq!(id.to_string(), "d437908e-65e6-487c-9735-7bdff699bea5");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleId(Guid);

impl ModuleId
{
    /// Build the identity from the 16 MVID bytes in metadata layout.
    #[must_use]
    pub const fn from_mvid_bytes(bytes: [u8; 16]) -> Self
    {
        Self(Guid::from_bytes(bytes))
    }

    /// Underlying GUID.
    #[must_use]
    pub const fn guid(&self) -> Guid
    {
        self.0
    }

    /// MVID bytes in metadata layout.
    #[must_use]
    pub const fn to_bytes(&self) -> [u8; 16]
    {
        self.0.to_bytes()
    }
}

impl From<Guid> for ModuleId
{
    fn from(guid: Guid) -> Self
    {
        Self(guid)
    }
}

impl fmt::Display for ModuleId
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        fmt::Display::fmt(&self.0, f)
    }
}
