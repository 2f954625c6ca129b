//! Symbol loading policy.

use ilmap_utils::SymbolSettings;

use super::file_name;

/// Decides whether symbols should be loaded for a module path
pub trait SymbolLoadPolicy: Send + Sync
{
    /// `false` marks the module `Skipped`; the symbol host is not consulted.
    fn should_load_symbols(&self, path: &str) -> bool;
}

impl<F> SymbolLoadPolicy for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn should_load_symbols(&self, path: &str) -> bool
    {
        self(path)
    }
}

/// Load symbols for every module.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadAll;

impl SymbolLoadPolicy for LoadAll
{
    fn should_load_symbols(&self, _path: &str) -> bool
    {
        true
    }
}

/// Skip modules whose display name starts with one of a set of prefixes.
///
/// ```rust
/// use ilmap_core::modules::{PrefixPolicy, SymbolLoadPolicy};
///
/// let policy = PrefixPolicy::new(["System.", "SOS."]);
/// assert!(!policy.should_load_symbols("/usr/share/dotnet/System.Private.CoreLib.dll"));
/// assert!(policy.should_load_symbols("/app/MyApp.dll"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixPolicy
{
    prefixes: Vec<String>,
}

impl PrefixPolicy
{
    /// Policy skipping the given display-name prefixes.
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).filter(|p: &String| !p.is_empty()).collect(),
        }
    }

    /// Policy built from the configured skip list.
    #[must_use]
    pub fn from_settings(settings: &SymbolSettings) -> Self
    {
        Self::new(settings.skip_prefixes.iter().cloned())
    }

    /// Configured prefixes.
    #[must_use]
    pub fn prefixes(&self) -> &[String]
    {
        &self.prefixes
    }
}

impl Default for PrefixPolicy
{
    fn default() -> Self
    {
        Self::from_settings(&SymbolSettings::default())
    }
}

impl SymbolLoadPolicy for PrefixPolicy
{
    fn should_load_symbols(&self, path: &str) -> bool
    {
        let name = file_name(path);
        !self.prefixes.iter().any(|prefix| name.starts_with(prefix.as_str()))
    }
}
