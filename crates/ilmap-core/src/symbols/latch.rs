//! # Host Preparation Latch
//!
//! Preparing a symbol host is attempted once. If that attempt fails, the host
//! is considered broken for the rest of the process: every later request
//! fails with `HostUnavailable` and preparation is never retried.

use std::sync::Arc;

use once_cell::sync::{Lazy, OnceCell};
use tracing::{error, info};

use super::eval::{ChildVisitor, EvalOutcome, ParsedValue};
use super::provider::{ImageSource, ModuleSymbols, SymbolHost};
use crate::error::{IlmapError, IlmapResult};

static GLOBAL_LATCH: Lazy<Arc<HostLatch>> = Lazy::new(|| Arc::new(HostLatch::new()));

/// Init-once, never-reset record of a host preparation attempt.
#[derive(Debug, Default)]
pub struct HostLatch
{
    outcome: OnceCell<Result<(), String>>,
}

impl HostLatch
{
    /// A latch that has not been attempted yet.
    #[must_use]
    pub const fn new() -> Self
    {
        Self { outcome: OnceCell::new() }
    }

    /// The process-wide latch.
    #[must_use]
    pub fn global() -> Arc<HostLatch>
    {
        Arc::clone(&GLOBAL_LATCH)
    }

    /// Run `prepare` if no attempt has been made yet, then report the latched
    /// outcome.
    ///
    /// Concurrent callers block until the first attempt finishes. The first
    /// failure is logged once at error level.
    ///
    /// ## Errors
    ///
    /// `HostUnavailable` carrying the original failure, on this call and
    /// every call after it.
    pub fn prepare<F>(&self, prepare: F) -> IlmapResult<()>
    where
        F: FnOnce() -> IlmapResult<()>,
    {
        let outcome = self.outcome.get_or_init(|| match prepare() {
            Ok(()) => {
                info!("symbol host prepared");
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "symbol host preparation failed; symbol loading and evaluation are disabled");
                Err(err.to_string())
            }
        });

        match outcome {
            Ok(()) => Ok(()),
            Err(reason) => Err(IlmapError::HostUnavailable(reason.clone())),
        }
    }

    /// Whether preparation has been attempted.
    #[must_use]
    pub fn is_attempted(&self) -> bool
    {
        self.outcome.get().is_some()
    }

    /// Whether the attempt failed.
    #[must_use]
    pub fn is_failed(&self) -> bool
    {
        matches!(self.outcome.get(), Some(Err(_)))
    }
}

/// A [`SymbolHost`] whose every request first passes through a [`HostLatch`].
pub struct LatchedHost<H>
{
    host: H,
    latch: Arc<HostLatch>,
}

impl<H: SymbolHost> LatchedHost<H>
{
    /// Wrap `host` with a latch of its own.
    pub fn new(host: H) -> Self
    {
        Self::with_latch(host, Arc::new(HostLatch::new()))
    }

    /// Wrap `host` with a shared latch, typically [`HostLatch::global`].
    pub fn with_latch(host: H, latch: Arc<HostLatch>) -> Self
    {
        Self { host, latch }
    }

    /// The latch guarding this host.
    pub fn latch(&self) -> &HostLatch
    {
        &self.latch
    }

    /// The wrapped host.
    pub fn inner(&self) -> &H
    {
        &self.host
    }

    fn ready(&self) -> IlmapResult<()>
    {
        self.latch.prepare(|| self.host.prepare())
    }
}

impl<H: SymbolHost> SymbolHost for LatchedHost<H>
{
    fn prepare(&self) -> IlmapResult<()>
    {
        self.ready()
    }

    fn load_module_symbols(&self, source: &ImageSource) -> IlmapResult<Box<dyn ModuleSymbols>>
    {
        self.ready()?;
        self.host.load_module_symbols(source)
    }

    fn parse_expression(&self, expression: &str, type_name: &str) -> IlmapResult<ParsedValue>
    {
        self.ready()?;
        self.host.parse_expression(expression, type_name)
    }

    fn evaluate_expression(&self, expression: &str, children: &mut dyn ChildVisitor) -> IlmapResult<EvalOutcome>
    {
        self.ready()?;
        self.host.evaluate_expression(expression, children)
    }
}

#[cfg(test)]
mod tests
{
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_success_is_cached()
    {
        let latch = HostLatch::new();
        let attempts = AtomicUsize::new(0);

        for _ in 0..3 {
            latch
                .prepare(|| {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
                .unwrap();
        }

        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(latch.is_attempted());
        assert!(!latch.is_failed());
    }

    #[test]
    fn test_failure_is_latched()
    {
        let latch = HostLatch::new();
        assert!(!latch.is_attempted());

        let first = latch.prepare(|| Err(IlmapError::Provider("runtime library missing".to_string())));
        assert!(matches!(first, Err(IlmapError::HostUnavailable(ref msg)) if msg.contains("runtime library missing")));

        let second = latch.prepare(|| panic!("preparation must not be retried"));
        assert_eq!(first, second);
        assert!(latch.is_failed());
    }

    #[test]
    fn test_global_latch_is_shared()
    {
        assert!(Arc::ptr_eq(&HostLatch::global(), &HostLatch::global()));
    }
}
