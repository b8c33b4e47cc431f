#![forbid(unsafe_code)]

//! Setup-time errors.
//!
//! Steady-state history operations never fail: exhausted stacks,
//! non-editable surfaces, and drifted patch contexts all degrade to
//! silent no-ops or best-effort application. The only fatal class is
//! invalid configuration, raised once when the engine is built.

use std::fmt;

/// Errors detected while validating [`EngineOptions`](crate::EngineOptions).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    /// The content cache was enabled without a cache id to key it.
    MissingCacheId,
    /// The undo stack bound must hold at least the seed record.
    ZeroStackSize,
}

impl fmt::Display for OptionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCacheId => {
                write!(f, "content cache is enabled but no cache id was provided")
            }
            Self::ZeroStackSize => write!(f, "stack_size must be at least 1"),
        }
    }
}

impl std::error::Error for OptionsError {}
