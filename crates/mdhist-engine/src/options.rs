#![forbid(unsafe_code)]

//! Engine configuration.

use std::time::Duration;

use crate::error::OptionsError;

/// Content-cache configuration.
///
/// The engine itself never persists anything; the id is validated here
/// because a keyless cache silently collides across documents, which is
/// the kind of failure that must surface at setup rather than mid-session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheOptions {
    /// Whether the embedder persists content between sessions.
    pub enable: bool,
    /// Storage key for the cached content.
    pub id: Option<String>,
}

impl CacheOptions {
    /// Enabled cache keyed by `id`.
    #[must_use]
    pub fn enabled(id: impl Into<String>) -> Self {
        Self {
            enable: true,
            id: Some(id.into()),
        }
    }
}

/// Configuration for [`HistoryEngine`](crate::HistoryEngine).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Maximum undo records kept per mode. Oldest are evicted.
    pub stack_size: usize,
    /// Quiet period before a burst of edits commits, in milliseconds.
    pub commit_delay_ms: u64,
    /// Content-cache settings.
    pub cache: CacheOptions,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            stack_size: 50,
            commit_delay_ms: 800,
            cache: CacheOptions::default(),
        }
    }
}

impl EngineOptions {
    /// Set the undo stack bound.
    #[must_use]
    pub fn with_stack_size(mut self, stack_size: usize) -> Self {
        self.stack_size = stack_size;
        self
    }

    /// Set the commit quiet period in milliseconds.
    #[must_use]
    pub fn with_commit_delay_ms(mut self, delay_ms: u64) -> Self {
        self.commit_delay_ms = delay_ms;
        self
    }

    /// Set the cache configuration.
    #[must_use]
    pub fn with_cache(mut self, cache: CacheOptions) -> Self {
        self.cache = cache;
        self
    }

    /// The commit quiet period as a [`Duration`].
    #[must_use]
    pub fn commit_delay(&self) -> Duration {
        Duration::from_millis(self.commit_delay_ms)
    }

    /// Check the configuration for the fatal-at-setup error class.
    ///
    /// # Errors
    ///
    /// [`OptionsError::MissingCacheId`] when the cache is enabled without
    /// an id; [`OptionsError::ZeroStackSize`] when the stack cannot hold
    /// even the seed record.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.stack_size == 0 {
            return Err(OptionsError::ZeroStackSize);
        }
        if self.cache.enable && self.cache.id.is_none() {
            return Err(OptionsError::MissingCacheId);
        }
        Ok(())
    }
}
