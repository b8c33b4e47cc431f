#![forbid(unsafe_code)]

//! Debounce bookkeeping for commit coalescing.
//!
//! Rapid consecutive edits must collapse into one history record or a
//! 50-deep stack is exhausted within seconds of typing. The timer itself
//! belongs to the embedder (this engine has no event loop); the scheduler
//! only answers "has the quiet period elapsed since the last edit?".
//!
//! A new edit re-arms the boundary: the pending commit is deferred, never
//! stacked, so one burst of typing produces exactly one record no matter
//! how long it runs.

use std::time::{Duration, Instant};

/// Default quiet period before a pending burst commits.
pub const DEFAULT_COMMIT_DELAY: Duration = Duration::from_millis(800);

/// Tracks the debounce boundary between edit bursts.
#[derive(Debug, Clone)]
pub struct CommitScheduler {
    delay: Duration,
    /// Time of the most recent edit; `None` when no commit is pending.
    last_edit: Option<Instant>,
}

impl Default for CommitScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_COMMIT_DELAY)
    }
}

impl CommitScheduler {
    /// Scheduler with the given quiet period.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_edit: None,
        }
    }

    /// The configured quiet period.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record an edit at `now`, re-arming the boundary.
    pub fn note_edit(&mut self, now: Instant) {
        self.last_edit = Some(now);
    }

    /// Whether a commit is pending (edits seen, boundary not yet taken).
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.last_edit.is_some()
    }

    /// Whether the quiet period has elapsed since the last edit.
    #[must_use]
    pub fn boundary_elapsed(&self, now: Instant) -> bool {
        self.last_edit
            .is_some_and(|at| now.saturating_duration_since(at) >= self.delay)
    }

    /// Consume the pending commit if its boundary has elapsed.
    ///
    /// Returns `true` exactly once per burst; the caller then runs the
    /// actual commit against the engine.
    pub fn take_commit(&mut self, now: Instant) -> bool {
        if self.boundary_elapsed(now) {
            self.last_edit = None;
            true
        } else {
            false
        }
    }

    /// Drop any pending commit without firing it.
    pub fn cancel(&mut self) {
        self.last_edit = None;
    }
}
