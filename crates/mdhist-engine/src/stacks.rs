#![forbid(unsafe_code)]

//! Bounded undo/redo stacks for one editing mode.
//!
//! [`ModeHistory`] owns the two stacks, the last committed snapshot, and
//! the replay flag for a single mode. Nothing else mutates them: the
//! engine asks for transitions and receives the reconstructed snapshot
//! back.
//!
//! ```text
//! commit(s3)
//! ┌─────────────────────────────────────────────────┐
//! │ Undo Stack: [seed, d1, d2, d3]   last_text: s3  │
//! │ Redo Stack: []                                  │
//! └─────────────────────────────────────────────────┘
//!
//! undo() x2
//! ┌─────────────────────────────────────────────────┐
//! │ Undo Stack: [seed, d1]           last_text: s1  │
//! │ Redo Stack: [d3, d2]             has_undo: true │
//! └─────────────────────────────────────────────────┘
//!
//! commit(s4)  <-- new branch, clears redo
//! ┌─────────────────────────────────────────────────┐
//! │ Undo Stack: [seed, d1, d4]       last_text: s4  │
//! │ Redo Stack: []                                  │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! Each record is the patch set that turns its own snapshot back into the
//! previous one, so undo applies the top record forward and redo applies
//! the popped record inverted.
//!
//! # Invariants
//!
//! 1. `undo_stack.len() <= limit` after any operation; oldest evicted.
//! 2. The seed record (index 0) is never popped; undo needs two records.
//! 3. `redo_stack` is non-empty only between an undo and the next commit.
//! 4. `last_text` is always the snapshot reconstructed by the stack top.
//! 5. An empty diff is only recorded into an empty stack (the seed).

use std::collections::VecDeque;

use mdhist_patch::PatchSet;

/// Undo/redo state for one editing mode.
#[derive(Debug, Clone, Default)]
pub struct ModeHistory {
    /// Records available for undo; seed at the front, newest at the back.
    undo_stack: VecDeque<PatchSet>,
    /// Records undone since the last commit, newest at the back.
    redo_stack: Vec<PatchSet>,
    /// The most recently committed (or reconstructed) snapshot, sentinel
    /// included.
    last_text: String,
    /// Set by undo; a commit seeing it true clears the redo stack.
    has_undo: bool,
}

impl ModeHistory {
    /// Fresh, unseeded history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The last committed snapshot.
    #[must_use]
    pub fn last_text(&self) -> &str {
        &self.last_text
    }

    /// Number of records on the undo stack, seed included.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of records on the redo stack.
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Whether an undo would currently do anything.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() >= 2
    }

    /// Whether a redo would currently do anything.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Whether the stack is exactly the seed record, and that record is
    /// non-empty. This is the only state in which the seed's cursor may
    /// be retroactively rewritten.
    #[must_use]
    pub fn is_pristine_seed(&self) -> bool {
        self.undo_stack.len() == 1
            && !self.undo_stack[0].is_empty()
            && self.redo_stack.is_empty()
    }

    /// The full snapshot recorded in the seed record.
    ///
    /// The seed is always a whole-document record (the first commit diffs
    /// against the empty string), so its first hunk's base side is the
    /// complete text.
    #[must_use]
    pub fn seed_text(&self) -> Option<String> {
        self.undo_stack.front().and_then(PatchSet::first_base_text)
    }

    /// Record a commit: `record` turns `new_text` back into the previous
    /// `last_text`.
    ///
    /// Returns `false` for the no-change case (empty diff onto a
    /// non-empty stack). A pending replay flag clears the redo stack.
    pub fn record_commit(&mut self, record: PatchSet, new_text: String, limit: usize) -> bool {
        if record.is_empty() && !self.undo_stack.is_empty() {
            return false;
        }
        self.last_text = new_text;
        self.undo_stack.push_back(record);
        while self.undo_stack.len() > limit {
            self.undo_stack.pop_front();
        }
        if self.has_undo {
            self.redo_stack.clear();
            self.has_undo = false;
        }
        true
    }

    /// Pop the top record, move it to redo, and reconstruct the previous
    /// snapshot.
    ///
    /// Returns `None` at the seed floor. The record stays intact on the
    /// redo stack; application is best-effort (see
    /// [`PatchSet::apply`]).
    pub fn undo_apply(&mut self) -> Option<String> {
        if self.undo_stack.len() < 2 {
            return None;
        }
        let record = self.undo_stack.pop_back()?;
        let outcome = record.apply(&self.last_text);
        if !outcome.all_applied() {
            tracing::debug!(
                applied = outcome.results.iter().filter(|&&ok| ok).count(),
                hunks = outcome.results.len(),
                "undo applied partially; content drifted out of band"
            );
        }
        self.redo_stack.push(record);
        self.last_text = outcome.text.clone();
        self.has_undo = true;
        Some(outcome.text)
    }

    /// Pop the newest redo record, move it back to undo, and reconstruct
    /// the next snapshot by applying it inverted.
    pub fn redo_apply(&mut self) -> Option<String> {
        let record = self.redo_stack.pop()?;
        let outcome = record.invert().apply(&self.last_text);
        if !outcome.all_applied() {
            tracing::debug!(
                applied = outcome.results.iter().filter(|&&ok| ok).count(),
                hunks = outcome.results.len(),
                "redo applied partially; content drifted out of band"
            );
        }
        self.undo_stack.push_back(record);
        self.last_text = outcome.text.clone();
        Some(outcome.text)
    }

    /// Replace the seed record and last text wholesale.
    ///
    /// Used for first-keystroke cursor capture: the pre-burst cursor
    /// position is written retroactively into the seed. Only valid while
    /// [`is_pristine_seed`](Self::is_pristine_seed) holds.
    pub fn rewrite_seed(&mut self, record: PatchSet, text: String) {
        debug_assert!(self.is_pristine_seed());
        self.undo_stack[0] = record;
        self.last_text = text;
    }

    /// Drop everything: both stacks, the committed text, and the replay
    /// flag.
    pub fn reset(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.last_text.clear();
        self.has_undo = false;
    }
}
