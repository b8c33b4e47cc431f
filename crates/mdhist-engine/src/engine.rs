#![forbid(unsafe_code)]

//! The history engine: mode-keyed stacks orchestrated against a surface.
//!
//! [`HistoryEngine`] wires the snapshot codec, the patch kernel, and the
//! per-mode stacks together. It is the only component that touches the
//! stacks; the surface and pipeline only ever receive instructions.
//!
//! Every steady-state operation is a silent no-op when its preconditions
//! fail (exhausted stack, non-editable surface): undo must never crash or
//! error an in-progress editing session.

use mdhist_patch::{DiffMode, PatchSet};
use rustc_hash::FxHashMap;

use crate::error::OptionsError;
use crate::guards::{self, KeyClass, PlatformProfile};
use crate::mode::EditMode;
use crate::options::EngineOptions;
use crate::snapshot;
use crate::stacks::ModeHistory;
use crate::surface::{EditSurface, RenderPipeline};

/// Bounded, cursor-accurate undo/redo over a live editing surface.
///
/// # Example
///
/// ```
/// use mdhist_engine::{EditSurface, EngineOptions, HistoryEngine};
/// use mdhist_engine::test_support::{MemorySurface, RecordingPipeline};
///
/// let mut engine = HistoryEngine::new(EngineOptions::default()).unwrap();
/// let mut surface = MemorySurface::with_content("# hello");
/// let mut pipeline = RecordingPipeline::default();
///
/// engine.clear(&surface);           // seed with the current content
/// surface.type_text(" world");
/// engine.commit(&surface);          // one coalesced record
/// engine.undo(&mut surface, &mut pipeline);
/// assert_eq!(surface.content(), "# hello");
/// ```
#[derive(Debug)]
pub struct HistoryEngine {
    /// Per-mode stacks; entries materialize on first use.
    histories: FxHashMap<EditMode, ModeHistory>,
    /// The mode all operations currently target.
    active: EditMode,
    options: EngineOptions,
}

impl HistoryEngine {
    /// Build an engine, validating the configuration.
    ///
    /// # Errors
    ///
    /// Returns the fatal-at-setup [`OptionsError`] class; steady-state
    /// operations never fail after this point.
    pub fn new(options: EngineOptions) -> Result<Self, OptionsError> {
        options.validate()?;
        Ok(Self {
            histories: FxHashMap::default(),
            active: EditMode::default(),
            options,
        })
    }

    /// The configuration the engine was built with.
    #[must_use]
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// The mode operations currently target.
    #[must_use]
    pub fn active_mode(&self) -> EditMode {
        self.active
    }

    /// The history of `mode`, if it has been used.
    #[must_use]
    pub fn history(&self, mode: EditMode) -> Option<&ModeHistory> {
        self.histories.get(&mode)
    }

    /// Whether an undo would currently change anything.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.histories
            .get(&self.active)
            .is_some_and(ModeHistory::can_undo)
    }

    /// Whether a redo would currently change anything.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.histories
            .get(&self.active)
            .is_some_and(ModeHistory::can_redo)
    }

    /// Finalize the current surface state as one history record.
    ///
    /// Captures a sentinel-bearing snapshot, diffs it back to the last
    /// committed state, and pushes the result. A no-change diff onto a
    /// non-empty stack is skipped; the very first commit is always
    /// recorded to seed the stack.
    pub fn commit<S: EditSurface + ?Sized>(&mut self, surface: &S) {
        let snapshot = snapshot::capture(surface);
        let limit = self.options.stack_size;
        let history = self.histories.entry(self.active).or_default();
        let record = PatchSet::diff(&snapshot, history.last_text(), DiffMode::Lines);
        let recorded = history.record_commit(record, snapshot, limit);
        if recorded {
            tracing::debug!(
                mode = %self.active,
                depth = self.histories[&self.active].undo_depth(),
                "committed history record"
            );
        } else {
            tracing::trace!(mode = %self.active, "no change since last commit; record skipped");
        }
    }

    /// Step the surface back one record.
    ///
    /// No-op while the surface is non-editable or only the seed record
    /// remains.
    pub fn undo<S, P>(&mut self, surface: &mut S, pipeline: &mut P)
    where
        S: EditSurface + ?Sized,
        P: RenderPipeline + ?Sized,
    {
        if !surface.is_editable() {
            tracing::debug!(mode = %self.active, "surface not editable; undo ignored");
            return;
        }
        let Some(text) = self.histories.entry(self.active).or_default().undo_apply() else {
            tracing::trace!(mode = %self.active, "undo floor reached");
            return;
        };
        snapshot::restore(&text, surface, pipeline);
    }

    /// Step the surface forward one undone record.
    ///
    /// No-op while the surface is non-editable or nothing was undone.
    pub fn redo<S, P>(&mut self, surface: &mut S, pipeline: &mut P)
    where
        S: EditSurface + ?Sized,
        P: RenderPipeline + ?Sized,
    {
        if !surface.is_editable() {
            tracing::debug!(mode = %self.active, "surface not editable; redo ignored");
            return;
        }
        let Some(text) = self.histories.entry(self.active).or_default().redo_apply() else {
            tracing::trace!(mode = %self.active, "redo stack empty");
            return;
        };
        snapshot::restore(&text, surface, pipeline);
    }

    /// Record the cursor position *before* the first keystroke of a fresh
    /// stack's first burst.
    ///
    /// An undo of that burst must land the cursor where typing began, not
    /// where the burst ended, so the seed record's sentinel is rewritten
    /// retroactively. Fires at most once per fresh stack, and only when:
    ///
    /// - the surface has a cursor to anchor,
    /// - the stack is exactly the (non-empty) seed with no pending redo,
    /// - no platform guard suppresses capture for this keystroke, and
    /// - the surface text still matches the seed (a chorded shortcut must
    ///   not overwrite the recorded state with unrelated text).
    pub fn record_first_position<S: EditSurface + ?Sized>(
        &mut self,
        surface: &S,
        key: KeyClass,
        profile: &PlatformProfile,
    ) {
        if surface.cursor().is_none() {
            return;
        }
        if !self.histories.entry(self.active).or_default().is_pristine_seed() {
            return;
        }
        if guards::suppress_first_position(profile, key) {
            tracing::debug!(mode = %self.active, ?key, "platform quirk suppressed position capture");
            return;
        }
        let snapshot = snapshot::capture(surface);
        let history = self.histories.entry(self.active).or_default();
        let Some(seed) = history.seed_text() else {
            return;
        };
        if snapshot::normalize_for_compare(&snapshot) != snapshot::normalize_for_compare(&seed) {
            return;
        }
        let record = PatchSet::diff(&snapshot, "", DiffMode::Lines);
        history.rewrite_seed(record, snapshot);
        tracing::debug!(mode = %self.active, "seed cursor rewritten to pre-burst position");
    }

    /// Discard the active mode's history and reseed it from the current
    /// surface content.
    ///
    /// The sole entry point for external resets (new document loaded,
    /// cache cleared).
    pub fn clear<S: EditSurface + ?Sized>(&mut self, surface: &S) {
        self.histories.entry(self.active).or_default().reset();
        self.commit(surface);
        tracing::debug!(mode = %self.active, "history cleared and reseeded");
    }

    /// Switch the active editing mode.
    ///
    /// Records from one mode are never replayed into another: every
    /// mode's history is reset and the new mode reseeds from the current
    /// surface content. Switching to the already-active mode is a no-op.
    pub fn set_mode<S: EditSurface + ?Sized>(&mut self, mode: EditMode, surface: &S) {
        if mode == self.active {
            return;
        }
        for m in EditMode::all() {
            if let Some(history) = self.histories.get_mut(&m) {
                history.reset();
            }
        }
        self.active = mode;
        self.commit(surface);
        tracing::debug!(mode = %mode, "editing mode switched; history reset");
    }
}
