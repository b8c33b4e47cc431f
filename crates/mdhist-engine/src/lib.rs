#![forbid(unsafe_code)]

//! Bounded, cursor-accurate undo/redo history for live markdown editing
//! surfaces.
//!
//! The document is one serialized markup string, continuously mutated by
//! typing. Snapshotting it wholesale on every keystroke is memory-hungry
//! and loses fine-grained cursor continuity, so this engine stores the
//! *difference* between snapshots instead: reversible patch sets computed
//! by [`mdhist-patch`](mdhist_patch), with the cursor encoded as a
//! sentinel token inside the very text being diffed.
//!
//! # Architecture
//!
//! ```text
//!  edit events        debounce boundary          undo/redo requests
//!      │                    │                           │
//!      ▼                    ▼                           ▼
//! ┌───────────────┐   ┌────────────┐   ┌──────────────────────────────┐
//! │ CommitScheduler│──►│ capture()  │──►│ HistoryEngine                │
//! │ (coalescing)   │   │ (sentinel) │   │  mode ─► ModeHistory         │
//! └───────────────┘   └────────────┘   │          undo/redo stacks    │
//!                                       │          last_text           │
//!                                       └──────┬───────────────┬───────┘
//!                                              ▼               ▼
//!                                        PatchSet::apply   restore()
//!                                        (fuzzy anchors)   (surface +
//!                                                           pipeline)
//! ```
//!
//! # Key Components
//!
//! - [`HistoryEngine`] - mode-keyed stacks and the commit/undo/redo discipline
//! - [`snapshot`] - the cursor-sentinel codec
//! - [`CommitScheduler`] - debounce bookkeeping for burst coalescing
//! - [`PlatformProfile`] / [`guards`] - table-driven first-keystroke guards
//! - [`EditSurface`] / [`RenderPipeline`] - the contracts the engine drives
//! - [`test_support`] - in-memory reference implementations
//!
//! # Failure Philosophy
//!
//! Configuration problems fail once, at construction
//! ([`OptionsError`]). Everything afterwards degrades silently: undo on
//! an exhausted stack does nothing, a missing sentinel falls back to
//! end-of-content, and a patch that no longer matches anchors by context
//! or is skipped. An editing session is never crashed by its own history.

pub mod commit;
pub mod engine;
pub mod error;
pub mod guards;
pub mod mode;
pub mod options;
pub mod snapshot;
pub mod stacks;
pub mod surface;
pub mod test_support;

pub use commit::{CommitScheduler, DEFAULT_COMMIT_DELAY};
pub use engine::HistoryEngine;
pub use error::OptionsError;
pub use guards::{KeyClass, PlatformProfile, Quirk};
pub use mode::EditMode;
pub use options::{CacheOptions, EngineOptions};
pub use stacks::ModeHistory;
pub use surface::{EditSurface, RegionId, RenderPipeline};

// The patch kernel types travel with the engine API.
pub use mdhist_patch::{ApplyOutcome, DiffMode, PatchSet};
