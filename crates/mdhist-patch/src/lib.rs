#![forbid(unsafe_code)]

//! Patch kernel for the mdhist history engine.
//!
//! This crate turns pairs of serialized document snapshots into small,
//! reversible edit scripts and applies those scripts back onto text that
//! may have drifted slightly in the meantime.
//!
//! # Key Components
//!
//! - [`DiffOp`] / [`DiffTag`] - a single run of equal, deleted, or inserted text
//! - [`DiffMode`] - character-level diffing, or line-first with character refinement
//! - [`Patch`] - one contiguous hunk with surrounding context
//! - [`PatchSet`] - an ordered hunk sequence; the unit stored in history stacks
//!
//! # Role in mdhist
//!
//! `mdhist-patch` is the leaf crate: it knows nothing about editing
//! surfaces, cursors, or history stacks. `mdhist-engine` diffs consecutive
//! snapshots here and replays (or inverts) the resulting [`PatchSet`]s to
//! move the document backwards and forwards through time.
//!
//! # Example
//!
//! ```
//! use mdhist_patch::{DiffMode, PatchSet};
//!
//! let before = "# Title\n\nHello world.\n";
//! let after = "# Title\n\nHello brave world.\n";
//!
//! let patches = PatchSet::diff(before, after, DiffMode::Lines);
//! assert_eq!(patches.apply(before).text, after);
//! assert_eq!(patches.invert().apply(after).text, before);
//! ```

pub mod diff;
pub mod patch;

pub use diff::{DiffMode, DiffOp, DiffTag};
pub use patch::{ApplyOutcome, CONTEXT_MARGIN, Patch, PatchSet};
