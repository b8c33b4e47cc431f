#![forbid(unsafe_code)]

//! Minimal edit scripts over opaque text.
//!
//! The diff layer produces runs of [`DiffOp`]s from two snapshot strings.
//! Content is treated as plain text: markup, code fences, and math blocks
//! are just bytes here. Cursor preservation happens upstream by embedding
//! a sentinel in the text being diffed, so nothing in this module needs to
//! know about cursors at all.
//!
//! # Invariants
//!
//! 1. Concatenating the `Equal` + `Delete` op texts in order reproduces the
//!    base string exactly.
//! 2. Concatenating the `Equal` + `Insert` op texts in order reproduces the
//!    target string exactly.
//! 3. Adjacent ops never share a tag (runs are coalesced).
//!
//! # Performance
//!
//! Snapshots of a live document can reach tens of KB, where a pure
//! character-level Myers pass is too slow for interactive latency.
//! [`DiffMode::Lines`] first diffs whole lines, then refines each changed
//! run character-by-character, so the expensive pass only ever sees the
//! lines that actually changed.

use similar::{ChangeTag, TextDiff};

/// Kind of a single edit-script run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiffTag {
    /// Text present in both base and target.
    Equal,
    /// Text present only in the base; removed by the edit.
    Delete,
    /// Text present only in the target; added by the edit.
    Insert,
}

impl DiffTag {
    /// The tag describing the opposite edit.
    ///
    /// `Equal` is its own inverse.
    #[must_use]
    pub fn inverted(self) -> Self {
        match self {
            Self::Equal => Self::Equal,
            Self::Delete => Self::Insert,
            Self::Insert => Self::Delete,
        }
    }
}

/// One contiguous run of equal, deleted, or inserted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffOp {
    /// What this run does to the base text.
    pub tag: DiffTag,
    /// The run's text.
    pub text: String,
}

impl DiffOp {
    /// Create an `Equal` run.
    #[must_use]
    pub fn equal(text: impl Into<String>) -> Self {
        Self {
            tag: DiffTag::Equal,
            text: text.into(),
        }
    }

    /// Create a `Delete` run.
    #[must_use]
    pub fn delete(text: impl Into<String>) -> Self {
        Self {
            tag: DiffTag::Delete,
            text: text.into(),
        }
    }

    /// Create an `Insert` run.
    #[must_use]
    pub fn insert(text: impl Into<String>) -> Self {
        Self {
            tag: DiffTag::Insert,
            text: text.into(),
        }
    }
}

/// Tokenization strategy for the minimal-edit computation.
///
/// Output ops are always character-granular; `Lines` only changes how the
/// work is partitioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiffMode {
    /// Diff character-by-character in one pass.
    Chars,
    /// Treat lines as atomic units first, then refine changed runs
    /// character-by-character. Preferred for multi-KB snapshots.
    #[default]
    Lines,
}

/// Compute the edit-script runs that transform `base` into `target`.
#[must_use]
pub fn diff_ops(base: &str, target: &str, mode: DiffMode) -> Vec<DiffOp> {
    let ops = match mode {
        DiffMode::Chars => char_ops(base, target),
        DiffMode::Lines => line_refined_ops(base, target),
    };
    coalesce(ops)
}

fn char_ops(base: &str, target: &str) -> Vec<DiffOp> {
    let diff = TextDiff::from_chars(base, target);
    runs(diff.iter_all_changes().map(|c| (c.tag(), c.value())))
}

/// Line-first pass: paired delete/insert line runs are re-diffed by
/// character so single-word edits inside a long line stay small.
fn line_refined_ops(base: &str, target: &str) -> Vec<DiffOp> {
    let diff = TextDiff::from_lines(base, target);
    let coarse = runs(diff.iter_all_changes().map(|c| (c.tag(), c.value())));

    let mut out = Vec::with_capacity(coarse.len());
    let mut pending_delete = String::new();
    let mut pending_insert = String::new();
    for op in coarse {
        match op.tag {
            DiffTag::Delete => pending_delete.push_str(&op.text),
            DiffTag::Insert => pending_insert.push_str(&op.text),
            DiffTag::Equal => {
                flush_pending(&mut out, &mut pending_delete, &mut pending_insert);
                out.push(op);
            }
        }
    }
    flush_pending(&mut out, &mut pending_delete, &mut pending_insert);
    out
}

fn flush_pending(out: &mut Vec<DiffOp>, deleted: &mut String, inserted: &mut String) {
    match (deleted.is_empty(), inserted.is_empty()) {
        (true, true) => {}
        (false, true) => out.push(DiffOp::delete(std::mem::take(deleted))),
        (true, false) => out.push(DiffOp::insert(std::mem::take(inserted))),
        (false, false) => {
            let refined = char_ops(deleted, inserted);
            tracing::trace!(
                deleted = deleted.len(),
                inserted = inserted.len(),
                ops = refined.len(),
                "refined changed line run"
            );
            out.extend(refined);
            deleted.clear();
            inserted.clear();
        }
    }
}

/// Group consecutive same-tag changes into single ops.
fn runs<'a, I>(changes: I) -> Vec<DiffOp>
where
    I: IntoIterator<Item = (ChangeTag, &'a str)>,
{
    let mut out: Vec<DiffOp> = Vec::new();
    for (tag, value) in changes {
        let tag = match tag {
            ChangeTag::Equal => DiffTag::Equal,
            ChangeTag::Delete => DiffTag::Delete,
            ChangeTag::Insert => DiffTag::Insert,
        };
        match out.last_mut() {
            Some(last) if last.tag == tag => last.text.push_str(value),
            _ => out.push(DiffOp { tag, text: value.to_string() }),
        }
    }
    out
}

/// Drop empty runs and merge adjacent same-tag runs left over from
/// refinement.
fn coalesce(ops: Vec<DiffOp>) -> Vec<DiffOp> {
    let mut out: Vec<DiffOp> = Vec::with_capacity(ops.len());
    for op in ops {
        if op.text.is_empty() {
            continue;
        }
        match out.last_mut() {
            Some(last) if last.tag == op.tag => last.text.push_str(&op.text),
            _ => out.push(op),
        }
    }
    out
}
