#![forbid(unsafe_code)]

//! Context-anchored patch hunks.
//!
//! A [`PatchSet`] is the stored form of one history record: the ordered
//! hunks that turn one snapshot into another. Hunks keep a few characters
//! of surrounding context so they can be re-anchored when the text they
//! are applied to has drifted (the live surface may pick up
//! renderer-inserted attributes between snapshots).
//!
//! ```text
//! base:    ...and the quick brown fox jumped...
//!                       ─┬── ───┬─
//! hunk:        [Equal "ick "][Delete "brown"][Insert "red"][Equal " fox"]
//!                       └ context margin (4 chars each side)
//! ```
//!
//! # Invariants
//!
//! 1. Hunks are ordered by ascending `start_base` and never overlap.
//! 2. `base_len` / `target_len` always equal the byte length of the hunk's
//!    base-side / target-side text.
//! 3. `apply` never fails: hunks that cannot be anchored are skipped and
//!    reported through [`ApplyOutcome::results`].
//! 4. `invert` is an involution: `p.invert().invert()` applies exactly
//!    like `p`.

use smallvec::SmallVec;

use crate::diff::{DiffMode, DiffOp, DiffTag, diff_ops};

/// Characters of equal context kept on each side of a hunk.
pub const CONTEXT_MARGIN: usize = 4;

/// One contiguous hunk: context, deletions, and insertions covering a
/// single changed region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Byte offset of the hunk in the base text.
    start_base: usize,
    /// Byte offset of the hunk in the target text.
    start_target: usize,
    /// Byte length of the hunk's base-side text.
    base_len: usize,
    /// Byte length of the hunk's target-side text.
    target_len: usize,
    /// Edit runs, starting and ending with up to [`CONTEXT_MARGIN`]
    /// characters of `Equal` context.
    ops: SmallVec<[DiffOp; 4]>,
}

impl Patch {
    fn open(start_base: usize, start_target: usize) -> Self {
        Self {
            start_base,
            start_target,
            base_len: 0,
            target_len: 0,
            ops: SmallVec::new(),
        }
    }

    fn push_op(&mut self, op: DiffOp) {
        match op.tag {
            DiffTag::Equal => {
                self.base_len += op.text.len();
                self.target_len += op.text.len();
            }
            DiffTag::Delete => self.base_len += op.text.len(),
            DiffTag::Insert => self.target_len += op.text.len(),
        }
        self.ops.push(op);
    }

    /// Edit runs of this hunk.
    #[must_use]
    pub fn ops(&self) -> &[DiffOp] {
        &self.ops
    }

    /// Byte offset of this hunk in the base text.
    #[must_use]
    pub fn start_base(&self) -> usize {
        self.start_base
    }

    /// The text this hunk expects to find in the base.
    #[must_use]
    pub fn base_text(&self) -> String {
        self.ops
            .iter()
            .filter(|op| op.tag != DiffTag::Insert)
            .map(|op| op.text.as_str())
            .collect()
    }

    /// The text this hunk writes into the result.
    #[must_use]
    pub fn target_text(&self) -> String {
        self.ops
            .iter()
            .filter(|op| op.tag != DiffTag::Delete)
            .map(|op| op.text.as_str())
            .collect()
    }

    fn inverted(&self) -> Self {
        let mut ops: SmallVec<[DiffOp; 4]> = self
            .ops
            .iter()
            .map(|op| DiffOp {
                tag: op.tag.inverted(),
                text: op.text.clone(),
            })
            .collect();
        normalize_runs(&mut ops);
        Self {
            start_base: self.start_target,
            start_target: self.start_base,
            base_len: self.target_len,
            target_len: self.base_len,
            ops,
        }
    }
}

/// Canonical op order inside a changed run: deletions before insertions.
fn normalize_runs(ops: &mut SmallVec<[DiffOp; 4]>) {
    let mut i = 0;
    while i < ops.len() {
        if ops[i].tag == DiffTag::Equal {
            i += 1;
            continue;
        }
        let start = i;
        while i < ops.len() && ops[i].tag != DiffTag::Equal {
            i += 1;
        }
        ops[start..i].sort_by_key(|op| match op.tag {
            DiffTag::Delete => 0,
            DiffTag::Insert => 1,
            DiffTag::Equal => 2,
        });
    }
}

/// Result of applying a [`PatchSet`].
///
/// `results[i]` is `false` when hunk `i` could not be anchored and was
/// skipped; the returned text is then the best-effort partial application.
#[derive(Debug, Clone)]
pub struct ApplyOutcome {
    /// The transformed text.
    pub text: String,
    /// Per-hunk success flags, in hunk order.
    pub results: Vec<bool>,
}

impl ApplyOutcome {
    /// `true` when every hunk anchored and applied.
    #[must_use]
    pub fn all_applied(&self) -> bool {
        self.results.iter().all(|&ok| ok)
    }
}

/// An ordered sequence of hunks; one history record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchSet {
    patches: Vec<Patch>,
}

impl PatchSet {
    /// Compute the patches that transform `base` into `target`.
    ///
    /// Two identical texts produce an empty set, the "no change" record.
    #[must_use]
    pub fn diff(base: &str, target: &str, mode: DiffMode) -> Self {
        let set = build_patches(diff_ops(base, target, mode));
        tracing::debug!(
            base = base.len(),
            target = target.len(),
            hunks = set.patches.len(),
            "computed patch set"
        );
        set
    }

    /// `true` when this set describes no change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// Number of hunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patches.len()
    }

    /// The hunks, ordered by ascending base offset.
    #[must_use]
    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    /// Base-side text of the first hunk, if any.
    ///
    /// For a whole-document record (a diff against the empty string) this
    /// is the complete recorded snapshot.
    #[must_use]
    pub fn first_base_text(&self) -> Option<String> {
        self.patches.first().map(Patch::base_text)
    }

    /// Apply every hunk to `base`, best-effort.
    ///
    /// Each hunk anchors by exact match of its expected base text at the
    /// delta-adjusted offset, falling back to the occurrence nearest that
    /// offset anywhere in the text. A hunk with no match anywhere is
    /// skipped and reported in [`ApplyOutcome::results`]; this call never
    /// fails.
    #[must_use]
    pub fn apply(&self, base: &str) -> ApplyOutcome {
        let mut text = base.to_string();
        let mut results = Vec::with_capacity(self.patches.len());
        let mut delta: isize = 0;

        for patch in &self.patches {
            let needle = patch.base_text();
            let replacement = patch.target_text();
            let projected = patch.start_base as isize + delta;
            let expected = clamp_boundary(&text, projected.max(0) as usize);

            let anchor = if needle.is_empty() {
                Some(expected)
            } else {
                nearest_match(&text, &needle, expected)
            };
            let Some(anchor) = anchor else {
                tracing::debug!(
                    start_base = patch.start_base,
                    needle = needle.len(),
                    "hunk context not found; skipping"
                );
                results.push(false);
                continue;
            };
            if anchor != expected {
                tracing::trace!(expected, anchor, "hunk re-anchored by context search");
            }

            text.replace_range(anchor..anchor + needle.len(), &replacement);
            delta = anchor as isize + replacement.len() as isize
                - patch.start_base as isize
                - needle.len() as isize;
            results.push(true);
        }

        ApplyOutcome { text, results }
    }

    /// The set that undoes this one.
    ///
    /// Insert and delete roles are swapped, base/target coordinates are
    /// exchanged, and changed runs are normalized to delete-before-insert
    /// order.
    #[must_use]
    pub fn invert(&self) -> Self {
        Self {
            patches: self.patches.iter().map(Patch::inverted).collect(),
        }
    }
}

/// Group edit runs into context-carrying hunks.
fn build_patches(ops: Vec<DiffOp>) -> PatchSet {
    if ops.iter().all(|op| op.tag == DiffTag::Equal) {
        return PatchSet::default();
    }

    let mut patches = Vec::new();
    let mut current: Option<Patch> = None;
    // Most recent equal text seen while no hunk was open; its tail becomes
    // the next hunk's leading context.
    let mut last_equal = String::new();
    let mut pos_base = 0usize;
    let mut pos_target = 0usize;
    let total = ops.len();

    for (idx, op) in ops.into_iter().enumerate() {
        match op.tag {
            DiffTag::Equal => {
                let advance = op.text.len();
                if let Some(patch) = current.as_mut() {
                    let char_len = op.text.chars().count();
                    if char_len <= 2 * CONTEXT_MARGIN && idx != total - 1 {
                        patch.push_op(op);
                    } else {
                        let tail: String = op.text.chars().take(CONTEXT_MARGIN).collect();
                        if !tail.is_empty() {
                            patch.push_op(DiffOp::equal(tail));
                        }
                        patches.push(current.take().expect("hunk is open"));
                        last_equal = op.text;
                    }
                } else {
                    last_equal = op.text;
                }
                pos_base += advance;
                pos_target += advance;
            }
            DiffTag::Delete | DiffTag::Insert => {
                if current.is_none() {
                    let context = tail_chars(&last_equal, CONTEXT_MARGIN);
                    let mut patch =
                        Patch::open(pos_base - context.len(), pos_target - context.len());
                    if !context.is_empty() {
                        patch.push_op(DiffOp::equal(context));
                    }
                    current = Some(patch);
                }
                let patch = current.as_mut().expect("hunk just opened");
                match op.tag {
                    DiffTag::Delete => pos_base += op.text.len(),
                    DiffTag::Insert => pos_target += op.text.len(),
                    DiffTag::Equal => unreachable!("outer match covers Equal"),
                }
                patch.push_op(op);
            }
        }
    }

    if let Some(patch) = current {
        patches.push(patch);
    }
    PatchSet { patches }
}

/// Last `count` characters of `s`.
fn tail_chars(s: &str, count: usize) -> String {
    let chars = s.chars().count();
    let skip = chars.saturating_sub(count);
    s.chars().skip(skip).collect()
}

/// Clamp `pos` into `s` on a `char` boundary.
fn clamp_boundary(s: &str, pos: usize) -> usize {
    let mut pos = pos.min(s.len());
    while !s.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

/// Offset of the occurrence of `needle` nearest to `expected`.
///
/// Overlapping occurrences count: a periodic needle like `"aaaa"` must
/// not shadow the true anchor, or exact application of a patch to its own
/// base would corrupt the text. `expected` must lie on a `char` boundary.
fn nearest_match(hay: &str, needle: &str, expected: usize) -> Option<usize> {
    if hay[expected..].starts_with(needle) {
        return Some(expected);
    }
    let mut best: Option<usize> = None;
    let mut from = 0;
    while let Some(rel) = hay.get(from..).and_then(|rest| rest.find(needle)) {
        let at = from + rel;
        if best.is_none_or(|b| at.abs_diff(expected) < b.abs_diff(expected)) {
            best = Some(at);
        } else {
            // Positions ascend, so distances only grow from here on.
            break;
        }
        // Step one char, not one match, so overlapping occurrences are seen.
        from = at + hay[at..].chars().next().map_or(1, char::len_utf8);
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_texts_produce_empty_set() {
        let set = PatchSet::diff("same", "same", DiffMode::Chars);
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
        let outcome = set.apply("same");
        assert_eq!(outcome.text, "same");
        assert!(outcome.all_applied());
    }

    #[test]
    fn round_trip_small_edit() {
        let a = "The quick brown fox jumps over the lazy dog";
        let b = "The quick red fox leaps over the lazy dog";
        let set = PatchSet::diff(a, b, DiffMode::Chars);
        assert!(!set.is_empty());
        assert_eq!(set.apply(a).text, b);
        assert_eq!(set.invert().apply(b).text, a);
    }

    #[test]
    fn round_trip_line_mode_document() {
        let a = "# Title\n\nfirst paragraph\n\n```rust\nfn main() {}\n```\n";
        let b = "# Title\n\nfirst paragraph, edited\n\nsecond paragraph\n\n```rust\nfn main() {}\n```\n";
        let set = PatchSet::diff(a, b, DiffMode::Lines);
        assert_eq!(set.apply(a).text, b);
        assert_eq!(set.invert().apply(b).text, a);
    }

    #[test]
    fn whole_document_record_exposes_base_text() {
        // The seed record shape: current text diffed against "".
        let set = PatchSet::diff("# hello<wbr> world", "", DiffMode::Lines);
        assert_eq!(set.len(), 1);
        assert_eq!(set.first_base_text().as_deref(), Some("# hello<wbr> world"));
        assert_eq!(set.apply("# hello<wbr> world").text, "");
    }

    #[test]
    fn empty_set_has_no_first_base_text() {
        assert_eq!(PatchSet::default().first_base_text(), None);
    }

    #[test]
    fn apply_survives_out_of_band_prefix_drift() {
        // The live surface gained a renderer attribute before the hunk's
        // region; context search re-anchors the hunk.
        let a = "alpha beta gamma delta";
        let b = "alpha beta GAMMA delta";
        let set = PatchSet::diff(a, b, DiffMode::Chars);

        let drifted = format!("<section> {a}");
        let outcome = set.apply(&drifted);
        assert!(outcome.all_applied());
        assert_eq!(outcome.text, format!("<section> {b}"));
    }

    #[test]
    fn unmatched_hunks_are_skipped_not_fatal() {
        let a = "one two three";
        let b = "one 2 three";
        let set = PatchSet::diff(a, b, DiffMode::Chars);

        let outcome = set.apply("completely unrelated text");
        assert!(!outcome.all_applied());
        assert_eq!(outcome.text, "completely unrelated text");
        assert_eq!(outcome.results, vec![false]);
    }

    #[test]
    fn multiple_hunks_apply_in_order() {
        let a = "aaaa 1111 bbbb 2222 cccc 3333 dddd";
        let b = "aaaa XXXX bbbb 2222 cccc YYYY dddd";
        let set = PatchSet::diff(a, b, DiffMode::Chars);
        assert!(set.len() >= 2, "expected separate hunks, got {}", set.len());
        let outcome = set.apply(a);
        assert!(outcome.all_applied());
        assert_eq!(outcome.text, b);
    }

    #[test]
    fn periodic_text_round_trips_exactly() {
        // Context here is periodic, so the hunk's needle occurs at
        // overlapping offsets; the anchor search must still pick the true
        // position, not the first non-overlapping occurrence.
        let a = "aaaaaaaa";
        let b = "aaaaaaXaa";
        let set = PatchSet::diff(a, b, DiffMode::Chars);
        assert_eq!(set.apply(a).text, b);
        assert_eq!(set.invert().apply(b).text, a);
    }

    #[test]
    fn invert_is_an_involution() {
        let a = "line one\nline two\nline three\n";
        let b = "line 1\nline two\nline 3\n";
        let set = PatchSet::diff(a, b, DiffMode::Lines);
        let twice = set.invert().invert();
        assert_eq!(twice.apply(a).text, b);
    }

    #[test]
    fn growth_only_edit_round_trips() {
        let a = "";
        let b = "first keystroke";
        let set = PatchSet::diff(a, b, DiffMode::Lines);
        assert_eq!(set.apply(a).text, b);
        assert_eq!(set.invert().apply(b).text, a);
    }

    #[test]
    fn sentinel_token_rides_through_patches() {
        // Cursor sentinels are plain text to the patch kernel; moving one
        // between snapshots must round-trip like any other edit.
        let a = "# head\n\nbody<wbr> text\n";
        let b = "# head\n\nbody more<wbr> text\n";
        let set = PatchSet::diff(a, b, DiffMode::Lines);
        assert_eq!(set.apply(a).text, b);
        assert_eq!(set.invert().apply(b).text, a);
    }

    #[test]
    fn multibyte_round_trip_both_modes() {
        let a = "日本語のテキスト 👩‍💻 end";
        let b = "日本語の長いテキスト 👩‍💻 end!";
        for mode in [DiffMode::Chars, DiffMode::Lines] {
            let set = PatchSet::diff(a, b, mode);
            assert_eq!(set.apply(a).text, b, "mode {mode:?}");
            assert_eq!(set.invert().apply(b).text, a, "mode {mode:?}");
        }
    }

    #[test]
    fn hunks_carry_bounded_context() {
        let a = format!("{}CHANGE{}", "x".repeat(100), "y".repeat(100));
        let b = format!("{}ALTERED{}", "x".repeat(100), "y".repeat(100));
        let set = PatchSet::diff(&a, &b, DiffMode::Chars);
        assert_eq!(set.len(), 1);
        let hunk = &set.patches()[0];
        // The hunk starts at the changed region minus the margin.
        assert_eq!(hunk.start_base(), 100 - CONTEXT_MARGIN);
        // Leading and trailing equal context are clipped to the margin.
        let first = hunk.ops().first().expect("hunk has ops");
        let last = hunk.ops().last().expect("hunk has ops");
        assert_eq!(first.tag, DiffTag::Equal);
        assert!(first.text.chars().count() <= CONTEXT_MARGIN);
        assert_eq!(last.tag, DiffTag::Equal);
        assert!(last.text.chars().count() <= CONTEXT_MARGIN);
        assert_eq!(set.apply(&a).text, b);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        // A small alphabet forces repeated substrings, the worst case for
        // context anchoring.
        fn doc() -> impl Strategy<Value = String> {
            proptest::string::string_regex("[abc \\n]{0,60}").expect("valid regex")
        }

        proptest! {
            #[test]
            fn round_trip_chars(a in doc(), b in doc()) {
                let set = PatchSet::diff(&a, &b, DiffMode::Chars);
                prop_assert_eq!(set.apply(&a).text, b.clone());
                prop_assert_eq!(set.invert().apply(&b).text, a);
            }

            #[test]
            fn round_trip_lines(a in doc(), b in doc()) {
                let set = PatchSet::diff(&a, &b, DiffMode::Lines);
                prop_assert_eq!(set.apply(&a).text, b.clone());
                prop_assert_eq!(set.invert().apply(&b).text, a);
            }

            #[test]
            fn self_diff_is_empty(a in doc()) {
                prop_assert!(PatchSet::diff(&a, &a, DiffMode::Lines).is_empty());
            }
        }
    }
}
