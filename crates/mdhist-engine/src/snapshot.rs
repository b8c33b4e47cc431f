#![forbid(unsafe_code)]

//! Snapshot codec: serialized content with an embedded cursor sentinel.
//!
//! A snapshot is one opaque string holding the full serialized document,
//! with the cursor encoded as a marker substring *inside* the text being
//! diffed. The generic patch kernel then preserves cursor placement
//! through arbitrary edits for free; carrying a separate integer offset
//! would not compose under insertions and deletions upstream of it.
//!
//! # Invariants
//!
//! 1. A snapshot contains at most one [`CURSOR_SENTINEL`].
//! 2. Content written back to a surface never contains the sentinel;
//!    only stored snapshots (and the diffs between them) do.
//! 3. The sentinel is inserted on a grapheme boundary so a restore can
//!    never split a user-perceived character.

use unicode_segmentation::GraphemeCursor;

use crate::surface::{EditSurface, RegionId, RenderPipeline};

/// Marker substring standing in for the cursor during diff and patch.
pub const CURSOR_SENTINEL: &str = "<wbr>";

/// Renderer-inserted expansion class, stripped when comparing snapshots.
///
/// The renderer toggles this on the node under the cursor; it is
/// presentation state, not document content.
pub const NODE_EXPAND_CLASS: &str = " md-node--expand";

/// Attribute marking a rich region whose rendered form must be rebuilt.
const RERENDER_MARK: &str = "data-render=\"2\"";

/// Attribute carrying a region's stable identifier.
const NODE_ID_ATTR: &str = "data-node-id=\"";

/// Read the surface into a sentinel-bearing snapshot.
///
/// The sentinel lands at the cursor offset, snapped to the nearest
/// grapheme boundary at or before it. When the surface reports no cursor
/// the sentinel is omitted and the snapshot is the raw content.
pub fn capture<S: EditSurface + ?Sized>(surface: &S) -> String {
    let content = surface.content();
    if content.contains(CURSOR_SENTINEL) {
        // A sentinel is already embedded (mid-restore capture); keep it.
        return content;
    }
    match surface.cursor() {
        Some(offset) => {
            let at = snap_to_grapheme(&content, offset);
            let mut snapshot = String::with_capacity(content.len() + CURSOR_SENTINEL.len());
            snapshot.push_str(&content[..at]);
            snapshot.push_str(CURSOR_SENTINEL);
            snapshot.push_str(&content[at..]);
            snapshot
        }
        None => {
            tracing::debug!("surface has no active selection; capturing without sentinel");
            content
        }
    }
}

/// Write a snapshot back to the surface and restore the cursor.
///
/// The sentinel is located and stripped, the stripped text is written,
/// and the cursor moves to the sentinel's offset. Snapshots without a
/// sentinel place the cursor at end of content. Afterwards every region
/// flagged for re-render is handed to the pipeline.
pub fn restore<S, P>(snapshot: &str, surface: &mut S, pipeline: &mut P)
where
    S: EditSurface + ?Sized,
    P: RenderPipeline + ?Sized,
{
    let (text, cursor) = match sentinel_offset(snapshot) {
        Some(offset) => (strip_sentinel(snapshot), Some(offset)),
        None => (snapshot.to_string(), None),
    };
    surface.set_content(&text);
    match cursor {
        Some(offset) => surface.set_cursor(offset),
        None => {
            tracing::debug!("no cursor sentinel in snapshot; falling back to end of content");
            surface.set_cursor(text.len());
        }
    }
    let regions = render_regions(&text);
    tracing::debug!(bytes = text.len(), regions = regions.len(), "restored snapshot");
    pipeline.reprocess(&regions);
}

/// Byte offset of the sentinel, if present.
#[must_use]
pub fn sentinel_offset(snapshot: &str) -> Option<usize> {
    snapshot.find(CURSOR_SENTINEL)
}

/// Remove the sentinel (first occurrence only; snapshots carry at most
/// one).
#[must_use]
pub fn strip_sentinel(snapshot: &str) -> String {
    snapshot.replacen(CURSOR_SENTINEL, "", 1)
}

/// Canonical form for snapshot equality checks.
///
/// Drops the sentinel and the renderer's expansion class so cursor moves
/// and hover-state churn do not read as document edits.
#[must_use]
pub fn normalize_for_compare(snapshot: &str) -> String {
    strip_sentinel(snapshot).replacen(NODE_EXPAND_CLASS, "", 1)
}

/// Extract the regions flagged for re-render.
///
/// Regions carry a stable `data-node-id` when the serializer assigned
/// one; unidentified regions fall back to their ordinal so the pipeline
/// can still address them positionally.
#[must_use]
pub fn render_regions(content: &str) -> Vec<RegionId> {
    let mut regions = Vec::new();
    for (ordinal, (mark_at, _)) in content.match_indices(RERENDER_MARK).enumerate() {
        let tag_start = content[..mark_at].rfind('<').unwrap_or(0);
        let tag_end = content[mark_at..]
            .find('>')
            .map_or(content.len(), |rel| mark_at + rel);
        let tag = &content[tag_start..tag_end];
        let id = tag
            .find(NODE_ID_ATTR)
            .map(|at| at + NODE_ID_ATTR.len())
            .and_then(|from| tag[from..].find('"').map(|len| &tag[from..from + len]))
            .map_or_else(|| format!("region-{ordinal}"), str::to_string);
        regions.push(RegionId(id));
    }
    regions
}

/// Snap `offset` into `content` onto a grapheme boundary at or before it.
fn snap_to_grapheme(content: &str, offset: usize) -> usize {
    let mut offset = offset.min(content.len());
    while !content.is_char_boundary(offset) {
        offset -= 1;
    }
    let mut cursor = GraphemeCursor::new(offset, content.len(), true);
    match cursor.is_boundary(content, 0) {
        Ok(true) => offset,
        _ => cursor
            .prev_boundary(content, 0)
            .ok()
            .flatten()
            .unwrap_or(0),
    }
}
