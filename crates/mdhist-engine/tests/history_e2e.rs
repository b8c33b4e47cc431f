#![forbid(unsafe_code)]

//! End-to-end tests for the history engine.
//!
//! These drive the public API the way an embedder does: a surface, a
//! render pipeline, and the engine's commit/undo/redo entry points.
//!
//! # Invariants exercised
//!
//! 1. **Round trip**: undo then redo restores content and cursor exactly.
//! 2. **Seed floor**: the first record is never popped.
//! 3. **Redo invalidation**: a fresh commit after undo kills redo.
//! 4. **Bounded depth**: the stack never exceeds the configured size.
//! 5. **Editability gate**: a non-editable surface no-ops undo and redo.

use std::time::{Duration, Instant};

use mdhist_engine::test_support::{MemorySurface, RecordingPipeline};
use mdhist_engine::{
    CommitScheduler, EditMode, EditSurface, EngineOptions, HistoryEngine, KeyClass,
    PlatformProfile,
};

fn fresh(content: &str) -> (HistoryEngine, MemorySurface, RecordingPipeline) {
    let engine = HistoryEngine::new(EngineOptions::default()).expect("valid options");
    let surface = MemorySurface::with_content(content);
    let pipeline = RecordingPipeline::default();
    (engine, surface, pipeline)
}

#[test]
fn typing_session_walks_backwards_and_forwards() {
    let (mut engine, mut surface, mut pipeline) = fresh("");
    engine.clear(&surface);

    for text in ["a", "b", "c"] {
        surface.type_text(text);
        engine.commit(&surface);
    }
    assert_eq!(surface.content(), "abc");

    engine.undo(&mut surface, &mut pipeline);
    assert_eq!(surface.content(), "ab");

    engine.undo(&mut surface, &mut pipeline);
    assert_eq!(surface.content(), "a");

    engine.redo(&mut surface, &mut pipeline);
    assert_eq!(surface.content(), "ab");

    // A new commit invalidates the remaining redo.
    surface.type_text("X");
    engine.commit(&surface);
    assert_eq!(surface.content(), "abX");

    engine.redo(&mut surface, &mut pipeline);
    assert_eq!(surface.content(), "abX", "redo stack was cleared");
}

#[test]
fn undo_exhausts_at_the_seed_and_stays_there() {
    let (mut engine, mut surface, mut pipeline) = fresh("base");
    engine.clear(&surface);
    surface.type_text("!");
    engine.commit(&surface);

    engine.undo(&mut surface, &mut pipeline);
    assert_eq!(surface.content(), "base");

    for _ in 0..5 {
        engine.undo(&mut surface, &mut pipeline);
    }
    assert_eq!(surface.content(), "base", "seed record is never popped");
}

#[test]
fn cursor_round_trips_through_undo_redo() {
    let (mut engine, mut surface, mut pipeline) = fresh("lorem ipsum");
    surface.set_cursor(5);
    engine.clear(&surface);

    surface.type_text(" dolor");
    engine.commit(&surface);
    assert_eq!(surface.cursor(), Some(11));

    engine.undo(&mut surface, &mut pipeline);
    assert_eq!(surface.content(), "lorem ipsum");
    assert_eq!(surface.cursor(), Some(5));

    engine.redo(&mut surface, &mut pipeline);
    assert_eq!(surface.content(), "lorem dolor ipsum");
    assert_eq!(surface.cursor(), Some(11));
}

#[test]
fn non_editable_surface_ignores_requests_regardless_of_stack() {
    let (mut engine, mut surface, mut pipeline) = fresh("content");
    engine.clear(&surface);
    surface.type_text(" more");
    engine.commit(&surface);

    surface.set_editable(false);
    engine.undo(&mut surface, &mut pipeline);
    engine.redo(&mut surface, &mut pipeline);
    assert_eq!(surface.content(), "content more");
    assert!(pipeline.calls.is_empty(), "no restores ran");
}

#[test]
fn deep_session_respects_the_stack_bound() {
    let options = EngineOptions::default().with_stack_size(50);
    let mut engine = HistoryEngine::new(options).expect("valid options");
    let mut surface = MemorySurface::new();
    let mut pipeline = RecordingPipeline::default();
    engine.clear(&surface);

    for i in 0..80 {
        surface.type_text(&format!("{i},"));
        engine.commit(&surface);
    }
    let history = engine.history(EditMode::InstantRender).expect("mode used");
    assert_eq!(history.undo_depth(), 50);

    // Only 49 steps of undo are reachable past the current state.
    let mut steps = 0;
    while engine.can_undo() {
        engine.undo(&mut surface, &mut pipeline);
        steps += 1;
    }
    assert_eq!(steps, 49);
    assert_ne!(surface.content(), "", "earliest records were evicted");
}

#[test]
fn first_burst_undo_lands_on_the_pre_burst_cursor() {
    let (mut engine, mut surface, mut pipeline) = fresh("fn main() {}");
    engine.clear(&surface);

    // Fresh stack; the embedder reports the burst-opening keystroke.
    surface.set_cursor(11);
    engine.record_first_position(&surface, KeyClass::Text, &PlatformProfile::none());
    surface.type_text("42");
    engine.commit(&surface);
    assert_eq!(surface.content(), "fn main() {42}");

    engine.undo(&mut surface, &mut pipeline);
    assert_eq!(surface.content(), "fn main() {}");
    assert_eq!(surface.cursor(), Some(11), "cursor where the burst began");
}

#[test]
fn rendered_regions_are_reprocessed_after_restore() {
    let doc_plain = "# doc\n<pre data-node-id=\"blk1\" data-render=\"1\">fence</pre>";
    let doc_dirty = "# doc\n<pre data-node-id=\"blk1\" data-render=\"2\">fence</pre>\nmore";

    let (mut engine, mut surface, mut pipeline) = fresh(doc_plain);
    engine.clear(&surface);
    surface.set_content(doc_dirty);
    surface.set_cursor(doc_dirty.len());
    engine.commit(&surface);

    engine.undo(&mut surface, &mut pipeline);
    engine.redo(&mut surface, &mut pipeline);

    assert_eq!(pipeline.calls.len(), 2, "one reprocess per restore");
    // The redo restored the block flagged for re-render.
    let last = pipeline.calls.last().expect("redo reprocessed");
    assert_eq!(last.len(), 1);
    assert_eq!(last[0].as_str(), "blk1");
}

#[test]
fn debounced_burst_produces_a_single_record() {
    let (mut engine, mut surface, _pipeline) = fresh("");
    engine.clear(&surface);
    let depth_before = engine
        .history(EditMode::InstantRender)
        .expect("seeded")
        .undo_depth();

    let mut scheduler = CommitScheduler::new(Duration::from_millis(100));
    let start = Instant::now();

    // Five keystrokes, 10ms apart: each re-arms the boundary.
    for (i, ch) in ["h", "e", "l", "l", "o"].iter().enumerate() {
        let now = start + Duration::from_millis(10 * i as u64);
        surface.type_text(ch);
        scheduler.note_edit(now);
        if scheduler.take_commit(now) {
            engine.commit(&surface);
        }
    }

    // Quiet period passes; the caller-owned timer fires once.
    let after = start + Duration::from_millis(200);
    if scheduler.take_commit(after) {
        engine.commit(&surface);
    }

    let history = engine.history(EditMode::InstantRender).expect("seeded");
    assert_eq!(
        history.undo_depth(),
        depth_before + 1,
        "burst coalesced into one record"
    );
    assert_eq!(surface.content(), "hello");
}

#[test]
fn mode_switch_discards_cross_mode_records() {
    let (mut engine, mut surface, mut pipeline) = fresh("shared");
    engine.clear(&surface);
    surface.type_text(" state");
    engine.commit(&surface);
    assert!(engine.can_undo());

    engine.set_mode(EditMode::Wysiwyg, &surface);
    engine.undo(&mut surface, &mut pipeline);
    assert_eq!(
        surface.content(),
        "shared state",
        "no record from the previous mode is replayable"
    );
}
