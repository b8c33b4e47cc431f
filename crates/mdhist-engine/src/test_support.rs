#![forbid(unsafe_code)]

//! In-memory reference implementations of the engine's collaborators.
//!
//! These back the crate's own tests and give embedders a starting point
//! for harnesses: [`MemorySurface`] is a minimal but honest
//! [`EditSurface`] (owned string + clamped cursor), and
//! [`RecordingPipeline`] captures every reprocess request for assertions.

use crate::surface::{EditSurface, RegionId, RenderPipeline};

/// An editable in-memory surface.
#[derive(Debug, Clone)]
pub struct MemorySurface {
    content: String,
    cursor: Option<usize>,
    editable: bool,
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySurface {
    /// Empty, editable surface with the cursor at offset 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            content: String::new(),
            cursor: Some(0),
            editable: true,
        }
    }

    /// Surface holding `content` with the cursor at the end.
    #[must_use]
    pub fn with_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
            cursor: Some(content.len()),
            editable: true,
        }
    }

    /// Drop the cursor, modeling a surface with no active selection.
    #[must_use]
    pub fn without_cursor(mut self) -> Self {
        self.cursor = None;
        self
    }

    /// Toggle editability.
    pub fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    /// Insert `text` at the cursor and advance past it, like typing.
    pub fn type_text(&mut self, text: &str) {
        let at = self.cursor.unwrap_or(self.content.len());
        let at = clamp_boundary(&self.content, at);
        self.content.insert_str(at, text);
        self.cursor = Some(at + text.len());
    }

    /// Delete the character before the cursor. Returns `false` at offset
    /// 0 or without a cursor.
    pub fn backspace(&mut self) -> bool {
        let Some(cursor) = self.cursor else {
            return false;
        };
        let cursor = clamp_boundary(&self.content, cursor);
        let Some((at, _)) = self.content[..cursor].char_indices().next_back() else {
            return false;
        };
        self.content.remove(at);
        self.cursor = Some(at);
        true
    }
}

impl EditSurface for MemorySurface {
    fn content(&self) -> String {
        self.content.clone()
    }

    fn set_content(&mut self, content: &str) {
        self.content = content.to_string();
        if let Some(cursor) = self.cursor {
            self.cursor = Some(clamp_boundary(&self.content, cursor));
        }
    }

    fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    fn set_cursor(&mut self, offset: usize) {
        self.cursor = Some(clamp_boundary(&self.content, offset));
    }

    fn is_editable(&self) -> bool {
        self.editable
    }
}

fn clamp_boundary(s: &str, offset: usize) -> usize {
    let mut offset = offset.min(s.len());
    while !s.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// A pipeline that records every reprocess request.
#[derive(Debug, Clone, Default)]
pub struct RecordingPipeline {
    /// One entry per `reprocess` call, in call order.
    pub calls: Vec<Vec<RegionId>>,
}

impl RenderPipeline for RecordingPipeline {
    fn reprocess(&mut self, regions: &[RegionId]) {
        self.calls.push(regions.to_vec());
    }
}
