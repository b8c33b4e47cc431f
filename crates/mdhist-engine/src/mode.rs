#![forbid(unsafe_code)]

//! Editing-mode key for the history map.

use std::fmt;

/// The editing mode a history belongs to.
///
/// Exactly one mode is active at a time; switching modes resets history
/// entirely, so per-mode stacks exist to keep records from one mode from
/// ever being replayed into another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EditMode {
    /// Markup rendered in place as it is typed.
    #[default]
    InstantRender,
    /// Fully rendered editing view.
    Wysiwyg,
    /// Source and preview side by side.
    SplitView,
}

impl EditMode {
    /// Short identifier used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InstantRender => "ir",
            Self::Wysiwyg => "wysiwyg",
            Self::SplitView => "sv",
        }
    }

    /// All modes, for whole-map resets.
    #[must_use]
    pub fn all() -> [EditMode; 3] {
        [Self::InstantRender, Self::Wysiwyg, Self::SplitView]
    }
}

impl fmt::Display for EditMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
