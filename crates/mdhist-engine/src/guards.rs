#![forbid(unsafe_code)]

//! Platform quirk guards for first-keystroke cursor capture.
//!
//! A handful of host platforms make the very first keystroke of a burst
//! unreliable for position capture. Those exceptions are policy, not
//! algorithm, so they live here as a small rule table evaluated against a
//! capability probe instead of inline branches in the engine.

use rustc_hash::FxHashSet;

/// Classification of the keystroke that opened a burst.
///
/// Which physical keys fall into which class is the embedder's concern;
/// the engine only distinguishes destructive keys from the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClass {
    /// A key that inserts content.
    Text,
    /// A destructive key (backspace, delete).
    Delete,
}

/// Named platform quirks affecting position capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quirk {
    /// The first destructive keystroke after focus does not mutate the
    /// surface, so the position it would record is wrong.
    FirstDeleteUnreliable,
    /// Key events arrive after the input event, so the position was
    /// already captured by normal commit flow and capturing again would
    /// duplicate it.
    InputPrecedesKeydown,
}

/// Result of the runtime capability probe: the set of quirks the host
/// platform exhibits.
#[derive(Debug, Clone, Default)]
pub struct PlatformProfile {
    active: FxHashSet<Quirk>,
}

impl PlatformProfile {
    /// A profile with no quirks (the well-behaved platform).
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Probe a user-agent-style identification string.
    #[must_use]
    pub fn probe(user_agent: &str) -> Self {
        let ua = user_agent.to_ascii_lowercase();
        let mut profile = Self::none();
        if ua.contains("firefox") {
            profile.active.insert(Quirk::FirstDeleteUnreliable);
        }
        if ua.contains("safari") && !ua.contains("chrome") {
            profile.active.insert(Quirk::InputPrecedesKeydown);
        }
        profile
    }

    /// Add a quirk explicitly.
    #[must_use]
    pub fn with_quirk(mut self, quirk: Quirk) -> Self {
        self.active.insert(quirk);
        self
    }

    /// Whether the platform exhibits `quirk`.
    #[must_use]
    pub fn has(&self, quirk: Quirk) -> bool {
        self.active.contains(&quirk)
    }
}

/// One row of the suppression table.
struct GuardRule {
    quirk: Quirk,
    /// When set, the rule only fires for destructive keys.
    delete_keys_only: bool,
}

/// The suppression table: quirk -> suppress position capture.
const GUARD_RULES: &[GuardRule] = &[
    GuardRule {
        quirk: Quirk::FirstDeleteUnreliable,
        delete_keys_only: true,
    },
    GuardRule {
        quirk: Quirk::InputPrecedesKeydown,
        delete_keys_only: false,
    },
];

/// Whether first-position capture must be suppressed for this keystroke
/// on this platform.
#[must_use]
pub fn suppress_first_position(profile: &PlatformProfile, key: KeyClass) -> bool {
    GUARD_RULES.iter().any(|rule| {
        profile.has(rule.quirk) && (!rule.delete_keys_only || key == KeyClass::Delete)
    })
}
