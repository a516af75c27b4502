//! Debounced autosave bookkeeping.
//!
//! DESIGN
//! ======
//! `Autosave` is a pure state machine driven by host timestamps in
//! milliseconds. Every mutation pushes the deadline out by the quiet
//! interval; the host polls [`Autosave::is_due`] from a timer and performs
//! the write through the same path as an explicit save. Saves are full-state
//! writes, so whichever snapshot is current at save time wins.
//!
//! ERROR HANDLING
//! ==============
//! The dirty flag is cleared only after a successful write. A failed write
//! keeps the state dirty and schedules a retry one quiet interval later.

#[cfg(test)]
#[path = "autosave_test.rs"]
mod autosave_test;

use crate::config::EditorConfig;

/// What started a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveTrigger {
    /// The user pressed save (or left the editor).
    Manual,
    /// The quiet interval elapsed after the last mutation.
    Auto,
}

/// Dirty flag, debounce deadline and saving-indicator window.
#[derive(Debug, Clone)]
pub struct Autosave {
    quiet_ms: u64,
    indicator_ms: u64,
    dirty: bool,
    due_at_ms: Option<u64>,
    indicator_until_ms: Option<u64>,
}

impl Autosave {
    #[must_use]
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            quiet_ms: config.autosave_quiet_ms,
            indicator_ms: config.saving_indicator_ms,
            dirty: false,
            due_at_ms: None,
            indicator_until_ms: None,
        }
    }

    /// Forget all pending state, as when a different album is opened.
    pub fn reset(&mut self) {
        self.dirty = false;
        self.due_at_ms = None;
        self.indicator_until_ms = None;
    }

    /// Record a mutation at `now_ms`, restarting the quiet interval.
    pub fn mark_dirty(&mut self, now_ms: u64) {
        self.dirty = true;
        self.due_at_ms = Some(now_ms.saturating_add(self.quiet_ms));
    }

    /// Whether unsaved mutations exist.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether the quiet interval has elapsed with unsaved mutations.
    #[must_use]
    pub fn is_due(&self, now_ms: u64) -> bool {
        self.dirty && self.due_at_ms.is_some_and(|due| now_ms >= due)
    }

    /// Record a successful write.
    pub fn record_saved(&mut self, now_ms: u64, trigger: SaveTrigger) {
        self.dirty = false;
        self.due_at_ms = None;
        if trigger == SaveTrigger::Auto {
            self.indicator_until_ms = Some(now_ms.saturating_add(self.indicator_ms));
        }
    }

    /// Record a failed write; the state stays dirty and retries later.
    pub fn record_failed(&mut self, now_ms: u64) {
        if self.dirty {
            self.due_at_ms = Some(now_ms.saturating_add(self.quiet_ms));
        }
    }

    /// Whether the transient "saving" indicator should be shown.
    #[must_use]
    pub fn is_indicator_visible(&self, now_ms: u64) -> bool {
        self.indicator_until_ms.is_some_and(|until| now_ms < until)
    }

    /// Earliest timestamp at which the host should poll again, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        let due = if self.dirty { self.due_at_ms } else { None };
        match (due, self.indicator_until_ms) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Drop an expired indicator window so it stops contributing deadlines.
    pub fn expire_indicator(&mut self, now_ms: u64) {
        if self.indicator_until_ms.is_some_and(|until| now_ms >= until) {
            self.indicator_until_ms = None;
        }
    }
}
