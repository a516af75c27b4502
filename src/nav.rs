//! Current page tracking and horizontal swipe paging.
//!
//! Paging grows on demand: moving past the last page asks the caller to
//! append a page rather than stopping. Swipes are a secondary input for the
//! same prev/next moves.

#[cfg(test)]
#[path = "nav_test.rs"]
mod nav_test;

use crate::config::EditorConfig;
use crate::consts::{FALLBACK_CONTAINER_WIDTH_PX, SWIPE_EDGE_RESISTANCE, SWIPE_MAX_OFFSET_RATIO};
use crate::geom::Point;
use crate::gesture::PointerId;

/// Result of [`PageNavigator::go_next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextPage {
    /// Advanced onto an existing page.
    Moved(usize),
    /// Already on the last page; the caller appends one and calls
    /// [`PageNavigator::go_to`].
    NeedsNewPage,
}

/// Index of the page being shown, plus the page-manager overlay flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageNavigator {
    index: usize,
    manager_open: bool,
}

impl PageNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Step back one page, floored at the first. Returns whether it moved.
    pub fn go_prev(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        true
    }

    /// Step forward one page if one exists.
    pub fn go_next(&mut self, page_count: usize) -> NextPage {
        if self.index + 1 < page_count {
            self.index += 1;
            NextPage::Moved(self.index)
        } else {
            NextPage::NeedsNewPage
        }
    }

    /// Jump to `index` and close the page manager. Out-of-range indices are
    /// ignored.
    pub fn go_to(&mut self, index: usize, page_count: usize) -> bool {
        if index >= page_count {
            return false;
        }
        self.index = index;
        self.manager_open = false;
        true
    }

    /// Pull the index back into `0..page_count`.
    pub fn clamp(&mut self, page_count: usize) {
        self.index = self.index.min(page_count.saturating_sub(1));
    }

    #[must_use]
    pub fn is_manager_open(&self) -> bool {
        self.manager_open
    }

    pub fn open_manager(&mut self) {
        self.manager_open = true;
    }

    pub fn close_manager(&mut self) {
        self.manager_open = false;
    }

    /// Page counter text, e.g. `Page 2 of 5`.
    #[must_use]
    pub fn label(&self, page_count: usize) -> String {
        format!("Page {} of {}", self.index + 1, page_count.max(1))
    }
}

/// Direction a swipe locked onto after leaving the dead zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeAxis {
    Horizontal,
    Vertical,
}

/// What a finished swipe asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeOutcome {
    Prev,
    Next,
    /// Horizontal swipe that did not cross the threshold.
    SnapBack,
    /// No horizontal swipe happened.
    None,
}

#[derive(Debug, Clone, Copy)]
struct SwipeSession {
    pointer: PointerId,
    start: Point,
    axis: Option<SwipeAxis>,
    offset: f64,
}

/// Tracks one swipe across the canvas.
#[derive(Debug, Clone)]
pub struct SwipeTracker {
    dead_zone: f64,
    commit_ratio: f64,
    session: Option<SwipeSession>,
}

impl SwipeTracker {
    #[must_use]
    pub fn new(config: &EditorConfig) -> Self {
        Self { dead_zone: config.swipe_dead_zone, commit_ratio: config.swipe_commit_ratio, session: None }
    }

    #[must_use]
    pub fn is_tracking(&self) -> bool {
        self.session.is_some()
    }

    /// Visual offset of the page while swiping, in pixels.
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.session.map_or(0.0, |s| s.offset)
    }

    #[must_use]
    pub fn axis(&self) -> Option<SwipeAxis> {
        self.session.and_then(|s| s.axis)
    }

    pub fn begin(&mut self, pointer: PointerId, at: Point) {
        self.session = Some(SwipeSession { pointer, start: at, axis: None, offset: 0.0 });
    }

    /// Follow the pointer. Returns the new offset once the swipe is
    /// horizontal.
    pub fn update(&mut self, pointer: PointerId, at: Point, width: f64, index: usize, page_count: usize) -> Option<f64> {
        let dead_zone = self.dead_zone;
        let session = self.session.as_mut().filter(|s| s.pointer == pointer)?;
        let delta = at.delta_from(session.start);

        if session.axis.is_none() && (delta.x.abs() > dead_zone || delta.y.abs() > dead_zone) {
            session.axis =
                Some(if delta.x.abs() > delta.y.abs() { SwipeAxis::Horizontal } else { SwipeAxis::Vertical });
        }
        if session.axis != Some(SwipeAxis::Horizontal) {
            return None;
        }

        let max = effective_width(width) * SWIPE_MAX_OFFSET_RATIO;
        let clamped = delta.x.clamp(-max, max);
        let at_first = index == 0 && delta.x > 0.0;
        let at_last = index + 1 >= page_count && delta.x < 0.0;
        session.offset = if at_first || at_last { clamped * SWIPE_EDGE_RESISTANCE } else { clamped };
        Some(session.offset)
    }

    /// Finish the swipe owned by `pointer`.
    pub fn end(&mut self, pointer: PointerId, width: f64, index: usize, page_count: usize) -> SwipeOutcome {
        let Some(session) = self.session.filter(|s| s.pointer == pointer) else {
            return SwipeOutcome::None;
        };
        self.session = None;
        if session.axis != Some(SwipeAxis::Horizontal) {
            return SwipeOutcome::None;
        }

        let threshold = effective_width(width) * self.commit_ratio;
        if session.offset.abs() <= threshold {
            return SwipeOutcome::SnapBack;
        }
        if session.offset > 0.0 && index > 0 {
            SwipeOutcome::Prev
        } else if session.offset < 0.0 && index + 1 < page_count {
            SwipeOutcome::Next
        } else {
            SwipeOutcome::SnapBack
        }
    }

    /// Abandon the swipe without changing page.
    pub fn cancel(&mut self) {
        self.session = None;
    }
}

fn effective_width(width: f64) -> f64 {
    if width.is_finite() && width > 0.0 { width } else { FALLBACK_CONTAINER_WIDTH_PX }
}
