//! Geometry primitives and percent/pixel conversion against the measured canvas.
//!
//! Element centers are stored as percentages of the canvas so they survive a
//! container resize. Everything interactive works in CSS pixels, so the
//! conversions live here next to the clamping rules.

#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

/// A point in canvas pixel space (CSS pixels, origin at the top-left corner).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise difference `self - origin`.
    #[must_use]
    pub fn delta_from(self, origin: Point) -> Point {
        Point { x: self.x - origin.x, y: self.y - origin.y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Width/height pair in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero, negative or not finite.
    #[must_use]
    pub fn is_empty(self) -> bool {
        !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0)
    }
}

/// Axis-aligned rectangle in canvas pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Build a rectangle around a center point.
    #[must_use]
    pub fn from_center(center: Point, size: Size) -> Self {
        Self {
            left: center.x - size.width / 2.0,
            top: center.y - size.height / 2.0,
            width: size.width,
            height: size.height,
        }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// Whether `pt` lies inside the rectangle (edges inclusive).
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.left && pt.x <= self.right() && pt.y >= self.top && pt.y <= self.bottom()
    }
}

/// The measured canvas container: CSS size plus device pixel ratio.
///
/// Re-measured by the host on page change, on drawing-mode toggles and on
/// container resize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub size: Size,
    pub dpr: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { size: Size::default(), dpr: 1.0 }
    }
}

impl Viewport {
    #[must_use]
    pub fn new(width: f64, height: f64, dpr: f64) -> Self {
        let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
        Self { size: Size::new(width.max(0.0), height.max(0.0)), dpr }
    }

    /// Convert a percentage position to canvas pixels.
    #[must_use]
    pub fn pct_to_px(&self, x_pct: f64, y_pct: f64) -> Point {
        Point::new(x_pct / 100.0 * self.size.width, y_pct / 100.0 * self.size.height)
    }

    /// Convert a canvas pixel position to percentages, clamped into `[0, 100]`.
    ///
    /// An unmeasured axis maps to the center.
    #[must_use]
    pub fn px_to_pct(&self, pt: Point) -> (f64, f64) {
        (axis_pct(pt.x, self.size.width), axis_pct(pt.y, self.size.height))
    }

    /// Clamp an element center so it stays at least half the element's size
    /// away from each container edge.
    ///
    /// When the element is larger than the container on an axis, the center
    /// is pinned to the middle of that axis.
    #[must_use]
    pub fn clamp_center(&self, center: Point, element: Size) -> Point {
        Point::new(
            clamp_axis(center.x, element.width / 2.0, self.size.width),
            clamp_axis(center.y, element.height / 2.0, self.size.height),
        )
    }
}

/// Clamp a percentage coordinate into `[0, 100]`; non-finite input maps to 50.
#[must_use]
pub fn clamp_pct(v: f64) -> f64 {
    if v.is_finite() { v.clamp(0.0, 100.0) } else { 50.0 }
}

fn axis_pct(px: f64, extent: f64) -> f64 {
    if extent > 0.0 { clamp_pct(px / extent * 100.0) } else { 50.0 }
}

fn clamp_axis(v: f64, half: f64, extent: f64) -> f64 {
    let lo = half;
    let hi = extent - half;
    if lo > hi { extent / 2.0 } else { v.clamp(lo, hi) }
}
