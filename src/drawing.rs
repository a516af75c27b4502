//! Freehand drawing overlay.
//!
//! The overlay is a transparent raster sized to the canvas container at the
//! device pixel ratio, so strokes stay sharp on high-density displays. Pointer
//! input arrives in CSS pixels and is scaled on the way in. Each stroke is a
//! chain of round-capped segments between consecutive pointer samples.
//!
//! [`DrawingOverlay::finish`] encodes the raster as a PNG data URL and reports
//! the CSS size, which is what the document stores for the resulting photo.

#[cfg(test)]
#[path = "drawing_test.rs"]
mod drawing_test;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tiny_skia::{Color, FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::consts::{DEFAULT_PEN_RGBA, DEFAULT_PEN_WIDTH, PNG_DATA_URL_PREFIX};
use crate::error::DrawingError;
use crate::geom::{Point, Size, Viewport};
use crate::gesture::PointerId;

/// Stroke color and width in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pen {
    pub rgba: [u8; 4],
    pub width: f32,
}

impl Default for Pen {
    fn default() -> Self {
        Self { rgba: DEFAULT_PEN_RGBA, width: DEFAULT_PEN_WIDTH }
    }
}

/// A finished drawing, ready to become a photo element.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingImage {
    /// `data:image/png;base64,...`
    pub data_url: String,
    /// Logical width in CSS pixels.
    pub width: f64,
    /// Logical height in CSS pixels.
    pub height: f64,
}

#[derive(Debug, Clone, Copy)]
struct StrokeSession {
    pointer: PointerId,
    last: Point,
}

/// Raster overlay capturing freehand strokes.
pub struct DrawingOverlay {
    pixmap: Option<Pixmap>,
    css: Size,
    dpr: f64,
    pen: Pen,
    stroke: Option<StrokeSession>,
}

impl DrawingOverlay {
    /// Allocate an overlay matching `viewport`. An unmeasured viewport gets no
    /// raster until [`DrawingOverlay::resize`] is called with a real size.
    #[must_use]
    pub fn new(viewport: &Viewport) -> Self {
        let mut overlay = Self { pixmap: None, css: Size::default(), dpr: 1.0, pen: Pen::default(), stroke: None };
        overlay.resize(viewport);
        overlay
    }

    /// Re-measure. A change in device pixel size reallocates the raster, which
    /// discards anything drawn so far.
    pub fn resize(&mut self, viewport: &Viewport) {
        let (w, h) = device_size(viewport);
        self.css = viewport.size;
        self.dpr = viewport.dpr;
        if self.pixel_size() == (w, h) {
            return;
        }
        self.stroke = None;
        self.pixmap = Pixmap::new(w, h);
    }

    /// Raster size in device pixels, `(0, 0)` when unallocated.
    #[must_use]
    pub fn pixel_size(&self) -> (u32, u32) {
        self.pixmap.as_ref().map_or((0, 0), |p| (p.width(), p.height()))
    }

    #[must_use]
    pub fn pen(&self) -> Pen {
        self.pen
    }

    pub fn set_pen(&mut self, pen: Pen) {
        self.pen = pen;
    }

    /// Whether a stroke is in progress.
    #[must_use]
    pub fn is_stroking(&self) -> bool {
        self.stroke.is_some()
    }

    /// True when no pixel has been painted.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.pixmap.as_ref().is_none_or(|p| p.pixels().iter().all(|px| px.alpha() == 0))
    }

    /// Start a stroke at `at` (CSS pixels), painting a dot so a tap leaves a mark.
    pub fn pointer_down(&mut self, pointer: PointerId, at: Point) -> bool {
        if self.stroke.is_some() || self.pixmap.is_none() {
            return false;
        }
        self.stroke = Some(StrokeSession { pointer, last: at });
        self.dot(at);
        true
    }

    /// Extend the active stroke with a segment to `at`.
    pub fn pointer_move(&mut self, pointer: PointerId, at: Point) -> bool {
        let Some(session) = self.stroke.filter(|s| s.pointer == pointer) else {
            return false;
        };
        if session.last == at {
            return false;
        }
        self.segment(session.last, at);
        self.stroke = Some(StrokeSession { pointer, last: at });
        true
    }

    /// End the stroke owned by `pointer`.
    pub fn pointer_up(&mut self, pointer: PointerId) -> Option<PointerId> {
        match self.stroke {
            Some(s) if s.pointer == pointer => self.end(),
            _ => None,
        }
    }

    /// End any stroke unconditionally, keeping what was drawn.
    pub fn end(&mut self) -> Option<PointerId> {
        self.stroke.take().map(|s| s.pointer)
    }

    /// Reset the raster to fully transparent.
    pub fn clear(&mut self) {
        self.stroke = None;
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.fill(Color::TRANSPARENT);
        }
    }

    /// Encode the raster as a PNG data URL and clear it.
    ///
    /// # Errors
    ///
    /// Returns [`DrawingError::EmptySurface`] if the canvas was never measured,
    /// or [`DrawingError::Encode`] if PNG encoding fails.
    pub fn finish(&mut self) -> Result<DrawingImage, DrawingError> {
        self.stroke = None;
        let Some(pixmap) = self.pixmap.as_ref() else {
            return Err(DrawingError::EmptySurface { width: self.css.width, height: self.css.height });
        };
        let png = pixmap.encode_png().map_err(|e| DrawingError::Encode(e.to_string()))?;
        let image = DrawingImage {
            data_url: format!("{PNG_DATA_URL_PREFIX}{}", STANDARD.encode(png)),
            width: self.css.width,
            height: self.css.height,
        };
        self.clear();
        Ok(image)
    }

    fn paint(&self) -> Paint<'static> {
        let mut paint = Paint::default();
        let [r, g, b, a] = self.pen.rgba;
        paint.set_color_rgba8(r, g, b, a);
        paint.anti_alias = true;
        paint
    }

    fn dot(&mut self, at: Point) {
        let paint = self.paint();
        let (x, y) = self.to_device(at);
        let radius = self.device_width() / 2.0;
        let Some(path) = PathBuilder::from_circle(x, y, radius.max(0.5)) else {
            return;
        };
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        }
    }

    fn segment(&mut self, from: Point, to: Point) {
        let paint = self.paint();
        let stroke = Stroke {
            width: self.device_width(),
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Default::default()
        };
        let (fx, fy) = self.to_device(from);
        let (tx, ty) = self.to_device(to);
        let mut pb = PathBuilder::new();
        pb.move_to(fx, fy);
        pb.line_to(tx, ty);
        let Some(path) = pb.finish() else {
            return;
        };
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn to_device(&self, pt: Point) -> (f32, f32) {
        ((pt.x * self.dpr) as f32, (pt.y * self.dpr) as f32)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn device_width(&self) -> f32 {
        self.pen.width * self.dpr as f32
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn device_size(viewport: &Viewport) -> (u32, u32) {
    if viewport.size.is_empty() {
        return (0, 0);
    }
    let w = (viewport.size.width * viewport.dpr).ceil();
    let h = (viewport.size.height * viewport.dpr).ceil();
    (w.min(f64::from(u32::MAX)) as u32, h.min(f64::from(u32::MAX)) as u32)
}
