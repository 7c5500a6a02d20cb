use crate::error::RenderError;
use easel_fonts::ResolvedFont;
use easel_types::{Align, Color, Point};

/// Fill or stroke appearance: a color plus an opacity fraction in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub color: Color,
    pub opacity: f64,
}

impl Paint {
    /// Build a paint from a document-model opacity in percent.
    pub fn new(color: Color, opacity_pct: f64) -> Self {
        Self {
            color,
            opacity: (opacity_pct / 100.0).clamp(0.0, 1.0),
        }
    }

    pub fn opaque(color: Color) -> Self {
        Self { color, opacity: 1.0 }
    }

    pub fn is_opaque(&self) -> bool {
        self.opacity >= 1.0
    }
}

/// Horizontal text anchoring relative to the x coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

impl From<Align> for Anchor {
    fn from(align: Align) -> Self {
        match align {
            Align::Left => Anchor::Start,
            Align::Center => Anchor::Middle,
            Align::Right => Anchor::End,
        }
    }
}

/// The minimal drawing capability set every backend provides.
///
/// All coordinates are device units with the origin at the top-left and
/// Y growing downward; the layer dispatcher has already applied the
/// percentage-space conversion (including the Y flip). A surface is
/// consumed by [`finish`](DrawingSurface::finish), which returns the
/// produced output bytes.
pub trait DrawingSurface {
    /// Device canvas size `(width, height)`.
    fn size(&self) -> (f64, f64);

    /// Starts a slide by filling the full canvas with the background.
    /// Paginated backends open a new page here.
    fn begin_slide(&mut self, bg: Paint) -> Result<(), RenderError>;

    /// Fills the full canvas with a vertical two-stop linear gradient;
    /// `pct` positions the first stop. Backends without a gradient
    /// primitive degrade to a flat fill of `color1`.
    fn fill_gradient(&mut self, color1: Color, color2: Color, pct: f64)
    -> Result<(), RenderError>;

    /// Axis-aligned filled rectangle; (x, y) is the top-left corner.
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, paint: Paint)
    -> Result<(), RenderError>;

    /// Filled ellipse centered at (cx, cy) with radii rx/ry.
    fn fill_ellipse(
        &mut self,
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
        paint: Paint,
    ) -> Result<(), RenderError>;

    /// Stroked straight line.
    fn stroke_line(
        &mut self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        width: f64,
        paint: Paint,
    ) -> Result<(), RenderError>;

    /// Stroked elliptical arc centered at (cx, cy); angles in degrees,
    /// counter-clockwise from east.
    #[allow(clippy::too_many_arguments)]
    fn draw_arc(
        &mut self,
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
        a1: f64,
        a2: f64,
        width: f64,
        paint: Paint,
    ) -> Result<(), RenderError>;

    /// Stroked quadratic Bézier from (x1, y1) to (x2, y2) with control
    /// point (cx, cy).
    #[allow(clippy::too_many_arguments)]
    fn draw_curve(
        &mut self,
        x1: f64,
        y1: f64,
        cx: f64,
        cy: f64,
        x2: f64,
        y2: f64,
        width: f64,
        paint: Paint,
    ) -> Result<(), RenderError>;

    /// Closed filled polygon.
    fn fill_polygon(&mut self, points: &[Point], paint: Paint) -> Result<(), RenderError>;

    /// Single line of anchored text with (x, y) on the baseline.
    /// `rotation` is degrees clockwise around the anchor point.
    #[allow(clippy::too_many_arguments)]
    fn draw_text(
        &mut self,
        x: f64,
        y: f64,
        text: &str,
        font: &ResolvedFont,
        size: f64,
        anchor: Anchor,
        rotation: f64,
        paint: Paint,
    ) -> Result<(), RenderError>;

    /// Image centered at (cx, cy), scaled to w x h. A missing or
    /// undecodable image is skipped with a warning, never fatal.
    fn draw_image(
        &mut self,
        cx: f64,
        cy: f64,
        w: f64,
        h: f64,
        path: &str,
        opacity: f64,
    ) -> Result<(), RenderError>;

    /// Ends the current slide.
    fn end_slide(&mut self) -> Result<(), RenderError>;

    /// Consumes the surface and returns the produced output bytes.
    fn finish(self: Box<Self>) -> Result<Vec<u8>, RenderError>;
}
