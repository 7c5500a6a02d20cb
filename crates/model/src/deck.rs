use easel_types::{Align, Color};

/// A parsed deck: canvas dimensions in device units plus ordered slides.
///
/// Built once per render call from intermediate XML and discarded after
/// rendering; it owns no external resources.
#[derive(Debug, Clone)]
pub struct Deck {
    pub canvas: Canvas,
    pub slides: Vec<Slide>,
}

impl Deck {
    /// Parse a deck from intermediate XML.
    ///
    /// Documents without a `<slide>` wrapper (bare shape elements, or
    /// shapes directly inside `<deck>`) are wrapped into a single
    /// synthetic slide.
    pub fn parse(xml: &str) -> Result<Deck, crate::ParseError> {
        crate::parse::parse_deck(xml)
    }
}

/// Canvas dimensions in device units. Invariant: width and height > 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

impl Default for Canvas {
    fn default() -> Self {
        // US-letter landscape at 96dpi, the source DSL's default canvas.
        Self { width: 792.0, height: 612.0 }
    }
}

/// A two-stop linear background gradient. Active only when both colors
/// were supplied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gradient {
    pub color1: Color,
    pub color2: Color,
    /// Stop position of the first color, in percent.
    pub pct: f64,
}

/// One slide: background/foreground attributes plus per-kind shape
/// collections, each in document order.
#[derive(Debug, Clone)]
pub struct Slide {
    pub bg: Color,
    pub fg: Color,
    pub gradient: Option<Gradient>,
    pub rects: Vec<Rect>,
    pub ellipses: Vec<Ellipse>,
    pub lines: Vec<Line>,
    pub arcs: Vec<Arc>,
    pub curves: Vec<Curve>,
    pub polygons: Vec<Polygon>,
    pub texts: Vec<Text>,
    pub lists: Vec<List>,
    pub images: Vec<Image>,
}

impl Default for Slide {
    fn default() -> Self {
        Self {
            bg: Color::WHITE,
            fg: Color::BLACK,
            gradient: None,
            rects: Vec::new(),
            ellipses: Vec::new(),
            lines: Vec::new(),
            arcs: Vec::new(),
            curves: Vec::new(),
            polygons: Vec::new(),
            texts: Vec::new(),
            lists: Vec::new(),
            images: Vec::new(),
        }
    }
}

impl Slide {
    /// Total number of shape records on this slide, across all kinds.
    pub fn shape_count(&self) -> usize {
        self.rects.len()
            + self.ellipses.len()
            + self.lines.len()
            + self.arcs.len()
            + self.curves.len()
            + self.polygons.len()
            + self.texts.len()
            + self.lists.len()
            + self.images.len()
    }
}

/// Rectangle centered at (xp, yp); wp/hp are percent of canvas
/// width/height.
#[derive(Debug, Clone, PartialEq)]
pub struct Rect {
    pub xp: f64,
    pub yp: f64,
    pub wp: f64,
    pub hp: f64,
    pub color: Option<Color>,
    pub opacity: f64,
}

/// Ellipse centered at (xp, yp).
#[derive(Debug, Clone, PartialEq)]
pub struct Ellipse {
    pub xp: f64,
    pub yp: f64,
    pub wp: f64,
    pub hp: f64,
    pub color: Option<Color>,
    pub opacity: f64,
}

/// Straight line between two percentage-space points; sp is the stroke
/// size relative to canvas width.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub xp1: f64,
    pub yp1: f64,
    pub xp2: f64,
    pub yp2: f64,
    pub sp: f64,
    pub color: Option<Color>,
    pub opacity: f64,
}

/// Elliptical arc centered at (xp, yp), angles a1..a2 in degrees
/// (counter-clockwise, 0 = east).
#[derive(Debug, Clone, PartialEq)]
pub struct Arc {
    pub xp: f64,
    pub yp: f64,
    pub wp: f64,
    pub hp: f64,
    pub a1: f64,
    pub a2: f64,
    pub sp: f64,
    pub color: Option<Color>,
    pub opacity: f64,
}

/// Quadratic Bézier from (xp1, yp1) to (xp3, yp3) with control point
/// (xp2, yp2).
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    pub xp1: f64,
    pub yp1: f64,
    pub xp2: f64,
    pub yp2: f64,
    pub xp3: f64,
    pub yp3: f64,
    pub sp: f64,
    pub color: Option<Color>,
    pub opacity: f64,
}

/// Closed filled polygon; xc/yc are parallel percentage coordinate lists.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub xc: Vec<f64>,
    pub yc: Vec<f64>,
    pub color: Option<Color>,
    pub opacity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextKind {
    #[default]
    Plain,
    /// Word-wrapped to a target width.
    Block,
    /// Monospaced with a background panel.
    Code,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub content: String,
    pub xp: f64,
    pub yp: f64,
    /// Font size relative to canvas width.
    pub sp: f64,
    /// Wrap width in percent of canvas width; 0 means the default width.
    pub wp: f64,
    pub font: Option<String>,
    pub color: Option<Color>,
    pub opacity: f64,
    pub align: Align,
    pub kind: TextKind,
    /// Line-spacing factor relative to the font size.
    pub lp: Option<f64>,
    /// Rotation in degrees around the anchor point.
    pub rotation: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListKind {
    #[default]
    Plain,
    Bullet,
    Number,
}

#[derive(Debug, Clone, PartialEq)]
pub struct List {
    pub items: Vec<String>,
    pub xp: f64,
    pub yp: f64,
    pub sp: f64,
    pub wp: f64,
    pub font: Option<String>,
    pub color: Option<Color>,
    pub opacity: f64,
    pub align: Align,
    pub kind: ListKind,
    pub lp: Option<f64>,
}

/// Image centered at (xp, yp), scaled to wp/hp percent of the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub name: String,
    pub xp: f64,
    pub yp: f64,
    pub wp: f64,
    pub hp: f64,
    pub opacity: f64,
}
