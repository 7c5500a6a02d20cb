//! The layer dispatcher: walks a caller-ordered list of layer names and
//! paints the matching shape collections of one slide through a
//! [`DrawingSurface`], in document order. Unknown layer names are
//! silently skipped so callers can reorder or omit layers (for example a
//! text-only preview) without special-casing.

use crate::coord::{device_size, device_x, device_y, dimen, pct};
use crate::error::RenderError;
use crate::surface::{Anchor, DrawingSurface, Paint};
use crate::text::{self, TextStyle, DEFAULT_LINE_SPACING};
use easel_fonts::FontLibrary;
use easel_model::{Deck, Slide, TextKind};
use easel_types::{Color, FontWeight, Point};

/// Default paint order, back to front.
pub const DEFAULT_LAYERS: &str = "image:rect:ellipse:curve:arc:line:poly:text:list";

/// Fill used by geometric shapes that carry no explicit color. Text and
/// list elements fall back to the slide foreground instead.
pub const DEFAULT_SHAPE_COLOR: Color = Color::gray(128);

/// Wrap width (percent of canvas width) for block text that does not
/// specify one.
const DEFAULT_WRAP_WP: f64 = 50.0;

/// Monospace family forced onto code text.
const CODE_FONT: &str = "mono";

/// Grid overlay appearance.
const GRID_COLOR: Color = Color::gray(200);
const GRID_STROKE_SP: f64 = 0.1;

/// Render configuration. Pure value data with no identity.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Colon- or comma-separated layer ordering.
    pub layers: String,
    /// Percent grid overlay spacing; 0 disables the overlay.
    pub grid_pct: f64,
    /// Document title metadata, where the backend supports it.
    pub title: Option<String>,
    /// Font family for elements that do not name one.
    pub font_family: String,
    /// Weight used for all resolved text faces.
    pub font_weight: FontWeight,
    /// Slide rendered by single-slide backends.
    pub slide: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            layers: DEFAULT_LAYERS.to_string(),
            grid_pct: 0.0,
            title: None,
            font_family: "sans".to_string(),
            font_weight: FontWeight::Regular,
            slide: 0,
        }
    }
}

/// Splits a layer specification on colons, commas or whitespace.
pub fn layer_names(spec: &str) -> impl Iterator<Item = &str> {
    spec.split([':', ',', ' ', '\t'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Renders every slide of the deck, in order. Used by paginated
/// backends, which map each slide onto a page.
pub fn render_deck(
    surface: &mut dyn DrawingSurface,
    deck: &Deck,
    fonts: &FontLibrary,
    options: &RenderOptions,
) -> Result<(), RenderError> {
    for index in 0..deck.slides.len() {
        render_slide(surface, deck, index, fonts, options)?;
    }
    Ok(())
}

/// Renders one slide through the surface: background, gradient, the
/// caller-ordered shape layers, then the optional grid overlay.
pub fn render_slide(
    surface: &mut dyn DrawingSurface,
    deck: &Deck,
    index: usize,
    fonts: &FontLibrary,
    options: &RenderOptions,
) -> Result<(), RenderError> {
    let slide = deck.slides.get(index).ok_or(RenderError::SlideIndex {
        index,
        count: deck.slides.len(),
    })?;
    let (cw, ch) = surface.size();

    surface.begin_slide(Paint::opaque(slide.bg))?;
    if let Some(gradient) = &slide.gradient {
        surface.fill_gradient(gradient.color1, gradient.color2, gradient.pct)?;
    }

    for layer in layer_names(&options.layers) {
        match layer {
            "image" => draw_images(surface, slide, cw, ch)?,
            "rect" => draw_rects(surface, slide, cw, ch)?,
            "ellipse" => draw_ellipses(surface, slide, cw, ch)?,
            "curve" => draw_curves(surface, slide, cw, ch)?,
            "arc" => draw_arcs(surface, slide, cw, ch)?,
            "line" => draw_lines(surface, slide, cw, ch)?,
            "poly" => draw_polygons(surface, slide, cw, ch)?,
            "text" => draw_texts(surface, slide, fonts, options, cw, ch)?,
            "list" => draw_lists(surface, slide, fonts, options, cw, ch)?,
            unknown => {
                log::debug!("[RENDER] skipping unknown layer '{}'", unknown);
            }
        }
    }

    if options.grid_pct > 0.0 {
        draw_grid(surface, options.grid_pct, cw, ch)?;
    }

    surface.end_slide()
}

fn shape_paint(color: Option<Color>, opacity: f64) -> Paint {
    Paint::new(color.unwrap_or(DEFAULT_SHAPE_COLOR), opacity)
}

fn draw_images(
    surface: &mut dyn DrawingSurface,
    slide: &Slide,
    cw: f64,
    ch: f64,
) -> Result<(), RenderError> {
    for image in &slide.images {
        surface.draw_image(
            device_x(cw, image.xp),
            device_y(ch, image.yp),
            pct(image.wp, cw),
            pct(image.hp, ch),
            &image.name,
            (image.opacity / 100.0).clamp(0.0, 1.0),
        )?;
    }
    Ok(())
}

fn draw_rects(
    surface: &mut dyn DrawingSurface,
    slide: &Slide,
    cw: f64,
    ch: f64,
) -> Result<(), RenderError> {
    for rect in &slide.rects {
        let w = pct(rect.wp, cw);
        let h = pct(rect.hp, ch);
        surface.fill_rect(
            device_x(cw, rect.xp) - w / 2.0,
            device_y(ch, rect.yp) - h / 2.0,
            w,
            h,
            shape_paint(rect.color, rect.opacity),
        )?;
    }
    Ok(())
}

fn draw_ellipses(
    surface: &mut dyn DrawingSurface,
    slide: &Slide,
    cw: f64,
    ch: f64,
) -> Result<(), RenderError> {
    for ellipse in &slide.ellipses {
        surface.fill_ellipse(
            device_x(cw, ellipse.xp),
            device_y(ch, ellipse.yp),
            pct(ellipse.wp, cw) / 2.0,
            pct(ellipse.hp, ch) / 2.0,
            shape_paint(ellipse.color, ellipse.opacity),
        )?;
    }
    Ok(())
}

fn draw_lines(
    surface: &mut dyn DrawingSurface,
    slide: &Slide,
    cw: f64,
    ch: f64,
) -> Result<(), RenderError> {
    for line in &slide.lines {
        surface.stroke_line(
            device_x(cw, line.xp1),
            device_y(ch, line.yp1),
            device_x(cw, line.xp2),
            device_y(ch, line.yp2),
            device_size(cw, line.sp),
            shape_paint(line.color, line.opacity),
        )?;
    }
    Ok(())
}

fn draw_arcs(
    surface: &mut dyn DrawingSurface,
    slide: &Slide,
    cw: f64,
    ch: f64,
) -> Result<(), RenderError> {
    for arc in &slide.arcs {
        surface.draw_arc(
            device_x(cw, arc.xp),
            device_y(ch, arc.yp),
            pct(arc.wp, cw) / 2.0,
            pct(arc.hp, ch) / 2.0,
            arc.a1,
            arc.a2,
            device_size(cw, arc.sp),
            shape_paint(arc.color, arc.opacity),
        )?;
    }
    Ok(())
}

fn draw_curves(
    surface: &mut dyn DrawingSurface,
    slide: &Slide,
    cw: f64,
    ch: f64,
) -> Result<(), RenderError> {
    for curve in &slide.curves {
        surface.draw_curve(
            device_x(cw, curve.xp1),
            device_y(ch, curve.yp1),
            device_x(cw, curve.xp2),
            device_y(ch, curve.yp2),
            device_x(cw, curve.xp3),
            device_y(ch, curve.yp3),
            device_size(cw, curve.sp),
            shape_paint(curve.color, curve.opacity),
        )?;
    }
    Ok(())
}

fn draw_polygons(
    surface: &mut dyn DrawingSurface,
    slide: &Slide,
    cw: f64,
    ch: f64,
) -> Result<(), RenderError> {
    for polygon in &slide.polygons {
        let points: Vec<Point> = polygon
            .xc
            .iter()
            .zip(&polygon.yc)
            .map(|(&xp, &yp)| Point::new(device_x(cw, xp), device_y(ch, yp)))
            .collect();
        surface.fill_polygon(&points, shape_paint(polygon.color, polygon.opacity))?;
    }
    Ok(())
}

fn draw_texts(
    surface: &mut dyn DrawingSurface,
    slide: &Slide,
    fonts: &FontLibrary,
    options: &RenderOptions,
    cw: f64,
    ch: f64,
) -> Result<(), RenderError> {
    for element in &slide.texts {
        let family = match element.kind {
            TextKind::Code => CODE_FONT,
            _ => element.font.as_deref().unwrap_or(&options.font_family),
        };
        let font = fonts.resolve(family, options.font_weight);
        let (x, y, size) = dimen(cw, ch, element.xp, element.yp, element.sp);
        let style = TextStyle {
            font: &font,
            size,
            anchor: Anchor::from(element.align),
            line_spacing: size * element.lp.unwrap_or(DEFAULT_LINE_SPACING),
            rotation: element.rotation,
            paint: Paint::new(element.color.unwrap_or(slide.fg), element.opacity),
        };

        match element.kind {
            TextKind::Plain => text::draw_free_text(surface, x, y, &element.content, &style)?,
            TextKind::Block => {
                let wp = if element.wp > 0.0 { element.wp } else { DEFAULT_WRAP_WP };
                text::draw_block_text(surface, x, y, &element.content, pct(wp, cw), &style)?;
            }
            TextKind::Code => text::draw_code_text(surface, x, y, &element.content, &style)?,
        }
    }
    Ok(())
}

fn draw_lists(
    surface: &mut dyn DrawingSurface,
    slide: &Slide,
    fonts: &FontLibrary,
    options: &RenderOptions,
    cw: f64,
    ch: f64,
) -> Result<(), RenderError> {
    for list in &slide.lists {
        let family = list.font.as_deref().unwrap_or(&options.font_family);
        let font = fonts.resolve(family, options.font_weight);
        let (x, y, size) = dimen(cw, ch, list.xp, list.yp, list.sp);
        let style = TextStyle {
            font: &font,
            size,
            anchor: Anchor::from(list.align),
            line_spacing: size * list.lp.unwrap_or(DEFAULT_LINE_SPACING),
            rotation: 0.0,
            paint: Paint::new(list.color.unwrap_or(slide.fg), list.opacity),
        };
        let wrap_width = if list.wp > 0.0 { pct(list.wp, cw) } else { 0.0 };
        text::draw_list(surface, x, y, &list.items, list.kind, wrap_width, &style)?;
    }
    Ok(())
}

/// Percent grid overlay: light lines every `grid_pct` percent on both
/// axes, painted over the slide content.
fn draw_grid(
    surface: &mut dyn DrawingSurface,
    grid_pct: f64,
    cw: f64,
    ch: f64,
) -> Result<(), RenderError> {
    let width = device_size(cw, GRID_STROKE_SP);
    let paint = Paint::opaque(GRID_COLOR);

    let mut p = grid_pct;
    while p < 100.0 {
        let x = pct(p, cw);
        surface.stroke_line(x, 0.0, x, ch, width, paint)?;
        let y = pct(p, ch);
        surface.stroke_line(0.0, y, cw, y, width, paint)?;
        p += grid_pct;
    }
    Ok(())
}
