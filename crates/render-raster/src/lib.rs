//! The raster backend: draws into a tiny-skia pixmap and encodes PNG.
//!
//! Device coordinates are snapped to integers before drawing; opacity is
//! composited with true source-over alpha blending. Glyphs are filled
//! outlines extracted through ttf-parser; images are decoded with the
//! `image` crate, resampled with nearest-neighbor when the target size
//! differs from the source, and anchored at their center point.

use easel_fonts::ResolvedFont;
use easel_render_core::{Anchor, DrawingSurface, Paint, RenderError};
use easel_types::{Color, Point};
use tiny_skia::{
    FillRule, GradientStop, IntSize, LinearGradient, Paint as SkiaPaint, PathBuilder, Pixmap,
    PixmapPaint, Rect, SpreadMode, Stroke, Transform,
};
use ttf_parser::OutlineBuilder;

/// A drawing surface backed by a tiny-skia pixmap.
pub struct RasterSurface {
    pixmap: Pixmap,
    width: f64,
    height: f64,
}

impl RasterSurface {
    pub fn new(width: f64, height: f64) -> Result<Self, RenderError> {
        let pixmap = Pixmap::new(width.round().max(1.0) as u32, height.round().max(1.0) as u32)
            .ok_or_else(|| RenderError::Other(format!("invalid pixmap size {width}x{height}")))?;
        Ok(Self { pixmap, width, height })
    }

    fn fill(&mut self, path: &tiny_skia::Path, paint: Paint, transform: Transform) {
        self.pixmap
            .fill_path(path, &skia_paint(paint), FillRule::Winding, transform, None);
    }

    fn stroke(&mut self, path: &tiny_skia::Path, width: f64, paint: Paint) {
        let stroke = Stroke { width: width as f32, ..Stroke::default() };
        self.pixmap
            .stroke_path(path, &skia_paint(paint), &stroke, Transform::identity(), None);
    }
}

fn skia_color(color: Color, opacity: f64) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(
        color.r,
        color.g,
        color.b,
        (opacity.clamp(0.0, 1.0) * 255.0).round() as u8,
    )
}

fn skia_paint(paint: Paint) -> SkiaPaint<'static> {
    let mut sk = SkiaPaint::default();
    sk.set_color(skia_color(paint.color, paint.opacity));
    sk.anti_alias = true;
    sk
}

/// Integer device coordinate, per the raster backend contract.
fn snap(v: f64) -> f32 {
    v.round() as f32
}

/// Converts ttf-parser glyph outlines into a tiny-skia path.
struct GlyphOutline(PathBuilder);

impl OutlineBuilder for GlyphOutline {
    fn move_to(&mut self, x: f32, y: f32) {
        self.0.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.0.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.0.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.0.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.0.close();
    }
}

impl DrawingSurface for RasterSurface {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn begin_slide(&mut self, bg: Paint) -> Result<(), RenderError> {
        self.pixmap.fill(skia_color(bg.color, bg.opacity));
        Ok(())
    }

    fn fill_gradient(
        &mut self,
        color1: Color,
        color2: Color,
        pct: f64,
    ) -> Result<(), RenderError> {
        let first_stop = (pct / 100.0).clamp(0.0, 1.0) as f32;
        if first_stop >= 1.0 {
            // Degenerate stop placement: the first color covers everything.
            self.pixmap.fill(skia_color(color1, 1.0));
            return Ok(());
        }
        let shader = LinearGradient::new(
            tiny_skia::Point::from_xy(0.0, 0.0),
            tiny_skia::Point::from_xy(0.0, self.height as f32),
            vec![
                GradientStop::new(first_stop, skia_color(color1, 1.0)),
                GradientStop::new(1.0, skia_color(color2, 1.0)),
            ],
            SpreadMode::Pad,
            Transform::identity(),
        )
        .ok_or_else(|| RenderError::Other("invalid gradient".into()))?;

        let mut paint = SkiaPaint::default();
        paint.shader = shader;
        paint.anti_alias = true;
        if let Some(rect) = Rect::from_xywh(0.0, 0.0, self.width as f32, self.height as f32) {
            let path = PathBuilder::from_rect(rect);
            self.pixmap
                .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        }
        Ok(())
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, paint: Paint)
    -> Result<(), RenderError> {
        let Some(rect) = Rect::from_xywh(snap(x), snap(y), snap(w).max(1.0), snap(h).max(1.0))
        else {
            return Ok(());
        };
        let path = PathBuilder::from_rect(rect);
        self.fill(&path, paint, Transform::identity());
        Ok(())
    }

    fn fill_ellipse(
        &mut self,
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
        paint: Paint,
    ) -> Result<(), RenderError> {
        let Some(rect) = Rect::from_xywh(
            snap(cx - rx),
            snap(cy - ry),
            snap(rx * 2.0).max(1.0),
            snap(ry * 2.0).max(1.0),
        ) else {
            return Ok(());
        };
        let mut pb = PathBuilder::new();
        pb.push_oval(rect);
        if let Some(path) = pb.finish() {
            self.fill(&path, paint, Transform::identity());
        }
        Ok(())
    }

    fn stroke_line(
        &mut self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        width: f64,
        paint: Paint,
    ) -> Result<(), RenderError> {
        let mut pb = PathBuilder::new();
        pb.move_to(snap(x1), snap(y1));
        pb.line_to(snap(x2), snap(y2));
        if let Some(path) = pb.finish() {
            self.stroke(&path, width, paint);
        }
        Ok(())
    }

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
    ) -> Result<(), RenderError> {
        const SEGMENTS: usize = 64;
        let mut pb = PathBuilder::new();
        for i in 0..=SEGMENTS {
            let t = a1 + (a2 - a1) * i as f64 / SEGMENTS as f64;
            let rad = t.to_radians();
            let x = (cx + rx * rad.cos()) as f32;
            let y = (cy - ry * rad.sin()) as f32;
            if i == 0 {
                pb.move_to(x, y);
            } else {
                pb.line_to(x, y);
            }
        }
        if let Some(path) = pb.finish() {
            self.stroke(&path, width, paint);
        }
        Ok(())
    }

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
    ) -> Result<(), RenderError> {
        let mut pb = PathBuilder::new();
        pb.move_to(snap(x1), snap(y1));
        pb.quad_to(snap(cx), snap(cy), snap(x2), snap(y2));
        if let Some(path) = pb.finish() {
            self.stroke(&path, width, paint);
        }
        Ok(())
    }

    fn fill_polygon(&mut self, points: &[Point], paint: Paint) -> Result<(), RenderError> {
        if points.len() < 3 {
            return Ok(());
        }
        let mut pb = PathBuilder::new();
        pb.move_to(snap(points[0].x), snap(points[0].y));
        for p in &points[1..] {
            pb.line_to(snap(p.x), snap(p.y));
        }
        pb.close();
        if let Some(path) = pb.finish() {
            self.fill(&path, paint, Transform::identity());
        }
        Ok(())
    }

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
    ) -> Result<(), RenderError> {
        let Some(face) = font.as_face() else {
            // No loadable face and no built-in bitmap fallback: skip the
            // glyph pass, keep the rest of the slide.
            log::warn!(
                "[RASTER] no usable face for '{}', text skipped",
                font.requested_family()
            );
            return Ok(());
        };

        let upem = face.units_per_em() as f64;
        if upem <= 0.0 {
            return Ok(());
        }
        let scale = size / upem;

        let total = font.measure(text, size);
        let mut pen_x = match anchor {
            Anchor::Start => x,
            Anchor::Middle => x - total / 2.0,
            Anchor::End => x - total,
        };
        let baseline = snap(y);

        let mut pb = PathBuilder::new();
        for c in text.chars() {
            let Some(gid) = face.glyph_index(c) else {
                pen_x += size * 0.6;
                continue;
            };
            let mut outline = GlyphOutline(PathBuilder::new());
            if face.outline_glyph(gid, &mut outline).is_some()
                && let Some(glyph_path) = outline.0.finish()
            {
                // Glyph outlines are Y-up in font units; flip while scaling.
                let transform = Transform::from_scale(scale as f32, -(scale as f32))
                    .post_translate(snap(pen_x), baseline);
                if let Some(positioned) = glyph_path.transform(transform) {
                    pb.push_path(&positioned);
                }
            }
            pen_x += face.glyph_hor_advance(gid).unwrap_or(0) as f64 * scale;
        }

        if let Some(path) = pb.finish() {
            let transform = if rotation != 0.0 {
                Transform::from_rotate_at(rotation as f32, snap(x), snap(y))
            } else {
                Transform::identity()
            };
            self.fill(&path, paint, transform);
        }
        Ok(())
    }

    fn draw_image(
        &mut self,
        cx: f64,
        cy: f64,
        w: f64,
        h: f64,
        path: &str,
        opacity: f64,
    ) -> Result<(), RenderError> {
        let decoded = match image::open(path) {
            Ok(img) => img.to_rgba8(),
            Err(e) => {
                log::warn!("[RASTER] image '{}' skipped: {}", path, e);
                return Ok(());
            }
        };

        let tw = w.round().max(1.0) as u32;
        let th = h.round().max(1.0) as u32;
        let scaled = if decoded.dimensions() != (tw, th) {
            image::imageops::resize(&decoded, tw, th, image::imageops::FilterType::Nearest)
        } else {
            decoded
        };

        // tiny-skia expects premultiplied RGBA.
        let mut data = scaled.into_raw();
        for px in data.chunks_exact_mut(4) {
            let a = px[3] as u32;
            px[0] = (px[0] as u32 * a / 255) as u8;
            px[1] = (px[1] as u32 * a / 255) as u8;
            px[2] = (px[2] as u32 * a / 255) as u8;
        }
        let Some(size) = IntSize::from_wh(tw, th) else {
            return Ok(());
        };
        let Some(source) = Pixmap::from_vec(data, size) else {
            log::warn!("[RASTER] image '{}' skipped: invalid pixel buffer", path);
            return Ok(());
        };

        let paint = PixmapPaint {
            opacity: opacity.clamp(0.0, 1.0) as f32,
            ..PixmapPaint::default()
        };
        self.pixmap.draw_pixmap(
            (cx - w / 2.0).round() as i32,
            (cy - h / 2.0).round() as i32,
            source.as_ref(),
            &paint,
            Transform::identity(),
            None,
        );
        Ok(())
    }

    fn end_slide(&mut self) -> Result<(), RenderError> {
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<Vec<u8>, RenderError> {
        self.pixmap
            .encode_png()
            .map_err(|e| RenderError::Encode(e.to_string()))
    }
}
