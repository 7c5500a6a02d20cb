//! The vector backend: emits one SVG document per rendered slide.
//!
//! Gradients are first-class (`<linearGradient>` defined once in
//! `<defs>`, referenced by fill); opacity is expressed through the
//! `fill-opacity`/`stroke-opacity` channels; text anchoring maps
//! directly onto SVG's `text-anchor` start/middle/end. Images are
//! referenced by href rather than embedded.

use easel_fonts::ResolvedFont;
use easel_render_core::{Anchor, DrawingSurface, Paint, RenderError};
use easel_types::{Color, Point};
use std::fmt::Write as _;

/// A drawing surface that assembles SVG markup.
pub struct SvgSurface {
    width: f64,
    height: f64,
    title: Option<String>,
    defs: String,
    body: String,
    gradient_count: usize,
}

impl SvgSurface {
    pub fn new(width: f64, height: f64, title: Option<String>) -> Self {
        Self {
            width,
            height,
            title,
            defs: String::new(),
            body: String::new(),
            gradient_count: 0,
        }
    }

    fn fill_attrs(paint: Paint) -> String {
        if paint.is_opaque() {
            format!(r#"fill="{}""#, paint.color)
        } else {
            format!(r#"fill="{}" fill-opacity="{}""#, paint.color, paint.opacity)
        }
    }

    fn stroke_attrs(width: f64, paint: Paint) -> String {
        if paint.is_opaque() {
            format!(r#"stroke="{}" stroke-width="{}""#, paint.color, width)
        } else {
            format!(
                r#"stroke="{}" stroke-width="{}" stroke-opacity="{}""#,
                paint.color, width, paint.opacity
            )
        }
    }
}

/// Escapes text content and attribute values.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

impl DrawingSurface for SvgSurface {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn begin_slide(&mut self, bg: Paint) -> Result<(), RenderError> {
        let _ = writeln!(
            self.body,
            r#"<rect x="0" y="0" width="{}" height="{}" {} />"#,
            self.width,
            self.height,
            Self::fill_attrs(bg)
        );
        Ok(())
    }

    fn fill_gradient(
        &mut self,
        color1: Color,
        color2: Color,
        pct: f64,
    ) -> Result<(), RenderError> {
        self.gradient_count += 1;
        let id = format!("grad{}", self.gradient_count);
        let offset = pct.clamp(0.0, 100.0);
        let _ = writeln!(
            self.defs,
            concat!(
                r#"<linearGradient id="{id}" x1="0" y1="0" x2="0" y2="1">"#,
                r#"<stop offset="{off}%" stop-color="{c1}"/>"#,
                r#"<stop offset="100%" stop-color="{c2}"/>"#,
                r#"</linearGradient>"#
            ),
            id = id,
            off = offset,
            c1 = color1,
            c2 = color2,
        );
        let _ = writeln!(
            self.body,
            r#"<rect x="0" y="0" width="{}" height="{}" fill="url(#{})" />"#,
            self.width, self.height, id
        );
        Ok(())
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, paint: Paint)
    -> Result<(), RenderError> {
        let _ = writeln!(
            self.body,
            r#"<rect x="{}" y="{}" width="{}" height="{}" {} />"#,
            x,
            y,
            w,
            h,
            Self::fill_attrs(paint)
        );
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
        let _ = writeln!(
            self.body,
            r#"<ellipse cx="{}" cy="{}" rx="{}" ry="{}" {} />"#,
            cx,
            cy,
            rx,
            ry,
            Self::fill_attrs(paint)
        );
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
        let _ = writeln!(
            self.body,
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" {} />"#,
            x1,
            y1,
            x2,
            y2,
            Self::stroke_attrs(width, paint)
        );
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
        // Angles are counter-clockwise from east in a Y-up frame, so the
        // device-space point needs the sine negated.
        let (sx, sy) = arc_point(cx, cy, rx, ry, a1);
        let (ex, ey) = arc_point(cx, cy, rx, ry, a2);
        let large_arc = if (a2 - a1).abs() > 180.0 { 1 } else { 0 };
        let _ = writeln!(
            self.body,
            r#"<path d="M {} {} A {} {} 0 {} 0 {} {}" fill="none" {} />"#,
            sx,
            sy,
            rx,
            ry,
            large_arc,
            ex,
            ey,
            Self::stroke_attrs(width, paint)
        );
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
        let _ = writeln!(
            self.body,
            r#"<path d="M {} {} Q {} {} {} {}" fill="none" {} />"#,
            x1,
            y1,
            cx,
            cy,
            x2,
            y2,
            Self::stroke_attrs(width, paint)
        );
        Ok(())
    }

    fn fill_polygon(&mut self, points: &[Point], paint: Paint) -> Result<(), RenderError> {
        let mut coords = String::new();
        for p in points {
            if !coords.is_empty() {
                coords.push(' ');
            }
            let _ = write!(coords, "{},{}", p.x, p.y);
        }
        let _ = writeln!(
            self.body,
            r#"<polygon points="{}" {} />"#,
            coords,
            Self::fill_attrs(paint)
        );
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
        let anchor = match anchor {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
            Anchor::End => "end",
        };
        let transform = if rotation != 0.0 {
            format!(r#" transform="rotate({} {} {})""#, rotation, x, y)
        } else {
            String::new()
        };
        let _ = writeln!(
            self.body,
            r#"<text x="{}" y="{}" font-family="{}" font-size="{}" text-anchor="{}" {}{}>{}</text>"#,
            x,
            y,
            escape(font.family_name()),
            size,
            anchor,
            Self::fill_attrs(paint),
            transform,
            escape(text)
        );
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
        let opacity_attr = if opacity < 1.0 {
            format!(r#" opacity="{}""#, opacity)
        } else {
            String::new()
        };
        let _ = writeln!(
            self.body,
            r#"<image x="{}" y="{}" width="{}" height="{}" href="{}"{} />"#,
            cx - w / 2.0,
            cy - h / 2.0,
            w,
            h,
            escape(path),
            opacity_attr
        );
        Ok(())
    }

    fn end_slide(&mut self) -> Result<(), RenderError> {
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<Vec<u8>, RenderError> {
        let mut out = String::new();
        let _ = writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        );
        if let Some(title) = &self.title {
            let _ = writeln!(out, "<title>{}</title>", escape(title));
        }
        if !self.defs.is_empty() {
            let _ = writeln!(out, "<defs>\n{}</defs>", self.defs);
        }
        out.push_str(&self.body);
        out.push_str("</svg>\n");
        Ok(out.into_bytes())
    }
}

fn arc_point(cx: f64, cy: f64, rx: f64, ry: f64, angle_deg: f64) -> (f64, f64) {
    let rad = angle_deg.to_radians();
    (cx + rx * rad.cos(), cy - ry * rad.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_fonts::FontLibrary;
    use easel_model::Deck;
    use easel_render_core::{render_slide, RenderOptions};

    fn render(xml: &str) -> String {
        let deck = Deck::parse(xml).unwrap();
        let mut surface = Box::new(SvgSurface::new(deck.canvas.width, deck.canvas.height, None));
        let fonts = FontLibrary::new();
        render_slide(&mut *surface, &deck, 0, &fonts, &RenderOptions::default()).unwrap();
        String::from_utf8(surface.finish().unwrap()).unwrap()
    }

    #[test]
    fn test_root_tags_and_text_content() {
        let svg = render(
            r#"<deck><canvas width="792" height="612"/><slide>
                <text xp="50" yp="50" sp="3" align="center">Hello World</text>
            </slide></deck>"#,
        );
        assert!(svg.contains("<svg"));
        assert!(svg.contains("</svg>"));
        assert!(svg.contains("Hello World"));
        assert!(svg.contains(r#"x="396""#));
        assert!(svg.contains(r#"y="306""#));
        assert!(svg.contains(r#"text-anchor="middle""#));
    }

    #[test]
    fn test_gradient_defined_once_and_referenced() {
        let svg = render(
            r#"<deck><slide gradcolor1="red" gradcolor2="blue" gradpercent="40"/></deck>"#,
        );
        assert_eq!(svg.matches("<linearGradient").count(), 1);
        assert!(svg.contains(r##"fill="url(#grad1)""##));
        assert!(svg.contains(r#"offset="40%""#));
    }

    #[test]
    fn test_opacity_emitted_as_fill_opacity() {
        let svg = render(
            r#"<deck><slide><rect xp="50" yp="50" wp="10" hp="10" color="red" opacity="50"/></slide></deck>"#,
        );
        assert!(svg.contains(r#"fill-opacity="0.5""#));
    }

    #[test]
    fn test_text_is_escaped() {
        let svg = render(
            r#"<deck><slide><text xp="10" yp="10" sp="2">a &lt; b &amp; c</text></slide></deck>"#,
        );
        assert!(svg.contains("a &lt; b &amp; c"));
    }

    #[test]
    fn test_image_is_center_anchored() {
        let svg = render(
            r#"<deck><canvas width="100" height="100"/><slide>
                <image name="pic.png" xp="50" yp="50" wp="20" hp="20"/>
            </slide></deck>"#,
        );
        assert!(svg.contains(r#"<image x="40" y="40" width="20" height="20" href="pic.png""#));
    }
}
