//! The paginated backend: one PDF page per slide, generated with lopdf.
//!
//! Known fidelity degradations, reproduced deliberately rather than
//! "fixed": gradients flatten to the first gradient color, and arcs and
//! curves are emitted as straight-line approximations. Text uses the
//! Type1 base-14 faces with WinAnsi encoding; opacity goes through
//! ExtGState alpha entries; images are embedded as DeviceRGB XObjects.

use easel_fonts::ResolvedFont;
use easel_render_core::{Anchor, DrawingSurface, Paint, RenderError};
use easel_types::{Color, Point};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::collections::BTreeMap;

/// Segment count for the arc/curve straight-line approximations.
const FLATTEN_SEGMENTS: usize = 32;

/// Magic for approximating quarter-ellipse arcs with cubic Béziers.
const KAPPA: f64 = 0.552_284_749_831;

/// A drawing surface that accumulates PDF pages.
pub struct PdfSurface {
    doc: Document,
    pages_id: ObjectId,
    resources_id: ObjectId,
    page_ids: Vec<ObjectId>,
    ops: Vec<Operation>,
    fonts_used: BTreeMap<String, String>,
    alphas_used: BTreeMap<String, f64>,
    xobjects: Vec<(String, ObjectId)>,
    width: f64,
    height: f64,
    title: Option<String>,
}

impl PdfSurface {
    pub fn new(width: f64, height: f64, title: Option<String>) -> Self {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let resources_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            resources_id,
            page_ids: Vec::new(),
            ops: Vec::new(),
            fonts_used: BTreeMap::new(),
            alphas_used: BTreeMap::new(),
            xobjects: Vec::new(),
            width,
            height,
            title,
        }
    }

    /// Convert layout Y (top-down) to PDF Y (bottom-up origin).
    fn fy(&self, y: f64) -> f64 {
        self.height - y
    }

    fn op(&mut self, operator: &str, operands: Vec<Object>) {
        self.ops.push(Operation::new(operator, operands));
    }

    fn save_state(&mut self) {
        self.op("q", vec![]);
    }

    fn restore_state(&mut self) {
        self.op("Q", vec![]);
    }

    fn set_fill_color(&mut self, color: Color) {
        let [r, g, b] = color.to_unit();
        self.op("rg", vec![r.into(), g.into(), b.into()]);
    }

    fn set_stroke_color(&mut self, color: Color) {
        let [r, g, b] = color.to_unit();
        self.op("RG", vec![r.into(), g.into(), b.into()]);
    }

    /// Applies constant alpha through a (deduplicated) ExtGState.
    fn set_alpha(&mut self, opacity: f64) {
        if opacity >= 1.0 {
            return;
        }
        let name = format!("GS{}", (opacity * 100.0).round() as u32);
        self.alphas_used.entry(name.clone()).or_insert(opacity);
        self.op("gs", vec![Object::Name(name.into_bytes())]);
    }

    /// The `/F..` resource name for a font, registering it on first use.
    fn font_resource(&mut self, font: &ResolvedFont) -> String {
        let base = base14_name(font);
        if let Some(name) = self.fonts_used.get(&base) {
            return name.clone();
        }
        let name = format!("F{}", self.fonts_used.len() + 1);
        self.fonts_used.insert(base, name.clone());
        name
    }

    fn stroke_polyline(&mut self, points: &[(f64, f64)], width: f64, paint: Paint) {
        if points.len() < 2 {
            return;
        }
        self.save_state();
        self.set_alpha(paint.opacity);
        self.set_stroke_color(paint.color);
        self.op("w", vec![(width as f32).into()]);
        self.op("m", vec![(points[0].0 as f32).into(), (points[0].1 as f32).into()]);
        for &(x, y) in &points[1..] {
            self.op("l", vec![(x as f32).into(), (y as f32).into()]);
        }
        self.op("S", vec![]);
        self.restore_state();
    }

    fn fill_full_page(&mut self, paint: Paint) {
        self.save_state();
        self.set_alpha(paint.opacity);
        self.set_fill_color(paint.color);
        self.op(
            "re",
            vec![
                0f32.into(),
                0f32.into(),
                (self.width as f32).into(),
                (self.height as f32).into(),
            ],
        );
        self.op("f", vec![]);
        self.restore_state();
    }
}

/// Maps a requested family onto a Type1 base-14 face, with the weight
/// suffix scheme of styled font names.
fn base14_name(font: &ResolvedFont) -> String {
    let family = font.requested_family().to_ascii_lowercase();
    let base = if family.contains("mono") || family.contains("courier") {
        "Courier"
    } else if family.contains("sans") || family.contains("helvetica") || family.contains("arial") {
        "Helvetica"
    } else if family.contains("serif") || family.contains("times") {
        "Times"
    } else {
        "Helvetica"
    };

    match (base, font.weight().is_bold()) {
        ("Times", false) => "Times-Roman".to_string(),
        ("Times", true) => "Times-Bold".to_string(),
        (name, false) => name.to_string(),
        (name, true) => format!("{}-Bold", name),
    }
}

/// WinAnsi-safe byte encoding: codepoints above latin-1 become '?'.
fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| if (c as u32) < 256 { c as u8 } else { b'?' })
        .collect()
}

impl DrawingSurface for PdfSurface {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn begin_slide(&mut self, bg: Paint) -> Result<(), RenderError> {
        self.ops.clear();
        self.fill_full_page(bg);
        Ok(())
    }

    fn fill_gradient(
        &mut self,
        color1: Color,
        _color2: Color,
        _pct: f64,
    ) -> Result<(), RenderError> {
        // No native multi-stop gradient primitive here: degrade to a flat
        // fill of the first gradient color.
        self.fill_full_page(Paint::opaque(color1));
        Ok(())
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, paint: Paint)
    -> Result<(), RenderError> {
        self.save_state();
        self.set_alpha(paint.opacity);
        self.set_fill_color(paint.color);
        self.op(
            "re",
            vec![
                (x as f32).into(),
                (self.fy(y + h) as f32).into(),
                (w as f32).into(),
                (h as f32).into(),
            ],
        );
        self.op("f", vec![]);
        self.restore_state();
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
        let cy = self.fy(cy);
        let (kx, ky) = (rx * KAPPA, ry * KAPPA);

        self.save_state();
        self.set_alpha(paint.opacity);
        self.set_fill_color(paint.color);
        self.op("m", vec![((cx + rx) as f32).into(), (cy as f32).into()]);
        let quadrants: [[f64; 6]; 4] = [
            [cx + rx, cy + ky, cx + kx, cy + ry, cx, cy + ry],
            [cx - kx, cy + ry, cx - rx, cy + ky, cx - rx, cy],
            [cx - rx, cy - ky, cx - kx, cy - ry, cx, cy - ry],
            [cx + kx, cy - ry, cx + rx, cy - ky, cx + rx, cy],
        ];
        for q in quadrants {
            self.op("c", q.iter().map(|&v| (v as f32).into()).collect());
        }
        self.op("f", vec![]);
        self.restore_state();
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
        let points = [(x1, self.fy(y1)), (x2, self.fy(y2))];
        self.stroke_polyline(&points, width, paint);
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
        // Straight-line approximation: documented fidelity loss.
        let points: Vec<(f64, f64)> = (0..=FLATTEN_SEGMENTS)
            .map(|i| {
                let t = a1 + (a2 - a1) * i as f64 / FLATTEN_SEGMENTS as f64;
                let rad = t.to_radians();
                (cx + rx * rad.cos(), self.fy(cy - ry * rad.sin()))
            })
            .collect();
        self.stroke_polyline(&points, width, paint);
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
        // Straight-line approximation of the quadratic Bézier.
        let points: Vec<(f64, f64)> = (0..=FLATTEN_SEGMENTS)
            .map(|i| {
                let t = i as f64 / FLATTEN_SEGMENTS as f64;
                let mt = 1.0 - t;
                let x = mt * mt * x1 + 2.0 * mt * t * cx + t * t * x2;
                let y = mt * mt * y1 + 2.0 * mt * t * cy + t * t * y2;
                (x, self.fy(y))
            })
            .collect();
        self.stroke_polyline(&points, width, paint);
        Ok(())
    }

    fn fill_polygon(&mut self, points: &[Point], paint: Paint) -> Result<(), RenderError> {
        if points.len() < 3 {
            return Ok(());
        }
        self.save_state();
        self.set_alpha(paint.opacity);
        self.set_fill_color(paint.color);
        self.op(
            "m",
            vec![(points[0].x as f32).into(), (self.fy(points[0].y) as f32).into()],
        );
        for p in &points[1..] {
            self.op("l", vec![(p.x as f32).into(), (self.fy(p.y) as f32).into()]);
        }
        self.op("h", vec![]);
        self.op("f", vec![]);
        self.restore_state();
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
        if text.is_empty() {
            return Ok(());
        }
        let font_name = self.font_resource(font);
        let total = font.measure(text, size);
        let x0 = match anchor {
            Anchor::Start => x,
            Anchor::Middle => x - total / 2.0,
            Anchor::End => x - total,
        };
        let py = self.fy(y);

        self.save_state();
        self.set_alpha(paint.opacity);
        self.set_fill_color(paint.color);
        self.op("BT", vec![]);
        self.op(
            "Tf",
            vec![Object::Name(font_name.into_bytes()), (size as f32).into()],
        );
        if rotation != 0.0 {
            // Screen-clockwise rotation is a negative angle in PDF's
            // Y-up frame.
            let rad = (-rotation).to_radians();
            let (sin, cos) = (rad.sin() as f32, rad.cos() as f32);
            self.op(
                "Tm",
                vec![
                    cos.into(),
                    sin.into(),
                    (-sin).into(),
                    cos.into(),
                    (x0 as f32).into(),
                    (py as f32).into(),
                ],
            );
        } else {
            self.op("Td", vec![(x0 as f32).into(), (py as f32).into()]);
        }
        self.op(
            "Tj",
            vec![Object::String(
                encode_text(text),
                lopdf::StringFormat::Literal,
            )],
        );
        self.op("ET", vec![]);
        self.restore_state();
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
        let img = match image::open(path) {
            Ok(img) => img.to_rgb8(),
            Err(e) => {
                log::warn!("[PDF] image '{}' skipped: {}", path, e);
                return Ok(());
            }
        };
        let (iw, ih) = img.dimensions();
        let stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => iw as i64,
                "Height" => ih as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8i64,
            },
            img.into_raw(),
        );
        let id = self.doc.add_object(stream);
        let name = format!("Im{}", self.xobjects.len() + 1);
        self.xobjects.push((name.clone(), id));

        // Unit-square image placement: scale to w x h at the bottom-left
        // corner of the target box.
        let bx = cx - w / 2.0;
        let by = self.fy(cy + h / 2.0);
        self.save_state();
        self.set_alpha(opacity);
        self.op(
            "cm",
            vec![
                (w as f32).into(),
                0f32.into(),
                0f32.into(),
                (h as f32).into(),
                (bx as f32).into(),
                (by as f32).into(),
            ],
        );
        self.op("Do", vec![Object::Name(name.into_bytes())]);
        self.restore_state();
        Ok(())
    }

    fn end_slide(&mut self) -> Result<(), RenderError> {
        let content = Content {
            operations: std::mem::take(&mut self.ops),
        };
        let bytes = content
            .encode()
            .map_err(|e| RenderError::Pdf(e.to_string()))?;
        let content_id = self.doc.add_object(Stream::new(dictionary! {}, bytes));
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![
                0f32.into(),
                0f32.into(),
                (self.width as f32).into(),
                (self.height as f32).into(),
            ],
            "Contents" => content_id,
            "Resources" => self.resources_id,
        });
        self.page_ids.push(page_id);
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> Result<Vec<u8>, RenderError> {
        let mut font_dict = Dictionary::new();
        for (base, name) in &self.fonts_used {
            let entry = dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => base.as_str(),
                "Encoding" => "WinAnsiEncoding",
            };
            font_dict.set(name.as_bytes().to_vec(), Object::Dictionary(entry));
        }

        let mut resources = dictionary! {
            "Font" => Object::Dictionary(font_dict),
        };
        if !self.alphas_used.is_empty() {
            let mut ext_dict = Dictionary::new();
            for (name, alpha) in &self.alphas_used {
                ext_dict.set(
                    name.as_bytes().to_vec(),
                    Object::Dictionary(dictionary! {
                        "Type" => "ExtGState",
                        "ca" => (*alpha as f32),
                        "CA" => (*alpha as f32),
                    }),
                );
            }
            resources.set("ExtGState", Object::Dictionary(ext_dict));
        }
        if !self.xobjects.is_empty() {
            let mut xobj_dict = Dictionary::new();
            for (name, id) in &self.xobjects {
                xobj_dict.set(name.as_bytes().to_vec(), Object::Reference(*id));
            }
            resources.set("XObject", Object::Dictionary(xobj_dict));
        }
        self.doc
            .objects
            .insert(self.resources_id, Object::Dictionary(resources));

        let kids: Vec<Object> = self.page_ids.iter().map(|id| Object::Reference(*id)).collect();
        let count = self.page_ids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        if let Some(title) = self.title.take() {
            let info_id = self.doc.add_object(dictionary! {
                "Producer" => Object::string_literal("easel"),
                "Title" => Object::string_literal(title),
            });
            self.doc.trailer.set("Info", info_id);
        }

        let mut buffer = Vec::new();
        self.doc
            .save_to(&mut buffer)
            .map_err(|e| RenderError::Pdf(e.to_string()))?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_fonts::FontLibrary;
    use easel_model::Deck;
    use easel_render_core::{render_deck, RenderOptions};
    use easel_types::FontWeight;

    fn render(xml: &str) -> Vec<u8> {
        let deck = Deck::parse(xml).unwrap();
        let mut surface = Box::new(PdfSurface::new(deck.canvas.width, deck.canvas.height, None));
        let fonts = FontLibrary::new();
        render_deck(&mut *surface, &deck, &fonts, &RenderOptions::default()).unwrap();
        surface.finish().unwrap()
    }

    #[test]
    fn test_produces_pdf_header() {
        let pdf = render(r#"<deck><slide/></deck>"#);
        assert!(pdf.starts_with(b"%PDF-1.7"));
    }

    #[test]
    fn test_one_page_per_slide() {
        // Parsing support is feature-gated off, so inspect the raw bytes.
        let pdf = render(r#"<deck><slide/><slide/><slide/></deck>"#);
        let text = String::from_utf8_lossy(&pdf);
        assert!(text.contains("/Count 3"), "missing page count: {}", &text[..200.min(text.len())]);
    }

    #[test]
    fn test_base14_mapping() {
        let fonts = FontLibrary::new();
        let sans = fonts.resolve("sans", FontWeight::Regular);
        let serif = fonts.resolve("serif", FontWeight::Regular);
        let mono = fonts.resolve("mono", FontWeight::Regular);
        let bold = fonts.resolve("sans", FontWeight::Bold);
        assert_eq!(base14_name(&sans), "Helvetica");
        assert_eq!(base14_name(&serif), "Times-Roman");
        assert_eq!(base14_name(&mono), "Courier");
        assert_eq!(base14_name(&bold), "Helvetica-Bold");
    }

    #[test]
    fn test_text_encoding_replaces_non_latin1() {
        assert_eq!(encode_text("ab\u{2014}c"), b"ab?c".to_vec());
    }
}
