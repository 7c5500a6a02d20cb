//! Attribute-driven parser for the intermediate deck XML.

use crate::deck::*;
use easel_types::{Align, Color};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("invalid canvas dimensions: {width} x {height}")]
    InvalidCanvas { width: f64, height: f64 },
    #[error("invalid attribute '{attribute}' on <{element}>: {message}")]
    Attribute {
        element: String,
        attribute: String,
        message: String,
    },
}

/// Names of the shape elements that may appear inside a slide.
const SHAPE_ELEMENTS: &[&str] = &[
    "rect", "ellipse", "line", "arc", "curve", "polygon", "text", "list", "image",
];

/// Default stroke size (percent of canvas width) for line-like shapes.
const DEFAULT_STROKE_SP: f64 = 0.2;
/// Default font size (percent-scale units) for text and list elements.
const DEFAULT_TEXT_SP: f64 = 2.0;

pub fn parse_deck(xml: &str) -> Result<Deck, ParseError> {
    let doc = roxmltree::Document::parse(xml)?;
    let root = doc.root_element();

    let mut canvas = Canvas::default();
    let mut slides = Vec::new();

    match root.tag_name().name() {
        "deck" => {
            // Bare shapes directly inside <deck> are collected into one
            // synthetic slide so fragment-level tooling keeps working.
            let mut synthetic = Slide::default();
            let mut has_bare = false;
            for child in root.children().filter(|c| c.is_element()) {
                match child.tag_name().name() {
                    "canvas" => canvas = parse_canvas(child)?,
                    "slide" => slides.push(parse_slide(child)?),
                    name if SHAPE_ELEMENTS.contains(&name) => {
                        parse_shape_into(&mut synthetic, child)?;
                        has_bare = true;
                    }
                    other => {
                        log::debug!("[PARSE] ignoring unknown element <{}>", other);
                    }
                }
            }
            if has_bare {
                slides.push(synthetic);
            }
        }
        "slide" => slides.push(parse_slide(root)?),
        name if SHAPE_ELEMENTS.contains(&name) => {
            // A shape fragment as the document root.
            let mut synthetic = Slide::default();
            parse_shape_into(&mut synthetic, root)?;
            slides.push(synthetic);
        }
        other => {
            log::debug!("[PARSE] unknown root element <{}>, producing empty deck", other);
        }
    }

    if canvas.width <= 0.0 || canvas.height <= 0.0 {
        return Err(ParseError::InvalidCanvas {
            width: canvas.width,
            height: canvas.height,
        });
    }

    Ok(Deck { canvas, slides })
}

fn parse_canvas(node: roxmltree::Node) -> Result<Canvas, ParseError> {
    let default = Canvas::default();
    Ok(Canvas {
        width: attr_f64(node, "width", default.width)?,
        height: attr_f64(node, "height", default.height)?,
    })
}

fn parse_slide(node: roxmltree::Node) -> Result<Slide, ParseError> {
    let mut slide = Slide {
        bg: attr_color(node, "bg")?.unwrap_or(Color::WHITE),
        fg: attr_color(node, "fg")?.unwrap_or(Color::BLACK),
        ..Slide::default()
    };

    // The gradient is active only when both colors parse.
    let c1 = attr_color(node, "gradcolor1")?;
    let c2 = attr_color(node, "gradcolor2")?;
    if let (Some(color1), Some(color2)) = (c1, c2) {
        slide.gradient = Some(Gradient {
            color1,
            color2,
            pct: attr_f64(node, "gradpercent", 50.0)?,
        });
    }

    for child in node.children().filter(|c| c.is_element()) {
        parse_shape_into(&mut slide, child)?;
    }
    Ok(slide)
}

fn parse_shape_into(slide: &mut Slide, node: roxmltree::Node) -> Result<(), ParseError> {
    match node.tag_name().name() {
        "rect" => slide.rects.push(Rect {
            xp: attr_f64(node, "xp", 0.0)?,
            yp: attr_f64(node, "yp", 0.0)?,
            wp: attr_f64(node, "wp", 0.0)?,
            hp: attr_f64(node, "hp", 0.0)?,
            color: attr_color(node, "color")?,
            opacity: attr_f64(node, "opacity", 100.0)?,
        }),
        "ellipse" => slide.ellipses.push(Ellipse {
            xp: attr_f64(node, "xp", 0.0)?,
            yp: attr_f64(node, "yp", 0.0)?,
            wp: attr_f64(node, "wp", 0.0)?,
            hp: attr_f64(node, "hp", 0.0)?,
            color: attr_color(node, "color")?,
            opacity: attr_f64(node, "opacity", 100.0)?,
        }),
        "line" => slide.lines.push(Line {
            xp1: attr_f64(node, "xp1", 0.0)?,
            yp1: attr_f64(node, "yp1", 0.0)?,
            xp2: attr_f64(node, "xp2", 0.0)?,
            yp2: attr_f64(node, "yp2", 0.0)?,
            sp: attr_f64(node, "sp", DEFAULT_STROKE_SP)?,
            color: attr_color(node, "color")?,
            opacity: attr_f64(node, "opacity", 100.0)?,
        }),
        "arc" => slide.arcs.push(Arc {
            xp: attr_f64(node, "xp", 0.0)?,
            yp: attr_f64(node, "yp", 0.0)?,
            wp: attr_f64(node, "wp", 0.0)?,
            hp: attr_f64(node, "hp", 0.0)?,
            a1: attr_f64(node, "a1", 0.0)?,
            a2: attr_f64(node, "a2", 0.0)?,
            sp: attr_f64(node, "sp", DEFAULT_STROKE_SP)?,
            color: attr_color(node, "color")?,
            opacity: attr_f64(node, "opacity", 100.0)?,
        }),
        "curve" => slide.curves.push(Curve {
            xp1: attr_f64(node, "xp1", 0.0)?,
            yp1: attr_f64(node, "yp1", 0.0)?,
            xp2: attr_f64(node, "xp2", 0.0)?,
            yp2: attr_f64(node, "yp2", 0.0)?,
            xp3: attr_f64(node, "xp3", 0.0)?,
            yp3: attr_f64(node, "yp3", 0.0)?,
            sp: attr_f64(node, "sp", DEFAULT_STROKE_SP)?,
            color: attr_color(node, "color")?,
            opacity: attr_f64(node, "opacity", 100.0)?,
        }),
        "polygon" => {
            let xc = attr_coord_list(node, "xc")?;
            let yc = attr_coord_list(node, "yc")?;
            if xc.len() != yc.len() || xc.len() < 3 {
                return Err(ParseError::Attribute {
                    element: "polygon".into(),
                    attribute: "xc".into(),
                    message: format!(
                        "coordinate lists must match and hold at least 3 points (got {} x, {} y)",
                        xc.len(),
                        yc.len()
                    ),
                });
            }
            slide.polygons.push(Polygon {
                xc,
                yc,
                color: attr_color(node, "color")?,
                opacity: attr_f64(node, "opacity", 100.0)?,
            });
        }
        "text" => slide.texts.push(Text {
            content: text_content(node),
            xp: attr_f64(node, "xp", 0.0)?,
            yp: attr_f64(node, "yp", 0.0)?,
            sp: attr_f64(node, "sp", DEFAULT_TEXT_SP)?,
            wp: attr_f64(node, "wp", 0.0)?,
            font: node.attribute("font").map(str::to_string),
            color: attr_color(node, "color")?,
            opacity: attr_f64(node, "opacity", 100.0)?,
            align: node.attribute("align").map(Align::parse).unwrap_or_default(),
            kind: match node.attribute("type") {
                Some("block") => TextKind::Block,
                Some("code") => TextKind::Code,
                _ => TextKind::Plain,
            },
            lp: attr_opt_f64(node, "lp")?,
            rotation: attr_f64(node, "rotation", 0.0)?,
        }),
        "list" => slide.lists.push(List {
            items: node
                .children()
                .filter(|c| c.is_element() && c.tag_name().name() == "li")
                .map(text_content)
                .collect(),
            xp: attr_f64(node, "xp", 0.0)?,
            yp: attr_f64(node, "yp", 0.0)?,
            sp: attr_f64(node, "sp", DEFAULT_TEXT_SP)?,
            wp: attr_f64(node, "wp", 0.0)?,
            font: node.attribute("font").map(str::to_string),
            color: attr_color(node, "color")?,
            opacity: attr_f64(node, "opacity", 100.0)?,
            align: node.attribute("align").map(Align::parse).unwrap_or_default(),
            kind: match node.attribute("type") {
                Some("bullet") => ListKind::Bullet,
                Some("number") => ListKind::Number,
                _ => ListKind::Plain,
            },
            lp: attr_opt_f64(node, "lp")?,
        }),
        "image" => slide.images.push(Image {
            name: node.attribute("name").unwrap_or_default().to_string(),
            xp: attr_f64(node, "xp", 0.0)?,
            yp: attr_f64(node, "yp", 0.0)?,
            wp: attr_f64(node, "wp", 0.0)?,
            hp: attr_f64(node, "hp", 0.0)?,
            opacity: attr_f64(node, "opacity", 100.0)?,
        }),
        other => {
            log::debug!("[PARSE] ignoring unknown element <{}>", other);
        }
    }
    Ok(())
}

/// The concatenated text content of an element.
fn text_content(node: roxmltree::Node) -> String {
    let mut s = String::new();
    for child in node.children() {
        if child.is_text()
            && let Some(text) = child.text()
        {
            s.push_str(text);
        }
    }
    s
}

fn attr_f64(node: roxmltree::Node, name: &str, default: f64) -> Result<f64, ParseError> {
    match node.attribute(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<f64>().map_err(|e| ParseError::Attribute {
            element: node.tag_name().name().to_string(),
            attribute: name.to_string(),
            message: e.to_string(),
        }),
    }
}

fn attr_opt_f64(node: roxmltree::Node, name: &str) -> Result<Option<f64>, ParseError> {
    match node.attribute(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|e| ParseError::Attribute {
                element: node.tag_name().name().to_string(),
                attribute: name.to_string(),
                message: e.to_string(),
            }),
    }
}

fn attr_color(node: roxmltree::Node, name: &str) -> Result<Option<Color>, ParseError> {
    match node.attribute(name) {
        None => Ok(None),
        Some(raw) => Color::parse(raw)
            .map(Some)
            .map_err(|message| ParseError::Attribute {
                element: node.tag_name().name().to_string(),
                attribute: name.to_string(),
                message,
            }),
    }
}

fn attr_coord_list(node: roxmltree::Node, name: &str) -> Result<Vec<f64>, ParseError> {
    let raw = node.attribute(name).unwrap_or_default();
    raw.split_whitespace()
        .map(|v| {
            v.parse::<f64>().map_err(|e| ParseError::Attribute {
                element: node.tag_name().name().to_string(),
                attribute: name.to_string(),
                message: e.to_string(),
            })
        })
        .collect()
}
