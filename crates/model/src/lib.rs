//! The deck document model and its intermediate-XML parser.
//!
//! A [`Deck`] is the parsed, typed in-memory representation of one
//! presentation: a canvas size plus ordered slides, each holding ordered
//! collections of shape records. All positions and sizes are expressed in
//! percentage coordinates relative to the canvas; conversion to device
//! units happens in the render layer, never here.

mod deck;
mod parse;

pub use deck::{
    Arc, Canvas, Curve, Deck, Ellipse, Gradient, Image, Line, List, ListKind, Polygon, Rect,
    Slide, Text, TextKind,
};
pub use parse::ParseError;
