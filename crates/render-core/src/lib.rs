//! Core rendering abstractions shared by every backend.
//!
//! The three output backends (SVG, raster, PDF) implement one
//! [`DrawingSurface`] capability set; the coordinate engine, the layer
//! dispatcher and the text/list layout algorithms are written exactly
//! once against that trait. Backends only translate device-space
//! primitives into their native drawing model.

pub mod coord;
mod error;
mod layers;
mod surface;
pub mod text;

pub use error::RenderError;
pub use layers::{
    layer_names, render_deck, render_slide, RenderOptions, DEFAULT_LAYERS, DEFAULT_SHAPE_COLOR,
};
pub use surface::{Anchor, DrawingSurface, Paint};
