//! easel - a declarative slide-rendering engine.
//!
//! easel consumes the intermediate deck XML produced by an external DSL
//! compiler and renders it through one shared layout path to three
//! structurally different backends: vector SVG markup, raster PNG
//! bitmaps, and paginated PDF documents. The document model works in
//! percentage coordinates (Y measured from the canvas bottom); backends
//! only ever see device-space primitives.
//!
//! ## Quick start
//!
//! ```no_run
//! use easel::{Pipeline, PassthroughCompiler, OutputFormat, RenderOptions, FontLibrary};
//! use std::sync::Arc;
//!
//! let pipeline = Pipeline::new(Arc::new(PassthroughCompiler), FontLibrary::from_env());
//! let svg = pipeline.render(
//!     r#"<deck><slide><text xp="50" yp="50" sp="3">Hello</text></slide></deck>"#,
//!     OutputFormat::Svg,
//!     &RenderOptions::default(),
//! )?;
//! # Ok::<(), easel::PipelineError>(())
//! ```
//!
//! Beyond one-shot rendering, [`watch::Watcher`] fans a directory of DSL
//! sources out to multiple formats on every change, and
//! [`golden::GoldenHarness`] performs byte-exact regression comparison
//! against a recorded fixture catalog.

pub mod compile;
pub mod error;
pub mod golden;
pub mod pipeline;
pub mod watch;

pub use compile::{CommandCompiler, DeckCompiler, PassthroughCompiler};
pub use error::PipelineError;
pub use golden::{Catalog, GoldenHarness, HarnessReport, StageOutcome};
pub use pipeline::{default_output_path, OutputFormat, Pipeline, DSL_EXTENSION};
pub use watch::{shutdown_channel, WatchConfig, Watcher};

// Re-export the pieces callers need to drive a render.
pub use easel_fonts::FontLibrary;
pub use easel_model::Deck;
pub use easel_render_core::{RenderError, RenderOptions, DEFAULT_LAYERS};
pub use easel_types::Color;
