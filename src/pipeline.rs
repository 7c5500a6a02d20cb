//! The pipeline orchestrator: compile -> parse -> dispatch.
//!
//! A render call is composed strictly of the three stages; an error at
//! any stage is wrapped with the stage name and returned immediately,
//! never swallowed and never retried.

use crate::compile::DeckCompiler;
use crate::error::PipelineError;
use easel_fonts::FontLibrary;
use easel_model::Deck;
use easel_render_core::{render_deck, render_slide, DrawingSurface, RenderOptions};
use easel_render_pdf::PdfSurface;
use easel_render_raster::RasterSurface;
use easel_render_svg::SvgSurface;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// File extension of DSL source files.
pub const DSL_EXTENSION: &str = "dsh";

/// The selectable output targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Svg,
    Png,
    Pdf,
    /// Pass-through: the compiled intermediate XML itself.
    Xml,
}

impl OutputFormat {
    /// Parses a format identifier; `None` for anything unsupported.
    pub fn from_name(name: &str) -> Option<OutputFormat> {
        match name.to_ascii_lowercase().as_str() {
            "svg" => Some(OutputFormat::Svg),
            "png" => Some(OutputFormat::Png),
            "pdf" => Some(OutputFormat::Pdf),
            "xml" => Some(OutputFormat::Xml),
            _ => None,
        }
    }

    /// Parses a comma- or colon-separated format list.
    pub fn parse_list(spec: &str) -> Result<Vec<OutputFormat>, PipelineError> {
        spec.split([',', ':'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|name| {
                OutputFormat::from_name(name)
                    .ok_or_else(|| PipelineError::UnsupportedFormat(name.to_string()))
            })
            .collect()
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
            OutputFormat::Pdf => "pdf",
            OutputFormat::Xml => "xml",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Derives the default output path by swapping the DSL extension for the
/// format's extension.
pub fn default_output_path(input: &Path, format: OutputFormat) -> PathBuf {
    input.with_extension(format.extension())
}

/// The render pipeline: an external compiler plus a shared font library.
///
/// Rendering is stateless per call; one pipeline value can serve
/// concurrent renders.
pub struct Pipeline {
    compiler: Arc<dyn DeckCompiler>,
    fonts: FontLibrary,
}

impl Pipeline {
    pub fn new(compiler: Arc<dyn DeckCompiler>, fonts: FontLibrary) -> Self {
        log::debug!(
            "[PIPELINE] using '{}' compiler, {} font face(s)",
            compiler.name(),
            fonts.face_count()
        );
        Self { compiler, fonts }
    }

    pub fn fonts(&self) -> &FontLibrary {
        &self.fonts
    }

    /// Runs only the compile stage.
    pub fn compile(&self, source: &str) -> Result<String, PipelineError> {
        self.compiler.compile(source)
    }

    /// One-shot render: DSL text in, output bytes out.
    pub fn render(
        &self,
        source: &str,
        format: OutputFormat,
        options: &RenderOptions,
    ) -> Result<Vec<u8>, PipelineError> {
        let xml = self.compiler.compile(source)?;
        if format == OutputFormat::Xml {
            return Ok(xml.into_bytes());
        }
        let deck = Deck::parse(&xml)?;
        self.render_deck(&deck, format, options)
    }

    /// Like [`render`](Pipeline::render), but with the format given as an
    /// identifier string; unknown names produce
    /// [`PipelineError::UnsupportedFormat`] and zero output bytes.
    pub fn render_named(
        &self,
        source: &str,
        format: &str,
        options: &RenderOptions,
    ) -> Result<Vec<u8>, PipelineError> {
        let format = OutputFormat::from_name(format)
            .ok_or_else(|| PipelineError::UnsupportedFormat(format.to_string()))?;
        self.render(source, format, options)
    }

    /// Renders an already-parsed deck.
    ///
    /// SVG and PNG render the slide selected by `options.slide`; PDF
    /// renders every slide, one page each.
    pub fn render_deck(
        &self,
        deck: &Deck,
        format: OutputFormat,
        options: &RenderOptions,
    ) -> Result<Vec<u8>, PipelineError> {
        let (w, h) = (deck.canvas.width, deck.canvas.height);
        match format {
            OutputFormat::Svg => {
                let mut surface = Box::new(SvgSurface::new(w, h, options.title.clone()));
                render_slide(&mut *surface, deck, options.slide, &self.fonts, options)?;
                Ok(surface.finish()?)
            }
            OutputFormat::Png => {
                let mut surface = Box::new(RasterSurface::new(w, h)?);
                render_slide(&mut *surface, deck, options.slide, &self.fonts, options)?;
                Ok(surface.finish()?)
            }
            OutputFormat::Pdf => {
                let mut surface = Box::new(PdfSurface::new(w, h, options.title.clone()));
                render_deck(&mut *surface, deck, &self.fonts, options)?;
                Ok(surface.finish()?)
            }
            OutputFormat::Xml => Err(PipelineError::UnsupportedFormat(
                "xml pass-through requires the DSL source".to_string(),
            )),
        }
    }

    /// Reads a DSL file, renders it, and writes the output next to the
    /// input (or to `output` when given). Returns the written path.
    pub fn render_file(
        &self,
        input: &Path,
        format: OutputFormat,
        options: &RenderOptions,
        output: Option<&Path>,
    ) -> Result<PathBuf, PipelineError> {
        let source = std::fs::read_to_string(input)?;
        let bytes = self.render(&source, format, options)?;
        let path = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_output_path(input, format));
        std::fs::write(&path, bytes)?;
        log::info!("[PIPELINE] wrote {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!(OutputFormat::from_name("SVG"), Some(OutputFormat::Svg));
        assert_eq!(OutputFormat::from_name("pdf"), Some(OutputFormat::Pdf));
        assert_eq!(OutputFormat::from_name("webp"), None);
    }

    #[test]
    fn test_format_list_parsing() {
        let formats = OutputFormat::parse_list("svg, png").unwrap();
        assert_eq!(formats, vec![OutputFormat::Svg, OutputFormat::Png]);
        assert!(OutputFormat::parse_list("svg,webp").is_err());
    }

    #[test]
    fn test_default_output_path_swaps_extension() {
        let path = default_output_path(Path::new("talks/intro.dsh"), OutputFormat::Png);
        assert_eq!(path, PathBuf::from("talks/intro.png"));
    }
}
