//! Shared text and list layout, written once against [`DrawingSurface`].
//!
//! Backends never lay out text themselves: free text, block wrapping,
//! code panels and list markers are computed here and fed to the surface
//! as anchored single-line draws plus ordinary shapes.

use crate::error::RenderError;
use crate::surface::{Anchor, DrawingSurface, Paint};
use easel_fonts::ResolvedFont;
use easel_model::ListKind;
use easel_types::Color;

/// Default line-spacing factor relative to the font size.
pub const DEFAULT_LINE_SPACING: f64 = 1.4;

/// Background panel color behind code text.
pub const CODE_BACKGROUND: Color = Color::gray(240);

/// The token that forces a manual line break inside block text.
const BREAK_TOKEN: &str = "\\n";

/// Everything needed to draw one text element.
pub struct TextStyle<'a> {
    pub font: &'a ResolvedFont,
    pub size: f64,
    pub anchor: Anchor,
    pub line_spacing: f64,
    pub rotation: f64,
    pub paint: Paint,
}

/// Word-wraps `content` to `max_width` device units.
///
/// Words accumulate until the next word would push the measured line
/// width past `max_width`; the break is applied before that word, so a
/// single overlong word may exceed the width on its own line. The
/// literal `\n` token forces a break regardless of width.
pub fn wrap_words(content: &str, font: &ResolvedFont, size: f64, max_width: f64) -> Vec<String> {
    let space_width = font.measure(" ", size);
    let mut lines = Vec::new();

    for segment in content.split(BREAK_TOKEN) {
        let mut line = String::new();
        let mut line_width = 0.0;
        for word in segment.split_whitespace() {
            let word_width = font.measure(word, size);
            if !line.is_empty() && line_width + space_width + word_width > max_width {
                lines.push(std::mem::take(&mut line));
                line_width = 0.0;
            }
            if line.is_empty() {
                line_width = word_width;
            } else {
                line.push(' ');
                line_width += space_width + word_width;
            }
            line.push_str(word);
        }
        lines.push(line);
    }
    lines
}

/// Draws newline-separated free text; line `i` sits at
/// `y + i * line_spacing`.
pub fn draw_free_text(
    surface: &mut dyn DrawingSurface,
    x: f64,
    y: f64,
    content: &str,
    style: &TextStyle,
) -> Result<(), RenderError> {
    for (i, line) in content.lines().enumerate() {
        surface.draw_text(
            x,
            y + i as f64 * style.line_spacing,
            line,
            style.font,
            style.size,
            style.anchor,
            style.rotation,
            style.paint,
        )?;
    }
    Ok(())
}

/// Draws word-wrapped block text and returns the number of line breaks
/// produced, so callers can reserve vertical space for what follows.
pub fn draw_block_text(
    surface: &mut dyn DrawingSurface,
    x: f64,
    y: f64,
    content: &str,
    wrap_width: f64,
    style: &TextStyle,
) -> Result<usize, RenderError> {
    let lines = wrap_words(content, style.font, style.size, wrap_width);
    for (i, line) in lines.iter().enumerate() {
        surface.draw_text(
            x,
            y + i as f64 * style.line_spacing,
            line,
            style.font,
            style.size,
            style.anchor,
            style.rotation,
            style.paint,
        )?;
    }
    Ok(lines.len().saturating_sub(1))
}

/// Draws code text: a background panel sized to the line count, then the
/// lines themselves. The panel must stay in a lower paint order than the
/// glyphs, so it is emitted first.
pub fn draw_code_text(
    surface: &mut dyn DrawingSurface,
    x: f64,
    y: f64,
    content: &str,
    style: &TextStyle,
) -> Result<(), RenderError> {
    let lines: Vec<&str> = content.lines().collect();
    let widest = lines
        .iter()
        .map(|line| style.font.measure(line, style.size))
        .fold(0.0, f64::max);

    let pad = style.size * 0.5;
    surface.fill_rect(
        x - pad,
        y - style.size - pad * 0.5,
        widest + pad * 2.0,
        lines.len() as f64 * style.line_spacing + pad,
        Paint::opaque(CODE_BACKGROUND),
    )?;

    for (i, line) in lines.iter().enumerate() {
        surface.draw_text(
            x,
            y + i as f64 * style.line_spacing,
            line,
            style.font,
            style.size,
            Anchor::Start,
            style.rotation,
            style.paint,
        )?;
    }
    Ok(())
}

/// Draws a list element.
///
/// Every item gets its kind's prefix: nothing, a filled dot left of the
/// text, or a 1-based `"N. "` number. Center-aligned lists lay out one
/// line per item; any other alignment word-wraps each item as block text
/// and carries the wrap count forward so items never overlap. Exactly
/// one entry is emitted per input item, in input order.
#[allow(clippy::too_many_arguments)]
pub fn draw_list(
    surface: &mut dyn DrawingSurface,
    x: f64,
    y: f64,
    items: &[String],
    kind: ListKind,
    wrap_width: f64,
    style: &TextStyle,
) -> Result<(), RenderError> {
    let mut line_y = y;
    for (i, item) in items.iter().enumerate() {
        let text = match kind {
            ListKind::Number => format!("{}. {}", i + 1, item),
            _ => item.clone(),
        };

        if kind == ListKind::Bullet {
            let r = style.size * 0.22;
            surface.fill_ellipse(x - style.size * 0.8, line_y - style.size * 0.32, r, r, style.paint)?;
        }

        if style.anchor == Anchor::Middle || wrap_width <= 0.0 {
            surface.draw_text(
                x,
                line_y,
                &text,
                style.font,
                style.size,
                style.anchor,
                style.rotation,
                style.paint,
            )?;
            line_y += style.line_spacing;
        } else {
            let breaks = draw_block_text(surface, x, line_y, &text, wrap_width, style)?;
            line_y += (breaks + 1) as f64 * style.line_spacing;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_fonts::FontLibrary;
    use easel_types::FontWeight;

    fn fallback_font() -> std::sync::Arc<ResolvedFont> {
        // Empty library: deterministic 0.6-em-per-char fallback metrics.
        FontLibrary::new().resolve("sans", FontWeight::Regular)
    }

    #[test]
    fn test_wrap_respects_width() {
        let font = fallback_font();
        let size = 10.0;
        // Each char is 6.0 wide, so ten characters fit per line.
        let lines = wrap_words("aaaa bbbb cccc dddd", &font, size, 60.0);
        assert_eq!(lines, vec!["aaaa bbbb", "cccc dddd"]);

        // No produced line exceeds the wrap width.
        for line in &lines {
            assert!(font.measure(line, size) <= 60.0);
        }
    }

    #[test]
    fn test_wrap_overlong_word_stands_alone() {
        let font = fallback_font();
        let lines = wrap_words("tiny enormousword tiny", &font, 10.0, 40.0);
        assert_eq!(lines, vec!["tiny", "enormousword", "tiny"]);
    }

    #[test]
    fn test_wrap_forced_break_token() {
        let font = fallback_font();
        let lines = wrap_words(r"one\ntwo three", &font, 10.0, 1000.0);
        assert_eq!(lines, vec!["one", "two three"]);
    }

    #[test]
    fn test_wrap_single_line_when_wide_enough() {
        let font = fallback_font();
        let lines = wrap_words("a b c", &font, 10.0, 1000.0);
        assert_eq!(lines, vec!["a b c"]);
    }
}
