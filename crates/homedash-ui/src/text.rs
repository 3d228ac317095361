//! Font selection and text placement.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt::Debug;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use homedash_core::RenderError;
use parking_lot::Mutex;
use u8g2_fonts::types::{FontColor, HorizontalAlignment, VerticalPosition};
use u8g2_fonts::{fonts, FontRenderer};

use crate::layout::TEXT_COLOR;

/// Drawn in place of a character the font has no glyph for.
pub const MISSING_GLYPH: char = '?';

/// Strings already reported as needing substitution.
static REPORTED: Mutex<BTreeSet<String>> = Mutex::new(BTreeSet::new());

/// The four type sizes used on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontSize {
    Large,
    Medium,
    Small,
    /// Carries the checkbox glyphs used by the to-do list.
    Symbols,
}

impl FontSize {
    /// Vertical advance of one line, in pixels.
    pub const fn line_height(self) -> u32 {
        match self {
            FontSize::Large => 40,
            FontSize::Medium => 24,
            FontSize::Small => 18,
            FontSize::Symbols => 18,
        }
    }

    fn renderer(self) -> FontRenderer {
        match self {
            FontSize::Large => FontRenderer::new::<fonts::u8g2_font_logisoso32_tf>(),
            FontSize::Medium => FontRenderer::new::<fonts::u8g2_font_helvR18_tf>(),
            FontSize::Small => FontRenderer::new::<fonts::u8g2_font_helvR14_tf>(),
            FontSize::Symbols => FontRenderer::new::<fonts::u8g2_font_unifont_t_symbols>(),
        }
    }
}

/// `text` with every character `size` cannot draw replaced by
/// [`MISSING_GLYPH`]. Borrowed when nothing needed replacing.
pub fn renderable_text(text: &str, size: FontSize) -> Cow<'_, str> {
    let renderer = size.renderer();
    let has_glyph = |c: char| {
        let mut buf = [0u8; 4];
        let glyph: &str = c.encode_utf8(&mut buf);
        c == '\n'
            || renderer
                .get_rendered_dimensions(glyph, Point::zero(), VerticalPosition::Baseline)
                .is_ok()
    };

    if text.chars().all(&has_glyph) {
        return Cow::Borrowed(text);
    }

    if REPORTED.lock().insert(text.to_string()) {
        tracing::warn!(
            "No glyph for some characters in {:?}, substituting {:?}",
            text,
            MISSING_GLYPH
        );
    }
    Cow::Owned(
        text.chars()
            .map(|c| if has_glyph(c) { c } else { MISSING_GLYPH })
            .collect(),
    )
}

/// Render one run of text anchored at `anchor`.
///
/// Characters the font lacks are drawn as [`MISSING_GLYPH`] so the rest of
/// the line still renders.
pub fn render_text<D>(
    target: &mut D,
    text: &str,
    anchor: Point,
    vertical: VerticalPosition,
    horizontal: HorizontalAlignment,
    size: FontSize,
) -> Result<(), RenderError>
where
    D: DrawTarget<Color = Rgb888>,
    D::Error: Debug,
{
    if text.is_empty() {
        return Ok(());
    }

    let text = renderable_text(text, size);
    size.renderer()
        .render_aligned(
            text.as_ref(),
            anchor,
            vertical,
            horizontal,
            FontColor::Transparent(TEXT_COLOR),
            target,
        )
        .map(|_| ())
        .map_err(|e| RenderError::Font(format!("{:?} while drawing {:?}", e, text)))
}

/// `render_text` that logs a failure and lets the frame continue.
pub fn draw_text<D>(
    target: &mut D,
    text: &str,
    anchor: Point,
    vertical: VerticalPosition,
    horizontal: HorizontalAlignment,
    size: FontSize,
) where
    D: DrawTarget<Color = Rgb888>,
    D::Error: Debug,
{
    if let Err(e) = render_text(target, text, anchor, vertical, horizontal, size) {
        tracing::warn!("{}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::layout::BACKGROUND;

    #[test]
    fn test_text_marks_pixels() {
        let mut canvas = Canvas::new(Size::new(200, 60));
        render_text(
            &mut canvas,
            "12:30 PM",
            Point::new(100, 30),
            VerticalPosition::Center,
            HorizontalAlignment::Center,
            FontSize::Large,
        )
        .unwrap();

        assert!(canvas.colors().iter().any(|c| *c == TEXT_COLOR));
    }

    #[test]
    fn test_empty_text_draws_nothing() {
        let mut canvas = Canvas::new(Size::new(20, 20));
        render_text(
            &mut canvas,
            "",
            Point::new(10, 10),
            VerticalPosition::Center,
            HorizontalAlignment::Center,
            FontSize::Small,
        )
        .unwrap();

        assert!(canvas.colors().iter().all(|c| *c == BACKGROUND));
    }

    #[test]
    fn test_checkbox_glyphs_render() {
        let mut canvas = Canvas::new(Size::new(200, 40));
        render_text(
            &mut canvas,
            "☑ done ☐ open",
            Point::new(4, 20),
            VerticalPosition::Center,
            HorizontalAlignment::Left,
            FontSize::Symbols,
        )
        .unwrap();

        assert!(canvas.colors().iter().any(|c| *c == TEXT_COLOR));
    }

    fn lit_pixels(text: &str, size: FontSize) -> usize {
        let mut canvas = Canvas::new(Size::new(400, 40));
        render_text(
            &mut canvas,
            text,
            Point::new(4, 20),
            VerticalPosition::Center,
            HorizontalAlignment::Left,
            size,
        )
        .unwrap();
        canvas.colors().iter().filter(|c| **c == TEXT_COLOR).count()
    }

    #[test]
    fn test_missing_glyph_keeps_rest_of_line() {
        let prefix = lit_pixels("☐ Buy ", FontSize::Symbols);
        let full = lit_pixels("☐ Buy 日本茶 today", FontSize::Symbols);

        assert!(prefix > 0);
        assert!(full > prefix, "text after the missing glyphs was not drawn");
    }

    #[test]
    fn test_missing_glyphs_are_substituted() {
        assert_eq!(renderable_text("Café – 5€", FontSize::Small), "Café ? 5?");
        assert!(lit_pixels("Café – 5€", FontSize::Small) > lit_pixels("Café ", FontSize::Small));
    }

    #[test]
    fn test_supported_text_is_borrowed() {
        assert!(matches!(
            renderable_text("12:30 PM", FontSize::Large),
            Cow::Borrowed("12:30 PM")
        ));
    }

    #[test]
    fn test_line_heights_descend() {
        assert!(FontSize::Large.line_height() > FontSize::Medium.line_height());
        assert!(FontSize::Medium.line_height() > FontSize::Small.line_height());
    }
}
