//! Color palette and glyphs for the reveal overlay.

use ratatui::style::Color;

/// Kanagawa-derived constants for the overlay.
mod colors {
    use super::Color;

    pub const BG: Color = Color::Rgb(22, 22, 29);
    pub const TRACK: Color = Color::Rgb(42, 42, 55);
    pub const FILL: Color = Color::Rgb(149, 127, 184);
    pub const TEXT: Color = Color::Rgb(220, 215, 186);
    pub const TEXT_MUTED: Color = Color::Rgb(114, 113, 105);
}

/// Resolved palette for the reveal overlay and the content behind it.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg: Color,
    pub track: Color,
    pub fill: Color,
    pub text: Color,
    pub text_muted: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            bg: colors::BG,
            track: colors::TRACK,
            fill: colors::FILL,
            text: colors::TEXT,
            text_muted: colors::TEXT_MUTED,
        }
    }
}

/// Glyph set for the wordmark and progress bar.
#[derive(Debug, Clone, Copy)]
pub struct Glyphs {
    pub mark: &'static str,
    pub bar_filled: &'static str,
    pub bar_empty: &'static str,
}

impl Glyphs {
    #[must_use]
    pub fn for_terminal(ascii_only: bool) -> Self {
        if ascii_only {
            Self {
                mark: "*",
                bar_filled: "#",
                bar_empty: "-",
            }
        } else {
            Self {
                mark: "\u{25c6}",
                bar_filled: "\u{2588}",
                bar_empty: "\u{2591}",
            }
        }
    }
}

/// Blend `fg` toward `bg` as `alpha` falls from 1 to 0.
///
/// Terminals have no real opacity, so the fade is simulated per color.
/// Non-RGB colors pass through unchanged.
#[must_use]
pub fn fade_toward(fg: Color, bg: Color, alpha: f32) -> Color {
    let (Color::Rgb(fr, fg_g, fb), Color::Rgb(br, bg_g, bb)) = (fg, bg) else {
        return fg;
    };
    let a = alpha.clamp(0.0, 1.0);
    let mix = |f: u8, b: u8| -> u8 { (f32::from(b) + (f32::from(f) - f32::from(b)) * a).round() as u8 };
    Color::Rgb(mix(fr, br), mix(fg_g, bg_g), mix(fb, bb))
}
