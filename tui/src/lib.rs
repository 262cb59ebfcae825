//! Reveal surface rendering for Curtain using ratatui.
//!
//! [`RevealSurface`] holds the overlay's lifecycle; [`draw_reveal`] paints
//! it over whatever content the host has already rendered into the frame.

mod animation;
mod surface;
mod theme;

pub use surface::RevealSurface;
pub use theme::{Glyphs, Palette, fade_toward};

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Paragraph},
};

/// Width of the progress bar in terminal cells.
const BAR_WIDTH: u16 = 40;

/// Draw the reveal overlay over the whole frame.
///
/// The terminal cannot compose translucent layers, so the exit fade is
/// realized by blending every foreground toward the background color. A
/// fully transparent or unmounted overlay draws nothing.
pub fn draw_reveal(
    frame: &mut Frame,
    surface: &RevealSurface,
    palette: &Palette,
    glyphs: &Glyphs,
    title: &str,
) {
    if !surface.is_mounted() {
        return;
    }
    let alpha = surface.opacity();
    if alpha <= f32::EPSILON {
        return;
    }

    let area = frame.area();
    let backdrop = Block::default().style(Style::default().bg(palette.bg));
    frame.render_widget(backdrop, area);

    let column = centered_column(area);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // wordmark
            Constraint::Length(1), // spacer
            Constraint::Length(1), // bar
            Constraint::Length(1), // percentage
        ])
        .split(column);

    let text = fade_toward(palette.text, palette.bg, alpha);
    let muted = fade_toward(palette.text_muted, palette.bg, alpha);
    let fill = fade_toward(palette.fill, palette.bg, alpha);
    let track = fade_toward(palette.track, palette.bg, alpha);

    let wordmark = Paragraph::new(Line::from(vec![
        Span::styled(glyphs.mark, Style::default().fg(fill)),
        Span::raw(" "),
        Span::styled(title.to_string(), Style::default().fg(text)),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(wordmark, rows[0]);

    let percent = surface.progress().percent();
    let filled = usize::from(BAR_WIDTH) * usize::from(percent) / 100;
    let empty = usize::from(BAR_WIDTH) - filled;
    let bar = Paragraph::new(Line::from(vec![
        Span::styled(glyphs.bar_filled.repeat(filled), Style::default().fg(fill)),
        Span::styled(glyphs.bar_empty.repeat(empty), Style::default().fg(track)),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(bar, rows[2]);

    let readout = Paragraph::new(Line::from(Span::styled(
        format!("{percent}%"),
        Style::default().fg(muted),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(readout, rows[3]);
}

// Four rows, vertically centered, clamped to the frame.
fn centered_column(area: Rect) -> Rect {
    let height = 4.min(area.height);
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x: area.x,
        y,
        width: area.width,
        height,
    }
}
