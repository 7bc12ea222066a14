//! Smooth Unicode bar used for the seek track and the volume gauge.
//!
//! The bar fills its whole area, so a click column maps straight onto a
//! fraction with `seek_fraction_from_pointer(x, area.x, area.width)`.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::theme::C_TRACK;

const BLOCKS: [char; 9] = [' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉', '█'];

/// `fraction` (0.0..=1.0) of `width` cells, filled in eighths. The unfilled
/// part is a thin rule so the track stays visible at zero.
pub fn bar_cells(fraction: f64, width: usize) -> (String, String) {
    let fraction = if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    };
    let eighths = (fraction * width as f64 * 8.0) as usize;
    let full = (eighths / 8).min(width);
    let partial = eighths % 8;

    let mut filled = "█".repeat(full);
    let mut used = full;
    if full < width && partial > 0 {
        filled.push(BLOCKS[partial]);
        used += 1;
    }
    (filled, "─".repeat(width - used))
}

/// Render the bar into a one-row `area`.
pub fn draw_bar(frame: &mut Frame, area: Rect, fraction: f64, color: Color) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let (filled, rest) = bar_cells(fraction, area.width as usize);
    let line = Line::from(vec![
        Span::styled(filled, Style::default().fg(color)),
        Span::styled(rest, Style::default().fg(C_TRACK)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
