//! Countdown bar for the current rotation window.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::theme::{C_LIVE, C_MUTED, C_PAUSED, C_SECONDARY};

const BLOCKS: [char; 9] = [' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉', '█'];

/// Render `percent` (0..=100) of the window with eighth-cell resolution,
/// followed by the seconds left until the next channel.
pub fn draw_countdown(frame: &mut Frame, area: Rect, percent: f64, interval_secs: u64, paused: bool) {
    if area.width < 8 || area.height == 0 {
        return;
    }

    let label = if paused {
        " paused".to_string()
    } else {
        format!(" {}s", remaining_secs(percent, interval_secs))
    };
    let bar_w = (area.width as usize).saturating_sub(label.chars().count()).max(4);

    let bar_color = if paused { C_PAUSED } else { C_LIVE };
    let spans = vec![
        Span::styled(fill(percent / 100.0, bar_w), Style::default().fg(bar_color)),
        Span::styled(
            label,
            Style::default().fg(if paused { C_MUTED } else { C_SECONDARY }),
        ),
    ];
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn remaining_secs(percent: f64, interval_secs: u64) -> u64 {
    let left = (1.0 - percent.clamp(0.0, 100.0) / 100.0) * interval_secs as f64;
    left.ceil() as u64
}

fn fill(progress: f64, width: usize) -> String {
    let eighths = (progress.clamp(0.0, 1.0) * width as f64 * 8.0) as usize;
    let full = eighths / 8;
    let mut bar = String::with_capacity(width * 3);
    for _ in 0..full {
        bar.push('█');
    }
    if full < width {
        bar.push(BLOCKS[eighths % 8]);
        for _ in (full + 1)..width {
            bar.push(' ');
        }
    }
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_has_fixed_width() {
        for p in [0.0, 0.33, 0.5, 0.99, 1.0] {
            assert_eq!(fill(p, 10).chars().count(), 10);
        }
        assert_eq!(fill(1.0, 4), "████");
        assert_eq!(fill(0.5, 4), "██  ");
    }

    #[test]
    fn test_remaining_secs_rounds_up() {
        assert_eq!(remaining_secs(0.0, 30), 30);
        assert_eq!(remaining_secs(50.0, 30), 15);
        assert_eq!(remaining_secs(99.0, 30), 1);
        assert_eq!(remaining_secs(100.0, 30), 0);
    }
}
