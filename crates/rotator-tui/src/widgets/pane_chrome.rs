//! Bordered pane with a title and an optional right-aligned badge.

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders},
};

use crate::theme::{style_border, C_MUTED, C_PRIMARY};

/// Short status tag in the pane header, e.g. "LIVE" or "PAUSED".
pub struct Badge<'a> {
    pub text: &'a str,
    pub color: Color,
}

pub fn pane_chrome<'a>(title: &'a str, focused: bool, badges: &[Badge<'a>]) -> Block<'a> {
    let title_style = if focused {
        Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(C_MUTED)
    };

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(style_border(focused))
        .title(Line::from(Span::styled(format!(" {} ", title), title_style)));

    if !badges.is_empty() {
        let spans: Vec<Span> = badges
            .iter()
            .map(|b| {
                Span::styled(
                    format!(" {} ", b.text),
                    Style::default().fg(b.color).add_modifier(Modifier::BOLD),
                )
            })
            .collect();
        block = block.title_top(Line::from(spans).right_aligned());
    }
    block
}
