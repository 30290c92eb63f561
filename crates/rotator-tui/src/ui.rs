//! Frame layout and the text shown for the current channel.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, List, ListItem, ListState, Paragraph},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use rotator_core::engine::{LiveCounts, Rotator};
use rotator_core::protocol::StatusRecord;
use rotator_core::rotation::Scheduler;
use rotator_core::store::KeyValueStore;

use crate::action::KEY_HINTS;
use crate::app::App;
use crate::theme::{
    style_default, style_live, style_muted, style_secondary, style_selected, C_ACCENT, C_LINK,
    C_LIVE, C_OFFLINE, C_PAUSED,
};
use crate::widgets::pane_chrome::{pane_chrome, Badge};
use crate::widgets::progress_bar::draw_countdown;

pub fn draw<S: KeyValueStore>(frame: &mut Frame, app: &App<S>) {
    let area = frame.area();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(6),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    draw_header(frame, rows[0], app);
    draw_now_showing(frame, rows[1], app);
    let scheduler = app.rotator.scheduler();
    draw_countdown(
        frame,
        rows[2],
        scheduler.countdown().percent(),
        scheduler.interval().as_secs(),
        !scheduler.is_ticking(),
    );
    draw_roster(frame, rows[3], &app.rotator);

    if app.prompt.is_open() {
        app.prompt.draw(frame, rows[4]);
    } else {
        draw_key_hints(frame, rows[4]);
    }

    if app.show_help {
        draw_help(frame, area);
    }

    let toast_area = Rect {
        height: area.height.saturating_sub(1),
        ..area
    };
    app.toast.draw(frame, toast_area);
}

fn draw_header<S: KeyValueStore>(frame: &mut Frame, area: Rect, app: &App<S>) {
    let rotator = &app.rotator;
    let scheduler = rotator.scheduler();

    let (state, state_style) = if !scheduler.is_playing() {
        ("⏸ PAUSED", Style::default().fg(C_PAUSED))
    } else if scheduler.is_hidden() {
        ("◌ HIDDEN", style_muted())
    } else {
        ("▶ PLAYING", style_live())
    };

    let mut spans = vec![
        Span::styled(
            " rotator ",
            Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::styled(state, state_style.add_modifier(Modifier::BOLD)),
        Span::styled(
            format!("  every {}s", scheduler.interval().as_secs()),
            style_secondary(),
        ),
        Span::styled(
            if rotator.live_only() {
                "  live-only"
            } else {
                "  all channels"
            },
            style_secondary(),
        ),
    ];
    if rotator.muted() {
        spans.push(Span::styled("  muted", style_secondary()));
    }
    spans.push(Span::styled("  │  ", style_muted()));
    spans.push(Span::styled(
        counts_label(rotator.has_status(), rotator.counts(), rotator.roster().category()),
        style_default(),
    ));
    if app.fetching {
        spans.push(Span::styled("  checking…", style_muted()));
    } else if let Some(at) = app.last_update {
        spans.push(Span::styled(
            format!("  updated {}", at.format("%H:%M:%S")),
            style_muted(),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_now_showing<S: KeyValueStore>(frame: &mut Frame, area: Rect, app: &App<S>) {
    let rotator = &app.rotator;
    let current = rotator.current();
    let record = current.and_then(|id| rotator.display_record(id));
    let live = record.is_some_and(|r| r.live);

    let mut badges = Vec::new();
    if rotator.has_status() && current.is_some() {
        badges.push(if live {
            Badge {
                text: "LIVE",
                color: C_LIVE,
            }
        } else {
            Badge {
                text: "OFFLINE",
                color: C_OFFLINE,
            }
        });
    }
    if app.viewport.muted() {
        badges.push(Badge {
            text: "MUTED",
            color: C_PAUSED,
        });
    }

    let block = pane_chrome("Now showing", true, &badges);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let width = inner.width as usize;
    let lines = vec![
        Line::from(Span::styled(
            fit(&position_label(rotator.scheduler()), width),
            style_default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            fit(&stream_info(rotator.has_status(), record), width),
            if live { style_live() } else { style_secondary() },
        )),
        Line::from(""),
        Line::from(Span::styled(
            fit(app.viewport.url().unwrap_or("no player loaded"), width),
            Style::default().fg(C_LINK),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_roster<S: KeyValueStore>(frame: &mut Frame, area: Rect, rotator: &Rotator<S>) {
    let title = format!("Streamers ({})", rotator.roster().len());
    let block = pane_chrome(&title, false, &[]);

    let active = rotator.scheduler().active();
    let items: Vec<ListItem> = rotator
        .roster()
        .channels()
        .iter()
        .map(|id| {
            let live = rotator.display_record(id).is_some_and(|r| r.live);
            let marker = if live {
                Span::styled(" ● ", style_live())
            } else {
                Span::styled(" ○ ", style_muted())
            };
            let name_style = if active.contains(id) {
                style_default()
            } else {
                style_muted()
            };
            ListItem::new(Line::from(vec![marker, Span::styled(id.clone(), name_style)]))
        })
        .collect();

    let selected = rotator
        .current()
        .and_then(|id| rotator.roster().channels().iter().position(|c| c == id));
    let mut state = ListState::default().with_selected(selected);

    let list = List::new(items)
        .block(block)
        .highlight_style(style_selected())
        .highlight_symbol("▸");
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_key_hints(frame: &mut Frame, area: Rect) {
    let mut spans = Vec::new();
    for (key, what) in KEY_HINTS {
        spans.push(Span::styled(format!(" {}", key), style_default()));
        spans.push(Span::styled(format!(" {} ", what), style_muted()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_help(frame: &mut Frame, area: Rect) {
    let height = (KEY_HINTS.len() as u16 + 2).min(area.height);
    let width = 36.min(area.width);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };

    let lines: Vec<Line> = KEY_HINTS
        .iter()
        .map(|(key, what)| {
            Line::from(vec![
                Span::styled(format!("{:>8}  ", key), style_default()),
                Span::styled(*what, style_secondary()),
            ])
        })
        .collect();

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines).block(pane_chrome("Keys", true, &[])),
        popup,
    );
}

/// `"<n>/<len>: <id>"` for the displayed channel.
pub fn position_label(scheduler: &Scheduler) -> String {
    match (scheduler.position(), scheduler.current()) {
        (Some((n, len)), Some(id)) => format!("{}/{}: {}", n, len, id),
        _ => "No channels to show".to_string(),
    }
}

/// Title, category and viewers for a live channel; "Offline" otherwise.
pub fn stream_info(has_status: bool, record: Option<&StatusRecord>) -> String {
    if !has_status {
        return "Checking status…".to_string();
    }
    match record {
        Some(r) if r.live => {
            let mut parts = Vec::new();
            if let Some(title) = r.title.as_deref().filter(|t| !t.is_empty()) {
                parts.push(title.to_string());
            }
            if let Some(category) = r.category.as_deref().filter(|c| !c.is_empty()) {
                parts.push(category.to_string());
            }
            parts.push(format!("{} viewers", r.viewer_count.unwrap_or(0)));
            parts.join(" · ")
        }
        _ => "Offline".to_string(),
    }
}

pub fn counts_label(has_status: bool, counts: LiveCounts, category: &str) -> String {
    if !has_status {
        return "status pending".to_string();
    }
    match counts.in_category {
        Some(n) => format!("{} live · {} in {}", counts.total, n, category),
        None => format!("{} live", counts.total),
    }
}

/// Truncate to `width` terminal columns, ending in "…" when cut.
fn fit(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_label() {
        let s = Scheduler::new(30, vec!["A".into(), "C".into()]);
        assert_eq!(position_label(&s), "1/2: A");
        assert_eq!(position_label(&Scheduler::new(30, vec![])), "No channels to show");
    }

    #[test]
    fn test_stream_info_for_live_and_offline() {
        let live = StatusRecord::live("speedrun", "Minecraft", 1200);
        assert_eq!(
            stream_info(true, Some(&live)),
            "speedrun · Minecraft · 1200 viewers"
        );
        let bare = StatusRecord::live("", "", 0);
        assert_eq!(stream_info(true, Some(&bare)), "0 viewers");
        assert_eq!(stream_info(true, Some(&StatusRecord::offline())), "Offline");
        assert_eq!(stream_info(true, None), "Offline");
        assert_eq!(stream_info(false, None), "Checking status…");
    }

    #[test]
    fn test_counts_label_mentions_category_only_when_filtered() {
        let unfiltered = LiveCounts {
            total: 4,
            in_category: None,
        };
        assert_eq!(counts_label(true, unfiltered, ""), "4 live");
        let filtered = LiveCounts {
            total: 4,
            in_category: Some(1),
        };
        assert_eq!(counts_label(true, filtered, "Chess"), "4 live · 1 in Chess");
    }

    #[test]
    fn test_fit_respects_display_width() {
        assert_eq!(fit("short", 10), "short");
        assert_eq!(fit("abcdefgh", 5), "abcd…");
        assert_eq!(fit("日本語テキスト", 5), "日本…");
    }
}
