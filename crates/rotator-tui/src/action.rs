//! Action enum: everything a key press can ask the app to do.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Which value a text prompt is collecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    AddChannel,
    BulkAdd,
    RemoveChannel,
    Category,
    Interval,
    JumpTo,
}

impl PromptKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::AddChannel => "Add streamer",
            Self::BulkAdd => "Add streamers",
            Self::RemoveChannel => "Remove streamer",
            Self::Category => "Category",
            Self::Interval => "Interval (s)",
            Self::JumpTo => "Jump to",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            Self::AddChannel | Self::RemoveChannel | Self::JumpTo => "channel name",
            Self::BulkAdd => "name1, name2, name3",
            Self::Category => "game name, empty for all",
            Self::Interval => "5-600",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    // ── Rotation ─────────────────────────────────────────────────────────────
    TogglePause,
    Next,
    Prev,

    // ── Settings ─────────────────────────────────────────────────────────────
    ToggleLiveOnly,
    ToggleMute,
    ClearCategory,
    OpenPrompt(PromptKind),

    // ── System ───────────────────────────────────────────────────────────────
    Refresh,
    ToggleHelp,
    Quit,
    Noop,
}

impl Action {
    pub fn from_key(key: KeyEvent) -> Self {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') => Self::Quit,
                _ => Self::Noop,
            };
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Self::Quit,
            KeyCode::Char(' ') => Self::TogglePause,
            KeyCode::Char('n') | KeyCode::Right => Self::Next,
            KeyCode::Char('p') | KeyCode::Left => Self::Prev,
            KeyCode::Char('l') => Self::ToggleLiveOnly,
            KeyCode::Char('m') => Self::ToggleMute,
            KeyCode::Char('a') => Self::OpenPrompt(PromptKind::AddChannel),
            KeyCode::Char('b') => Self::OpenPrompt(PromptKind::BulkAdd),
            KeyCode::Char('x') => Self::OpenPrompt(PromptKind::RemoveChannel),
            KeyCode::Char('c') => Self::OpenPrompt(PromptKind::Category),
            KeyCode::Char('C') => Self::ClearCategory,
            KeyCode::Char('i') => Self::OpenPrompt(PromptKind::Interval),
            KeyCode::Char('j') | KeyCode::Char('/') => Self::OpenPrompt(PromptKind::JumpTo),
            KeyCode::Char('r') => Self::Refresh,
            KeyCode::Char('?') => Self::ToggleHelp,
            _ => Self::Noop,
        }
    }
}

/// Key hints for the status line and help overlay.
pub const KEY_HINTS: &[(&str, &str)] = &[
    ("space", "pause"),
    ("n/p", "next/prev"),
    ("l", "live-only"),
    ("m", "mute"),
    ("a/b", "add/bulk"),
    ("x", "remove"),
    ("c/C", "category/clear"),
    ("i", "interval"),
    ("j", "jump"),
    ("r", "refresh"),
    ("?", "help"),
    ("q", "quit"),
];
