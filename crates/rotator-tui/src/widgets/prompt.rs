//! One-line text prompt (add channel, category, interval, ...) on top of
//! tui-input.

use ratatui::crossterm::event::{Event, KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::action::PromptKind;
use crate::theme::{C_MUTED, C_PROMPT_BG, C_PROMPT_FG, C_SECONDARY};

#[derive(Debug, PartialEq)]
pub enum PromptAction {
    Submitted(PromptKind, String),
    Cancelled,
    Editing,
}

#[derive(Default)]
pub struct Prompt {
    input: Input,
    kind: Option<PromptKind>,
}

impl Prompt {
    pub fn open(&mut self, kind: PromptKind, initial: &str) {
        self.input = Input::new(initial.to_string());
        self.kind = Some(kind);
    }

    pub fn close(&mut self) {
        self.input = Input::default();
        self.kind = None;
    }

    pub fn is_open(&self) -> bool {
        self.kind.is_some()
    }

    pub fn text(&self) -> &str {
        self.input.value()
    }

    /// Enter submits, Esc cancels, everything else edits.
    pub fn handle_key(&mut self, key: KeyEvent) -> PromptAction {
        let Some(kind) = self.kind else {
            return PromptAction::Cancelled;
        };
        match key.code {
            KeyCode::Esc => {
                self.close();
                PromptAction::Cancelled
            }
            KeyCode::Enter => {
                let text = self.input.value().to_string();
                self.close();
                PromptAction::Submitted(kind, text)
            }
            _ => {
                self.input.handle_event(&Event::Key(key));
                PromptAction::Editing
            }
        }
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        let Some(kind) = self.kind else {
            return;
        };
        let label = format!("{}: ", kind.label());
        let label_w = label.chars().count();
        let width = (area.width as usize).saturating_sub(label_w + 1);
        let scroll = self.input.visual_scroll(width);
        let value = self.input.value();

        let body = if value.is_empty() {
            Span::styled(kind.placeholder(), Style::default().fg(C_MUTED))
        } else {
            let visible: String = value.chars().skip(scroll).collect();
            Span::styled(visible, Style::default().fg(C_PROMPT_FG))
        };

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(label, Style::default().fg(C_SECONDARY)),
                body,
            ]))
            .style(Style::default().bg(C_PROMPT_BG)),
            area,
        );

        let cursor_x = area.x + (label_w + self.input.visual_cursor().saturating_sub(scroll)) as u16;
        frame.set_cursor_position((cursor_x.min(area.x + area.width.saturating_sub(1)), area.y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_typing_then_enter_submits() {
        let mut prompt = Prompt::default();
        prompt.open(PromptKind::AddChannel, "");
        for c in "xQc".chars() {
            assert_eq!(prompt.handle_key(key(KeyCode::Char(c))), PromptAction::Editing);
        }
        assert_eq!(
            prompt.handle_key(key(KeyCode::Enter)),
            PromptAction::Submitted(PromptKind::AddChannel, "xQc".into())
        );
        assert!(!prompt.is_open());
    }

    #[test]
    fn test_initial_value_can_be_edited() {
        let mut prompt = Prompt::default();
        prompt.open(PromptKind::Interval, "30");
        prompt.handle_key(key(KeyCode::Backspace));
        prompt.handle_key(key(KeyCode::Char('5')));
        assert_eq!(prompt.text(), "35");
    }

    #[test]
    fn test_escape_cancels() {
        let mut prompt = Prompt::default();
        prompt.open(PromptKind::Category, "Chess");
        assert_eq!(prompt.handle_key(key(KeyCode::Esc)), PromptAction::Cancelled);
        assert!(!prompt.is_open());
        assert_eq!(prompt.text(), "");
    }
}
