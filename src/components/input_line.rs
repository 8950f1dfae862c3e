use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};

use crate::components::Component;
use crate::theme;
use crate::ui::{UiFrame, safe_set_string};

/// Single-line prompt at the bottom of a chat window. Plain character
/// editing only; Enter submission is handled by the app so the component
/// stays ignorant of sessions.
#[derive(Debug, Default)]
pub struct InputLine {
    buffer: String,
}

impl InputLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.trim().is_empty()
    }

    /// Drains the buffer for submission.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }
}

impl Component for InputLine {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, focused: bool) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let buffer = frame.buffer_mut();
        let bounds = area.intersection(buffer.area);
        if bounds.width == 0 || bounds.height == 0 {
            return;
        }
        let prompt = "> ";
        safe_set_string(
            buffer,
            bounds,
            area.x,
            area.y,
            prompt,
            Style::default().fg(theme::input_prompt_fg()),
        );
        let text_x = area.x.saturating_add(prompt.len() as u16);
        // keep the tail visible when the input outgrows the line
        let available = area.width.saturating_sub(prompt.len() as u16 + 1) as usize;
        let chars = self.buffer.chars().count();
        let visible: String = self
            .buffer
            .chars()
            .skip(chars.saturating_sub(available))
            .collect();
        safe_set_string(
            buffer,
            bounds,
            text_x,
            area.y,
            &visible,
            Style::default().fg(theme::input_fg()),
        );
        if focused {
            let cursor_x = text_x.saturating_add(visible.chars().count() as u16);
            safe_set_string(
                buffer,
                bounds,
                cursor_x,
                area.y,
                "█",
                Style::default()
                    .fg(theme::input_fg())
                    .add_modifier(Modifier::SLOW_BLINK),
            );
        }
    }

    fn handle_event(&mut self, event: &Event) -> bool {
        let Event::Key(key) = event else {
            return false;
        };
        if key.kind == KeyEventKind::Release {
            return false;
        }
        match key.code {
            KeyCode::Char(c)
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT) =>
            {
                self.buffer.push(c);
                true
            }
            KeyCode::Backspace => {
                self.buffer.pop();
                true
            }
            _ => false,
        }
    }
}
