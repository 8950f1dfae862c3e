use crossterm::event::Event;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear};

use crate::components::Component;
use crate::keybindings::{Action, KeyBindings};
use crate::theme;
use crate::ui::{UiFrame, safe_set_string};

// Generated by build.rs: embeds assets/help.md plus its modification stamp.
include!(concat!(env!("OUT_DIR"), "/generated_help.rs"));

/// Centered overlay showing the embedded keybinding help.
#[derive(Debug, Default)]
pub struct HelpOverlayComponent {
    visible: bool,
    scroll: usize,
}

impl HelpOverlayComponent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self) {
        self.visible = true;
        self.scroll = 0;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    fn help_lines() -> Vec<&'static str> {
        HELP_TEXT.lines().collect()
    }
}

impl Component for HelpOverlayComponent {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, _focused: bool) {
        if !self.visible || area.width < 10 || area.height < 6 {
            return;
        }
        let width = area.width.saturating_sub(6).min(64).max(20);
        let height = area.height.saturating_sub(2).min(24).max(6);
        let rect = Rect {
            x: area.x + area.width.saturating_sub(width) / 2,
            y: area.y + area.height.saturating_sub(height) / 2,
            width,
            height,
        };
        frame.render_widget(Clear, rect);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::dialog_separator()))
            .style(Style::default().bg(theme::dialog_bg()))
            .title(" help ");
        frame.render_widget(block, rect);

        let inner = Rect {
            x: rect.x + 2,
            y: rect.y + 1,
            width: rect.width.saturating_sub(4),
            height: rect.height.saturating_sub(2),
        };
        let lines = Self::help_lines();
        let view = inner.height as usize;
        let max_scroll = lines.len().saturating_sub(view);
        self.scroll = self.scroll.min(max_scroll);
        let buffer = frame.buffer_mut();
        let bounds = inner.intersection(buffer.area);
        for (row, line) in lines.iter().skip(self.scroll).take(view).enumerate() {
            let style = if line.starts_with('#') {
                Style::default()
                    .fg(theme::dialog_fg())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme::dialog_fg())
            };
            safe_set_string(
                buffer,
                bounds,
                inner.x,
                inner.y.saturating_add(row as u16),
                line,
                style,
            );
        }
        if !HELP_UPDATED.is_empty() && inner.height > 1 {
            let stamp = format!("updated {HELP_UPDATED}");
            safe_set_string(
                buffer,
                bounds,
                inner.x,
                inner.y + inner.height - 1,
                &stamp,
                Style::default()
                    .fg(theme::dialog_separator())
                    .add_modifier(Modifier::DIM),
            );
        }
    }

    fn handle_event(&mut self, event: &Event) -> bool {
        if !self.visible {
            return false;
        }
        let Event::Key(key) = event else {
            return false;
        };
        let kb = KeyBindings::default();
        if kb.matches(Action::CloseHelp, key) {
            self.hide();
            return true;
        }
        if kb.matches(Action::ScrollPageDown, key) {
            self.scroll = self.scroll.saturating_add(5);
            return true;
        }
        if kb.matches(Action::ScrollPageUp, key) {
            self.scroll = self.scroll.saturating_sub(5);
            return true;
        }
        // modal: swallow everything else while open
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    #[test]
    fn embedded_help_is_present_and_textual() {
        let lines = HelpOverlayComponent::help_lines();
        assert!(!lines.is_empty());
        assert!(lines.iter().any(|l| l.contains("Ctrl")));
    }

    #[test]
    fn escape_closes_the_overlay() {
        let mut help = HelpOverlayComponent::new();
        help.show();
        assert!(help.visible());
        let esc = Event::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert!(help.handle_event(&esc));
        assert!(!help.visible());
    }
}
