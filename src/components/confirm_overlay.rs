use crossterm::event::{Event, MouseEventKind};
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::components::Component;
use crate::keybindings::{Action, KeyBindings};
use crate::theme;
use crate::ui::{UiFrame, rect_contains, safe_set_string};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    Confirm,
    Cancel,
}

/// Modal confirmation dialog gating the destructive close. Renders centered
/// over the desktop, swallows input while visible, and resolves to a single
/// [`ConfirmAction`] from keyboard or mouse.
#[derive(Debug, Default)]
pub struct ConfirmOverlayComponent {
    visible: bool,
    title: String,
    body: String,
    selected_confirm: bool,
    cancel_rect: Option<Rect>,
    confirm_rect: Option<Rect>,
}

impl ConfirmOverlayComponent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, title: &str, body: &str) {
        self.visible = true;
        self.title = title.to_string();
        self.body = body.to_string();
        // default to the safe choice
        self.selected_confirm = false;
    }

    pub fn close(&mut self) {
        self.visible = false;
        self.cancel_rect = None;
        self.confirm_rect = None;
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    fn dialog_rect(&self, area: Rect) -> Rect {
        let width = (area.width.saturating_sub(4)).min(52).max(20);
        let height = 9u16.min(area.height);
        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = area.y + area.height.saturating_sub(height) / 2;
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn handle_confirm_event(&mut self, event: &Event) -> Option<ConfirmAction> {
        match event {
            Event::Mouse(mouse) if matches!(mouse.kind, MouseEventKind::Down(_)) => {
                if self
                    .confirm_rect
                    .is_some_and(|rect| rect_contains(rect, mouse.column, mouse.row))
                {
                    return Some(ConfirmAction::Confirm);
                }
                if self
                    .cancel_rect
                    .is_some_and(|rect| rect_contains(rect, mouse.column, mouse.row))
                {
                    return Some(ConfirmAction::Cancel);
                }
                None
            }
            Event::Key(key) => {
                let kb = KeyBindings::default();
                if kb.matches(Action::ConfirmToggle, key) {
                    self.selected_confirm = !self.selected_confirm;
                    None
                } else if kb.matches(Action::ConfirmLeft, key) {
                    self.selected_confirm = false;
                    None
                } else if kb.matches(Action::ConfirmRight, key) {
                    self.selected_confirm = true;
                    None
                } else if kb.matches(Action::ConfirmAccept, key) {
                    if self.selected_confirm {
                        Some(ConfirmAction::Confirm)
                    } else {
                        Some(ConfirmAction::Cancel)
                    }
                } else if kb.matches(Action::ConfirmCancel, key) {
                    Some(ConfirmAction::Cancel)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

impl Component for ConfirmOverlayComponent {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, _focused: bool) {
        self.cancel_rect = None;
        self.confirm_rect = None;
        if !self.visible || area.width == 0 || area.height == 0 {
            return;
        }
        let rect = self.dialog_rect(area);
        if rect.width < 6 || rect.height < 5 {
            return;
        }
        frame.render_widget(Clear, rect);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::dialog_separator()))
            .style(Style::default().bg(theme::dialog_bg()))
            .title(format!(" {} ", self.title));
        frame.render_widget(block, rect);

        let content = Rect {
            x: rect.x.saturating_add(2),
            y: rect.y.saturating_add(1),
            width: rect.width.saturating_sub(4),
            height: rect.height.saturating_sub(2),
        };
        if content.width == 0 || content.height < 4 {
            return;
        }
        let body_rect = Rect {
            x: content.x,
            y: content.y,
            width: content.width,
            height: content.height.saturating_sub(3),
        };
        let paragraph = Paragraph::new(self.body.as_str())
            .alignment(Alignment::Left)
            .style(Style::default().fg(theme::dialog_fg()))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, body_rect);

        let separator_y = content.y.saturating_add(content.height.saturating_sub(2));
        let button_y = content.y.saturating_add(content.height.saturating_sub(1));
        let separator_style = Style::default().fg(theme::dialog_separator());
        let buffer = frame.buffer_mut();
        let bounds = rect.intersection(buffer.area);
        if bounds.width == 0 || bounds.height == 0 {
            return;
        }
        for x in content.x..content.x.saturating_add(content.width) {
            if let Some(cell) = buffer.cell_mut((x, separator_y)) {
                cell.set_symbol("─");
                cell.set_style(separator_style);
            }
        }

        let cancel = "[ Cancel ]";
        let confirm = "[ Close ]";
        let selected_style = Style::default()
            .fg(theme::chrome_header_fg())
            .bg(theme::chrome_header_bg())
            .add_modifier(Modifier::BOLD);
        let unselected_style = Style::default()
            .fg(theme::dialog_fg())
            .bg(theme::dialog_bg());
        let (cancel_style, confirm_style) = if self.selected_confirm {
            (unselected_style, selected_style)
        } else {
            (selected_style, unselected_style)
        };
        let total_width = cancel.len() + 1 + confirm.len();
        let start_x = content
            .x
            .saturating_add(content.width.saturating_sub(total_width as u16));
        safe_set_string(buffer, bounds, start_x, button_y, cancel, cancel_style);
        let confirm_x = start_x.saturating_add(cancel.len() as u16 + 1);
        safe_set_string(buffer, bounds, confirm_x, button_y, confirm, confirm_style);
        self.cancel_rect = Some(Rect {
            x: start_x,
            y: button_y,
            width: cancel.len() as u16,
            height: 1,
        });
        self.confirm_rect = Some(Rect {
            x: confirm_x,
            y: button_y,
            width: confirm.len() as u16,
            height: 1,
        });
    }

    fn handle_event(&mut self, event: &Event) -> bool {
        if self.handle_confirm_event(event).is_some() {
            return true;
        }
        let Event::Key(key) = event else {
            return false;
        };
        let kb = KeyBindings::default();
        kb.matches(Action::ConfirmToggle, key)
            || kb.matches(Action::ConfirmLeft, key)
            || kb.matches(Action::ConfirmRight, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{
        KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    };

    #[test]
    fn opens_with_the_safe_choice_selected() {
        let mut o = ConfirmOverlayComponent::new();
        o.open("Close terminal", "sure?");
        assert!(o.visible());
        assert_eq!(
            o.handle_confirm_event(&Event::Key(KeyEvent::new(
                KeyCode::Enter,
                KeyModifiers::NONE
            ))),
            Some(ConfirmAction::Cancel)
        );
    }

    #[test]
    fn tab_toggles_and_enter_resolves() {
        let mut o = ConfirmOverlayComponent::new();
        o.open("t", "b");
        assert_eq!(
            o.handle_confirm_event(&Event::Key(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE))),
            None
        );
        assert_eq!(
            o.handle_confirm_event(&Event::Key(KeyEvent::new(
                KeyCode::Enter,
                KeyModifiers::NONE
            ))),
            Some(ConfirmAction::Confirm)
        );
    }

    #[test]
    fn escape_always_cancels() {
        let mut o = ConfirmOverlayComponent::new();
        o.open("t", "b");
        o.selected_confirm = true;
        assert_eq!(
            o.handle_confirm_event(&Event::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE))),
            Some(ConfirmAction::Cancel)
        );
    }

    #[test]
    fn mouse_hits_resolve_by_button_rect() {
        let mut o = ConfirmOverlayComponent::new();
        o.confirm_rect = Some(Rect {
            x: 2,
            y: 3,
            width: 4,
            height: 1,
        });
        o.cancel_rect = Some(Rect {
            x: 0,
            y: 3,
            width: 2,
            height: 1,
        });
        let click = |column, row| {
            Event::Mouse(MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column,
                row,
                modifiers: KeyModifiers::NONE,
            })
        };
        assert_eq!(
            o.handle_confirm_event(&click(3, 3)),
            Some(ConfirmAction::Confirm)
        );
        assert_eq!(
            o.handle_confirm_event(&click(0, 3)),
            Some(ConfirmAction::Cancel)
        );
        assert_eq!(o.handle_confirm_event(&click(9, 9)), None);
    }
}
