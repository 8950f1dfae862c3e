use crossterm::event::{Event, MouseEventKind};
use ratatui::prelude::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Scrollbar, ScrollbarOrientation, ScrollbarState};

use crate::chat::{Message, Sender, follow_newest};
use crate::theme;
use crate::ui::{UiFrame, rect_contains, safe_set_string};
use crate::window::WindowId;

/// Vertical scroll offset with deferred deltas. Wheel/keyboard input bumps a
/// pending delta which is folded into the clamped offset once the content
/// and viewport sizes are known during render.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScrollState {
    pub offset: usize,
    pending: isize,
}

impl ScrollState {
    pub fn reset(&mut self) {
        self.offset = 0;
        self.pending = 0;
    }

    pub fn bump(&mut self, delta: isize) {
        self.pending = self.pending.saturating_add(delta);
    }

    pub fn apply(&mut self, total: usize, view: usize) {
        let max_offset = total.saturating_sub(view);
        if self.pending != 0 {
            let delta = self.pending;
            self.pending = 0;
            let next = if delta.is_negative() {
                self.offset.saturating_sub(delta.unsigned_abs())
            } else {
                self.offset.saturating_add(delta as usize)
            };
            self.offset = next.min(max_offset);
        } else if self.offset > max_offset {
            self.offset = max_offset;
        }
    }
}

/// Greedy word wrap by char count. Long unbreakable words are split hard.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for raw in text.split('\n') {
        let seg_start = lines.len();
        let mut line = String::new();
        let mut line_len = 0usize;
        for word in raw.split_whitespace() {
            let word_len = word.chars().count();
            if line_len > 0 && line_len + 1 + word_len <= width {
                line.push(' ');
                line.push_str(word);
                line_len += 1 + word_len;
                continue;
            }
            if line_len > 0 {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            if word_len <= width {
                line.push_str(word);
                line_len = word_len;
            } else {
                // hard-split an oversized word
                let mut chars = word.chars().peekable();
                while chars.peek().is_some() {
                    let chunk: String = chars.by_ref().take(width).collect();
                    let chunk_len = chunk.chars().count();
                    if chunk_len == width {
                        lines.push(chunk);
                    } else {
                        line = chunk;
                        line_len = chunk_len;
                    }
                }
            }
        }
        if !line.is_empty() || lines.len() == seg_start {
            lines.push(line);
        }
    }
    lines
}

struct DisplayLine {
    text: String,
    style: Style,
}

/// Scrollable transcript of one window: persona banner on top, then the
/// message log with per-sender labels and colors, then a scrollbar when the
/// content overflows.
///
/// The view owns only transient scroll state; the messages live in the
/// lifecycle manager's record and are handed in for each render.
pub struct ChatView {
    window: WindowId,
    scroll: ScrollState,
    area: Rect,
    last_total: usize,
    last_view: usize,
}

impl ChatView {
    pub fn new(window: WindowId) -> Self {
        Self {
            window,
            scroll: ScrollState::default(),
            area: Rect::default(),
            last_total: 0,
            last_view: 0,
        }
    }

    pub fn offset(&self) -> usize {
        self.scroll.offset
    }

    pub fn set_offset(&mut self, offset: usize) {
        self.scroll.offset = offset;
    }

    pub fn reset(&mut self) {
        self.scroll.reset();
    }

    pub fn bump(&mut self, delta: isize) {
        self.scroll.bump(delta);
    }

    pub fn page_up(&mut self) {
        self.bump(-(self.last_view.max(1) as isize));
    }

    pub fn page_down(&mut self) {
        self.bump(self.last_view.max(1) as isize);
    }

    pub fn scroll_home(&mut self) {
        self.scroll.reset();
    }

    pub fn scroll_end(&mut self) {
        self.scroll.offset = self.last_total.saturating_sub(self.last_view);
        self.scroll.bump(isize::MAX / 2);
    }

    fn rows_from_bottom(&self) -> usize {
        self.last_total
            .saturating_sub(self.last_view)
            .saturating_sub(self.scroll.offset)
    }

    /// Apply the follow policy after a message landed: generated replies
    /// always drag the view to the newest line; the user's own messages do
    /// so only when the viewport was already near the bottom.
    pub fn on_appended(&mut self, sender: Sender) {
        if follow_newest(sender, self.rows_from_bottom()) {
            self.scroll_end();
        }
    }

    fn build_lines(&self, messages: &[Message], width: usize) -> Vec<DisplayLine> {
        let theme = theme::window_theme(self.window);
        let mut lines = Vec::new();
        for banner_line in theme.banner.lines() {
            lines.push(DisplayLine {
                text: banner_line.to_string(),
                style: Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::DIM),
            });
        }
        for message in messages {
            let label = theme::sender_label(self.window, message.sender);
            let style = Style::default().fg(theme::sender_color(message.sender));
            let prefix = format!("{label}> ");
            let indent = " ".repeat(prefix.chars().count().min(width.saturating_sub(1)));
            let wrapped = wrap_text(
                &message.content,
                width.saturating_sub(prefix.chars().count()).max(1),
            );
            for (i, chunk) in wrapped.into_iter().enumerate() {
                let text = if i == 0 {
                    format!("{prefix}{chunk}")
                } else {
                    format!("{indent}{chunk}")
                };
                let style = if i == 0 {
                    style.add_modifier(Modifier::BOLD)
                } else {
                    style
                };
                lines.push(DisplayLine { text, style });
            }
        }
        lines
    }

    pub fn render_messages(
        &mut self,
        frame: &mut UiFrame<'_>,
        area: Rect,
        messages: &[Message],
    ) {
        self.area = area;
        if area.width == 0 || area.height == 0 {
            return;
        }
        let text_width = area.width.saturating_sub(1).max(1) as usize;
        let lines = self.build_lines(messages, text_width);
        let total = lines.len();
        let view = area.height as usize;
        self.scroll.apply(total, view);
        self.last_total = total;
        self.last_view = view;

        let buffer = frame.buffer_mut();
        let bounds = area.intersection(buffer.area);
        if bounds.width == 0 || bounds.height == 0 {
            return;
        }
        for (row, line) in lines
            .iter()
            .skip(self.scroll.offset)
            .take(view)
            .enumerate()
        {
            safe_set_string(
                buffer,
                bounds,
                area.x,
                area.y.saturating_add(row as u16),
                &line.text,
                line.style,
            );
        }
        if total > view {
            let content_len = total.saturating_sub(view).saturating_add(1).max(1);
            let mut state = ScrollbarState::new(content_len)
                .position(self.scroll.offset.min(content_len.saturating_sub(1)))
                .viewport_content_length(view.max(1));
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight),
                area,
                &mut state,
            );
        }
    }

    /// Wheel scrolling over the transcript.
    pub fn handle_mouse(&mut self, event: &Event) -> bool {
        let Event::Mouse(mouse) = event else {
            return false;
        };
        if !rect_contains(self.area, mouse.column, mouse.row) {
            return false;
        }
        match mouse.kind {
            MouseEventKind::ScrollUp => {
                self.bump(-3);
                true
            }
            MouseEventKind::ScrollDown => {
                self.bump(3);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_splits_on_words_and_hard_breaks_long_tokens() {
        assert_eq!(wrap_text("one two three", 8), vec!["one two", "three"]);
        assert_eq!(wrap_text("abcdefgh", 3), vec!["abc", "def", "gh"]);
        assert_eq!(wrap_text("", 10), vec![String::new()]);
    }

    #[test]
    fn scroll_state_clamps_to_content() {
        let mut s = ScrollState::default();
        s.bump(100);
        s.apply(10, 4);
        assert_eq!(s.offset, 6);
        s.bump(-100);
        s.apply(10, 4);
        assert_eq!(s.offset, 0);
        // shrinking content pulls the offset back in range
        s.offset = 9;
        s.apply(5, 4);
        assert_eq!(s.offset, 1);
    }

    #[test]
    fn generated_replies_always_follow_to_bottom() {
        let mut view = ChatView::new(WindowId::Default);
        view.last_total = 200;
        view.last_view = 10;
        view.set_offset(0); // reader scrolled all the way back
        view.on_appended(Sender::System);
        view.scroll.apply(200, 10);
        assert_eq!(view.offset(), 190);
    }

    #[test]
    fn user_messages_preserve_a_deep_scrollback() {
        let mut view = ChatView::new(WindowId::Default);
        view.last_total = 200;
        view.last_view = 10;
        view.set_offset(100); // 90 rows above the bottom: beyond threshold
        view.on_appended(Sender::User);
        view.scroll.apply(200, 10);
        assert_eq!(view.offset(), 100);

        view.set_offset(150); // 40 rows from the bottom: within threshold
        view.on_appended(Sender::User);
        view.scroll.apply(200, 10);
        assert_eq!(view.offset(), 190);
    }
}
