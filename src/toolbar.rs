use crossterm::event::{Event, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};

use crate::theme;
use crate::ui::{UiFrame, rect_contains, safe_set_string, truncate_to_width};
use crate::window::WindowId;

#[derive(Debug, Clone, Copy)]
struct ChipHit {
    id: WindowId,
    rect: Rect,
}

/// Bottom tray holding one chip per minimized window, plus a right-aligned
/// info line (package, platform, hostname). Hit rectangles are recorded
/// during render and consumed by mouse dispatch, so `begin_frame` must run
/// before each render pass.
#[derive(Debug)]
pub struct Toolbar {
    area: Rect,
    chip_hits: Vec<ChipHit>,
    hostname: Option<String>,
}

impl Toolbar {
    pub fn new() -> Self {
        Self {
            area: Rect::default(),
            chip_hits: Vec::new(),
            hostname: None,
        }
    }

    pub fn begin_frame(&mut self) {
        self.chip_hits.clear();
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    /// Splits `area` into the managed desktop region and a one-row tray at
    /// the bottom. When the tray is hidden the whole area is managed.
    pub fn split_area(&mut self, visible: bool, area: Rect) -> (Rect, Rect) {
        if !visible || area.height == 0 {
            self.area = Rect::default();
            return (area, Rect::default());
        }
        let tray = Rect {
            x: area.x,
            y: area.y.saturating_add(area.height).saturating_sub(1),
            width: area.width,
            height: 1,
        };
        let managed = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height: area.height.saturating_sub(1),
        };
        self.area = tray;
        (managed, tray)
    }

    pub fn render(&mut self, frame: &mut UiFrame<'_>, minimized: &[WindowId]) {
        let area = self.area;
        if area.width == 0 || area.height == 0 {
            return;
        }
        let buffer = frame.buffer_mut();
        let bounds = area.intersection(buffer.area);
        if bounds.width == 0 || bounds.height == 0 {
            return;
        }
        // fill the tray row
        for x in bounds.x..bounds.x.saturating_add(bounds.width) {
            if let Some(cell) = buffer.cell_mut((x, area.y)) {
                cell.set_symbol(" ");
                cell.set_style(
                    Style::default()
                        .bg(theme::toolbar_bg())
                        .fg(theme::toolbar_fg()),
                );
            }
        }
        let mut x = area.x;
        let max_x = area.x.saturating_add(area.width);
        for &id in minimized {
            let title = theme::window_theme(id).title;
            let chunk = format!(" ▪ {title} ");
            let chunk_width = chunk.chars().count() as u16;
            if x.saturating_add(chunk_width) > max_x {
                break;
            }
            safe_set_string(
                buffer,
                bounds,
                x,
                area.y,
                &chunk,
                Style::default()
                    .bg(theme::toolbar_chip_bg())
                    .fg(theme::toolbar_chip_fg()),
            );
            self.chip_hits.push(ChipHit {
                id,
                rect: Rect {
                    x,
                    y: area.y,
                    width: chunk_width,
                    height: 1,
                },
            });
            x = x.saturating_add(chunk_width).saturating_add(1);
        }

        // right-aligned info line; hostname is cached to avoid a syscall
        // every frame
        let hostname = if let Some(ref h) = self.hostname {
            h.clone()
        } else {
            let h = hostname::get()
                .ok()
                .and_then(|s| s.into_string().ok())
                .unwrap_or_else(|| "unknown-host".to_string());
            self.hostname = Some(h.clone());
            h
        };
        const PKG_NAME: &str = env!("CARGO_PKG_NAME");
        const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
        let info = format!(
            "{PKG_NAME} {PKG_VERSION} · {} · {hostname}",
            std::env::consts::OS
        );
        let text = truncate_to_width(&info, bounds.width as usize);
        let text_width = text.chars().count() as u16;
        let start_x = if text_width >= bounds.width {
            bounds.x
        } else {
            bounds
                .x
                .saturating_add(bounds.width)
                .saturating_sub(text_width)
        };
        safe_set_string(
            buffer,
            bounds,
            start_x.max(x),
            area.y,
            &text,
            Style::default()
                .bg(theme::toolbar_bg())
                .fg(theme::toolbar_fg())
                .add_modifier(Modifier::DIM),
        );
    }

    /// Which minimized window's chip a mouse-down landed on, if any.
    pub fn hit_test_chip(&self, event: &Event) -> Option<WindowId> {
        let Event::Mouse(mouse) = event else {
            return None;
        };
        if !matches!(mouse.kind, MouseEventKind::Down(_)) {
            return None;
        }
        self.chip_hits
            .iter()
            .find(|hit| rect_contains(hit.rect, mouse.column, mouse.row))
            .map(|hit| hit.id)
    }
}

impl Default for Toolbar {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyModifiers, MouseButton, MouseEvent};
    use ratatui::buffer::Buffer;

    #[test]
    fn split_area_reserves_the_bottom_row_only_when_visible() {
        let mut toolbar = Toolbar::new();
        let area = Rect {
            x: 0,
            y: 0,
            width: 40,
            height: 10,
        };
        let (managed, tray) = toolbar.split_area(true, area);
        assert_eq!(managed.height, 9);
        assert_eq!(tray.height, 1);
        assert_eq!(tray.y, 9);

        let (managed, tray) = toolbar.split_area(false, area);
        assert_eq!(managed, area);
        assert_eq!(tray, Rect::default());
    }

    #[test]
    fn chips_are_hit_testable_after_render() {
        let mut toolbar = Toolbar::new();
        let area = Rect {
            x: 0,
            y: 0,
            width: 60,
            height: 2,
        };
        toolbar.begin_frame();
        let (_, _tray) = toolbar.split_area(true, area);
        let mut buf = Buffer::empty(area);
        let mut frame = UiFrame::from_parts(area, &mut buf);
        toolbar.render(&mut frame, &[WindowId::Npc, WindowId::Group]);

        let click = |column, row| {
            Event::Mouse(MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column,
                row,
                modifiers: KeyModifiers::NONE,
            })
        };
        assert_eq!(toolbar.hit_test_chip(&click(1, 1)), Some(WindowId::Npc));
        assert_eq!(toolbar.hit_test_chip(&click(1, 0)), None);
        // second chip starts after the first chip plus a gap
        let second_x = " ▪ npc ".chars().count() as u16 + 2;
        assert_eq!(
            toolbar.hit_test_chip(&click(second_x, 1)),
            Some(WindowId::Group)
        );
    }

    #[test]
    fn info_line_names_the_package() {
        let mut toolbar = Toolbar::new();
        let area = Rect {
            x: 0,
            y: 0,
            width: 80,
            height: 1,
        };
        toolbar.begin_frame();
        toolbar.split_area(true, area);
        // height 1: managed collapses to zero rows, tray takes the row
        let mut buf = Buffer::empty(area);
        let mut frame = UiFrame::from_parts(area, &mut buf);
        toolbar.render(&mut frame, &[]);
        let mut rendered = String::new();
        for x in 0..area.width {
            rendered.push_str(buf.cell((x, 0)).unwrap().symbol());
        }
        assert!(rendered.contains(env!("CARGO_PKG_NAME")));
        assert!(rendered.contains(env!("CARGO_PKG_VERSION")));
    }
}
