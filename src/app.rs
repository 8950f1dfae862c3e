use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyEventKind, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};

use crate::chat::{self, ChatSession, Message, ReplyEvent, ResponseGenerator, Sender};
use crate::components::{
    ChatView, Component, ConfirmAction, ConfirmOverlayComponent, HelpOverlayComponent, InputLine,
};
use crate::event_loop::ControlFlow;
use crate::keybindings::{Action, KeyBindings};
use crate::theme;
use crate::toolbar::Toolbar;
use crate::ui::{UiFrame, rect_contains, safe_set_string};
use crate::window::{CycleDirection, WindowId, WindowLifecycleManager};

const STATUS_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy)]
struct HeaderHit {
    id: WindowId,
    minimize: Rect,
    fullscreen: Rect,
    close: Rect,
    bar: Rect,
}

/// Top-level application: wires the lifecycle manager to per-window chat
/// sessions, views, and input lines, routes every input event, and drains
/// generator deliveries on each tick.
pub struct App {
    manager: WindowLifecycleManager,
    sessions: BTreeMap<WindowId, ChatSession>,
    views: BTreeMap<WindowId, ChatView>,
    inputs: BTreeMap<WindowId, InputLine>,
    generator: Box<dyn ResponseGenerator>,
    keybindings: KeyBindings,
    toolbar: Toolbar,
    confirm: ConfirmOverlayComponent,
    help: HelpOverlayComponent,
    export_dir: PathBuf,
    header_hits: Vec<HeaderHit>,
    body_rects: Vec<(WindowId, Rect)>,
    status: Option<(String, Instant)>,
}

impl App {
    pub fn new(generator: Box<dyn ResponseGenerator>, export_dir: PathBuf) -> Self {
        let manager =
            WindowLifecycleManager::new(|id| theme::window_theme(id).welcome.to_string());
        let mut sessions = BTreeMap::new();
        let mut views = BTreeMap::new();
        let mut inputs = BTreeMap::new();
        for id in WindowId::ALL {
            sessions.insert(id, ChatSession::new(id, theme::window_theme(id).persona));
            views.insert(id, ChatView::new(id));
            inputs.insert(id, InputLine::new());
        }
        let mut app = Self {
            manager,
            sessions,
            views,
            inputs,
            generator,
            keybindings: KeyBindings::default(),
            toolbar: Toolbar::new(),
            confirm: ConfirmOverlayComponent::new(),
            help: HelpOverlayComponent::new(),
            export_dir,
            header_hits: Vec::new(),
            body_rects: Vec::new(),
            status: None,
        };
        // the default terminal greets on launch
        app.open_window(WindowId::Default);
        app
    }

    pub fn manager(&self) -> &WindowLifecycleManager {
        &self.manager
    }

    fn focused(&self) -> Option<WindowId> {
        self.manager.topmost()
    }

    fn view_mut(&mut self, id: WindowId) -> &mut ChatView {
        self.views.get_mut(&id).expect("view per window id")
    }

    fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some((text.into(), Instant::now()));
    }

    /// Open (or restore) a window and line its view up with the persisted
    /// scroll offset.
    fn open_window(&mut self, id: WindowId) {
        self.manager.open(id);
        let offset = self.manager.record(id).scroll_offset();
        self.view_mut(id).set_offset(offset);
    }

    /// Persist the current message/scroll snapshot, then collapse to the
    /// toolbar.
    fn minimize_window(&mut self, id: WindowId) {
        let messages = self.manager.record(id).messages().to_vec();
        let offset = self.views[&id].offset();
        self.manager.save_state(id, messages, offset);
        self.manager.minimize_to_toolbar(id);
    }

    fn request_close(&mut self, id: WindowId) {
        self.manager.request_close(id);
        if let Some(request) = self.manager.pending_close() {
            let title = request.title.clone();
            let message = request.message.clone();
            self.confirm.open(&title, &message);
        }
    }

    fn resolve_confirm(&mut self, action: ConfirmAction) {
        match action {
            ConfirmAction::Confirm => {
                if let Some(target) = self.manager.confirm_close() {
                    // a stale reply must not land in the reset window
                    self.generator.cancel(target);
                    self.view_mut(target).reset();
                    self.inputs
                        .get_mut(&target)
                        .expect("input per window id")
                        .take();
                }
            }
            ConfirmAction::Cancel => self.manager.cancel_close(),
        }
        self.confirm.close();
    }

    fn toggle_fullscreen(&mut self) {
        if let Some(active) = self.manager.fullscreen() {
            self.manager.set_fullscreen(active, false);
        } else if let Some(id) = self.focused() {
            self.manager.set_fullscreen(id, true);
        }
    }

    /// Tab order over open windows in declaration order; in fullscreen the
    /// same keys walk the fullscreen cycle instead, since only one window
    /// is visible.
    fn focus_neighbor(&mut self, forward: bool) {
        if self.manager.fullscreen().is_some() {
            let direction = if forward {
                CycleDirection::Next
            } else {
                CycleDirection::Prev
            };
            self.manager.cycle_fullscreen(direction);
            return;
        }
        let open = self.manager.open_windows();
        if open.len() < 2 {
            return;
        }
        let current = self
            .focused()
            .and_then(|id| open.iter().position(|other| *other == id))
            .unwrap_or(0);
        let step = if forward { 1isize } else { -1isize };
        let next = ((current as isize + step).rem_euclid(open.len() as isize)) as usize;
        self.manager.focus(open[next]);
    }

    fn submit_input(&mut self, id: WindowId) {
        let text = self
            .inputs
            .get_mut(&id)
            .expect("input per window id")
            .take();
        let session = self.sessions[&id];
        if session.submit(&mut self.manager, self.generator.as_mut(), &text) {
            self.view_mut(id).on_appended(Sender::User);
        }
    }

    fn export_transcript(&mut self, id: WindowId) {
        let theme = theme::window_theme(id);
        let messages = self.manager.record(id).messages().to_vec();
        match chat::export::export_to_dir(&self.export_dir, id, theme.slug, &messages) {
            Ok(path) => self.set_status(format!("exported {}", path.display())),
            Err(err) => {
                tracing::warn!(window_id = ?id, error = %err, "transcript export failed");
                self.set_status(format!("export failed: {err}"));
            }
        }
    }

    fn copy_transcript(&mut self, id: WindowId) {
        let theme = theme::window_theme(id);
        let messages = self.manager.record(id).messages().to_vec();
        match chat::export::copy_to_clipboard(id, theme.slug, &messages) {
            Ok(()) => self.set_status("transcript copied"),
            Err(err) => {
                tracing::warn!(window_id = ?id, error = %err, "clipboard copy failed");
                self.set_status(format!("copy failed: {err}"));
            }
        }
    }

    fn apply_reply(&mut self, event: ReplyEvent) {
        match event {
            ReplyEvent::Append {
                window,
                content,
                sender,
            } => {
                if self.manager.append_message(window, Message::new(content, sender)) {
                    self.view_mut(window).on_appended(sender);
                }
            }
            ReplyEvent::ExtendLast { window, chunk } => {
                self.manager.extend_last_message(window, &chunk);
            }
            ReplyEvent::Failed { window, error } => {
                let note = format!("generation failed: {error}");
                if self
                    .manager
                    .append_message(window, Message::new(note, Sender::System))
                {
                    self.view_mut(window).on_appended(Sender::System);
                }
            }
        }
    }

    /// Idle tick: deliver due/streamed replies and persist scroll offsets.
    pub fn on_tick(&mut self, now: Instant) {
        for event in self.generator.poll(now) {
            self.apply_reply(event);
        }
        for id in self.manager.open_windows() {
            let offset = self.views[&id].offset();
            self.manager.save_scroll(id, offset);
        }
        if self
            .status
            .as_ref()
            .is_some_and(|(_, since)| since.elapsed() > STATUS_TTL)
        {
            self.status = None;
        }
    }

    pub fn handle_event(&mut self, event: &Event) -> ControlFlow {
        // modal overlays first
        if self.confirm.visible() {
            if let Some(action) = self.confirm.handle_confirm_event(event) {
                self.resolve_confirm(action);
            }
            return ControlFlow::Continue;
        }
        if self.help.visible() {
            self.help.handle_event(event);
            return ControlFlow::Continue;
        }
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                let kb = self.keybindings.clone();
                if kb.matches(Action::Quit, key) {
                    return ControlFlow::Quit;
                }
                if kb.matches(Action::OpenHelp, key) {
                    self.help.show();
                } else if kb.matches(Action::FocusNext, key) {
                    self.focus_neighbor(true);
                } else if kb.matches(Action::FocusPrev, key) {
                    self.focus_neighbor(false);
                } else if kb.matches(Action::FullscreenToggle, key) {
                    self.toggle_fullscreen();
                } else if kb.matches(Action::CycleFullscreenNext, key) {
                    self.manager.cycle_fullscreen(CycleDirection::Next);
                } else if kb.matches(Action::CycleFullscreenPrev, key) {
                    self.manager.cycle_fullscreen(CycleDirection::Prev);
                } else if kb.matches(Action::MinimizeWindow, key) {
                    if let Some(id) = self.focused() {
                        self.minimize_window(id);
                    }
                } else if kb.matches(Action::CloseWindow, key) {
                    if let Some(id) = self.focused() {
                        self.request_close(id);
                    }
                } else if kb.matches(Action::OpenDefault, key) {
                    self.open_window(WindowId::Default);
                } else if kb.matches(Action::OpenNpc, key) {
                    self.open_window(WindowId::Npc);
                } else if kb.matches(Action::OpenVoid, key) {
                    self.open_window(WindowId::Void);
                } else if kb.matches(Action::OpenGroup, key) {
                    self.open_window(WindowId::Group);
                } else if kb.matches(Action::ExportTranscript, key) {
                    if let Some(id) = self.focused() {
                        self.export_transcript(id);
                    }
                } else if kb.matches(Action::CopyTranscript, key) {
                    if let Some(id) = self.focused() {
                        self.copy_transcript(id);
                    }
                } else if kb.matches(Action::ScrollPageUp, key) {
                    if let Some(id) = self.focused() {
                        self.view_mut(id).page_up();
                    }
                } else if kb.matches(Action::ScrollPageDown, key) {
                    if let Some(id) = self.focused() {
                        self.view_mut(id).page_down();
                    }
                } else if kb.matches(Action::ScrollHome, key) {
                    if let Some(id) = self.focused() {
                        self.view_mut(id).scroll_home();
                    }
                } else if kb.matches(Action::ScrollEnd, key) {
                    if let Some(id) = self.focused() {
                        self.view_mut(id).scroll_end();
                    }
                } else if key.code == crossterm::event::KeyCode::Enter {
                    if let Some(id) = self.focused() {
                        self.submit_input(id);
                    }
                } else if let Some(id) = self.focused() {
                    self.inputs
                        .get_mut(&id)
                        .expect("input per window id")
                        .handle_event(event);
                }
            }
            Event::Mouse(mouse) => {
                if let Some(id) = self.toolbar.hit_test_chip(event) {
                    self.open_window(id);
                    return ControlFlow::Continue;
                }
                if matches!(mouse.kind, MouseEventKind::Down(_)) {
                    if let Some(hit) = self
                        .header_hits
                        .iter()
                        .copied()
                        .find(|hit| rect_contains(hit.bar, mouse.column, mouse.row))
                    {
                        if rect_contains(hit.minimize, mouse.column, mouse.row) {
                            self.minimize_window(hit.id);
                        } else if rect_contains(hit.fullscreen, mouse.column, mouse.row) {
                            if self.manager.fullscreen() == Some(hit.id) {
                                self.manager.set_fullscreen(hit.id, false);
                            } else {
                                self.manager.set_fullscreen(hit.id, true);
                            }
                        } else if rect_contains(hit.close, mouse.column, mouse.row) {
                            self.request_close(hit.id);
                        } else {
                            self.manager.focus(hit.id);
                        }
                        return ControlFlow::Continue;
                    }
                    // body click focuses the topmost window under the cursor
                    let hit = self
                        .body_rects
                        .iter()
                        .rev()
                        .find(|(_, rect)| rect_contains(*rect, mouse.column, mouse.row))
                        .map(|(id, _)| *id);
                    if let Some(id) = hit {
                        self.manager.focus(id);
                    }
                } else if matches!(
                    mouse.kind,
                    MouseEventKind::ScrollUp | MouseEventKind::ScrollDown
                ) {
                    let hit = self
                        .body_rects
                        .iter()
                        .rev()
                        .find(|(_, rect)| rect_contains(*rect, mouse.column, mouse.row))
                        .map(|(id, _)| *id);
                    if let Some(id) = hit {
                        self.view_mut(id).handle_mouse(event);
                    }
                }
            }
            _ => {}
        }
        ControlFlow::Continue
    }

    pub fn render(&mut self, frame: &mut ratatui::Frame) {
        let mut ui = UiFrame::new(frame);
        let full = ui.area();
        self.toolbar.begin_frame();
        self.header_hits.clear();
        self.body_rects.clear();

        let toolbar_visible = self.manager.toolbar_visible();
        let (managed, _tray) = self.toolbar.split_area(toolbar_visible, full);

        if let Some(active) = self.manager.fullscreen() {
            self.render_window(&mut ui, active, managed, true);
        } else {
            let open = self.manager.open_windows();
            if open.is_empty() {
                let hint = "no open windows -- F2..F5 to open one, F1 for help";
                let x = managed.x + managed.width.saturating_sub(hint.len() as u16) / 2;
                let y = managed.y + managed.height / 2;
                let buffer = ui.buffer_mut();
                safe_set_string(
                    buffer,
                    managed,
                    x,
                    y,
                    hint,
                    Style::default().add_modifier(Modifier::DIM),
                );
            } else {
                let columns = tile_columns(managed, open.len());
                let rect_of: BTreeMap<WindowId, Rect> =
                    open.iter().copied().zip(columns).collect();
                let focused = self.focused();
                for id in self.manager.draw_order() {
                    self.render_window(&mut ui, id, rect_of[&id], focused == Some(id));
                }
            }
        }

        let minimized = self.manager.minimized_windows();
        self.toolbar.render(&mut ui, &minimized);

        if let Some((status, _)) = &self.status {
            let text = format!(" {status} ");
            let x = managed
                .x
                .saturating_add(managed.width.saturating_sub(text.chars().count() as u16));
            let buffer = ui.buffer_mut();
            safe_set_string(
                buffer,
                managed,
                x,
                managed.y,
                &text,
                Style::default()
                    .bg(theme::toolbar_bg())
                    .fg(theme::toolbar_fg()),
            );
        }

        if self.confirm.visible() {
            self.confirm.render(&mut ui, full, true);
        }
        if self.help.visible() {
            self.help.render(&mut ui, full, true);
        }
    }

    fn render_window(&mut self, ui: &mut UiFrame<'_>, id: WindowId, rect: Rect, focused: bool) {
        // narrower than the header buttons is unusable anyway
        if rect.width < 14 || rect.height < 4 {
            return;
        }
        let window_theme = theme::window_theme(id);
        let border_style = if focused {
            Style::default().fg(theme::chrome_border_focused())
        } else {
            Style::default().fg(theme::chrome_border())
        };
        let block = ratatui::widgets::Block::default()
            .borders(ratatui::widgets::Borders::ALL)
            .border_style(border_style);
        ui.render_widget(block, rect);

        // header row: title on the left, window buttons on the right
        let header_bg = if focused {
            theme::chrome_header_bg()
        } else {
            theme::chrome_header_inactive_bg()
        };
        let header_style = Style::default().bg(header_bg).fg(theme::chrome_header_fg());
        let buffer = ui.buffer_mut();
        let bounds = rect.intersection(buffer.area);
        if bounds.width == 0 || bounds.height == 0 {
            return;
        }
        for x in rect.x + 1..rect.x + rect.width - 1 {
            if let Some(cell) = buffer.cell_mut((x, rect.y)) {
                cell.set_symbol(" ");
                cell.set_style(header_style);
            }
        }
        let title = format!(" {} ", window_theme.title);
        safe_set_string(
            buffer,
            bounds,
            rect.x + 1,
            rect.y,
            &title,
            header_style.add_modifier(Modifier::BOLD),
        );
        let buttons = "[_][□][x]";
        let buttons_x = rect.x + rect.width - 1 - buttons.chars().count() as u16;
        safe_set_string(buffer, bounds, buttons_x, rect.y, buttons, header_style);
        self.header_hits.push(HeaderHit {
            id,
            minimize: Rect {
                x: buttons_x,
                y: rect.y,
                width: 3,
                height: 1,
            },
            fullscreen: Rect {
                x: buttons_x + 3,
                y: rect.y,
                width: 3,
                height: 1,
            },
            close: Rect {
                x: buttons_x + 6,
                y: rect.y,
                width: 3,
                height: 1,
            },
            bar: Rect {
                x: rect.x,
                y: rect.y,
                width: rect.width,
                height: 1,
            },
        });

        let inner = Rect {
            x: rect.x + 1,
            y: rect.y + 1,
            width: rect.width.saturating_sub(2),
            height: rect.height.saturating_sub(2),
        };
        let input_rect = Rect {
            x: inner.x,
            y: inner.y + inner.height.saturating_sub(1),
            width: inner.width,
            height: 1,
        };
        let messages_rect = Rect {
            x: inner.x,
            y: inner.y,
            width: inner.width,
            height: inner.height.saturating_sub(1),
        };
        let messages = self.manager.record(id).messages().to_vec();
        self.view_mut(id).render_messages(ui, messages_rect, &messages);
        self.inputs
            .get_mut(&id)
            .expect("input per window id")
            .render(ui, input_rect, focused);
        self.body_rects.push((id, rect));
    }
}

/// Equal-width horizontal tiling of the managed area.
fn tile_columns(area: Rect, count: usize) -> Vec<Rect> {
    if count == 0 || area.width == 0 {
        return Vec::new();
    }
    let count_u16 = count as u16;
    let base = area.width / count_u16;
    let mut remainder = area.width % count_u16;
    let mut x = area.x;
    let mut rects = Vec::with_capacity(count);
    for _ in 0..count {
        let extra = if remainder > 0 {
            remainder -= 1;
            1
        } else {
            0
        };
        let width = base + extra;
        rects.push(Rect {
            x,
            y: area.y,
            width,
            height: area.height,
        });
        x += width;
    }
    rects
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::CannedGenerator;
    use crate::chat::generator::FixedPicker;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn app() -> App {
        let generator = CannedGenerator::with_picker(Box::new(FixedPicker::new(vec![0])));
        App::new(Box::new(generator), std::env::temp_dir())
    }

    fn key(code: KeyCode, mods: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, mods))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_event(&key(KeyCode::Char(c), KeyModifiers::NONE));
        }
    }

    #[test]
    fn starts_with_the_default_terminal_open() {
        let app = app();
        assert!(app.manager().record(WindowId::Default).is_open());
        assert_eq!(app.manager().open_windows(), vec![WindowId::Default]);
    }

    #[test]
    fn typed_line_submits_and_reply_arrives_after_the_delay() {
        let mut app = app();
        type_text(&mut app, "hello");
        app.handle_event(&key(KeyCode::Enter, KeyModifiers::NONE));
        assert_eq!(app.manager().record(WindowId::Default).messages().len(), 2);

        // before the delay nothing lands
        app.on_tick(Instant::now());
        assert_eq!(app.manager().record(WindowId::Default).messages().len(), 2);

        app.on_tick(Instant::now() + Duration::from_secs(5));
        let messages = app.manager().record(WindowId::Default).messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].sender, Sender::User);
        assert_eq!(messages[2].sender, Sender::System);
    }

    #[test]
    fn group_window_gets_npc_then_void_replies() {
        let mut app = app();
        app.handle_event(&key(KeyCode::F(5), KeyModifiers::NONE));
        type_text(&mut app, "hi");
        app.handle_event(&key(KeyCode::Enter, KeyModifiers::NONE));

        app.on_tick(Instant::now() + Duration::from_secs(5));
        let messages = app.manager().record(WindowId::Group).messages();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[2].sender, Sender::Npc);
        assert_eq!(messages[3].sender, Sender::Void);
    }

    #[test]
    fn reply_lands_in_a_minimized_window_and_survives_restore() {
        let mut app = app();
        type_text(&mut app, "ping");
        app.handle_event(&key(KeyCode::Enter, KeyModifiers::NONE));
        app.handle_event(&key(KeyCode::Char('t'), KeyModifiers::CONTROL));
        assert!(app.manager().record(WindowId::Default).is_minimized());

        app.on_tick(Instant::now() + Duration::from_secs(5));
        assert_eq!(app.manager().record(WindowId::Default).messages().len(), 3);

        app.handle_event(&key(KeyCode::F(2), KeyModifiers::NONE));
        assert!(app.manager().record(WindowId::Default).is_open());
        assert_eq!(app.manager().record(WindowId::Default).messages().len(), 3);
    }

    #[test]
    fn confirmed_close_cancels_the_pending_reply() {
        let mut app = app();
        type_text(&mut app, "doomed");
        app.handle_event(&key(KeyCode::Enter, KeyModifiers::NONE));
        app.handle_event(&key(KeyCode::Char('w'), KeyModifiers::CONTROL));
        assert!(app.manager().pending_close().is_some());

        // dialog is modal; select the destructive choice and accept
        app.handle_event(&key(KeyCode::Right, KeyModifiers::NONE));
        app.handle_event(&key(KeyCode::Enter, KeyModifiers::NONE));
        assert!(app.manager().record(WindowId::Default).is_closed());

        app.on_tick(Instant::now() + Duration::from_secs(5));
        let messages = app.manager().record(WindowId::Default).messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].sender, Sender::System);
    }

    #[test]
    fn cancelled_close_changes_nothing() {
        let mut app = app();
        type_text(&mut app, "stay");
        app.handle_event(&key(KeyCode::Enter, KeyModifiers::NONE));
        let before = app.manager().record(WindowId::Default).messages().to_vec();

        app.handle_event(&key(KeyCode::Char('w'), KeyModifiers::CONTROL));
        app.handle_event(&key(KeyCode::Esc, KeyModifiers::NONE));
        assert!(app.manager().pending_close().is_none());
        assert_eq!(
            app.manager().record(WindowId::Default).messages(),
            &before[..]
        );
    }

    #[test]
    fn fullscreen_tab_walks_the_open_set() {
        let mut app = app();
        app.handle_event(&key(KeyCode::F(3), KeyModifiers::NONE));
        app.handle_event(&key(KeyCode::F(5), KeyModifiers::NONE));
        app.handle_event(&key(KeyCode::Char('f'), KeyModifiers::CONTROL));
        assert_eq!(app.manager().fullscreen(), Some(WindowId::Group));

        app.handle_event(&key(KeyCode::Char('n'), KeyModifiers::CONTROL));
        assert_eq!(app.manager().fullscreen(), Some(WindowId::Default));
        app.handle_event(&key(KeyCode::Char('p'), KeyModifiers::CONTROL));
        assert_eq!(app.manager().fullscreen(), Some(WindowId::Group));
    }

    #[test]
    fn minimize_persists_scroll_through_restore() {
        let mut app = app();
        app.view_mut(WindowId::Default).set_offset(7);
        app.handle_event(&key(KeyCode::Char('t'), KeyModifiers::CONTROL));
        assert_eq!(app.manager().record(WindowId::Default).scroll_offset(), 7);

        app.view_mut(WindowId::Default).set_offset(0);
        app.handle_event(&key(KeyCode::F(2), KeyModifiers::NONE));
        assert_eq!(app.views[&WindowId::Default].offset(), 7);
    }

    #[test]
    fn tile_columns_cover_the_area_exactly() {
        let area = Rect {
            x: 0,
            y: 0,
            width: 83,
            height: 20,
        };
        let rects = tile_columns(area, 3);
        assert_eq!(rects.len(), 3);
        assert_eq!(rects.iter().map(|r| r.width).sum::<u16>(), 83);
        assert_eq!(rects[2].x + rects[2].width, 83);
    }
}
