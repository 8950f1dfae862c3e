use crossterm::event::Event;
use ratatui::layout::Rect;

use crate::ui::UiFrame;

pub mod chat_view;
pub mod confirm_overlay;
pub mod help_overlay;
pub mod input_line;

pub use chat_view::ChatView;
pub use confirm_overlay::{ConfirmAction, ConfirmOverlayComponent};
pub use help_overlay::HelpOverlayComponent;
pub use input_line::InputLine;

pub trait Component {
    fn resize(&mut self, _area: Rect) {}

    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, focused: bool);

    fn handle_event(&mut self, _event: &Event) -> bool {
        false
    }
}
