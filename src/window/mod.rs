pub mod fullscreen;
pub mod lifecycle;
pub mod stacking;

use chrono::{DateTime, Local};

use crate::chat::Message;

pub use fullscreen::{CycleDirection, FullscreenArbiter};
pub use lifecycle::{ConfirmationRequest, WindowLifecycleManager};
pub use stacking::StackOrderAllocator;

/// Logical chat surfaces. The set is fixed for the process lifetime and the
/// declaration order is the canonical traversal order for fullscreen cycling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WindowId {
    Default,
    Npc,
    Void,
    Group,
}

impl WindowId {
    pub const ALL: [WindowId; 4] = [
        WindowId::Default,
        WindowId::Npc,
        WindowId::Void,
        WindowId::Group,
    ];

    /// Stable lowercase identifier, used in export artifacts and filenames.
    pub fn slug(self) -> &'static str {
        match self {
            WindowId::Default => "default",
            WindowId::Npc => "npc",
            WindowId::Void => "void",
            WindowId::Group => "group",
        }
    }
}

/// Render state of one window. `Open` covers both the tiled and fullscreen
/// presentation; which window (if any) is fullscreen is tracked separately by
/// the [`FullscreenArbiter`] so the open/minimized/closed machine stays a
/// plain three-state enum with no invalid combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    Closed,
    Open,
    Minimized,
}

/// Everything one window carries across visibility transitions: its message
/// log, last known scroll offset, stacking position, and when it was last
/// freshly opened. Minimize keeps all of it; a confirmed destructive close
/// resets it back to the single seeded welcome message.
#[derive(Debug, Clone)]
pub struct WindowRecord {
    state: WindowState,
    messages: Vec<Message>,
    scroll_offset: usize,
    created_at: Option<DateTime<Local>>,
    z_index: u64,
    seed: String,
}

/// Static z-index assigned to every window before it is first focused.
pub const STATIC_Z: u64 = 10;

impl WindowRecord {
    pub(crate) fn new(seed: String) -> Self {
        Self {
            state: WindowState::Closed,
            messages: vec![Message::seed(&seed)],
            scroll_offset: 0,
            created_at: None,
            z_index: STATIC_Z,
            seed,
        }
    }

    pub fn state(&self) -> WindowState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == WindowState::Open
    }

    pub fn is_minimized(&self) -> bool {
        self.state == WindowState::Minimized
    }

    pub fn is_closed(&self) -> bool {
        self.state == WindowState::Closed
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn created_at(&self) -> Option<DateTime<Local>> {
        self.created_at
    }

    pub fn z_index(&self) -> u64 {
        self.z_index
    }

    pub(crate) fn set_state(&mut self, state: WindowState) {
        self.state = state;
    }

    pub(crate) fn set_z_index(&mut self, z: u64) {
        self.z_index = z;
    }

    pub(crate) fn stamp_created(&mut self) {
        self.created_at = Some(Local::now());
    }

    pub(crate) fn messages_mut(&mut self) -> &mut Vec<Message> {
        &mut self.messages
    }

    pub(crate) fn set_scroll_offset(&mut self, offset: usize) {
        self.scroll_offset = offset;
    }

    pub(crate) fn replace_messages(&mut self, messages: Vec<Message>) {
        self.messages = messages;
    }

    /// Drops the whole history and re-seeds the welcome message. Only the
    /// destructive close path calls this.
    pub(crate) fn reset(&mut self) {
        self.state = WindowState::Closed;
        self.messages = vec![Message::seed(&self.seed)];
        self.scroll_offset = 0;
        self.created_at = None;
    }
}
