pub mod export;
pub mod generator;
pub mod remote;

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::theme::PersonaKind;
use crate::window::{WindowId, WindowLifecycleManager};

pub use generator::{CannedGenerator, ReplyEvent, ResponseGenerator};
pub use remote::RemoteGenerator;

/// Display identity of a message author. `System` is the default persona's
/// voice and the sender of every seeded welcome message; `Npc` and `Void`
/// only appear in the group window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    System,
    Npc,
    Void,
}

impl Sender {
    pub fn is_user(self) -> bool {
        self == Sender::User
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub id: String,
    pub content: String,
    pub sender: Sender,
    pub timestamp: DateTime<Local>,
}

impl Message {
    pub fn new(content: impl Into<String>, sender: Sender) -> Self {
        Self {
            id: fresh_id(),
            content: content.into(),
            sender,
            timestamp: Local::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(content, Sender::User)
    }

    pub(crate) fn seed(content: &str) -> Self {
        Self::new(content, Sender::System)
    }
}

/// Millisecond timestamp plus a process-wide sequence suffix, so two appends
/// within the same millisecond still get distinct ids.
fn fresh_id() -> String {
    static SEQ: AtomicU64 = AtomicU64::new(0);
    format!(
        "{}-{}",
        Local::now().timestamp_millis(),
        SEQ.fetch_add(1, Ordering::Relaxed)
    )
}

/// How close to the bottom (in rows) the viewport may be for an append to
/// still drag it down to the newest message.
pub const FOLLOW_THRESHOLD: usize = 50;

/// Whether the view should jump to the newest message: always for generated
/// replies, and for the user's own messages only when the viewport was
/// already at or near the bottom. A reader who scrolled back stays put.
pub fn follow_newest(sender: Sender, rows_from_bottom: usize) -> bool {
    !sender.is_user() || rows_from_bottom <= FOLLOW_THRESHOLD
}

/// Per-window message mutation. One session exists per window; it owns no
/// message storage itself (the manager's record does) and funnels every
/// mutation through the manager, which is the only writer of the record map.
#[derive(Debug, Clone, Copy)]
pub struct ChatSession {
    window: WindowId,
    persona: PersonaKind,
}

impl ChatSession {
    pub fn new(window: WindowId, persona: PersonaKind) -> Self {
        Self { window, persona }
    }

    pub fn window(&self) -> WindowId {
        self.window
    }

    pub fn persona(&self) -> PersonaKind {
        self.persona
    }

    /// Appends the user's message. Whitespace-only input is rejected.
    pub fn append_user_message(
        &self,
        manager: &mut WindowLifecycleManager,
        text: &str,
    ) -> bool {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return false;
        }
        manager.append_message(self.window, Message::user(trimmed))
    }

    /// Appends the user's message and kicks off reply generation against the
    /// window's persona. Returns false (and starts nothing) for empty input.
    pub fn submit(
        &self,
        manager: &mut WindowLifecycleManager,
        generator: &mut dyn generator::ResponseGenerator,
        text: &str,
    ) -> bool {
        if !self.append_user_message(manager, text) {
            return false;
        }
        generator.begin(
            self.window,
            manager.record(self.window).messages(),
            self.persona,
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_are_unique_within_a_burst() {
        let ids: Vec<String> = (0..64).map(|_| fresh_id()).collect();
        let mut deduped = ids.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), ids.len());
    }

    #[test]
    fn empty_user_messages_are_rejected() {
        let mut mgr = WindowLifecycleManager::new(|_| "hi".to_string());
        mgr.open(WindowId::Default);
        let session = ChatSession::new(WindowId::Default, PersonaKind::Default);
        assert!(!session.append_user_message(&mut mgr, "   \n\t"));
        assert_eq!(mgr.record(WindowId::Default).messages().len(), 1);
        assert!(session.append_user_message(&mut mgr, "  hello  "));
        let messages = mgr.record(WindowId::Default).messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].content, "hello");
        assert_eq!(messages[1].sender, Sender::User);
    }

    #[test]
    fn follow_policy() {
        assert!(follow_newest(Sender::System, 1000));
        assert!(follow_newest(Sender::Npc, 1000));
        assert!(follow_newest(Sender::User, FOLLOW_THRESHOLD));
        assert!(!follow_newest(Sender::User, FOLLOW_THRESHOLD + 1));
    }
}
