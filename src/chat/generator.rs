use std::time::{Duration, Instant};

use rand::Rng;

use crate::chat::{Message, Sender};
use crate::theme::PersonaKind;
use crate::window::WindowId;

/// Delay before the primary persona reply lands.
pub const PRIMARY_REPLY_DELAY: Duration = Duration::from_millis(1000);
/// Additional delay before the second persona reply in the group window.
pub const GROUP_FOLLOWUP_DELAY: Duration = Duration::from_millis(800);

/// A reply delivery produced by a generator and applied by the app loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyEvent {
    Append {
        window: WindowId,
        content: String,
        sender: Sender,
    },
    /// Streaming token: extend the trailing message in place.
    ExtendLast { window: WindowId, chunk: String },
    /// Generation failed; surfaced as a single system message.
    Failed { window: WindowId, error: String },
}

/// Maps a conversation and persona to one or more asynchronous replies.
///
/// `begin` starts a generation; deliveries arrive later through `poll`,
/// which the event loop drains every tick. `cancel` drops everything still
/// in flight for one window (used by destructive close, so a stale reply
/// can never land in a freshly reset window). Deliveries for a merely
/// minimized window are deliberately NOT cancelled; they land in the hidden
/// log and show up on restore.
pub trait ResponseGenerator {
    fn begin(&mut self, window: WindowId, history: &[Message], persona: PersonaKind);
    fn poll(&mut self, now: Instant) -> Vec<ReplyEvent>;
    fn cancel(&mut self, window: WindowId);
}

/// Pseudo-random table selection, pluggable so tests can fix the sequence.
pub trait Picker {
    fn pick(&mut self, len: usize) -> usize;
}

pub struct RandomPicker;

impl Picker for RandomPicker {
    fn pick(&mut self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Cycles through a fixed index sequence. Test double.
pub struct FixedPicker {
    seq: Vec<usize>,
    at: usize,
}

impl FixedPicker {
    pub fn new(seq: Vec<usize>) -> Self {
        Self { seq, at: 0 }
    }
}

impl Picker for FixedPicker {
    fn pick(&mut self, len: usize) -> usize {
        let raw = self.seq.get(self.at).copied().unwrap_or(0);
        self.at = (self.at + 1) % self.seq.len().max(1);
        raw % len.max(1)
    }
}

const DEFAULT_RESPONSES: &[&str] = &[
    "Acknowledged. The terminal hums quietly.",
    "Processing... done. Nothing exploded this time.",
    "Signal received. Carry on, operator.",
    "That has been noted in the session log.",
    "Curious. Tell me more.",
    "The cursor blinks, patiently, as always.",
    "Understood. Executing in spirit only.",
    "Affirmative.",
];

const NPC_RESPONSES: &[&str] = &[
    "Well met, traveler. The tavern is quiet tonight.",
    "I once sold a sword to a ghost. Strange times.",
    "Rumor has it the old keep is not as empty as it looks.",
    "You carry yourself like someone with unfinished quests.",
    "Gold is gold, but a good story is worth more.",
    "Careful on the north road after dark.",
    "The blacksmith owes me a favor. And three coppers.",
    "Aye, I have heard stranger things than that.",
];

fn last_user_content(history: &[Message]) -> Option<&str> {
    history
        .iter()
        .rev()
        .find(|m| m.sender.is_user())
        .map(|m| m.content.as_str())
}

/// The void does not answer; it reflects.
fn void_echo(history: &[Message]) -> String {
    match last_user_content(history) {
        Some(text) => format!("...{text}... {text}..."),
        None => "...".to_string(),
    }
}

#[derive(Debug)]
struct PendingReply {
    window: WindowId,
    due: Instant,
    content: String,
    sender: Sender,
}

/// The default local generator: picks a canned line from the persona's
/// table (or echoes, for the void) and delivers it after a fixed delay. In
/// the group window the npc speaks first and the void follows, strictly in
/// that order.
pub struct CannedGenerator {
    picker: Box<dyn Picker + Send>,
    pending: Vec<PendingReply>,
}

impl CannedGenerator {
    pub fn new() -> Self {
        Self::with_picker(Box::new(RandomPicker))
    }

    pub fn with_picker(picker: Box<dyn Picker + Send>) -> Self {
        Self {
            picker,
            pending: Vec::new(),
        }
    }

    fn pick_from(&mut self, table: &[&str]) -> String {
        table[self.picker.pick(table.len())].to_string()
    }

    fn schedule(&mut self, window: WindowId, delay: Duration, content: String, sender: Sender) {
        self.pending.push(PendingReply {
            window,
            due: Instant::now() + delay,
            content,
            sender,
        });
    }
}

impl Default for CannedGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseGenerator for CannedGenerator {
    fn begin(&mut self, window: WindowId, history: &[Message], persona: PersonaKind) {
        match persona {
            PersonaKind::Default => {
                let line = self.pick_from(DEFAULT_RESPONSES);
                self.schedule(window, PRIMARY_REPLY_DELAY, line, Sender::System);
            }
            PersonaKind::Npc => {
                let line = self.pick_from(NPC_RESPONSES);
                self.schedule(window, PRIMARY_REPLY_DELAY, line, Sender::Npc);
            }
            PersonaKind::Void => {
                let line = void_echo(history);
                self.schedule(window, PRIMARY_REPLY_DELAY, line, Sender::Void);
            }
            PersonaKind::Group => {
                let first = self.pick_from(NPC_RESPONSES);
                let second = void_echo(history);
                self.schedule(window, PRIMARY_REPLY_DELAY, first, Sender::Npc);
                self.schedule(
                    window,
                    PRIMARY_REPLY_DELAY + GROUP_FOLLOWUP_DELAY,
                    second,
                    Sender::Void,
                );
            }
        }
    }

    /// Drains due deliveries in schedule order. Within one window the
    /// insertion order is preserved, which keeps the npc-before-void
    /// guarantee even when both are overdue at once.
    fn poll(&mut self, now: Instant) -> Vec<ReplyEvent> {
        let mut events = Vec::new();
        let mut remaining = Vec::with_capacity(self.pending.len());
        for reply in self.pending.drain(..) {
            if reply.due <= now {
                events.push(ReplyEvent::Append {
                    window: reply.window,
                    content: reply.content,
                    sender: reply.sender,
                });
            } else {
                remaining.push(reply);
            }
        }
        self.pending = remaining;
        events
    }

    fn cancel(&mut self, window: WindowId) {
        self.pending.retain(|reply| reply.window != window);
    }
}
