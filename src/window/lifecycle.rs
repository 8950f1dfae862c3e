use std::collections::BTreeMap;

use crate::chat::Message;

use super::{
    CycleDirection, FullscreenArbiter, StackOrderAllocator, WindowId, WindowRecord, WindowState,
};

/// Copy shown by the destructive-close dialog.
pub const CLOSE_CONFIRM_TITLE: &str = "Close terminal";
pub const CLOSE_CONFIRM_BODY: &str =
    "This will permanently close the terminal and destroy all context.\n\
     This action cannot be undone.";

/// A pending destructive-close request. Created by `request_close`, consumed
/// by `confirm_close`/`cancel_close`; at most one exists at a time and a new
/// request overwrites the previous one (the UI shows a single dialog).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationRequest {
    pub target: WindowId,
    pub title: String,
    pub message: String,
}

/// The central orchestrator for all windows.
///
/// Owns the `WindowId → WindowRecord` map (one fixed entry per id, never
/// added to or removed from), the z-index allocator, the fullscreen arbiter,
/// and the close-confirmation gate. Every cross-window invariant is enforced
/// here: at most one fullscreen window, fullscreen cleared when its owner is
/// minimized or destroyed, toolbar visibility, and the seed-message reset on
/// destructive close.
///
/// All operations are synchronous in-memory transitions; invalid targets are
/// unrepresentable (the id is an enum) and operations that are meaningless in
/// the current state are silent no-ops, since they correspond to normal UI
/// races such as a click landing after the state already changed.
#[derive(Debug)]
pub struct WindowLifecycleManager {
    records: BTreeMap<WindowId, WindowRecord>,
    allocator: StackOrderAllocator,
    fullscreen: FullscreenArbiter,
    pending_close: Option<ConfirmationRequest>,
}

impl WindowLifecycleManager {
    /// Builds the fixed record set, seeding every window with its welcome
    /// message. `seed_for` supplies the per-window welcome copy.
    pub fn new<F>(seed_for: F) -> Self
    where
        F: Fn(WindowId) -> String,
    {
        let records = WindowId::ALL
            .iter()
            .map(|&id| (id, WindowRecord::new(seed_for(id))))
            .collect();
        Self {
            records,
            allocator: StackOrderAllocator::new(),
            fullscreen: FullscreenArbiter::new(),
            pending_close: None,
        }
    }

    pub fn record(&self, id: WindowId) -> &WindowRecord {
        &self.records[&id]
    }

    fn record_mut(&mut self, id: WindowId) -> &mut WindowRecord {
        self.records
            .get_mut(&id)
            .expect("record set is fixed at construction")
    }

    /// Opens a window. From `Minimized` this is a restore that preserves the
    /// message log and scroll offset untouched; from `Closed` it is a fresh
    /// open that stamps `created_at` and leaves the seeded welcome message in
    /// place. Re-opening an already open window only re-focuses it.
    pub fn open(&mut self, id: WindowId) {
        let record = self.record_mut(id);
        match record.state() {
            WindowState::Open => {}
            WindowState::Minimized => {
                record.set_state(WindowState::Open);
                tracing::debug!(window_id = ?id, "restored window from toolbar");
            }
            WindowState::Closed => {
                record.set_state(WindowState::Open);
                record.stamp_created();
                tracing::debug!(window_id = ?id, "opened window");
            }
        }
        self.focus(id);
    }

    /// Collapses an open window to a toolbar chip. Content is preserved; the
    /// caller persists the latest message/scroll snapshot through
    /// [`Self::save_state`] as part of the same interaction. Clears
    /// fullscreen when `id` owns it.
    pub fn minimize_to_toolbar(&mut self, id: WindowId) {
        let record = self.record_mut(id);
        if record.state() != WindowState::Open {
            return;
        }
        record.set_state(WindowState::Minimized);
        self.fullscreen.exit(id);
        tracing::debug!(window_id = ?id, "minimized window to toolbar");
    }

    /// Raises the destructive-close confirmation without mutating the
    /// window. A newer request replaces any pending one.
    pub fn request_close(&mut self, id: WindowId) {
        self.pending_close = Some(ConfirmationRequest {
            target: id,
            title: CLOSE_CONFIRM_TITLE.to_string(),
            message: CLOSE_CONFIRM_BODY.to_string(),
        });
    }

    pub fn pending_close(&self) -> Option<&ConfirmationRequest> {
        self.pending_close.as_ref()
    }

    /// Destroys the pending request's target: all history is dropped and the
    /// record resets to the single seeded welcome message with scroll zero.
    /// Returns the destroyed id so the caller can tear down collaborators
    /// (e.g. cancel scheduled replies). No-op without a pending request.
    pub fn confirm_close(&mut self) -> Option<WindowId> {
        let request = self.pending_close.take()?;
        let target = request.target;
        self.record_mut(target).reset();
        self.fullscreen.exit(target);
        tracing::debug!(window_id = ?target, "closed window and destroyed context");
        Some(target)
    }

    /// Dismisses the pending request without touching any record.
    pub fn cancel_close(&mut self) {
        self.pending_close = None;
    }

    /// Brings a window to the top of the stack. Meaningless for windows that
    /// are not open, so those are ignored.
    pub fn focus(&mut self, id: WindowId) {
        if !self.record(id).is_open() {
            return;
        }
        let z = self.allocator.next();
        self.record_mut(id).set_z_index(z);
    }

    /// Replaces a window's message log and scroll offset. Skips the mutation
    /// entirely when both are unchanged, so sessions that save on a timer or
    /// on unmount do not churn state (and the caller can skip a re-render).
    /// Message identity is judged by length plus trailing id, which is exact
    /// under append-only mutation. Returns whether anything changed.
    pub fn save_state(&mut self, id: WindowId, messages: Vec<Message>, scroll_offset: usize) -> bool {
        let record = self.record_mut(id);
        let same_messages = record.messages().len() == messages.len()
            && record.messages().last().map(|m| m.id.as_str())
                == messages.last().map(|m| m.id.as_str());
        if same_messages && record.scroll_offset() == scroll_offset {
            return false;
        }
        record.replace_messages(messages);
        record.set_scroll_offset(scroll_offset);
        true
    }

    /// Persists only the scroll offset, with the same skip-if-unchanged
    /// contract as [`Self::save_state`].
    pub fn save_scroll(&mut self, id: WindowId, scroll_offset: usize) -> bool {
        let record = self.record_mut(id);
        if record.scroll_offset() == scroll_offset {
            return false;
        }
        record.set_scroll_offset(scroll_offset);
        true
    }

    /// Enters or leaves fullscreen for `id`. Entering requires the window to
    /// be open and also focuses it; leaving is guarded against stale exits
    /// by the arbiter.
    pub fn set_fullscreen(&mut self, id: WindowId, fullscreen: bool) {
        if fullscreen {
            if !self.record(id).is_open() {
                return;
            }
            self.fullscreen.enter(id);
            self.focus(id);
        } else {
            self.fullscreen.exit(id);
        }
    }

    pub fn fullscreen(&self) -> Option<WindowId> {
        self.fullscreen.active()
    }

    /// Moves fullscreen to the neighboring open window, recomputing
    /// eligibility from the live open set, and focuses the new owner.
    pub fn cycle_fullscreen(&mut self, direction: CycleDirection) -> Option<WindowId> {
        let eligible = self.open_windows();
        let next = self.fullscreen.cycle(direction, &eligible)?;
        self.focus(next);
        Some(next)
    }

    /// Open windows in declaration order.
    pub fn open_windows(&self) -> Vec<WindowId> {
        WindowId::ALL
            .iter()
            .copied()
            .filter(|id| self.record(*id).is_open())
            .collect()
    }

    /// Minimized windows in declaration order, for the toolbar chip list.
    pub fn minimized_windows(&self) -> Vec<WindowId> {
        WindowId::ALL
            .iter()
            .copied()
            .filter(|id| self.record(*id).is_minimized())
            .collect()
    }

    /// Open windows sorted bottom-to-top by z-index: the paint order.
    pub fn draw_order(&self) -> Vec<WindowId> {
        let mut order = self.open_windows();
        order.sort_by_key(|id| self.record(*id).z_index());
        order
    }

    /// Topmost open window, if any.
    pub fn topmost(&self) -> Option<WindowId> {
        self.draw_order().pop()
    }

    /// The toolbar tray renders iff no window is fullscreen and at least one
    /// window is minimized.
    pub fn toolbar_visible(&self) -> bool {
        self.fullscreen.active().is_none()
            && WindowId::ALL
                .iter()
                .any(|id| self.record(*id).is_minimized())
    }

    /// Appends a message to a window's log. Deliveries to a closed window are
    /// dropped: a destructive close already cancelled its scheduled replies,
    /// and a closed record must hold exactly its seed message.
    pub fn append_message(&mut self, id: WindowId, message: Message) -> bool {
        let record = self.record_mut(id);
        if record.is_closed() {
            tracing::debug!(window_id = ?id, "dropping message for closed window");
            return false;
        }
        record.messages_mut().push(message);
        true
    }

    /// Extends the trailing message in place (streaming token deliveries).
    pub fn extend_last_message(&mut self, id: WindowId, chunk: &str) -> bool {
        let record = self.record_mut(id);
        if record.is_closed() {
            return false;
        }
        match record.messages_mut().last_mut() {
            Some(last) => {
                last.content.push_str(chunk);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Sender;

    fn manager() -> WindowLifecycleManager {
        WindowLifecycleManager::new(|id| format!("welcome to {id:?}"))
    }

    #[test]
    fn fresh_open_stamps_created_and_keeps_seed() {
        let mut mgr = manager();
        assert!(mgr.record(WindowId::Default).created_at().is_none());
        mgr.open(WindowId::Default);
        let record = mgr.record(WindowId::Default);
        assert!(record.is_open());
        assert!(record.created_at().is_some());
        assert_eq!(record.messages().len(), 1);
        assert_eq!(record.messages()[0].sender, Sender::System);
    }

    #[test]
    fn minimize_then_open_restores_messages_and_scroll() {
        let mut mgr = manager();
        mgr.open(WindowId::Npc);
        mgr.append_message(WindowId::Npc, Message::user("hello"));
        mgr.save_scroll(WindowId::Npc, 42);
        let before = mgr.record(WindowId::Npc).messages().to_vec();

        mgr.minimize_to_toolbar(WindowId::Npc);
        assert!(mgr.record(WindowId::Npc).is_minimized());
        mgr.open(WindowId::Npc);

        let record = mgr.record(WindowId::Npc);
        assert_eq!(record.messages(), &before[..]);
        assert_eq!(record.scroll_offset(), 42);
        // restore must not restamp creation
        let created = record.created_at();
        mgr.minimize_to_toolbar(WindowId::Npc);
        mgr.open(WindowId::Npc);
        assert_eq!(mgr.record(WindowId::Npc).created_at(), created);
    }

    #[test]
    fn confirm_close_resets_to_seed_regardless_of_history() {
        let mut mgr = manager();
        mgr.open(WindowId::Void);
        for i in 0..25 {
            mgr.append_message(WindowId::Void, Message::user(format!("msg {i}")));
        }
        mgr.save_scroll(WindowId::Void, 300);

        mgr.request_close(WindowId::Void);
        assert_eq!(mgr.confirm_close(), Some(WindowId::Void));

        let record = mgr.record(WindowId::Void);
        assert!(record.is_closed());
        assert_eq!(record.messages().len(), 1);
        assert_eq!(record.messages()[0].content, "welcome to Void");
        assert_eq!(record.scroll_offset(), 0);
        assert!(mgr.pending_close().is_none());
    }

    #[test]
    fn cancel_close_leaves_record_untouched() {
        let mut mgr = manager();
        mgr.open(WindowId::Npc);
        mgr.append_message(WindowId::Npc, Message::user("keep me"));
        let before = mgr.record(WindowId::Npc).messages().to_vec();

        mgr.request_close(WindowId::Npc);
        mgr.cancel_close();

        assert!(mgr.pending_close().is_none());
        assert_eq!(mgr.record(WindowId::Npc).messages(), &before[..]);
        assert!(mgr.confirm_close().is_none());
    }

    #[test]
    fn newer_close_request_overwrites_pending_one() {
        let mut mgr = manager();
        mgr.open(WindowId::Default);
        mgr.open(WindowId::Npc);
        mgr.request_close(WindowId::Default);
        mgr.request_close(WindowId::Npc);
        assert_eq!(mgr.pending_close().map(|r| r.target), Some(WindowId::Npc));
        assert_eq!(mgr.confirm_close(), Some(WindowId::Npc));
        assert!(mgr.record(WindowId::Default).is_open());
    }

    #[test]
    fn focus_is_strictly_monotonic() {
        let mut mgr = manager();
        mgr.open(WindowId::Default);
        mgr.open(WindowId::Npc);
        let mut last = 0;
        for _ in 0..10 {
            mgr.focus(WindowId::Default);
            let z = mgr.record(WindowId::Default).z_index();
            assert!(z > last);
            last = z;
            mgr.focus(WindowId::Npc);
            assert!(mgr.record(WindowId::Npc).z_index() > last);
            last = mgr.record(WindowId::Npc).z_index();
        }
    }

    #[test]
    fn focus_ignores_windows_that_are_not_open() {
        let mut mgr = manager();
        let before = mgr.record(WindowId::Group).z_index();
        mgr.focus(WindowId::Group);
        assert_eq!(mgr.record(WindowId::Group).z_index(), before);
    }

    #[test]
    fn save_state_skips_identical_snapshot() {
        let mut mgr = manager();
        mgr.open(WindowId::Default);
        mgr.append_message(WindowId::Default, Message::user("one"));
        let snapshot = mgr.record(WindowId::Default).messages().to_vec();
        let scroll = mgr.record(WindowId::Default).scroll_offset();

        assert!(!mgr.save_state(WindowId::Default, snapshot.clone(), scroll));
        assert!(mgr.save_state(WindowId::Default, snapshot.clone(), scroll + 5));
        assert!(!mgr.save_state(WindowId::Default, snapshot, scroll + 5));
    }

    #[test]
    fn minimize_clears_owned_fullscreen() {
        let mut mgr = manager();
        mgr.open(WindowId::Default);
        mgr.open(WindowId::Npc);
        mgr.set_fullscreen(WindowId::Npc, true);
        assert_eq!(mgr.fullscreen(), Some(WindowId::Npc));

        mgr.minimize_to_toolbar(WindowId::Default);
        assert_eq!(mgr.fullscreen(), Some(WindowId::Npc));
        mgr.minimize_to_toolbar(WindowId::Npc);
        assert_eq!(mgr.fullscreen(), None);
    }

    #[test]
    fn toolbar_visibility_rule() {
        let mut mgr = manager();
        mgr.open(WindowId::Default);
        mgr.open(WindowId::Npc);
        assert!(!mgr.toolbar_visible());

        mgr.minimize_to_toolbar(WindowId::Default);
        assert!(mgr.toolbar_visible());

        // fullscreen hides the tray even while a minimized window exists
        mgr.set_fullscreen(WindowId::Npc, true);
        assert!(!mgr.toolbar_visible());
        mgr.set_fullscreen(WindowId::Npc, false);
        assert!(mgr.toolbar_visible());
    }

    #[test]
    fn cycle_skips_non_open_windows() {
        let mut mgr = manager();
        mgr.open(WindowId::Default);
        mgr.open(WindowId::Npc);
        mgr.open(WindowId::Group);
        mgr.minimize_to_toolbar(WindowId::Npc);
        mgr.set_fullscreen(WindowId::Default, true);

        assert_eq!(
            mgr.cycle_fullscreen(CycleDirection::Next),
            Some(WindowId::Group)
        );
        assert_eq!(
            mgr.cycle_fullscreen(CycleDirection::Next),
            Some(WindowId::Default)
        );
        assert_eq!(
            mgr.cycle_fullscreen(CycleDirection::Prev),
            Some(WindowId::Group)
        );
    }

    #[test]
    fn appends_to_closed_windows_are_dropped() {
        let mut mgr = manager();
        assert!(!mgr.append_message(WindowId::Void, Message::user("late")));
        assert_eq!(mgr.record(WindowId::Void).messages().len(), 1);
    }
}
