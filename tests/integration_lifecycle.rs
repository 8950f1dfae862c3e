use chat_desk::chat::Message;
use chat_desk::theme;
use chat_desk::window::{CycleDirection, WindowId, WindowLifecycleManager};

fn manager() -> WindowLifecycleManager {
    WindowLifecycleManager::new(|id| theme::window_theme(id).welcome.to_string())
}

#[test]
fn restore_fidelity_holds_for_every_window() {
    for id in WindowId::ALL {
        let mut mgr = manager();
        mgr.open(id);
        mgr.append_message(id, Message::user("one"));
        mgr.append_message(id, Message::user("two"));
        let snapshot = mgr.record(id).messages().to_vec();
        mgr.save_state(id, snapshot.clone(), 17);

        mgr.minimize_to_toolbar(id);
        mgr.open(id);

        assert_eq!(mgr.record(id).messages(), &snapshot[..]);
        assert_eq!(mgr.record(id).scroll_offset(), 17);
    }
}

#[test]
fn destructive_close_always_resets_to_the_seed() {
    for history_len in [0usize, 1, 50] {
        let mut mgr = manager();
        mgr.open(WindowId::Npc);
        for i in 0..history_len {
            mgr.append_message(WindowId::Npc, Message::user(format!("m{i}")));
        }
        mgr.save_state(
            WindowId::Npc,
            mgr.record(WindowId::Npc).messages().to_vec(),
            99,
        );
        mgr.request_close(WindowId::Npc);
        mgr.confirm_close();

        let record = mgr.record(WindowId::Npc);
        assert_eq!(record.messages().len(), 1);
        assert_eq!(
            record.messages()[0].content,
            theme::window_theme(WindowId::Npc).welcome
        );
        assert_eq!(record.scroll_offset(), 0);
    }
}

#[test]
fn at_most_one_window_is_fullscreen() {
    let mut mgr = manager();
    for id in WindowId::ALL {
        mgr.open(id);
    }
    mgr.set_fullscreen(WindowId::Default, true);
    mgr.set_fullscreen(WindowId::Group, true);
    assert_eq!(mgr.fullscreen(), Some(WindowId::Group));

    // stale exit for a window that no longer owns fullscreen is ignored
    mgr.set_fullscreen(WindowId::Default, false);
    assert_eq!(mgr.fullscreen(), Some(WindowId::Group));
}

#[test]
fn cycle_never_selects_a_non_open_window() {
    let mut mgr = manager();
    for id in WindowId::ALL {
        mgr.open(id);
    }
    mgr.minimize_to_toolbar(WindowId::Npc);
    mgr.request_close(WindowId::Void);
    mgr.confirm_close();
    mgr.set_fullscreen(WindowId::Default, true);

    for _ in 0..8 {
        let next = mgr.cycle_fullscreen(CycleDirection::Next).unwrap();
        assert!(mgr.record(next).is_open());
        assert_ne!(next, WindowId::Npc);
        assert_ne!(next, WindowId::Void);
    }
}

#[test]
fn cycle_next_then_prev_returns_to_the_start() {
    let mut mgr = manager();
    mgr.open(WindowId::Default);
    mgr.open(WindowId::Void);
    mgr.open(WindowId::Group);
    mgr.set_fullscreen(WindowId::Void, true);

    mgr.cycle_fullscreen(CycleDirection::Next);
    mgr.cycle_fullscreen(CycleDirection::Prev);
    assert_eq!(mgr.fullscreen(), Some(WindowId::Void));
}

#[test]
fn focus_hands_out_strictly_increasing_z() {
    let mut mgr = manager();
    mgr.open(WindowId::Default);
    mgr.open(WindowId::Group);
    let mut seen = Vec::new();
    for _ in 0..20 {
        mgr.focus(WindowId::Default);
        seen.push(mgr.record(WindowId::Default).z_index());
        mgr.focus(WindowId::Group);
        seen.push(mgr.record(WindowId::Group).z_index());
    }
    for pair in seen.windows(2) {
        assert!(pair[1] > pair[0]);
    }
}

#[test]
fn save_state_is_idempotent_for_identical_snapshots() {
    let mut mgr = manager();
    mgr.open(WindowId::Default);
    mgr.append_message(WindowId::Default, Message::user("hi"));
    let snapshot = mgr.record(WindowId::Default).messages().to_vec();

    assert!(mgr.save_state(WindowId::Default, snapshot.clone(), 3));
    assert!(!mgr.save_state(WindowId::Default, snapshot.clone(), 3));
    assert!(!mgr.save_state(WindowId::Default, snapshot, 3));
}

#[test]
fn toolbar_hides_under_fullscreen_even_with_minimized_windows() {
    let mut mgr = manager();
    mgr.open(WindowId::Default);
    mgr.open(WindowId::Npc);
    mgr.minimize_to_toolbar(WindowId::Default);
    assert!(mgr.toolbar_visible());

    mgr.set_fullscreen(WindowId::Npc, true);
    assert!(!mgr.toolbar_visible());

    mgr.set_fullscreen(WindowId::Npc, false);
    assert!(mgr.toolbar_visible());
}

#[test]
fn draw_order_follows_focus_history() {
    let mut mgr = manager();
    mgr.open(WindowId::Default);
    mgr.open(WindowId::Npc);
    mgr.open(WindowId::Group);
    mgr.focus(WindowId::Default);
    assert_eq!(mgr.topmost(), Some(WindowId::Default));
    assert_eq!(
        mgr.draw_order().last().copied(),
        Some(WindowId::Default)
    );
    mgr.focus(WindowId::Npc);
    assert_eq!(mgr.topmost(), Some(WindowId::Npc));
}
