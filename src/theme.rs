use indoc::indoc;
use ratatui::style::Color;

use crate::chat::Sender;
use crate::window::WindowId;

/// Which canned-response table (and reply voice) a window speaks with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonaKind {
    Default,
    Npc,
    Void,
    Group,
}

impl PersonaKind {
    /// The sender tag a single-voiced reply from this persona carries. The
    /// group persona leads with the npc voice; its second voice is handled
    /// by the generator itself.
    pub fn reply_sender(self) -> Sender {
        match self {
            PersonaKind::Default => Sender::System,
            PersonaKind::Npc => Sender::Npc,
            PersonaKind::Void => Sender::Void,
            PersonaKind::Group => Sender::Npc,
        }
    }
}

/// Opaque per-window display bundle: title, sender labels, welcome copy,
/// accent color, and the boot banner. The lifecycle core only reads the
/// labels and the persona tag; everything else is presentation.
#[derive(Debug)]
pub struct WindowTheme {
    pub slug: &'static str,
    pub title: &'static str,
    pub persona: PersonaKind,
    pub persona_label: &'static str,
    pub user_label: &'static str,
    pub welcome: &'static str,
    pub accent: Color,
    pub banner: &'static str,
}

static DEFAULT_THEME: WindowTheme = WindowTheme {
    slug: "default",
    title: "terminal",
    persona: PersonaKind::Default,
    persona_label: "SYSTEM",
    user_label: "user",
    welcome: "SYSTEM TERMINAL v0.3 -- channel open. Type to begin.",
    accent: Color::Green,
    banner: indoc!(
        r#"
         _____ _____ ____  __  __
        |_   _| ____|  _ \|  \/  |
          | | |  _| | |_) | |\/| |
          | | | |___|  _ <| |  | |
          |_| |_____|_| \_\_|  |_|
        "#
    ),
};

static NPC_THEME: WindowTheme = WindowTheme {
    slug: "npc",
    title: "npc",
    persona: PersonaKind::Npc,
    persona_label: "NPC",
    user_label: "traveler",
    welcome: "A weathered innkeeper looks up from the counter. \"Welcome, traveler.\"",
    accent: Color::Yellow,
    banner: indoc!(
        r#"
         _   _ ____   ____
        | \ | |  _ \ / ___|
        |  \| | |_) | |
        | |\  |  __/| |___
        |_| \_|_|    \____|
        "#
    ),
};

static VOID_THEME: WindowTheme = WindowTheme {
    slug: "void",
    title: "void",
    persona: PersonaKind::Void,
    persona_label: "VOID",
    user_label: "voice",
    welcome: "...you have reached the void. it listens...",
    accent: Color::Magenta,
    banner: indoc!(
        r#"
        __     _____ ___ ____
        \ \   / / _ \_ _|  _ \
         \ \ / / | | | || | | |
          \ V /| |_| | || |_| |
           \_/  \___/___|____/
        "#
    ),
};

static GROUP_THEME: WindowTheme = WindowTheme {
    slug: "group",
    title: "group chat",
    persona: PersonaKind::Group,
    persona_label: "RELAY",
    user_label: "you",
    welcome: "Group relay established. npc and void are listening.",
    accent: Color::Cyan,
    banner: indoc!(
        r#"
          ____ ____   ___  _   _ ____
         / ___|  _ \ / _ \| | | |  _ \
        | |  _| |_) | | | | | | | |_) |
        | |_| |  _ <| |_| | |_| |  __/
         \____|_| \_\\___/ \___/|_|
        "#
    ),
};

pub fn window_theme(id: WindowId) -> &'static WindowTheme {
    match id {
        WindowId::Default => &DEFAULT_THEME,
        WindowId::Npc => &NPC_THEME,
        WindowId::Void => &VOID_THEME,
        WindowId::Group => &GROUP_THEME,
    }
}

/// Label shown in front of a message, resolved against the window's theme
/// so the same sender tag can read differently per window.
pub fn sender_label(window: WindowId, sender: Sender) -> &'static str {
    let theme = window_theme(window);
    match sender {
        Sender::User => theme.user_label,
        Sender::System => DEFAULT_THEME.persona_label,
        Sender::Npc => NPC_THEME.persona_label,
        Sender::Void => VOID_THEME.persona_label,
    }
}

pub fn sender_color(sender: Sender) -> Color {
    match sender {
        Sender::User => Color::White,
        Sender::System => Color::Green,
        Sender::Npc => Color::Yellow,
        Sender::Void => Color::Magenta,
    }
}

// Window chrome
pub fn chrome_header_bg() -> Color {
    Color::Blue
}
pub fn chrome_header_fg() -> Color {
    Color::White
}
pub fn chrome_header_inactive_bg() -> Color {
    Color::DarkGray
}
pub fn chrome_border() -> Color {
    Color::DarkGray
}
pub fn chrome_border_focused() -> Color {
    Color::Gray
}

// Toolbar tray
pub fn toolbar_bg() -> Color {
    Color::DarkGray
}
pub fn toolbar_fg() -> Color {
    Color::White
}
pub fn toolbar_chip_bg() -> Color {
    Color::Gray
}
pub fn toolbar_chip_fg() -> Color {
    Color::Black
}

// Dialog / confirm
pub fn dialog_bg() -> Color {
    Color::Black
}
pub fn dialog_fg() -> Color {
    Color::White
}
pub fn dialog_separator() -> Color {
    Color::DarkGray
}

// Input line
pub fn input_fg() -> Color {
    Color::White
}
pub fn input_prompt_fg() -> Color {
    Color::DarkGray
}
