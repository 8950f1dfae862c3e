use std::collections::HashMap;
use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub use crate::actions::Action;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyCombo {
    pub fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    pub fn matches(&self, key: &KeyEvent) -> bool {
        key.code == self.code && key.modifiers == self.mods
    }

    pub fn display(&self) -> String {
        let mut parts = Vec::new();
        if self.mods.contains(KeyModifiers::CONTROL) {
            parts.push("Ctrl".to_string());
        }
        if self.mods.contains(KeyModifiers::SHIFT) {
            parts.push("Shift".to_string());
        }
        if self.mods.contains(KeyModifiers::ALT) {
            parts.push("Alt".to_string());
        }
        let code = match self.code {
            KeyCode::Char(c) => c.to_ascii_uppercase().to_string(),
            KeyCode::Esc => "Esc".to_string(),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::BackTab => "BackTab".to_string(),
            KeyCode::Left => "Left".to_string(),
            KeyCode::Right => "Right".to_string(),
            KeyCode::Home => "Home".to_string(),
            KeyCode::End => "End".to_string(),
            KeyCode::PageUp => "PageUp".to_string(),
            KeyCode::PageDown => "PageDown".to_string(),
            KeyCode::F(n) => format!("F{}", n),
            _ => format!("{:?}", self.code),
        };
        parts.push(code);
        parts.join("+")
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[derive(Debug, Clone)]
pub struct KeyBindings {
    map: HashMap<Action, Vec<KeyCombo>>,
}

impl KeyBindings {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn add(&mut self, action: Action, combo: KeyCombo) {
        self.map.entry(action).or_default().push(combo);
    }

    pub fn matches(&self, action: Action, key: &KeyEvent) -> bool {
        self.map
            .get(&action)
            .is_some_and(|list| list.iter().any(|c| c.matches(key)))
    }

    pub fn first_combo(&self, action: Action) -> Option<&KeyCombo> {
        self.map.get(&action).and_then(|list| list.first())
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        use Action::*;
        let mut kb = Self::new();
        kb.add(Quit, KeyCombo::new(KeyCode::Char('q'), KeyModifiers::CONTROL));
        kb.add(OpenHelp, KeyCombo::new(KeyCode::F(1), KeyModifiers::NONE));
        kb.add(CloseHelp, KeyCombo::new(KeyCode::Esc, KeyModifiers::NONE));
        kb.add(CloseHelp, KeyCombo::new(KeyCode::F(1), KeyModifiers::NONE));
        // Focus navigation
        kb.add(FocusNext, KeyCombo::new(KeyCode::Tab, KeyModifiers::NONE));
        kb.add(
            FocusPrev,
            KeyCombo::new(KeyCode::BackTab, KeyModifiers::SHIFT),
        );
        kb.add(FocusPrev, KeyCombo::new(KeyCode::BackTab, KeyModifiers::NONE));
        // Fullscreen
        kb.add(
            FullscreenToggle,
            KeyCombo::new(KeyCode::Char('f'), KeyModifiers::CONTROL),
        );
        kb.add(
            CycleFullscreenNext,
            KeyCombo::new(KeyCode::Char('n'), KeyModifiers::CONTROL),
        );
        kb.add(
            CycleFullscreenPrev,
            KeyCombo::new(KeyCode::Char('p'), KeyModifiers::CONTROL),
        );
        // Lifecycle
        kb.add(
            MinimizeWindow,
            KeyCombo::new(KeyCode::Char('t'), KeyModifiers::CONTROL),
        );
        kb.add(
            CloseWindow,
            KeyCombo::new(KeyCode::Char('w'), KeyModifiers::CONTROL),
        );
        kb.add(OpenDefault, KeyCombo::new(KeyCode::F(2), KeyModifiers::NONE));
        kb.add(OpenNpc, KeyCombo::new(KeyCode::F(3), KeyModifiers::NONE));
        kb.add(OpenVoid, KeyCombo::new(KeyCode::F(4), KeyModifiers::NONE));
        kb.add(OpenGroup, KeyCombo::new(KeyCode::F(5), KeyModifiers::NONE));
        // Transcript
        kb.add(
            ExportTranscript,
            KeyCombo::new(KeyCode::Char('e'), KeyModifiers::CONTROL),
        );
        kb.add(
            CopyTranscript,
            KeyCombo::new(KeyCode::Char('y'), KeyModifiers::CONTROL),
        );
        // Confirm overlay
        kb.add(ConfirmToggle, KeyCombo::new(KeyCode::Tab, KeyModifiers::NONE));
        kb.add(
            ConfirmToggle,
            KeyCombo::new(KeyCode::BackTab, KeyModifiers::SHIFT),
        );
        kb.add(ConfirmLeft, KeyCombo::new(KeyCode::Left, KeyModifiers::NONE));
        kb.add(
            ConfirmRight,
            KeyCombo::new(KeyCode::Right, KeyModifiers::NONE),
        );
        kb.add(
            ConfirmAccept,
            KeyCombo::new(KeyCode::Enter, KeyModifiers::NONE),
        );
        kb.add(
            ConfirmAccept,
            KeyCombo::new(KeyCode::Char('y'), KeyModifiers::NONE),
        );
        kb.add(ConfirmCancel, KeyCombo::new(KeyCode::Esc, KeyModifiers::NONE));
        kb.add(
            ConfirmCancel,
            KeyCombo::new(KeyCode::Char('n'), KeyModifiers::NONE),
        );
        // Scrolling
        kb.add(
            ScrollPageUp,
            KeyCombo::new(KeyCode::PageUp, KeyModifiers::NONE),
        );
        kb.add(
            ScrollPageDown,
            KeyCombo::new(KeyCode::PageDown, KeyModifiers::NONE),
        );
        kb.add(ScrollHome, KeyCombo::new(KeyCode::Home, KeyModifiers::NONE));
        kb.add(ScrollEnd, KeyCombo::new(KeyCode::End, KeyModifiers::NONE));
        kb
    }
}
