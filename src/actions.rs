use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    OpenHelp,
    CloseHelp,
    // Focus navigation across open windows
    FocusNext,
    FocusPrev,
    // Fullscreen mode
    FullscreenToggle,
    CycleFullscreenNext,
    CycleFullscreenPrev,
    // Window lifecycle
    MinimizeWindow,
    CloseWindow,
    OpenDefault,
    OpenNpc,
    OpenVoid,
    OpenGroup,
    // Transcript
    ExportTranscript,
    CopyTranscript,
    // Confirm dialog navigation/actions
    ConfirmToggle,
    ConfirmLeft,
    ConfirmRight,
    ConfirmAccept,
    ConfirmCancel,
    // Scrolling
    ScrollPageUp,
    ScrollPageDown,
    ScrollHome,
    ScrollEnd,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Quit => "Quit",
            Action::OpenHelp => "Open help",
            Action::CloseHelp => "Close help",
            Action::FocusNext => "Focus next window (Tab)",
            Action::FocusPrev => "Focus previous window (BackTab)",
            Action::FullscreenToggle => "Toggle fullscreen",
            Action::CycleFullscreenNext => "Fullscreen: next window",
            Action::CycleFullscreenPrev => "Fullscreen: previous window",
            Action::MinimizeWindow => "Minimize to toolbar",
            Action::CloseWindow => "Close window (confirm)",
            Action::OpenDefault => "Open terminal window",
            Action::OpenNpc => "Open npc window",
            Action::OpenVoid => "Open void window",
            Action::OpenGroup => "Open group chat",
            Action::ExportTranscript => "Export transcript to file",
            Action::CopyTranscript => "Copy transcript to clipboard",
            Action::ConfirmToggle => "Confirm toggle (Tab)",
            Action::ConfirmLeft => "Confirm left",
            Action::ConfirmRight => "Confirm right",
            Action::ConfirmAccept => "Confirm accept",
            Action::ConfirmCancel => "Confirm cancel",
            Action::ScrollPageUp => "Scroll page up",
            Action::ScrollPageDown => "Scroll page down",
            Action::ScrollHome => "Scroll to top",
            Action::ScrollEnd => "Scroll to end",
        };
        write!(f, "{}", s)
    }
}
