use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Download,
    OpenPreview,
    Print,
    Share,
}

impl ActionKind {
    /// User-facing message for a failed action.
    pub fn failure_message(self, reason: &dyn fmt::Display) -> String {
        match self {
            ActionKind::Download => format!("There was an error generating your PDF: {}", reason),
            ActionKind::OpenPreview => format!("There was an error opening your PDF: {}", reason),
            ActionKind::Print => format!("Failed to print: {}", reason),
            ActionKind::Share => format!("Failed to share: {}", reason),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionKind::Download => "download",
            ActionKind::OpenPreview => "open preview",
            ActionKind::Print => "print",
            ActionKind::Share => "share",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ActionState {
    #[default]
    Idle,
    Running(ActionKind),
    Succeeded(ActionKind),
    Failed(ActionKind, String),
}

impl ActionState {
    pub fn is_running(&self) -> bool {
        matches!(self, ActionState::Running(_))
    }

    pub fn running_kind(&self) -> Option<ActionKind> {
        match self {
            ActionState::Running(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Succeeded or failed; waiting to fall back to idle.
    pub fn is_settled(&self) -> bool {
        matches!(self, ActionState::Succeeded(_) | ActionState::Failed(..))
    }
}

/// Everything the toolbar needs to know, published as one value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewerState {
    pub action: ActionState,
    /// The page address was copied to the clipboard recently.
    pub copied: bool,
    pub fullscreen: bool,
}
