//! Derives toolbar affordances from the viewer state. Pure; no side effects.

use crate::state::{ActionKind, ActionState, ViewerState};
use std::fmt;

pub const BUSY_LABEL: &str = "Processing...";
pub const SUCCESS_GLYPH: &str = "✓";
pub const ERROR_GLYPH: &str = "!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlId {
    Download,
    OpenPreview,
    Print,
    Fullscreen,
    Share,
}

impl ControlId {
    fn action(self) -> Option<ActionKind> {
        match self {
            ControlId::Download => Some(ActionKind::Download),
            ControlId::OpenPreview => Some(ActionKind::OpenPreview),
            ControlId::Print => Some(ActionKind::Print),
            ControlId::Share => Some(ActionKind::Share),
            ControlId::Fullscreen => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Indicator {
    None,
    Busy,
    Success,
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    pub id: ControlId,
    pub label: String,
    pub enabled: bool,
    pub indicator: Indicator,
}

impl Control {
    pub fn glyph(&self) -> Option<&'static str> {
        match self.indicator {
            Indicator::Success => Some(SUCCESS_GLYPH),
            Indicator::Error(_) => Some(ERROR_GLYPH),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarView {
    pub controls: Vec<Control>,
    /// Message for the error indicator, if the last action failed.
    pub error: Option<String>,
}

impl ToolbarView {
    pub fn reflect(state: &ViewerState) -> Self {
        let running = state.action.running_kind();
        let enabled = running.is_none();

        let indicator_for = |id: ControlId| -> Indicator {
            let Some(kind) = id.action() else {
                return Indicator::None;
            };
            match &state.action {
                ActionState::Running(k) if *k == kind => Indicator::Busy,
                ActionState::Succeeded(k) if *k == kind => Indicator::Success,
                ActionState::Failed(k, message) if *k == kind => Indicator::Error(message.clone()),
                _ if kind == ActionKind::Share && state.copied => Indicator::Success,
                _ => Indicator::None,
            }
        };

        let label_for = |id: ControlId, indicator: &Indicator| -> String {
            if *indicator == Indicator::Busy {
                return BUSY_LABEL.to_string();
            }
            let label = match id {
                ControlId::Download => "Download PDF",
                ControlId::OpenPreview => "Open PDF",
                ControlId::Print => "Print",
                ControlId::Fullscreen if state.fullscreen => "Exit Fullscreen",
                ControlId::Fullscreen => "Fullscreen",
                ControlId::Share if state.copied => "Copied!",
                ControlId::Share => "Share",
            };
            label.to_string()
        };

        let controls = [
            ControlId::Download,
            ControlId::OpenPreview,
            ControlId::Print,
            ControlId::Fullscreen,
            ControlId::Share,
        ]
        .into_iter()
        .map(|id| {
            let indicator = indicator_for(id);
            Control {
                id,
                label: label_for(id, &indicator),
                enabled,
                indicator,
            }
        })
        .collect();

        let error = match &state.action {
            ActionState::Failed(_, message) => Some(message.clone()),
            _ => None,
        };

        Self { controls, error }
    }

    pub fn control(&self, id: ControlId) -> Option<&Control> {
        self.controls.iter().find(|c| c.id == id)
    }
}

impl fmt::Display for ToolbarView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, control) in self.controls.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            let open = if control.enabled { "[" } else { "(" };
            let close = if control.enabled { "]" } else { ")" };
            write!(f, "{}{}", open, control.label)?;
            if let Some(glyph) = control.glyph() {
                write!(f, " {}", glyph)?;
            }
            f.write_str(close)?;
        }
        if let Some(error) = &self.error {
            write!(f, "\n{} {}", ERROR_GLYPH, error)?;
        }
        Ok(())
    }
}
