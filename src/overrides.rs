//! The scoped presentation override applied to the export target while it
//! is rasterized.
//!
//! Activation injects a ruleset that neutralises theme colours and effects,
//! tags the root with the export-mode class and suspends the frame's
//! responsive width classes. Deactivation undoes exactly what activation
//! did, so the document compares equal to its pre-activation self.

use crate::error::ExportError;
use crate::target::ExportTarget;
use folio_document::{
    BreakInside, Display, Document, GridTemplate, Media, Rule, Ruleset, Selector, Style, Track,
};
use folio_types::{Color, ColorValue};
use log::{debug, warn};

pub const EXPORT_RULESET_ID: &str = "pdf-export-styles";
pub const EXPORT_MODE_CLASS: &str = "pdf-export-mode";
pub const ATOMIC_BLOCK_CLASS: &str = "pdf-no-break";
/// Frame classes that constrain and centre the viewer at screen widths.
pub const SUSPENDED_FRAME_CLASSES: [&str; 2] = ["max-w-[850px]", "mx-auto"];

/// Bookkeeping for one activation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideState {
    pub active: bool,
    ruleset_injected: bool,
    root_class_added: bool,
    /// Frame classes removed on activation, with their original positions.
    suspended: Vec<(usize, String)>,
}

impl OverrideState {
    pub fn suspended_classes(&self) -> impl Iterator<Item = &str> {
        self.suspended.iter().map(|(_, class)| class.as_str())
    }
}

fn descendant(selector_class: &str) -> Selector {
    Selector::DescendantClass {
        scope: EXPORT_MODE_CLASS.to_string(),
        class: selector_class.to_string(),
    }
}

fn rule(selector: Selector, declarations: Style) -> Rule {
    Rule {
        selector,
        declarations,
    }
}

fn background(color: ColorValue) -> Style {
    Style {
        background: Some(color),
        ..Default::default()
    }
}

/// The ruleset injected while exporting. Later rules win.
pub fn export_ruleset() -> Ruleset {
    let none = || Some("none".to_string());
    let white = ColorValue::WHITE;
    let text_secondary = Style {
        color: Some(ColorValue::Srgb(Color::gray(0x44))),
        ..Default::default()
    };

    let rules = vec![
        rule(
            Selector::Class(EXPORT_MODE_CLASS.to_string()),
            Style {
                background: Some(white),
                color: Some(ColorValue::BLACK),
                padding: Some(40.0),
                width: Some(794.0),
                max_width: Some(794.0),
                transform: none(),
                ..Default::default()
            },
        ),
        rule(
            Selector::AnyDescendant {
                scope: EXPORT_MODE_CLASS.to_string(),
            },
            Style {
                background: Some(ColorValue::Transparent),
                color: Some(ColorValue::BLACK),
                border_color: Some(ColorValue::Srgb(Color::gray(0xd4))),
                box_shadow: none(),
                text_shadow: none(),
                filter: none(),
                outline: none(),
                animation: none(),
                transition: none(),
                transform: none(),
                ..Default::default()
            },
        ),
        rule(
            Selector::DescendantTag {
                scope: EXPORT_MODE_CLASS.to_string(),
                tag: "section".to_string(),
            },
            background(white),
        ),
        rule(
            Selector::DescendantTag {
                scope: EXPORT_MODE_CLASS.to_string(),
                tag: "div".to_string(),
            },
            background(white),
        ),
        rule(descendant("bg-bg-secondary"), background(white)),
        rule(descendant("bg-bg-primary"), background(white)),
        rule(
            descendant("bg-border-subtle"),
            background(ColorValue::Srgb(Color::gray(0xe5))),
        ),
        rule(descendant("text-text-secondary"), text_secondary.clone()),
        rule(descendant("text-text-muted"), text_secondary),
        rule(
            descendant(ATOMIC_BLOCK_CLASS),
            Style {
                break_inside: Some(BreakInside::Avoid),
                ..Default::default()
            },
        ),
        rule(
            descendant("grid"),
            Style {
                display: Some(Display::Grid),
                grid_columns: Some(GridTemplate(vec![Track::Fr(1.0), Track::Px(240.0)])),
                gap: Some(28.0),
                ..Default::default()
            },
        ),
    ];

    Ruleset {
        id: EXPORT_RULESET_ID.to_string(),
        media: Media::All,
        important: true,
        rules,
    }
}

pub struct OverrideController;

impl OverrideController {
    /// Applies the export override. Returns `false` if it was already active.
    pub fn activate(target: &ExportTarget) -> Result<bool, ExportError> {
        target.with_parts(|document, state| {
            if state.active {
                debug!("Export override already active");
                return Ok(false);
            }
            if !document.mounted {
                return Err(ExportError::OverrideApply(
                    "the export target is not mounted".to_string(),
                ));
            }
            *state = apply(document);
            debug!(
                "Export override applied; suspended frame classes: {:?}",
                state.suspended_classes().collect::<Vec<_>>()
            );
            Ok(true)
        })
    }

    /// Removes the export override. Returns `false` if it was not active.
    pub fn deactivate(target: &ExportTarget) -> bool {
        target.with_parts(|document, state| {
            if !state.active {
                return false;
            }
            restore(document, state);
            *state = OverrideState::default();
            debug!("Export override removed");
            true
        })
    }

    /// Activates the override for the lifetime of the returned handle.
    pub fn acquire(target: &ExportTarget) -> Result<OverrideHandle<'_>, ExportError> {
        let owns = Self::activate(target)?;
        Ok(OverrideHandle {
            target,
            owns,
            released: false,
        })
    }
}

fn apply(document: &mut Document) -> OverrideState {
    let ruleset_injected = if document.has_ruleset(EXPORT_RULESET_ID) {
        warn!("Ruleset '{}' is already present; leaving it in place", EXPORT_RULESET_ID);
        false
    } else {
        document.rulesets.push(export_ruleset());
        true
    };

    let root_class_added = document.root.add_class(EXPORT_MODE_CLASS);

    let suspended: Vec<(usize, String)> = document
        .frame_classes
        .iter()
        .enumerate()
        .filter(|(_, class)| SUSPENDED_FRAME_CLASSES.contains(&class.as_str()))
        .map(|(index, class)| (index, class.clone()))
        .collect();
    document
        .frame_classes
        .retain(|class| !SUSPENDED_FRAME_CLASSES.contains(&class.as_str()));

    OverrideState {
        active: true,
        ruleset_injected,
        root_class_added,
        suspended,
    }
}

fn restore(document: &mut Document, state: &OverrideState) {
    if state.ruleset_injected {
        document.remove_ruleset(EXPORT_RULESET_ID);
    }
    if state.root_class_added {
        document.root.remove_class(EXPORT_MODE_CLASS);
    }
    for (index, class) in &state.suspended {
        let at = (*index).min(document.frame_classes.len());
        document.frame_classes.insert(at, class.clone());
    }
}

/// Keeps the export override applied until released or dropped.
///
/// Dropping without [`OverrideHandle::release`] still deactivates, which
/// covers early returns and unwinding.
#[must_use = "the override is removed as soon as the handle is dropped"]
pub struct OverrideHandle<'a> {
    target: &'a ExportTarget,
    owns: bool,
    released: bool,
}

impl OverrideHandle<'_> {
    pub fn release(mut self) {
        self.deactivate();
    }

    fn deactivate(&mut self) {
        if self.owns && !self.released {
            OverrideController::deactivate(self.target);
        }
        self.released = true;
    }
}

impl Drop for OverrideHandle<'_> {
    fn drop(&mut self) {
        if self.owns && !self.released {
            warn!("Export override released without an explicit release");
        }
        self.deactivate();
    }
}
