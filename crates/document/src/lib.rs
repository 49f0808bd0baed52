//! The document model exported by folio.
//!
//! A [`Document`] is the export target subtree: a tree of [`Node`]s with
//! classes and inline [`Style`]s, plus the rulesets currently injected into
//! the document head. [`Document::styled_tree`] runs the cascade for a given
//! [`Media`] and yields the computed presentation the layout stage consumes.

mod cascade;
mod error;
mod node;
mod ruleset;
mod style;

pub use cascade::StyledNode;
pub use error::DocumentError;
pub use node::{Document, Node};
pub use ruleset::{Media, Rule, Ruleset, Selector};
pub use style::{BreakInside, ComputedStyle, Display, Effects, FontWeight, GridTemplate, Style, Track};
