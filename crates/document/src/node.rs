use crate::error::DocumentError;
use crate::ruleset::Ruleset;
use crate::style::Style;
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_tag() -> String {
    "div".to_string()
}

fn default_true() -> bool {
    true
}

/// One element of the export target subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    #[serde(default = "default_tag")]
    pub tag: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(default)]
    pub style: Style,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            classes: Vec::new(),
            style: Style::default(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Adds `class` unless already present. Returns whether it was added.
    pub fn add_class(&mut self, class: &str) -> bool {
        if self.has_class(class) {
            return false;
        }
        self.classes.push(class.to_string());
        true
    }

    /// Removes `class` if present. Returns whether it was removed.
    pub fn remove_class(&mut self, class: &str) -> bool {
        let before = self.classes.len();
        self.classes.retain(|c| c != class);
        before != self.classes.len()
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Node::node_count).sum::<usize>()
    }

    /// Concatenated text of the subtree in document order.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(text) = &self.text {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(text);
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }
}

/// The export target: a mounted document subtree plus its style environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub root: Node,
    /// Classes on the frame element that wraps `root` (responsive width, centering).
    #[serde(default)]
    pub frame_classes: Vec<String>,
    /// Rulesets currently injected into the document head.
    #[serde(default)]
    pub rulesets: Vec<Ruleset>,
    /// Declarative print-only styles supplied by the presentation layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub print_variant: Option<Ruleset>,
    #[serde(default = "default_true")]
    pub mounted: bool,
}

impl Document {
    pub fn new(root: Node) -> Self {
        Self {
            root,
            frame_classes: Vec::new(),
            rulesets: Vec::new(),
            print_variant: None,
            mounted: true,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DocumentError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_json(&source)
    }

    pub fn ruleset(&self, id: &str) -> Option<&Ruleset> {
        self.rulesets.iter().find(|r| r.id == id)
    }

    pub fn has_ruleset(&self, id: &str) -> bool {
        self.ruleset(id).is_some()
    }

    /// Removes every ruleset with `id`. Returns how many were removed.
    pub fn remove_ruleset(&mut self, id: &str) -> usize {
        let before = self.rulesets.len();
        self.rulesets.retain(|r| r.id != id);
        before - self.rulesets.len()
    }

    pub fn has_frame_class(&self, class: &str) -> bool {
        self.frame_classes.iter().any(|c| c == class)
    }
}
