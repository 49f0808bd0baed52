use crate::node::{Document, Node};
use crate::ruleset::{Media, Ruleset};
use crate::style::{ComputedStyle, Style};

/// A node together with its resolved presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledNode {
    pub tag: String,
    pub classes: Vec<String>,
    pub text: Option<String>,
    pub style: ComputedStyle,
    pub children: Vec<StyledNode>,
}

impl StyledNode {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Pre-order traversal over the styled subtree.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a StyledNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

impl Document {
    /// Runs the cascade for `media` and returns the styled tree rooted at `root`.
    pub fn styled_tree(&self, media: Media) -> StyledNode {
        let (important, normal): (Vec<&Ruleset>, Vec<&Ruleset>) = self
            .rulesets
            .iter()
            .filter(|r| r.media.applies_to(media))
            .partition(|r| r.important);

        let cascade = Cascade {
            normal,
            important,
            print_variant: self
                .print_variant
                .as_ref()
                .filter(|_| media == Media::Print),
        };
        let mut ancestors: Vec<&[String]> = vec![self.frame_classes.as_slice()];
        cascade.resolve(&self.root, None, &mut ancestors)
    }
}

struct Cascade<'a> {
    normal: Vec<&'a Ruleset>,
    important: Vec<&'a Ruleset>,
    print_variant: Option<&'a Ruleset>,
}

impl<'a> Cascade<'a> {
    fn resolve(
        &self,
        node: &'a Node,
        parent: Option<&ComputedStyle>,
        ancestors: &mut Vec<&'a [String]>,
    ) -> StyledNode {
        let mut declared = Style::default();
        self.apply_rules(&self.normal, node, ancestors, &mut declared);
        declared.apply(&node.style);
        self.apply_rules(&self.important, node, ancestors, &mut declared);
        // The print variant is authoritative whatever its flag says.
        if let Some(variant) = self.print_variant {
            self.apply_rules(&[variant], node, ancestors, &mut declared);
        }

        let style = ComputedStyle::resolve(&declared, parent);

        ancestors.push(node.classes.as_slice());
        let children = node
            .children
            .iter()
            .map(|child| self.resolve(child, Some(&style), ancestors))
            .collect();
        ancestors.pop();

        StyledNode {
            tag: node.tag.clone(),
            classes: node.classes.clone(),
            text: node.text.clone(),
            style,
            children,
        }
    }

    fn apply_rules(
        &self,
        rulesets: &[&Ruleset],
        node: &Node,
        ancestors: &[&[String]],
        declared: &mut Style,
    ) {
        let in_scope = |scope: &str| ancestors.iter().any(|set| set.iter().any(|c| c == scope));
        for ruleset in rulesets {
            for rule in &ruleset.rules {
                if rule.selector.matches(&node.tag, &node.classes, in_scope) {
                    declared.apply(&rule.declarations);
                }
            }
        }
    }
}
