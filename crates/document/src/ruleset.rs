use crate::error::DocumentError;
use crate::style::Style;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt;

/// The presentation context a ruleset applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Media {
    #[default]
    All,
    Screen,
    Print,
}

impl Media {
    /// Whether a ruleset declared for `self` participates when rendering for `target`.
    pub fn applies_to(self, target: Media) -> bool {
        self == Media::All || self == target
    }
}

/// The subset of selectors the presentation layer uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// `.class`
    Class(String),
    /// `.scope *`
    AnyDescendant { scope: String },
    /// `.scope .class`
    DescendantClass { scope: String, class: String },
    /// `.scope tag`
    DescendantTag { scope: String, tag: String },
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, DocumentError> {
        let parts: Vec<&str> = input.split_whitespace().collect();
        let class_name = |part: &str| -> Result<String, DocumentError> {
            part.strip_prefix('.')
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .ok_or_else(|| DocumentError::Selector(input.to_string()))
        };
        match parts.as_slice() {
            [single] => Ok(Selector::Class(class_name(single)?)),
            [scope, "*"] => Ok(Selector::AnyDescendant {
                scope: class_name(scope)?,
            }),
            [scope, inner] if inner.starts_with('.') => Ok(Selector::DescendantClass {
                scope: class_name(scope)?,
                class: class_name(inner)?,
            }),
            [scope, tag] if tag.chars().all(|c| c.is_ascii_alphanumeric()) => {
                Ok(Selector::DescendantTag {
                    scope: class_name(scope)?,
                    tag: tag.to_ascii_lowercase(),
                })
            }
            _ => Err(DocumentError::Selector(input.to_string())),
        }
    }

    /// `in_scope` reports whether a strict ancestor carries the given class.
    pub(crate) fn matches(
        &self,
        tag: &str,
        classes: &[String],
        in_scope: impl Fn(&str) -> bool,
    ) -> bool {
        let has = |c: &str| classes.iter().any(|own| own == c);
        match self {
            Selector::Class(class) => has(class),
            Selector::AnyDescendant { scope } => in_scope(scope),
            Selector::DescendantClass { scope, class } => has(class) && in_scope(scope),
            Selector::DescendantTag { scope, tag: want } => {
                tag.eq_ignore_ascii_case(want) && in_scope(scope)
            }
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Class(c) => write!(f, ".{}", c),
            Selector::AnyDescendant { scope } => write!(f, ".{} *", scope),
            Selector::DescendantClass { scope, class } => write!(f, ".{} .{}", scope, class),
            Selector::DescendantTag { scope, tag } => write!(f, ".{} {}", scope, tag),
        }
    }
}

impl Serialize for Selector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Selector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Selector::parse(&s).map_err(de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub selector: Selector,
    pub declarations: Style,
}

impl Rule {
    pub fn new(selector: &str, declarations: Style) -> Result<Self, DocumentError> {
        Ok(Self {
            selector: Selector::parse(selector)?,
            declarations,
        })
    }
}

/// A named block of rules injected into the document head.
///
/// Important rulesets win over inline styles; others lose to them. Within a
/// ruleset, later rules win.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ruleset {
    pub id: String,
    #[serde(default)]
    pub media: Media,
    #[serde(default)]
    pub important: bool,
    pub rules: Vec<Rule>,
}
