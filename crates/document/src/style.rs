use folio_types::ColorValue;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Light,
    #[default]
    Normal,
    Medium,
    Semibold,
    Bold,
    Black,
}

impl FontWeight {
    /// Weights at or above semibold are painted with the bold face.
    pub fn is_bold(self) -> bool {
        matches!(self, FontWeight::Semibold | FontWeight::Bold | FontWeight::Black)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Display {
    #[default]
    Block,
    Grid,
    /// Children flow left to right and wrap (chips, inline tags).
    #[serde(alias = "flex")]
    Flow,
    None,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakInside {
    #[default]
    Auto,
    Avoid,
}

/// One column track of a grid template.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Track {
    Px(f32),
    Fr(f32),
}

impl Track {
    fn parse(s: &str) -> Result<Self, String> {
        if let Some(v) = s.strip_suffix("fr") {
            v.parse().map(Track::Fr).map_err(|_| format!("Invalid fr track: {}", s))
        } else if let Some(v) = s.strip_suffix("px") {
            v.parse().map(Track::Px).map_err(|_| format!("Invalid px track: {}", s))
        } else {
            s.parse().map(Track::Px).map_err(|_| format!("Invalid track: {}", s))
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Track::Px(v) => write!(f, "{}px", v),
            Track::Fr(v) => write!(f, "{}fr", v),
        }
    }
}

/// A `grid-template-columns` value such as `1fr 240px`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GridTemplate(pub Vec<Track>);

impl GridTemplate {
    pub fn parse(s: &str) -> Result<Self, String> {
        s.split_whitespace()
            .map(Track::parse)
            .collect::<Result<Vec<_>, _>>()
            .map(GridTemplate)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.0
    }
}

impl Serialize for GridTemplate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let parts: Vec<String> = self.0.iter().map(Track::to_string).collect();
        serializer.serialize_str(&parts.join(" "))
    }
}

impl<'de> Deserialize<'de> for GridTemplate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        GridTemplate::parse(&s).map_err(de::Error::custom)
    }
}

/// A set of presentation declarations. Unset properties do not participate
/// in the cascade. Used both for inline styles and for rule bodies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Style {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<ColorValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<ColorValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_bottom_width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<FontWeight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_bottom: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<Display>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_columns: Option<GridTemplate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub break_inside: Option<BreakInside>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub box_shadow: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_shadow: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outline: Option<String>,
}

macro_rules! overlay {
    ($dst:expr, $src:expr, $($field:ident),+ $(,)?) => {
        $(
            if let Some(v) = &$src.$field {
                $dst.$field = Some(v.clone());
            }
        )+
    };
}

impl Style {
    /// Overlays every property set in `other` onto `self`.
    pub fn apply(&mut self, other: &Style) {
        overlay!(
            self, other, background, color, border_color, border_bottom_width, font_size,
            font_weight, line_height, padding, margin_bottom, width, max_width, display,
            grid_columns, gap, break_inside, box_shadow, text_shadow, filter, transform,
            transition, animation, outline,
        );
    }
}

/// Visual effects a static rasterizer cannot reproduce faithfully.
/// `None` means the effect is off.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Effects {
    pub box_shadow: Option<String>,
    pub text_shadow: Option<String>,
    pub filter: Option<String>,
    pub transform: Option<String>,
    pub transition: Option<String>,
    pub animation: Option<String>,
    pub outline: Option<String>,
}

impl Effects {
    /// Names of the effects that are currently on.
    pub fn active(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        let checks = [
            ("box-shadow", &self.box_shadow),
            ("text-shadow", &self.text_shadow),
            ("filter", &self.filter),
            ("transform", &self.transform),
            ("transition", &self.transition),
            ("animation", &self.animation),
            ("outline", &self.outline),
        ];
        for (name, value) in checks {
            if value.is_some() {
                out.push(name);
            }
        }
        out
    }
}

fn effect(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("none"))
        .map(str::to_string)
}

/// Fully resolved presentation of one node.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    pub background: ColorValue,
    pub color: ColorValue,
    pub border_color: ColorValue,
    pub border_bottom_width: f32,
    pub font_size: f32,
    pub font_weight: FontWeight,
    pub line_height: f32,
    pub padding: f32,
    pub margin_bottom: f32,
    pub width: Option<f32>,
    pub max_width: Option<f32>,
    pub display: Display,
    pub grid_columns: GridTemplate,
    pub gap: f32,
    pub break_inside: BreakInside,
    pub effects: Effects,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            background: ColorValue::Transparent,
            color: ColorValue::BLACK,
            border_color: ColorValue::Transparent,
            border_bottom_width: 0.0,
            font_size: 16.0,
            font_weight: FontWeight::Normal,
            line_height: 1.5,
            padding: 0.0,
            margin_bottom: 0.0,
            width: None,
            max_width: None,
            display: Display::Block,
            grid_columns: GridTemplate::default(),
            gap: 0.0,
            break_inside: BreakInside::Auto,
            effects: Effects::default(),
        }
    }
}

impl ComputedStyle {
    /// Resolves `declared` against the inherited properties of `parent`.
    pub(crate) fn resolve(declared: &Style, parent: Option<&ComputedStyle>) -> Self {
        let base = ComputedStyle::default();
        let inherited = parent.unwrap_or(&base);
        Self {
            background: declared.background.unwrap_or(ColorValue::Transparent),
            color: declared.color.unwrap_or(inherited.color),
            border_color: declared.border_color.unwrap_or(ColorValue::Transparent),
            border_bottom_width: declared.border_bottom_width.unwrap_or(0.0),
            font_size: declared.font_size.unwrap_or(inherited.font_size),
            font_weight: declared.font_weight.unwrap_or(inherited.font_weight),
            line_height: declared.line_height.unwrap_or(inherited.line_height),
            padding: declared.padding.unwrap_or(0.0),
            margin_bottom: declared.margin_bottom.unwrap_or(0.0),
            width: declared.width,
            max_width: declared.max_width,
            display: declared.display.unwrap_or_default(),
            grid_columns: declared.grid_columns.clone().unwrap_or_default(),
            gap: declared.gap.unwrap_or(0.0),
            break_inside: declared.break_inside.unwrap_or_default(),
            effects: Effects {
                box_shadow: effect(&declared.box_shadow),
                text_shadow: effect(&declared.text_shadow),
                filter: effect(&declared.filter),
                transform: effect(&declared.transform),
                transition: effect(&declared.transition),
                animation: effect(&declared.animation),
                outline: effect(&declared.outline),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_template_round_trips_through_text() {
        let t = GridTemplate::parse("1fr 240px").unwrap();
        assert_eq!(t.tracks(), &[Track::Fr(1.0), Track::Px(240.0)]);
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"1fr 240px\"");
    }

    #[test]
    fn none_effects_resolve_to_off() {
        let declared = Style {
            box_shadow: Some("none".into()),
            transition: Some("all 300ms".into()),
            ..Default::default()
        };
        let computed = ComputedStyle::resolve(&declared, None);
        assert_eq!(computed.effects.active(), vec!["transition"]);
    }

    #[test]
    fn color_and_font_inherit_but_background_does_not() {
        let parent = ComputedStyle::resolve(
            &Style {
                color: Some(ColorValue::WHITE),
                background: Some(ColorValue::BLACK),
                font_size: Some(20.0),
                ..Default::default()
            },
            None,
        );
        let child = ComputedStyle::resolve(&Style::default(), Some(&parent));
        assert_eq!(child.color, ColorValue::WHITE);
        assert_eq!(child.font_size, 20.0);
        assert_eq!(child.background, ColorValue::Transparent);
    }
}
