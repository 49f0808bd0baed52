use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

fn default_one() -> f32 {
    1.0
}

fn is_one(num: &f32) -> bool {
    *num == 1.0
}

/// An exact sRGB colour with straight alpha.
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(skip_serializing_if = "is_one", default = "default_one")]
    pub a: f32,
}

impl Eq for Color {}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.r.hash(state);
        self.g.hash(state);
        self.b.hash(state);
        self.a.to_bits().hash(state);
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 1.0 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 1.0 };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn gray(value: u8) -> Self {
        Self { r: value, g: value, b: value, a: 1.0 }
    }

    pub fn is_opaque(&self) -> bool {
        self.a >= 1.0
    }

    /// Components scaled to `0.0..=1.0`, as PDF colour operators expect them.
    pub fn to_unit_rgb(&self) -> (f32, f32, f32) {
        (
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        )
    }

    /// Parse a hex color string (#RGB or #RRGGBB format)
    fn parse_hex(s: &str) -> Result<Color, String> {
        let s = s.trim();
        if !s.starts_with('#') {
            return Err(format!("Color must start with #, got: {}", s));
        }
        let hex = &s[1..];
        if !hex.is_ascii() {
            return Err(format!("Invalid hex color: {}", s));
        }

        match hex.len() {
            3 => {
                // #RGB format - expand each digit
                let r = u8::from_str_radix(&hex[0..1].repeat(2), 16)
                    .map_err(|e| format!("Invalid red component: {}", e))?;
                let g = u8::from_str_radix(&hex[1..2].repeat(2), 16)
                    .map_err(|e| format!("Invalid green component: {}", e))?;
                let b = u8::from_str_radix(&hex[2..3].repeat(2), 16)
                    .map_err(|e| format!("Invalid blue component: {}", e))?;
                Ok(Color { r, g, b, a: 1.0 })
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16)
                    .map_err(|e| format!("Invalid red component: {}", e))?;
                let g = u8::from_str_radix(&hex[2..4], 16)
                    .map_err(|e| format!("Invalid green component: {}", e))?;
                let b = u8::from_str_radix(&hex[4..6], 16)
                    .map_err(|e| format!("Invalid blue component: {}", e))?;
                Ok(Color { r, g, b, a: 1.0 })
            }
            _ => Err(format!(
                "Invalid hex color length: expected 3 or 6, got {}",
                hex.len()
            )),
        }
    }

    /// Parse `rgb(r, g, b)` / `rgba(r, g, b, a)`.
    fn parse_rgb_function(s: &str) -> Result<Color, String> {
        let args = function_args(s, &["rgba", "rgb"])
            .ok_or_else(|| format!("Not an rgb() color: {}", s))?;
        if args.len() != 3 && args.len() != 4 {
            return Err(format!("rgb() expects 3 or 4 components, got {}", args.len()));
        }
        let channel = |v: &str| -> Result<u8, String> {
            let n: f32 = v
                .parse()
                .map_err(|_| format!("Invalid rgb component: {}", v))?;
            Ok(n.round().clamp(0.0, 255.0) as u8)
        };
        let a = match args.get(3) {
            Some(v) => parse_alpha(v)?,
            None => 1.0,
        };
        Ok(Color {
            r: channel(args[0])?,
            g: channel(args[1])?,
            b: channel(args[2])?,
            a,
        })
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_opaque() {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
        }
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum ColorDef {
            Str(String),
            Map {
                r: u8,
                g: u8,
                b: u8,
                #[serde(default = "default_one")]
                a: f32,
            },
        }

        match ColorDef::deserialize(deserializer)? {
            ColorDef::Str(s) => match s.parse::<ColorValue>().map_err(de::Error::custom)? {
                ColorValue::Srgb(color) => Ok(color),
                other => Err(de::Error::custom(format!(
                    "expected an exact sRGB color, got {}",
                    other
                ))),
            },
            ColorDef::Map { r, g, b, a } => Ok(Color { r, g, b, a }),
        }
    }
}

/// A colour as it appears in the interactive presentation.
///
/// Themes may express colours in perceptual spaces (`oklch(...)`) that only a
/// browser-grade colour pipeline can resolve. The export path requires
/// [`ColorValue::Srgb`] or [`ColorValue::Transparent`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorValue {
    Srgb(Color),
    Transparent,
    Oklch { l: f32, c: f32, h: f32, alpha: f32 },
}

impl ColorValue {
    pub const WHITE: ColorValue = ColorValue::Srgb(Color::WHITE);
    pub const BLACK: ColorValue = ColorValue::Srgb(Color::BLACK);

    pub fn as_srgb(&self) -> Option<Color> {
        match self {
            ColorValue::Srgb(c) => Some(*c),
            _ => None,
        }
    }

    /// True when the value can be painted without colour-space conversion.
    pub fn is_exact(&self) -> bool {
        !matches!(self, ColorValue::Oklch { .. })
    }

    pub fn is_transparent(&self) -> bool {
        match self {
            ColorValue::Transparent => true,
            ColorValue::Srgb(c) => c.a <= 0.0,
            ColorValue::Oklch { alpha, .. } => *alpha <= 0.0,
        }
    }

    fn parse_oklch(s: &str) -> Result<ColorValue, String> {
        let args = function_args(s, &["oklch"]).ok_or_else(|| format!("Not an oklch() color: {}", s))?;
        // `oklch(L C H / A)` is space separated; `/` introduces alpha.
        let flat: Vec<&str> = args
            .iter()
            .flat_map(|a| a.split_whitespace())
            .filter(|t| *t != "/")
            .collect();
        if flat.len() != 3 && flat.len() != 4 {
            return Err(format!("oklch() expects 3 or 4 components, got {}", flat.len()));
        }
        let l = match flat[0].strip_suffix('%') {
            Some(pct) => pct.parse::<f32>().map(|v| v / 100.0),
            None => flat[0].parse::<f32>(),
        }
        .map_err(|_| format!("Invalid oklch lightness: {}", flat[0]))?;
        let c: f32 = flat[1]
            .parse()
            .map_err(|_| format!("Invalid oklch chroma: {}", flat[1]))?;
        let h: f32 = flat[2]
            .trim_end_matches("deg")
            .parse()
            .map_err(|_| format!("Invalid oklch hue: {}", flat[2]))?;
        let alpha = match flat.get(3) {
            Some(v) => parse_alpha(v)?,
            None => 1.0,
        };
        Ok(ColorValue::Oklch { l, c, h, alpha })
    }
}

impl FromStr for ColorValue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let lower = s.to_ascii_lowercase();
        match lower.as_str() {
            "transparent" => Ok(ColorValue::Transparent),
            "white" => Ok(ColorValue::WHITE),
            "black" => Ok(ColorValue::BLACK),
            _ if lower.starts_with('#') => Color::parse_hex(&lower).map(ColorValue::Srgb),
            _ if lower.starts_with("rgb") => Color::parse_rgb_function(&lower).map(ColorValue::Srgb),
            _ if lower.starts_with("oklch") => ColorValue::parse_oklch(&lower),
            _ => Err(format!("Unsupported color syntax: {}", s)),
        }
    }
}

impl fmt::Display for ColorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorValue::Srgb(c) => write!(f, "{}", c),
            ColorValue::Transparent => f.write_str("transparent"),
            ColorValue::Oklch { l, c, h, alpha } if is_one(alpha) => {
                write!(f, "oklch({} {} {})", l, c, h)
            }
            ColorValue::Oklch { l, c, h, alpha } => {
                write!(f, "oklch({} {} {} / {})", l, c, h, alpha)
            }
        }
    }
}

impl From<Color> for ColorValue {
    fn from(color: Color) -> Self {
        ColorValue::Srgb(color)
    }
}

impl Serialize for ColorValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ColorValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

fn function_args<'a>(s: &'a str, names: &[&str]) -> Option<Vec<&'a str>> {
    let name = names.iter().find(|n| s.starts_with(**n))?;
    let inner = s[name.len()..].trim().strip_prefix('(')?.strip_suffix(')')?;
    Some(
        inner
            .split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .collect(),
    )
}

fn parse_alpha(v: &str) -> Result<f32, String> {
    let alpha = match v.strip_suffix('%') {
        Some(pct) => pct.parse::<f32>().map(|p| p / 100.0),
        None => v.parse::<f32>(),
    }
    .map_err(|_| format!("Invalid alpha component: {}", v))?;
    Ok(alpha.clamp(0.0, 1.0))
}
