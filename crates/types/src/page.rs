//! Page formats, orientation and margins, all expressed in millimetres.
use serde::{Deserialize, Deserializer, Serialize, Serializer, de, ser::SerializeMap};

const MM_PER_INCH: f32 = 25.4;

/// Converts millimetres to PDF points (1/72").
pub fn mm_to_pt(mm: f32) -> f32 {
    mm / MM_PER_INCH * 72.0
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PageFormat {
    #[default]
    A4,
    Letter,
    Legal,
    Custom { width_mm: f32, height_mm: f32 },
}

impl PageFormat {
    /// Portrait dimensions in millimetres.
    pub fn dimensions_mm(&self) -> (f32, f32) {
        match self {
            PageFormat::A4 => (210.0, 297.0),
            PageFormat::Letter => (215.9, 279.4),
            PageFormat::Legal => (215.9, 355.6),
            PageFormat::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }

    /// Dimensions in millimetres after applying `orientation`.
    pub fn oriented_mm(&self, orientation: Orientation) -> (f32, f32) {
        let (w, h) = self.dimensions_mm();
        match orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }

    pub fn oriented_pt(&self, orientation: Orientation) -> (f32, f32) {
        let (w, h) = self.oriented_mm(orientation);
        (mm_to_pt(w), mm_to_pt(h))
    }

    /// Parse a page size name (e.g., "A4", "Letter", "Legal")
    fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "a4" => Ok(PageFormat::A4),
            "letter" => Ok(PageFormat::Letter),
            "legal" => Ok(PageFormat::Legal),
            _ => Err(format!("Unknown page format: {}", s)),
        }
    }
}

impl Serialize for PageFormat {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            PageFormat::A4 => serializer.serialize_str("a4"),
            PageFormat::Letter => serializer.serialize_str("letter"),
            PageFormat::Legal => serializer.serialize_str("legal"),
            PageFormat::Custom {
                width_mm,
                height_mm,
            } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("widthMm", width_mm)?;
                map.serialize_entry("heightMm", height_mm)?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for PageFormat {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum PageFormatDef {
            Str(String),
            #[serde(rename_all = "camelCase")]
            Map { width_mm: f32, height_mm: f32 },
        }

        match PageFormatDef::deserialize(deserializer)? {
            PageFormatDef::Str(s) => Self::parse(&s).map_err(de::Error::custom),
            PageFormatDef::Map {
                width_mm,
                height_mm,
            } => Ok(PageFormat::Custom {
                width_mm,
                height_mm,
            }),
        }
    }
}

/// Page margins in millimetres.
#[derive(Serialize, Debug, Default, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Margins {
    pub fn all(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    pub fn is_uniform(&self) -> bool {
        self.top == self.right && self.right == self.bottom && self.bottom == self.left
    }

    /// Parse a length with optional unit (e.g. "10mm", "1cm", "0.5in"); bare numbers are millimetres.
    fn parse_length(input: &str) -> Result<f32, String> {
        let input = input.trim();
        let (number, factor) = if let Some(val) = input.strip_suffix("mm") {
            (val, 1.0)
        } else if let Some(val) = input.strip_suffix("cm") {
            (val, 10.0)
        } else if let Some(val) = input.strip_suffix("in") {
            (val, MM_PER_INCH)
        } else if let Some(val) = input.strip_suffix("pt") {
            (val, MM_PER_INCH / 72.0)
        } else {
            (input, 1.0)
        };
        number
            .trim()
            .parse::<f32>()
            .map(|v| v * factor)
            .map_err(|e| format!("Invalid number: {}", e))
    }

    /// Parse CSS-style margin shorthand (1, 2, or 4 values)
    fn parse_shorthand(input: &str) -> Result<Self, String> {
        let values = input
            .split_whitespace()
            .map(Self::parse_length)
            .collect::<Result<Vec<_>, _>>()?;

        match values.len() {
            1 => Ok(Margins::all(values[0])),
            2 => Ok(Margins {
                top: values[0],
                right: values[1],
                bottom: values[0],
                left: values[1],
            }),
            4 => Ok(Margins {
                top: values[0],
                right: values[1],
                bottom: values[2],
                left: values[3],
            }),
            _ => Err(format!(
                "Invalid margin shorthand: expected 1, 2, or 4 values, got {}",
                values.len()
            )),
        }
    }
}

impl<'de> Deserialize<'de> for Margins {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct MarginsVisitor;
        impl<'de> de::Visitor<'de> for MarginsVisitor {
            type Value = Margins;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a number of millimetres, a string like '10mm 5mm', or a map")
            }

            fn visit_f64<E>(self, value: f64) -> Result<Margins, E>
            where
                E: de::Error,
            {
                Ok(Margins::all(value as f32))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Margins, E>
            where
                E: de::Error,
            {
                Ok(Margins::all(value as f32))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Margins, E>
            where
                E: de::Error,
            {
                Ok(Margins::all(value as f32))
            }

            fn visit_str<E>(self, value: &str) -> Result<Margins, E>
            where
                E: de::Error,
            {
                Margins::parse_shorthand(value).map_err(E::custom)
            }

            fn visit_map<A>(self, mut map: A) -> Result<Margins, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut margins = Margins::default();
                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "top" => margins.top = map.next_value()?,
                        "right" => margins.right = map.next_value()?,
                        "bottom" => margins.bottom = map.next_value()?,
                        "left" => margins.left = map.next_value()?,
                        _ => {
                            map.next_value::<de::IgnoredAny>()?;
                        }
                    }
                }
                Ok(margins)
            }
        }
        deserializer.deserialize_any(MarginsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_landscape_swaps_dimensions() {
        assert_eq!(PageFormat::A4.oriented_mm(Orientation::Landscape), (297.0, 210.0));
        let (w, _) = PageFormat::A4.oriented_pt(Orientation::Portrait);
        assert!((w - 595.28).abs() < 0.01);
    }

    #[test]
    fn margins_accept_number_shorthand_and_map() {
        let m: Margins = serde_json::from_str("10").unwrap();
        assert_eq!(m, Margins::all(10.0));
        let m: Margins = serde_json::from_str("\"1cm 5mm\"").unwrap();
        assert_eq!(m, Margins { top: 10.0, right: 5.0, bottom: 10.0, left: 5.0 });
        let m: Margins = serde_json::from_str(r#"{"top": 3, "left": 4}"#).unwrap();
        assert_eq!(m.top, 3.0);
        assert_eq!(m.left, 4.0);
        assert!(!m.is_uniform());
    }

    #[test]
    fn page_format_parses_names_and_custom() {
        let f: PageFormat = serde_json::from_str("\"Letter\"").unwrap();
        assert_eq!(f, PageFormat::Letter);
        let f: PageFormat = serde_json::from_str(r#"{"widthMm": 100, "heightMm": 150}"#).unwrap();
        assert_eq!(f.dimensions_mm(), (100.0, 150.0));
    }
}
