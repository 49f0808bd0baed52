use folio_types::Color;

/// Rounds a canvas coordinate to the device-pixel grid of `scale`.
pub fn snap(value: f32, scale: f32) -> f32 {
    (value * scale).round() / scale
}

/// Resource key under which the font is registered on every page.
pub fn font_resource(bold: bool) -> &'static str {
    if bold { "F2" } else { "F1" }
}

/// `rg`/`RG` operands for a colour.
pub fn rgb_operands(color: Color) -> [f32; 3] {
    let (r, g, b) = color.to_unit_rgb();
    [r, g, b]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snaps_to_half_pixels_at_scale_two() {
        assert_eq!(snap(10.26, 2.0), 10.5);
        assert_eq!(snap(10.24, 2.0), 10.0);
        assert_eq!(snap(10.24, 1.0), 10.0);
    }
}
