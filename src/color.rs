use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Series palette
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.65, 0.5);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0).round() as u8,
    )
}

// ---------------------------------------------------------------------------
// Sequential heat scale (yellow → orange → red)
// ---------------------------------------------------------------------------

const HEAT_STOPS: [(u8, u8, u8); 9] = [
    (0xff, 0xff, 0xcc),
    (0xff, 0xed, 0xa0),
    (0xfe, 0xd9, 0x76),
    (0xfe, 0xb2, 0x4c),
    (0xfd, 0x8d, 0x3c),
    (0xfc, 0x4e, 0x2a),
    (0xe3, 0x1a, 0x1c),
    (0xbd, 0x00, 0x26),
    (0x80, 0x00, 0x26),
];

/// Colour of a value normalised to `0.0..=1.0` on the heat scale.
pub fn heat_color(t: f32) -> Color32 {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (HEAT_STOPS.len() - 1) as f32;
    let lower = (scaled.floor() as usize).min(HEAT_STOPS.len() - 2);
    let factor = scaled - lower as f32;

    let stop = |(r, g, b): (u8, u8, u8)| -> LinSrgb {
        Srgb::new(r, g, b).into_format::<f32>().into_linear()
    };
    let mixed = stop(HEAT_STOPS[lower]).mix(stop(HEAT_STOPS[lower + 1]), factor);
    to_color32(Srgb::from_linear(mixed))
}

/// Colour used for a heatmap cell without a value.
pub const MISSING_COLOR: Color32 = Color32::from_gray(200);

// ---------------------------------------------------------------------------
// Change colours
// ---------------------------------------------------------------------------

pub const GROWTH_COLOR: Color32 = Color32::from_rgb(0xa6, 0xd8, 0x54);
pub const DECLINE_COLOR: Color32 = Color32::from_rgb(0xff, 0xd9, 0x2f);
pub const BAR_COLOR: Color32 = Color32::from_rgb(0x66, 0xc2, 0xa5);

/// Bar colour for a percentage change.
pub fn change_color(change: f64) -> Color32 {
    if change >= 0.0 {
        GROWTH_COLOR
    } else {
        DECLINE_COLOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_distinct_colours() {
        let colours = generate_palette(6);
        assert_eq!(colours.len(), 6);
        for (i, a) in colours.iter().enumerate() {
            for b in &colours[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn heat_scale_endpoints() {
        assert_eq!(heat_color(0.0), Color32::from_rgb(0xff, 0xff, 0xcc));
        assert_eq!(heat_color(1.0), Color32::from_rgb(0x80, 0x00, 0x26));
        assert_eq!(heat_color(f32::NAN), heat_color(0.0));
        assert_eq!(heat_color(7.0), heat_color(1.0));
    }

    #[test]
    fn change_colours_split_on_sign() {
        assert_eq!(change_color(12.0), GROWTH_COLOR);
        assert_eq!(change_color(0.0), GROWTH_COLOR);
        assert_eq!(change_color(-3.0), DECLINE_COLOR);
    }
}
