use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Mix, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.65, 0.6);
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

/// `#RRGGBB` (leading `#` optional) → colour.
pub fn parse_hex(hex: &str) -> Option<Color32> {
    let hex = hex.trim().trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some(Color32::from_rgb(channel(0)?, channel(2)?, channel(4)?))
}

/// Accent for a dashboard variant, falling back to the default pink.
pub fn accent(hex: &str) -> Color32 {
    parse_hex(hex).unwrap_or(Color32::from_rgb(0xE9, 0x1E, 0x63))
}

/// Heat-map cell colour: white at `t = 0`, the accent at `t = 1`.
pub fn heat(t: f32, accent: Color32) -> Color32 {
    let white = Srgb::new(1.0f32, 1.0, 1.0).into_linear();
    let target = Srgb::new(
        accent.r() as f32 / 255.0,
        accent.g() as f32 / 255.0,
        accent.b() as f32 / 255.0,
    )
    .into_linear();
    let mixed: palette::LinSrgb = white.mix(target, t.clamp(0.0, 1.0));
    to_color32(Srgb::from_linear(mixed))
}

// ---------------------------------------------------------------------------
// Color mapping: series label → Color32
// ---------------------------------------------------------------------------

/// Maps series labels (artists, members) to distinct colours.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Colours are assigned in the order labels are given, so a label keeps
    /// its colour while filters hide other labels.
    pub fn new<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let labels: Vec<&str> = labels.into_iter().collect();
        let palette = generate_palette(labels.len());
        let mapping = labels
            .into_iter()
            .zip(palette)
            .map(|(label, c)| (label.to_string(), c))
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        let colors = generate_palette(5);
        assert_eq!(colors.len(), 5);
        assert_ne!(colors[0], colors[1]);
    }

    #[test]
    fn parses_hex_accents() {
        assert_eq!(parse_hex("#9C27B0"), Some(Color32::from_rgb(0x9C, 0x27, 0xB0)));
        assert_eq!(parse_hex("e91e63"), Some(Color32::from_rgb(0xE9, 0x1E, 0x63)));
        assert_eq!(parse_hex("#12345"), None);
        assert_eq!(parse_hex("#zzzzzz"), None);
        assert_eq!(accent("nope"), Color32::from_rgb(0xE9, 0x1E, 0x63));
    }

    #[test]
    fn heat_runs_from_white_to_accent() {
        let accent = Color32::from_rgb(0x9C, 0x27, 0xB0);
        assert_eq!(heat(0.0, accent), Color32::WHITE);
        let full = heat(1.0, accent);
        assert!((full.r() as i16 - 0x9C).abs() <= 1);
        assert!((full.b() as i16 - 0xB0).abs() <= 1);
    }

    #[test]
    fn labels_keep_their_colour() {
        let map = ColorMap::new(["BTS", "IU", "TWICE"]);
        assert_ne!(map.color_for("BTS"), map.color_for("IU"));
        assert_eq!(map.color_for("unknown"), Color32::GRAY);
    }
}
