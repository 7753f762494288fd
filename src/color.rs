use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

use crate::data::model::Value;

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
            let hsl = Hsl::new(hue, 0.75, 0.55);
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
// Diverging scale for correlation heatmaps
// ---------------------------------------------------------------------------

const COOL: (u8, u8, u8) = (59, 76, 192);
const NEUTRAL: (u8, u8, u8) = (221, 221, 221);
const WARM: (u8, u8, u8) = (180, 4, 38);

fn linear(c: (u8, u8, u8)) -> LinSrgb {
    Srgb::new(c.0, c.1, c.2).into_format::<f32>().into_linear()
}

/// Cool-warm colour for a value in `[-1, 1]`, blended in linear RGB.
pub fn diverging(value: f64) -> Color32 {
    let t = value.clamp(-1.0, 1.0) as f32;
    let mixed = if t < 0.0 {
        linear(NEUTRAL).mix(linear(COOL), -t)
    } else {
        linear(NEUTRAL).mix(linear(WARM), t)
    };
    to_color32(Srgb::from_linear(mixed))
}

/// Readable text colour on top of a [`diverging`] cell.
pub fn diverging_text(value: f64) -> Color32 {
    if value.abs() > 0.6 {
        Color32::WHITE
    } else {
        Color32::BLACK
    }
}

// ---------------------------------------------------------------------------
// Color mapping: hue value → Color32
// ---------------------------------------------------------------------------

/// Maps unique values of a chosen hue column to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    pub column: String,
    mapping: BTreeMap<Value, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map for the given column from its unique values.
    pub fn new(column: &str, unique_values: &BTreeSet<Value>) -> Self {
        let palette = generate_palette(unique_values.len());
        let mapping: BTreeMap<Value, Color32> = unique_values
            .iter()
            .cloned()
            .zip(palette)
            .collect();

        ColorMap {
            column: column.to_string(),
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given value; missing and unknown values are grey.
    pub fn color_for(&self, value: &Value) -> Color32 {
        self.mapping
            .get(value)
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Return the legend entries (value label → colour) for the UI.
    pub fn legend_entries(&self) -> Vec<(String, Color32)> {
        self.mapping
            .iter()
            .map(|(v, c)| (v.to_string(), *c))
            .collect()
    }

    /// Values in legend order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.mapping.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        let p = generate_palette(5);
        assert_eq!(p.len(), 5);
        assert_ne!(p[0], p[1]);
    }

    #[test]
    fn diverging_ends_and_middle() {
        assert_eq!(diverging(0.0), Color32::from_rgb(221, 221, 221));
        let cool = diverging(-1.0);
        let warm = diverging(1.0);
        assert!(cool.b() > cool.r());
        assert!(warm.r() > warm.b());
        assert_eq!(diverging(-5.0), cool);
    }

    #[test]
    fn color_map_falls_back_to_default() {
        let values: BTreeSet<Value> = [Value::Text("a".into()), Value::Text("b".into())]
            .into_iter()
            .collect();
        let cm = ColorMap::new("hue", &values);
        assert_eq!(cm.values().count(), 2);
        assert_ne!(cm.color_for(&Value::Text("a".into())), Color32::GRAY);
        assert_eq!(cm.color_for(&Value::Null), Color32::GRAY);
        assert_eq!(cm.legend_entries()[1].0, "b");
    }
}
