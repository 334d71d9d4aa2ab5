use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::datasets::{
    TRIAGE_BLUE, TRIAGE_GREEN, TRIAGE_NONE, TRIAGE_ORANGE, TRIAGE_RED, TRIAGE_WHITE,
    TRIAGE_YELLOW,
};

pub const ADMISSIONS_COLOR: Color32 = Color32::from_rgb(0x1f, 0x77, 0xb4);
pub const DEATHS_COLOR: Color32 = Color32::from_rgb(0xd6, 0x27, 0x28);
pub const RATE_COLOR: Color32 = Color32::from_rgb(0x2c, 0xa0, 0x2c);

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
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Series colours: series name → Color32
// ---------------------------------------------------------------------------

/// Colour of each series of a chart.
#[derive(Debug, Clone)]
pub struct SeriesColors {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl SeriesColors {
    /// Distinct palette colours, assigned in the given order.
    pub fn new<S: AsRef<str>>(names: &[S]) -> Self {
        let palette = generate_palette(names.len());
        Self::fixed(names.iter().map(|n| n.as_ref()).zip(palette))
    }

    pub fn fixed<'a>(pairs: impl IntoIterator<Item = (&'a str, Color32)>) -> Self {
        SeriesColors {
            mapping: pairs
                .into_iter()
                .map(|(name, c)| (name.to_string(), c))
                .collect(),
            default_color: Color32::GRAY,
        }
    }

    /// The Manchester triage colours.
    pub fn triage() -> Self {
        Self::fixed([
            (TRIAGE_RED, Color32::RED),
            (TRIAGE_ORANGE, Color32::from_rgb(255, 165, 0)),
            (TRIAGE_YELLOW, Color32::YELLOW),
            (TRIAGE_GREEN, Color32::GREEN),
            (TRIAGE_BLUE, Color32::BLUE),
            (TRIAGE_WHITE, Color32::WHITE),
            (TRIAGE_NONE, Color32::from_rgb(128, 0, 128)),
        ])
    }

    pub fn color_for(&self, name: &str) -> Color32 {
        self.mapping
            .get(name)
            .copied()
            .unwrap_or(self.default_color)
    }
}
