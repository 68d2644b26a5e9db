use std::collections::BTreeMap;
use std::str::FromStr;

use eframe::egui::Color32;
use palette::{FromColor, Hsl, Srgb};

use crate::data::model::CellValue;

// ---------------------------------------------------------------------------
// Fixed palettes
// ---------------------------------------------------------------------------

/// Qualitative palette for pie slices (matplotlib `tab20c`), cycled.
pub const PIE_PALETTE: [&str; 20] = [
    "#3182bd", "#6baed6", "#9ecae1", "#c6dbef", "#e6550d", "#fd8d3c", "#fdae6b", "#fdd0a2",
    "#31a354", "#74c476", "#a1d99b", "#c7e9c0", "#756bb1", "#9e9ac8", "#bcbddc", "#dadaeb",
    "#636363", "#969696", "#bdbdbd", "#d9d9d9",
];

/// Fill of the category bars.
pub const BAR_COLOR: &str = "#87ceeb";

/// Parse a `#rrggbb` hex code. Unparseable codes fall back to grey.
pub fn hex_color(hex: &str) -> Color32 {
    match Srgb::<u8>::from_str(hex) {
        Ok(rgb) => Color32::from_rgb(rgb.red, rgb.green, rgb.blue),
        Err(_) => Color32::GRAY,
    }
}

/// The `i`-th pie colour, wrapping around the palette.
pub fn pie_color(i: usize) -> Color32 {
    hex_color(PIE_PALETTE[i % PIE_PALETTE.len()])
}

/// Black or white, whichever reads better on `background`.
pub fn contrasting_text(background: Color32) -> Color32 {
    let rgb = Srgb::new(background.r(), background.g(), background.b()).into_format::<f32>();
    let hsl = Hsl::from_color(rgb);
    if hsl.lightness > 0.6 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

// ---------------------------------------------------------------------------
// Color mapping: seller → Color32
// ---------------------------------------------------------------------------

/// Gives every seller a stable pie colour in metrics order, so a seller
/// keeps its colour when others are deselected.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    mapping: BTreeMap<CellValue, Color32>,
}

impl ColorMap {
    pub fn new<'a, I>(sellers: I) -> Self
    where
        I: IntoIterator<Item = &'a CellValue>,
    {
        let mapping = sellers
            .into_iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), pie_color(i)))
            .collect();
        ColorMap { mapping }
    }

    /// Look up the colour for a given seller.
    pub fn color_for(&self, seller: &CellValue) -> Color32 {
        self.mapping.get(seller).copied().unwrap_or(Color32::GRAY)
    }
}
