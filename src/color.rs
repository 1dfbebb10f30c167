use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Colour for the `index`-th country, by golden-angle hue stepping: each
/// index lands far from its neighbours, and an index keeps its colour no
/// matter how many entries follow it.
pub fn palette_color(index: usize) -> Color32 {
    let hue = (index as f32 * 137.508) % 360.0;
    let hsl = Hsl::new(hue, 0.72, 0.52);
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Color mapping: country → Color32
// ---------------------------------------------------------------------------

/// Assigns each country a fixed colour by table row order, shared by the
/// series lines, the total bars, and the side-panel swatches.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
}

impl ColorMap {
    /// Build a colour map over all countries of a table, first row first,
    /// so a country's colour does not move when the selection changes.
    /// Duplicate names keep their first colour.
    pub fn new<'a, I>(countries: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut mapping = BTreeMap::new();
        let mut next = 0usize;
        for country in countries {
            mapping.entry(country.to_string()).or_insert_with(|| {
                let color = palette_color(next);
                next += 1;
                color
            });
        }
        ColorMap { mapping }
    }

    /// Look up the colour for a country. Unknown names get a neutral grey.
    pub fn color_for(&self, country: &str) -> Color32 {
        self.mapping.get(country).copied().unwrap_or(Color32::GRAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearby_indices_get_distinct_colors() {
        let colors: Vec<Color32> = (0..16).map(palette_color).collect();
        for i in 0..colors.len() {
            for j in (i + 1)..colors.len() {
                assert_ne!(colors[i], colors[j], "indices {i} and {j} collide");
            }
        }
    }

    #[test]
    fn colors_are_stable_as_countries_are_added() {
        let small = ColorMap::new(["China", "USA"]);
        let large = ColorMap::new(["China", "USA", "India", "Brazil"]);
        assert_eq!(small.color_for("China"), large.color_for("China"));
        assert_eq!(small.color_for("USA"), large.color_for("USA"));
    }

    #[test]
    fn duplicate_rows_share_one_color() {
        let map = ColorMap::new(["France", "France", "Japan"]);
        assert_eq!(map.color_for("France"), map.color_for("France"));
        assert_ne!(map.color_for("France"), map.color_for("Japan"));
    }

    #[test]
    fn unknown_country_is_grey() {
        let map = ColorMap::new(["China"]);
        assert_eq!(map.color_for("Wakanda"), Color32::GRAY);
    }
}
