//! Category color registry
//!
//! Known colors for features, models and sentiment levels are loaded from
//! palettes.json (embedded at compile time). Labels without a known color
//! get a color derived from the SHA-256 of `family:label`, so the same
//! label is colored the same way on every render and in every process.

use crate::engine::dataset::Column;
use once_cell::sync::Lazy;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Embedded palettes.json content
const PALETTES_JSON: &str = include_str!("../../palettes.json");

/// Global color registry, initialized lazily on first access
pub static COLOR_REGISTRY: Lazy<ColorRegistry> = Lazy::new(|| {
    ColorRegistry::from_json(PALETTES_JSON).unwrap_or_else(|e| {
        tracing::error!("failed to load palettes.json: {}", e);
        ColorRegistry::default()
    })
});

/// Which chart a color map belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteFamily {
    Feature,
    Model,
    Sentiment,
}

impl PaletteFamily {
    pub fn name(self) -> &'static str {
        match self {
            PaletteFamily::Feature => "feature",
            PaletteFamily::Model => "model",
            PaletteFamily::Sentiment => "sentiment",
        }
    }

    /// Family used to color a column's categories
    pub fn for_column(column: Column) -> Self {
        match column {
            Column::Feature => PaletteFamily::Feature,
            Column::Fact => PaletteFamily::Sentiment,
            // Comparison charts are colored by model; the rest share that map
            _ => PaletteFamily::Model,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct PaletteDefinition {
    family: PaletteFamily,
    colors: HashMap<String, String>,
}

/// Known label colors per family
#[derive(Debug, Clone, Default)]
pub struct ColorRegistry {
    families: HashMap<PaletteFamily, HashMap<String, [u8; 3]>>,
}

impl ColorRegistry {
    pub fn from_json(json: &str) -> Result<Self, String> {
        let definitions: Vec<PaletteDefinition> = serde_json::from_str(json)
            .map_err(|e| format!("Failed to parse palettes JSON: {}", e))?;

        let mut registry = Self::default();
        for def in definitions {
            let colors = registry.families.entry(def.family).or_default();
            for (label, hex) in def.colors {
                match parse_hex_color(&hex) {
                    Some(rgb) => {
                        colors.insert(label, rgb);
                    }
                    None => tracing::warn!("invalid color '{}' for '{}'", hex, label),
                }
            }
        }

        tracing::debug!(
            "loaded colors for {} families ({} labels)",
            registry.families.len(),
            registry.families.values().map(HashMap::len).sum::<usize>()
        );
        Ok(registry)
    }

    /// Known color, if palettes.json lists one
    pub fn known(&self, family: PaletteFamily, label: &str) -> Option<[u8; 3]> {
        self.families.get(&family)?.get(label).copied()
    }

    /// Known color or the hash-derived fallback
    pub fn color(&self, family: PaletteFamily, label: &str) -> [u8; 3] {
        self.known(family, label)
            .unwrap_or_else(|| hashed_color(family, label))
    }
}

/// Deterministic color for a label without a known one
pub fn hashed_color(family: PaletteFamily, label: &str) -> [u8; 3] {
    let mut hasher = Sha256::new();
    hasher.update(family.name().as_bytes());
    hasher.update(b":");
    hasher.update(label.as_bytes());
    let digest = hasher.finalize();
    [digest[0], digest[1], digest[2]]
}

/// Parse `#RRGGBB` / `RRGGBB` (an 8-digit form has its alpha ignored)
pub fn parse_hex_color(hex: &str) -> Option<[u8; 3]> {
    let hex = hex.trim_start_matches('#');
    if (hex.len() != 6 && hex.len() != 8) || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some([r, g, b])
}

pub fn to_hex(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

/// Color of `label` on the chart of `column`
pub fn color_for(column: Column, label: &str) -> [u8; 3] {
    COLOR_REGISTRY.color(PaletteFamily::for_column(column), label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#5ce1e6"), Some([92, 225, 230]));
        assert_eq!(parse_hex_color("98FB98"), Some([152, 251, 152]));
        assert_eq!(parse_hex_color("#8b0000FF"), Some([139, 0, 0]));
        assert_eq!(parse_hex_color("#12345"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
    }

    #[test]
    fn test_known_colors() {
        assert_eq!(color_for(Column::Feature, "Engine"), [0x5c, 0xe1, 0xe6]);
        assert_eq!(color_for(Column::Model, "Sonet"), [0x00, 0x4a, 0xad]);
        assert_eq!(to_hex(color_for(Column::Fact, "Very Negative")), "#8b0000");
    }

    #[test]
    fn test_fallback_is_deterministic() {
        let a = color_for(Column::Feature, "Sunroof");
        let b = color_for(Column::Feature, "Sunroof");
        assert_eq!(a, b);
        assert_eq!(a, hashed_color(PaletteFamily::Feature, "Sunroof"));
        assert_eq!(COLOR_REGISTRY.known(PaletteFamily::Feature, "Sunroof"), None);
    }

    #[test]
    fn test_family_scoping() {
        // "Engine" is a known feature color, not a known model color
        assert!(COLOR_REGISTRY.known(PaletteFamily::Model, "Engine").is_none());
        assert_eq!(PaletteFamily::for_column(Column::Segment), PaletteFamily::Model);
    }
}
