use serde::{Deserialize, Serialize};
use std::path::Path;

/// Card and spacing metrics for one layout invocation. Every pipeline stage
/// receives this struct; nothing reads process-wide constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub card_width: f32,
    pub card_height: f32,
    /// Gap between adjacent sibling subtrees in one generation.
    pub horizontal_spacing: f32,
    /// Distance between the card tops of consecutive generations.
    pub vertical_spacing: f32,
    /// Offset from a card's left edge to the next spouse card's left edge.
    pub spouse_spacing: f32,
    pub generation_label_width: f32,
    pub canvas_padding: f32,
    pub top_margin: f32,
    /// Padding added past the rightmost/bottommost card for the bounding box.
    pub bounds_margin: f32,
    /// Band height past the card row for the deepest generation.
    pub band_bottom_margin: f32,
    /// How far above the children's card tops the sibling bus rail sits.
    pub bus_rise: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            card_width: 170.0,
            card_height: 220.0,
            horizontal_spacing: 40.0,
            vertical_spacing: 360.0,
            spouse_spacing: 220.0,
            generation_label_width: 60.0,
            canvas_padding: 40.0,
            top_margin: 50.0,
            bounds_margin: 100.0,
            band_bottom_margin: 20.0,
            bus_rise: 20.0,
        }
    }
}

impl LayoutConfig {
    /// X coordinate of the first card in every generation row.
    pub fn left_margin(&self) -> f32 {
        self.generation_label_width + self.canvas_padding
    }
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<LayoutConfig> {
    let Some(path) = path else {
        return Ok(LayoutConfig::default());
    };
    let contents = std::fs::read_to_string(path)?;
    let config: LayoutConfig = serde_json::from_str(&contents)?;
    Ok(config)
}
